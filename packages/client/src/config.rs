//! Client configuration, populated from environment variables.

use std::time::Duration;

use crate::dispatch::RetryPolicy;
use crate::endpoint::{Endpoint, EndpointError, EndpointResolver};

/// User-Agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("wikiquery/", env!("CARGO_PKG_VERSION"));

/// Runtime configuration for a [`WikiClient`](crate::WikiClient).
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `WIKIQ_ENDPOINT` | (absent) | Default API endpoint |
/// | `WIKIQ_TIMEOUT_SECS` | `30` | HTTP request timeout |
/// | `WIKIQ_MAX_ATTEMPTS` | `3` | Total attempts per call, first one included |
/// | `WIKIQ_BACKOFF_MS` | `0` | Pause between attempts |
/// | `WIKIQ_USER_AGENT` | `wikiquery/<version>` | User-Agent header |
///
/// Unparsable numbers, and a zero timeout, fall back to their defaults. An unparsable endpoint is
/// an error.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint used when a client is built without an explicit one.
    pub endpoint: Option<Endpoint>,

    pub timeout_secs: u64,

    pub retry: RetryPolicy,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Populate config from the process environment.
    pub fn from_env() -> Result<Self, EndpointError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Populate config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EndpointError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let endpoint = lookup("WIKIQ_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .map(|v| Endpoint::parse(&v))
            .transpose()?;

        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let timeout_secs = number("WIKIQ_TIMEOUT_SECS")
            .filter(|&secs| secs > 0)
            .unwrap_or(defaults.timeout_secs);
        let max_attempts = number("WIKIQ_MAX_ATTEMPTS")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(defaults.retry.max_attempts);
        let backoff = number("WIKIQ_BACKOFF_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry.backoff);

        Ok(Self {
            endpoint,
            timeout_secs,
            retry: RetryPolicy::new(max_attempts).with_backoff(backoff),
            user_agent: lookup("WIKIQ_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl EndpointResolver for ClientConfig {
    fn resolve(&self) -> Option<Endpoint> {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.endpoint.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("WIKIQ_ENDPOINT", "https://en.wikipedia.org/w/api.php"),
            ("WIKIQ_TIMEOUT_SECS", "5"),
            ("WIKIQ_MAX_ATTEMPTS", "5"),
            ("WIKIQ_BACKOFF_MS", "250"),
            ("WIKIQ_USER_AGENT", "ratings-bot/1.0 (ops@example.org)"),
        ]))
        .unwrap();
        assert_eq!(
            config.resolve().map(|e| e.to_string()).as_deref(),
            Some("https://en.wikipedia.org/w/api.php")
        );
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff, Duration::from_millis(250));
        assert_eq!(config.user_agent, "ratings-bot/1.0 (ops@example.org)");
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("WIKIQ_TIMEOUT_SECS", "soon"),
            ("WIKIQ_MAX_ATTEMPTS", "-1"),
        ]))
        .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);

        let config = ClientConfig::from_lookup(lookup(&[("WIKIQ_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.timeout_secs, 30, "a zero timeout would fail every call");
    }

    #[test]
    fn bad_endpoint_is_an_error() {
        assert!(ClientConfig::from_lookup(lookup(&[("WIKIQ_ENDPOINT", "nope")])).is_err());
    }

    #[test]
    fn blank_endpoint_means_unset() {
        let config = ClientConfig::from_lookup(lookup(&[("WIKIQ_ENDPOINT", "  ")])).unwrap();
        assert!(config.endpoint.is_none());
    }
}
