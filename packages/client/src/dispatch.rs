//! The single funnel every network call goes through.
//!
//! ```text
//! START -> ATTEMPT
//! ATTEMPT --success--------------------------> Found(response)
//! ATTEMPT --semantic API error---------------> record(error)   -> Rejected
//! ATTEMPT --transient, attempts left---------> ATTEMPT
//! ATTEMPT --transient, budget spent----------> record(warning) -> Degraded
//! ATTEMPT --unclassified---------------------> Err(ClientError::Transport)
//! ```

use std::time::Duration;

use tracing::debug;
use wikiquery::{Action, Query};
use wikiquery_api::ApiResponse;

use crate::client::WikiClient;
use crate::error::{ClientError, ErrorClass, TransportError};
use crate::outcome::{Outcome, TransientFailure};
use crate::sink::{Event, EventContext, Severity};

/// Retry budget for transient failures.
///
/// The default is 3 attempts in total with no pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. `0` is treated as `1`.
    pub max_attempts: u32,
    /// Pause before each retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

impl WikiClient {
    /// Run `action` with `query` against this client's endpoint.
    ///
    /// Returns the transport's response unmodified on success, whatever its
    /// status. Semantic and exhausted transient failures are recorded on the
    /// sink and absorbed; unclassified failures are returned as
    /// [`ClientError::Transport`] without being recorded.
    pub async fn dispatch(
        &self,
        action: Action,
        query: &Query,
    ) -> Result<Outcome<ApiResponse>, ClientError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match self.transport.call(&self.endpoint, action, query).await {
                Ok(response) => return Ok(Outcome::Found(response)),
                Err(err) => err,
            };

            let kind = match err.class() {
                ErrorClass::Semantic(api_error) => {
                    self.report(Severity::Error, action, query, attempt, &err);
                    return Ok(Outcome::Rejected(api_error));
                }
                ErrorClass::Transient(kind) => kind,
                ErrorClass::Unclassified => return Err(ClientError::Transport(err)),
            };

            if attempt < max_attempts {
                debug!("dispatch: {action} attempt {attempt}/{max_attempts} failed, retrying: {err}");
                if !self.retry.backoff.is_zero() {
                    tokio::time::sleep(self.retry.backoff).await;
                }
                continue;
            }

            self.report(Severity::Warning, action, query, attempt, &err);
            return Ok(Outcome::Degraded(TransientFailure {
                kind,
                attempts: attempt,
                message: err.to_string(),
            }));
        }
    }

    fn report(
        &self,
        severity: Severity,
        action: Action,
        query: &Query,
        attempts: u32,
        err: &TransportError,
    ) {
        let message = match severity {
            Severity::Warning => format!("{action} gave up after {attempts} attempt(s): {err}"),
            Severity::Error => format!("{action} rejected: {err}"),
        };
        self.sink.record(Event {
            message,
            severity,
            context: Some(EventContext {
                action,
                query: query.clone(),
                endpoint: self.endpoint.to_string(),
                attempts,
            }),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use wikiquery_api::ApiError;

    use crate::error::TransientKind;
    use crate::sink::RecordingSink;
    use crate::test_support::{client_with, ScriptedTransport};

    fn ok() -> Result<ApiResponse, TransportError> {
        Ok(ApiResponse::json(200, json!({ "batchcomplete": "" })))
    }

    fn timeout() -> Result<ApiResponse, TransportError> {
        Err(TransportError::Timeout("operation timed out".into()))
    }

    #[tokio::test]
    async fn success_is_returned_unmodified() {
        let expected = ApiResponse::json(200, json!({ "query": { "anything": [1, 2, 3] } }));
        let transport = ScriptedTransport::new(vec![Ok(expected.clone())]);
        let sink = Arc::new(RecordingSink::new());
        let client = client_with(transport.clone(), sink.clone());

        let q = Query::new().with("meta", "siteinfo");
        let outcome = client.dispatch(Action::Query, &q).await.unwrap();

        assert_eq!(outcome, Outcome::Found(expected));
        assert_eq!(transport.calls(), 1);
        assert_eq!(transport.seen()[0], (Action::Query, q));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn up_to_two_transient_failures_are_absorbed() {
        for failures in 0..=2 {
            let mut script: Vec<_> = (0..failures).map(|_| timeout()).collect();
            script.push(ok());
            let transport = ScriptedTransport::new(script);
            let sink = Arc::new(RecordingSink::new());
            let client = client_with(transport.clone(), sink.clone());

            let outcome = client.dispatch(Action::Query, &Query::new()).await.unwrap();

            assert!(outcome.is_found(), "{failures} failure(s) should be absorbed");
            assert_eq!(transport.calls(), failures + 1);
            assert!(sink.is_empty());
        }
    }

    #[tokio::test]
    async fn three_transient_failures_degrade_with_one_warning() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Connect("connection refused".into())),
            timeout(),
            Err(TransportError::Http {
                status: 503,
                message: "Service Unavailable".into(),
            }),
            ok(),
        ]);
        let sink = Arc::new(RecordingSink::new());
        let client = client_with(transport.clone(), sink.clone());

        let outcome = client.dispatch(Action::Query, &Query::new()).await.unwrap();

        match outcome {
            Outcome::Degraded(failure) => {
                assert_eq!(failure.attempts, 3);
                assert_eq!(failure.kind, TransientKind::Http(503));
            }
            other => panic!("expected Degraded, got {other:?}"),
        }
        assert_eq!(transport.calls(), 3, "the fourth scripted reply must not be used");
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn semantic_error_is_not_retried() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Api(ApiError::new("badvalue", "Unrecognized value"))),
            ok(),
        ]);
        let sink = Arc::new(RecordingSink::new());
        let client = client_with(transport.clone(), sink.clone());

        let q = Query::new().with("list", "nope");
        let outcome = client.dispatch(Action::Query, &q).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Rejected(ApiError::new("badvalue", "Unrecognized value"))
        );
        assert_eq!(transport.calls(), 1);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, Severity::Error);
        let ctx = events[0].context.as_ref().unwrap();
        assert_eq!(ctx.action, Action::Query);
        assert_eq!(ctx.query, q);
        assert_eq!(ctx.endpoint, client.endpoint().to_string());
    }

    #[tokio::test]
    async fn unclassified_error_propagates_without_logging() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Other("certificate store unreadable".into())),
            ok(),
        ]);
        let sink = Arc::new(RecordingSink::new());
        let client = client_with(transport.clone(), sink.clone());

        let err = client
            .dispatch(Action::Query, &Query::new())
            .await
            .unwrap_err();

        match err {
            ClientError::Transport(TransportError::Other(inner)) => {
                assert_eq!(inner.to_string(), "certificate store unreadable");
            }
            other => panic!("expected the transport error back, got {other:?}"),
        }
        assert_eq!(transport.calls(), 1);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn budget_is_configurable() {
        let transport = ScriptedTransport::new((0..5).map(|_| timeout()).collect());
        let sink = Arc::new(RecordingSink::new());
        let client = client_with(transport.clone(), sink.clone()).with_retry(RetryPolicy::new(5));

        let outcome = client.dispatch(Action::Query, &Query::new()).await.unwrap();
        assert!(outcome.is_failure());
        assert_eq!(transport.calls(), 5);

        let transport = ScriptedTransport::new(vec![timeout(), ok()]);
        let client = client_with(transport.clone(), sink.clone()).with_retry(RetryPolicy::new(0));
        let outcome = client.dispatch(Action::Query, &Query::new()).await.unwrap();
        assert!(outcome.is_failure(), "a zero budget still makes one attempt");
        assert_eq!(transport.calls(), 1);
    }
}
