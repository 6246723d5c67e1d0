//! The API endpoint a client is bound to.

use std::fmt;
use std::str::FromStr;

use url::Url;

/// Base URL of a wiki's action API, e.g. `https://en.wikipedia.org/w/api.php`.
///
/// Raw page text is served by the sibling `index.php`, which is derived once
/// at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    api: Url,
    index: Url,
}

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("{input:?} is not a valid URL: {source}")]
    Parse {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme {0:?}; expected http or https")]
    Scheme(String),
}

impl Endpoint {
    pub fn parse(input: &str) -> Result<Self, EndpointError> {
        let parse_err = |source| EndpointError::Parse {
            input: input.to_owned(),
            source,
        };
        let api = Url::parse(input.trim()).map_err(parse_err)?;
        if !matches!(api.scheme(), "http" | "https") {
            return Err(EndpointError::Scheme(api.scheme().to_owned()));
        }
        let index = api.join("index.php").map_err(parse_err)?;
        Ok(Self { api, index })
    }

    /// The action API URL (`…/api.php`).
    pub fn api_url(&self) -> &Url {
        &self.api
    }

    /// The page-script URL (`…/index.php`) next to the API.
    pub fn index_url(&self) -> &Url {
        &self.index
    }

    pub fn as_str(&self) -> &str {
        self.api.as_str()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Supplies the default endpoint for clients built without one.
///
/// Implemented for closures and for [`ClientConfig`](crate::ClientConfig).
pub trait EndpointResolver {
    fn resolve(&self) -> Option<Endpoint>;
}

impl<F> EndpointResolver for F
where
    F: Fn() -> Option<Endpoint>,
{
    fn resolve(&self) -> Option<Endpoint> {
        self()
    }
}
