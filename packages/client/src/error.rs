//! Error types for the client and its transport.
//!
//! [`TransportError::class`] is the one place a transport failure is
//! classified; the dispatch primitive acts on its answer:
//!
//! | Variant | Class | Dispatch behaviour |
//! |---------|-------|--------------------|
//! | [`TransportError::Api`] | semantic | logged, not retried |
//! | [`TransportError::Timeout`], [`TransportError::Connect`], [`TransportError::Http`], [`TransportError::Protocol`] | transient | retried, then logged as a warning |
//! | [`TransportError::Other`] | unclassified | propagated as [`ClientError::Transport`] |

use serde::Serialize;
use wikiquery::Action;
use wikiquery_api::ApiError;

use crate::endpoint::EndpointError;

/// What kind of transient failure ended an attempt.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransientKind {
    Timeout,
    Connect,
    Http(u16),
    Protocol,
}

/// How the dispatch primitive treats a [`TransportError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// Refused by the service; carries the service's error.
    Semantic(ApiError),
    /// Worth another attempt.
    Transient(TransientKind),
    Unclassified,
}

/// Errors a [`Transport`](crate::Transport) can return for one call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The remote service understood the request and refused it.
    #[error("API error: {0}")]
    Api(ApiError),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    /// The HTTP layer failed the call: a 5xx or 429 from either endpoint, or
    /// any non-success status from the API without an error body.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The exchange broke off mid-request or mid-body.
    #[error("HTTP protocol failure: {0}")]
    Protocol(String),

    /// Anything else. Never retried, never swallowed.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    pub fn class(&self) -> ErrorClass {
        match self {
            TransportError::Api(e) => ErrorClass::Semantic(e.clone()),
            TransportError::Timeout(_) => ErrorClass::Transient(TransientKind::Timeout),
            TransportError::Connect(_) => ErrorClass::Transient(TransientKind::Connect),
            TransportError::Http { status, .. } => {
                ErrorClass::Transient(TransientKind::Http(*status))
            }
            TransportError::Protocol(_) => ErrorClass::Transient(TransientKind::Protocol),
            TransportError::Other(_) => ErrorClass::Unclassified,
        }
    }
}

/// Errors that abort a client operation.
///
/// Expected absence and absorbed failures are not errors; they are reported
/// through [`Outcome`](crate::Outcome).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No endpoint was supplied and the resolver had none either.
    #[error("no endpoint supplied and no default endpoint configured")]
    NoEndpoint,

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] EndpointError),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// An unclassified transport failure, passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response did not match the schema the operation reads.
    #[error("unexpected {action} response shape: {source}")]
    Decode {
        action: Action,
        #[source]
        source: serde_json::Error,
    },
}
