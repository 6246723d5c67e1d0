//! The result of an operation whose failure was absorbed at the dispatch
//! boundary.
//!
//! Every operation returns `Result<Outcome<T>, ClientError>`:
//!
//! | | Meaning | Logged |
//! |---|---------|--------|
//! | [`Outcome::Found`] | data | no |
//! | [`Outcome::NotFound`] | expected absence (empty list, missing page, non-200 fetch) | no |
//! | [`Outcome::Rejected`] | the service refused the request | error |
//! | [`Outcome::Degraded`] | transient failures exhausted the retry budget | warning |
//! | `Err(ClientError)` | must abort | no |
//!
//! [`Outcome::into_option`] collapses the middle three into `None` for
//! callers that only care whether data came back.

use serde::Serialize;
use wikiquery_api::ApiError;

use crate::error::TransientKind;

/// A call given up on after its retry budget ran out.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TransientFailure {
    pub kind: TransientKind,
    /// Attempts made, the first one included.
    pub attempts: u32,
    /// Message of the last error.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Found(T),
    NotFound,
    Rejected(ApiError),
    Degraded(TransientFailure),
}

impl<T> Outcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound)
    }

    /// `true` for rejected and degraded calls, i.e. failures as opposed to absence.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Rejected(_) | Outcome::Degraded(_))
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            Outcome::Found(v) => Some(v),
            _ => None,
        }
    }

    /// The data, or `None` for every other case.
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        self.and_then(|v| Outcome::Found(f(v)))
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Found(v) => f(v),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::Rejected(e) => Outcome::Rejected(e),
            Outcome::Degraded(t) => Outcome::Degraded(t),
        }
    }

    /// [`and_then`](Self::and_then) for fallible continuations.
    pub fn try_and_then<U, E>(
        self,
        f: impl FnOnce(T) -> Result<Outcome<U>, E>,
    ) -> Result<Outcome<U>, E> {
        match self {
            Outcome::Found(v) => f(v),
            Outcome::NotFound => Ok(Outcome::NotFound),
            Outcome::Rejected(e) => Ok(Outcome::Rejected(e)),
            Outcome::Degraded(t) => Ok(Outcome::Degraded(t)),
        }
    }
}
