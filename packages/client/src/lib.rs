//! Retrying remote-query client for MediaWiki-style wiki APIs.
//!
//! Every remote call funnels through [`WikiClient::dispatch`], which retries
//! transient failures, reports absorbed failures on an [`EventSink`], and
//! passes anything it cannot classify back to the caller.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`client`] | [`WikiClient`] and its typed operations |
//! | [`ratings`] | Batch talk-page rating lookup |
//! | [`dispatch`] | The retrying dispatch primitive and [`RetryPolicy`] |
//! | [`outcome`] | [`Outcome`]: found, not found, rejected, degraded |
//! | [`transport`] | [`Transport`] seam and the reqwest-backed [`HttpTransport`] |
//! | [`endpoint`] | [`Endpoint`] parsing and the [`EndpointResolver`] seam |
//! | [`sink`] | [`EventSink`], [`TracingSink`], [`RecordingSink`] |
//! | [`config`] | [`ClientConfig`], read from `WIKIQ_*` variables |
//! | [`error`] | [`TransportError`], [`ClientError`] |
//!
//! # Example
//!
//! ```no_run
//! use wikiquery_client::{ClientConfig, WikiClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let client = WikiClient::from_config(&config)?;
//!
//! if let Some(id) = client.get_user_id("Example").await?.into_option() {
//!     println!("user id {id}");
//! }
//! for entry in client.get_article_rating(&["Apple", "Banana"]).await? {
//!     println!("{}: {:?}", entry.title, entry.rating);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod outcome;
pub mod ratings;
pub mod sink;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use client::WikiClient;
pub use config::{ClientConfig, DEFAULT_USER_AGENT};
pub use dispatch::RetryPolicy;
pub use endpoint::{Endpoint, EndpointError, EndpointResolver};
pub use error::{ClientError, ErrorClass, TransientKind, TransportError};
pub use outcome::{Outcome, TransientFailure};
pub use ratings::{merge_ratings, RatingEntry};
pub use sink::{Event, EventContext, EventSink, RecordingSink, Severity, TracingSink};
pub use transport::{HttpTransport, Transport};
