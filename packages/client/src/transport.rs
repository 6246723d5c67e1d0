//! The network side of a call.
//!
//! [`Transport`] is the seam between the dispatch primitive and the wire.
//! [`HttpTransport`] speaks to a real MediaWiki over HTTP(S); tests plug in
//! scripted transports.
//!
//! # Wire mapping
//!
//! | Action | Request |
//! |--------|---------|
//! | `query` | `GET {api}?action=query&format=json&<params>` |
//! | `get_wikitext` | `GET {index}?title=<title>&action=raw` |
//!
//! A JSON body carrying an `error` (or `errors`) member becomes
//! [`TransportError::Api`], whatever the status. Statuses 5xx and 429 become
//! [`TransportError::Http`] on both routes. On the API route every other
//! non-success status becomes [`TransportError::Http`] too; only
//! `get_wikitext` hands a non-success status back inside the
//! [`ApiResponse`].
//!
//! Connections are not reused across calls: [`HttpTransport::from_config`]
//! keeps no idle connections in the pool.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;
use wikiquery::{Action, Query};
use wikiquery_api::{ApiError, ApiResponse};

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::TransportError;

/// Performs one remote call against `endpoint`.
///
/// Implementations hold no per-endpoint state; the endpoint is supplied on
/// every call.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn call(
        &self,
        endpoint: &Endpoint,
        action: Action,
        query: &Query,
    ) -> Result<ApiResponse, TransportError>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Wrap a pre-configured client (timeout, User-Agent, proxy…).
    ///
    /// The client's pool settings are kept as they are.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client with the timeout and User-Agent from `config`. Each
    /// call opens its own connection.
    pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::new(client))
    }

    async fn api_query(
        &self,
        endpoint: &Endpoint,
        query: &Query,
    ) -> Result<ApiResponse, TransportError> {
        let mut params = vec![
            ("action".to_owned(), "query".to_owned()),
            ("format".to_owned(), "json".to_owned()),
        ];
        params.extend(
            query
                .to_wire_pairs()
                .into_iter()
                .filter(|(k, _)| k != "action" && k != "format"),
        );

        let response = self
            .client
            .get(endpoint.api_url().clone())
            .query(&params)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        reject_transient_status(status)?;
        let body = response.text().await.map_err(classify)?;

        let data = serde_json::from_str::<Value>(&body).ok();
        if let Some(err) = data.as_ref().and_then(ApiError::from_body) {
            return Err(TransportError::Api(err));
        }
        if !status.is_success() {
            return Err(http_error(status));
        }
        match data {
            Some(data) => Ok(ApiResponse::json(status.as_u16(), data)),
            None => Err(TransportError::Other(
                format!("{status} response from the API is not JSON").into(),
            )),
        }
    }

    async fn raw_wikitext(
        &self,
        endpoint: &Endpoint,
        query: &Query,
    ) -> Result<ApiResponse, TransportError> {
        let title = query
            .get_text("title")
            .ok_or_else(|| TransportError::Other("get_wikitext needs a `title` parameter".into()))?;

        let mut params = vec![
            ("title".to_owned(), title.to_owned()),
            ("action".to_owned(), "raw".to_owned()),
        ];
        params.extend(
            query
                .to_wire_pairs()
                .into_iter()
                .filter(|(k, _)| k != "title" && k != "action"),
        );

        let response = self
            .client
            .get(endpoint.index_url().clone())
            .query(&params)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        reject_transient_status(status)?;
        let body = response.text().await.map_err(classify)?;
        Ok(ApiResponse::text(status.as_u16(), body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        endpoint: &Endpoint,
        action: Action,
        query: &Query,
    ) -> Result<ApiResponse, TransportError> {
        debug!("transport: {action} against {endpoint}");
        match action {
            Action::Query => self.api_query(endpoint, query).await,
            Action::GetWikitext => self.raw_wikitext(endpoint, query).await,
        }
    }
}

fn reject_transient_status(status: StatusCode) -> Result<(), TransportError> {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(http_error(status));
    }
    Ok(())
}

fn http_error(status: StatusCode) -> TransportError {
    TransportError::Http {
        status: status.as_u16(),
        message: status.canonical_reason().unwrap_or("unknown status").to_owned(),
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_request() || err.is_body() {
        TransportError::Protocol(err.to_string())
    } else {
        TransportError::Other(Box::new(err))
    }
}
