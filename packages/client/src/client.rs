//! [`WikiClient`]: the typed operations on top of [`dispatch`](WikiClient::dispatch).
//!
//! | Operation | Request | `Found` |
//! |-----------|---------|---------|
//! | [`query`](WikiClient::query) | caller's parameters | the response, unmodified |
//! | [`get_page_content`](WikiClient::get_page_content) | `get_wikitext` | raw wikitext on status 200 |
//! | [`get_user_id`](WikiClient::get_user_id) | `list=users` | id of the first existing user |
//! | [`is_redirect`](WikiClient::is_redirect) | `prop=info` | (plain `bool`) |
//! | [`get_page_info`](WikiClient::get_page_info) | `prop=info` | decoded page info on status 200 |
//! | [`get_raw_page_content`](WikiClient::get_raw_page_content) | `prop=revisions` | the pages map |
//!
//! The batch rating lookup lives in [`ratings`](crate::ratings).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;
use wikiquery::{Action, BannerRatingExtractor, Query, QueryValue, RatingExtractor};
use wikiquery_api::{ApiResponse, PageInfoResponse, PageRecord, Pages, RevisionsResponse, UsersResponse};

use crate::config::ClientConfig;
use crate::dispatch::RetryPolicy;
use crate::endpoint::{Endpoint, EndpointResolver};
use crate::error::ClientError;
use crate::outcome::Outcome;
use crate::sink::{EventSink, TracingSink};
use crate::transport::{HttpTransport, Transport};

/// Client bound to one wiki endpoint.
///
/// Holds no mutable state; share it across tasks behind an [`Arc`].
pub struct WikiClient {
    pub(crate) endpoint: Endpoint,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) extractor: Arc<dyn RatingExtractor>,
    pub(crate) retry: RetryPolicy,
}

impl WikiClient {
    /// Client for `endpoint`, logging through [`TracingSink`] and rating
    /// with [`BannerRatingExtractor`].
    pub fn new(endpoint: Endpoint, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
            sink: Arc::new(TracingSink),
            extractor: Arc::new(BannerRatingExtractor),
            retry: RetryPolicy::default(),
        }
    }

    /// Client for whatever endpoint `resolver` supplies.
    ///
    /// Fails with [`ClientError::NoEndpoint`] when it supplies none.
    pub fn from_resolver<R>(resolver: &R, transport: Arc<dyn Transport>) -> Result<Self, ClientError>
    where
        R: EndpointResolver + ?Sized,
    {
        let endpoint = resolver.resolve().ok_or(ClientError::NoEndpoint)?;
        Ok(Self::new(endpoint, transport))
    }

    /// HTTP client built entirely from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::from_config(config).map_err(ClientError::Build)?;
        Ok(Self::from_resolver(config, Arc::new(transport))?.with_retry(config.retry))
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn RatingExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Run an arbitrary `action=query` call.
    pub async fn query(&self, parameters: Query) -> Result<Outcome<ApiResponse>, ClientError> {
        self.dispatch(Action::Query, &parameters).await
    }

    /// Raw wikitext of `title`. Any status other than 200 is `NotFound`.
    pub async fn get_page_content(&self, title: &str) -> Result<Outcome<String>, ClientError> {
        let query = Query::new().with("title", title);
        let outcome = self.dispatch(Action::GetWikitext, &query).await?;
        Ok(outcome.and_then(|response| {
            if response.is_ok() {
                Outcome::Found(response.into_text())
            } else {
                debug!("client: no content for {title:?} (status {})", response.status);
                Outcome::NotFound
            }
        }))
    }

    /// Numeric id of `username`.
    ///
    /// An empty user list, or an entry flagged `missing`/`invalid`, is
    /// `NotFound`.
    pub async fn get_user_id(&self, username: &str) -> Result<Outcome<u64>, ClientError> {
        let query = Query::new().with("list", "users").with("ususers", username);
        self.dispatch(Action::Query, &query)
            .await?
            .try_and_then(|response| -> Result<_, ClientError> {
                if !response.is_ok() {
                    return Ok(Outcome::NotFound);
                }
                let users: UsersResponse = decode(&response)?;
                Ok(match users.users().first().and_then(|u| u.id()) {
                    Some(id) => Outcome::Found(id),
                    None => Outcome::NotFound,
                })
            })
    }

    /// Whether `title` is a redirect. Anything but a successful lookup
    /// answers `false`.
    pub async fn is_redirect(&self, title: &str) -> Result<bool, ClientError> {
        let info = self.get_page_info(&[title]).await?;
        Ok(info
            .found()
            .and_then(PageInfoResponse::first_page)
            .is_some_and(|page| page.redirect))
    }

    /// `prop=info` for `titles`, decoded. Any status other than 200 is
    /// `NotFound`.
    pub async fn get_page_info<S: AsRef<str>>(
        &self,
        titles: &[S],
    ) -> Result<Outcome<PageInfoResponse>, ClientError> {
        let query = Query::new()
            .with("prop", "info")
            .with("titles", titles_value(titles));
        self.dispatch(Action::Query, &query)
            .await?
            .try_and_then(|response| -> Result<_, ClientError> {
                if !response.is_ok() {
                    return Ok(Outcome::NotFound);
                }
                Ok(Outcome::Found(decode(&response)?))
            })
    }

    /// Latest main-slot wikitext of every page in `titles`, keyed by page id.
    ///
    /// A response without a `pages` section is `NotFound`.
    pub async fn get_raw_page_content<S: AsRef<str>>(
        &self,
        titles: &[S],
    ) -> Result<Outcome<Pages<PageRecord>>, ClientError> {
        let query = Query::new()
            .with("prop", "revisions")
            .with("rvprop", "content")
            .with("rvslots", "main")
            .with("titles", titles_value(titles));
        self.dispatch(Action::Query, &query)
            .await?
            .try_and_then(|response| -> Result<_, ClientError> {
                if !response.is_ok() {
                    return Ok(Outcome::NotFound);
                }
                let revisions: RevisionsResponse = decode(&response)?;
                Ok(match revisions.into_pages() {
                    Some(pages) => Outcome::Found(pages),
                    None => Outcome::NotFound,
                })
            })
    }
}

fn titles_value<S: AsRef<str>>(titles: &[S]) -> QueryValue {
    QueryValue::List(titles.iter().map(|t| t.as_ref().to_owned()).collect())
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ClientError> {
    response.decode().map_err(|source| ClientError::Decode {
        action: Action::Query,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wikiquery_api::ApiError;

    use crate::error::TransportError;
    use crate::sink::RecordingSink;
    use crate::test_support::{client_with, ScriptedTransport, TEST_ENDPOINT};

    fn scripted(replies: Vec<Result<ApiResponse, TransportError>>) -> (WikiClient, ScriptedTransport) {
        let transport = ScriptedTransport::new(replies);
        let client = client_with(transport.clone(), Arc::new(RecordingSink::new()));
        (client, transport)
    }

    fn refused() -> Result<ApiResponse, TransportError> {
        Err(TransportError::Connect("connection refused".into()))
    }

    #[test]
    fn from_resolver_without_endpoint_fails_fast() {
        let transport: Arc<dyn Transport> = Arc::new(ScriptedTransport::default());
        let none = || -> Option<Endpoint> { None };
        let err = WikiClient::from_resolver(&none, transport).err().unwrap();
        assert!(matches!(err, ClientError::NoEndpoint));
    }

    #[test]
    fn from_resolver_uses_supplied_endpoint() {
        let transport: Arc<dyn Transport> = Arc::new(ScriptedTransport::default());
        let resolver = || Endpoint::parse(TEST_ENDPOINT).ok();
        let client = WikiClient::from_resolver(&resolver, transport).unwrap();
        assert_eq!(client.endpoint().as_str(), TEST_ENDPOINT);
    }

    #[test]
    fn from_config_requires_endpoint() {
        let err = WikiClient::from_config(&ClientConfig::default()).err().unwrap();
        assert!(matches!(err, ClientError::NoEndpoint));
    }

    #[tokio::test]
    async fn query_passes_parameters_through() {
        let reply = ApiResponse::json(200, json!({ "query": { "general": {} } }));
        let (client, transport) = scripted(vec![Ok(reply.clone())]);

        let q = Query::new().with("meta", "siteinfo");
        let outcome = client.query(q.clone()).await.unwrap();

        assert_eq!(outcome, Outcome::Found(reply));
        assert_eq!(transport.seen(), vec![(Action::Query, q)]);
    }

    #[tokio::test]
    async fn page_content_on_200() {
        let (client, transport) = scripted(vec![Ok(ApiResponse::text(200, "'''Apple'''"))]);
        let outcome = client.get_page_content("Apple").await.unwrap();
        assert_eq!(outcome, Outcome::Found("'''Apple'''".to_string()));

        let (action, query) = &transport.seen()[0];
        assert_eq!(*action, Action::GetWikitext);
        assert_eq!(query.get_text("title"), Some("Apple"));
    }

    #[tokio::test]
    async fn page_content_non_200_is_not_found() {
        let (client, _) = scripted(vec![Ok(ApiResponse::text(404, ""))]);
        assert_eq!(client.get_page_content("Pear").await.unwrap(), Outcome::NotFound);
    }

    #[tokio::test]
    async fn page_content_degrades_after_retries() {
        let (client, transport) = scripted(vec![refused(), refused(), refused()]);
        let outcome = client.get_page_content("Apple").await.unwrap();
        assert!(matches!(outcome, Outcome::Degraded(_)));
        assert_eq!(outcome.into_option(), None);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn user_id_found() {
        let body = json!({ "batchcomplete": "", "query": { "users": [ { "userid": 4242, "name": "Example" } ] } });
        let (client, transport) = scripted(vec![Ok(ApiResponse::json(200, body))]);

        assert_eq!(client.get_user_id("Example").await.unwrap(), Outcome::Found(4242));
        let (_, query) = &transport.seen()[0];
        assert_eq!(query.get_text("list"), Some("users"));
        assert_eq!(query.get_text("ususers"), Some("Example"));
    }

    #[tokio::test]
    async fn empty_user_list_is_not_found_and_not_logged() {
        let sink = Arc::new(RecordingSink::new());
        let transport = ScriptedTransport::new(vec![Ok(ApiResponse::json(
            200,
            json!({ "query": { "users": [] } }),
        ))]);
        let client = client_with(transport, sink.clone());

        assert_eq!(client.get_user_id("NoSuchUser").await.unwrap(), Outcome::NotFound);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn missing_user_entry_is_not_found() {
        let body = json!({ "query": { "users": [ { "name": "NoSuchUser", "missing": "" } ] } });
        let (client, _) = scripted(vec![Ok(ApiResponse::json(200, body))]);
        assert_eq!(client.get_user_id("NoSuchUser").await.unwrap(), Outcome::NotFound);
    }

    #[tokio::test]
    async fn user_list_of_wrong_shape_is_a_decode_error() {
        let body = json!({ "query": { "users": "not a list" } });
        let (client, _) = scripted(vec![Ok(ApiResponse::json(200, body))]);
        let err = client.get_user_id("Example").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { action: Action::Query, .. }));
    }

    #[tokio::test]
    async fn redirect_flag_is_read() {
        let body = json!({ "query": { "pages": {
            "736": { "pageid": 736, "ns": 0, "title": "UK", "redirect": "" }
        } } });
        let (client, transport) = scripted(vec![Ok(ApiResponse::json(200, body))]);

        assert!(client.is_redirect("UK").await.unwrap());
        let (_, query) = &transport.seen()[0];
        assert_eq!(query.get_text("prop"), Some("info"));
    }

    #[tokio::test]
    async fn non_redirect_page() {
        let body = json!({ "query": { "pages": {
            "12": { "pageid": 12, "ns": 0, "title": "Apple" }
        } } });
        let (client, _) = scripted(vec![Ok(ApiResponse::json(200, body))]);
        assert!(!client.is_redirect("Apple").await.unwrap());
    }

    #[tokio::test]
    async fn redirect_check_is_false_on_any_failure() {
        let (client, _) = scripted(vec![refused(), refused(), refused()]);
        assert!(!client.is_redirect("UK").await.unwrap());

        let (client, _) = scripted(vec![Err(TransportError::Api(ApiError::new(
            "invalidtitle",
            "Bad title",
        )))]);
        assert!(!client.is_redirect("<>").await.unwrap());

        let (client, _) = scripted(vec![Ok(ApiResponse::text(500, "oops"))]);
        assert!(!client.is_redirect("UK").await.unwrap());
    }

    #[tokio::test]
    async fn unclassified_failures_are_not_swallowed() {
        fn other() -> Result<ApiResponse, TransportError> {
            Err(TransportError::Other("certificate store unreadable".into()))
        }
        fn is_other(err: ClientError) -> bool {
            matches!(err, ClientError::Transport(TransportError::Other(_)))
        }

        let (client, _) = scripted(vec![other()]);
        assert!(is_other(client.is_redirect("UK").await.unwrap_err()));

        let (client, _) = scripted(vec![other()]);
        assert!(is_other(client.get_page_content("UK").await.unwrap_err()));

        let (client, _) = scripted(vec![other()]);
        assert!(is_other(client.get_user_id("Example").await.unwrap_err()));

        let (client, _) = scripted(vec![other()]);
        assert!(is_other(client.get_page_info(&["UK"]).await.unwrap_err()));

        let (client, _) = scripted(vec![other()]);
        assert!(is_other(client.get_raw_page_content(&["UK"]).await.unwrap_err()));
    }

    #[tokio::test]
    async fn page_info_joins_titles() {
        let body = json!({ "query": { "pages": {
            "1": { "pageid": 1, "ns": 0, "title": "A" },
            "2": { "pageid": 2, "ns": 0, "title": "B" }
        } } });
        let (client, transport) = scripted(vec![Ok(ApiResponse::json(200, body))]);

        let info = client.get_page_info(&["A", "B"]).await.unwrap().into_option().unwrap();
        assert_eq!(info.query.unwrap().pages.unwrap().len(), 2);

        let (_, query) = &transport.seen()[0];
        assert_eq!(query.get("titles").map(QueryValue::to_wire).as_deref(), Some("A|B"));
    }

    #[tokio::test]
    async fn page_info_non_200_is_not_found() {
        let (client, _) = scripted(vec![Ok(ApiResponse::json(404, json!({})))]);
        assert_eq!(client.get_page_info(&["A"]).await.unwrap(), Outcome::NotFound);
    }

    #[tokio::test]
    async fn raw_content_without_pages_is_not_found() {
        let (client, transport) = scripted(vec![Ok(ApiResponse::json(
            200,
            json!({ "batchcomplete": "" }),
        ))]);
        assert_eq!(
            client.get_raw_page_content(&["Talk:Apple"]).await.unwrap(),
            Outcome::NotFound
        );

        let (_, query) = &transport.seen()[0];
        assert_eq!(query.get_text("prop"), Some("revisions"));
        assert_eq!(query.get_text("rvprop"), Some("content"));
        assert_eq!(query.get_text("rvslots"), Some("main"));
    }

    #[tokio::test]
    async fn raw_content_returns_pages_map() {
        let body = json!({ "query": { "pages": {
            "812": { "pageid": 812, "ns": 1, "title": "Talk:Banana",
                     "revisions": [ { "slots": { "main": { "*": "{{WikiProject Food}}" } } } ] }
        } } });
        let (client, _) = scripted(vec![Ok(ApiResponse::json(200, body))]);

        let pages = client
            .get_raw_page_content(&["Talk:Banana"])
            .await
            .unwrap()
            .into_option()
            .unwrap();
        assert_eq!(pages["812"].first_wikitext(), Some("{{WikiProject Food}}"));
    }
}
