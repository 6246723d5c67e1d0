//! Shared helpers for the wikiquery conformance test suite.
//!
//! Provides [`spawn_wiki`], which binds a `TcpListener` on an ephemeral port
//! and serves a small in-process imitation of a MediaWiki installation:
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `GET /w/api.php?action=query&list=users` | `users` entries, unknown names flagged `missing` |
//! | `GET /w/api.php?action=query&prop=info` | `pages` keyed by id, `redirect` flag, `missing` for unknown titles |
//! | `GET /w/api.php?action=query&prop=revisions` | as above plus `rvslots=main` revision content |
//! | `GET /w/index.php?action=raw&title=…` | raw wikitext, 404 for unknown titles |
//!
//! Titles are normalised the way MediaWiki does it (underscores to spaces,
//! first letter after the namespace upper-cased) and the mapping is reported
//! under `normalized`. Faults can be injected through [`WikiState`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};

/// Namespace whose titles get their first letter upper-cased separately.
const TALK_NS: &str = "Talk";

/// Content served by the mock wiki.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pages: BTreeMap<String, String>,
    redirects: BTreeSet<String>,
    users: BTreeMap<String, u64>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page. `title` must already be in normalised form.
    pub fn page(mut self, title: &str, wikitext: &str) -> Self {
        self.pages.insert(title.to_owned(), wikitext.to_owned());
        self
    }

    /// Add a page that is a redirect to `target`.
    pub fn redirect(mut self, title: &str, target: &str) -> Self {
        self.redirects.insert(title.to_owned());
        self.page(title, &format!("#REDIRECT [[{target}]]"))
    }

    pub fn user(mut self, name: &str, id: u64) -> Self {
        self.users.insert(name.to_owned(), id);
        self
    }

    /// Page ids are 1-based positions in title order.
    fn page_id(&self, title: &str) -> Option<u64> {
        self.pages
            .keys()
            .position(|t| t == title)
            .map(|i| i as u64 + 1)
    }
}

/// Shared state of a running mock wiki.
#[derive(Debug, Default)]
pub struct WikiState {
    fixture: Fixture,
    requests: AtomicUsize,
    fail_next: AtomicUsize,
    fail_status: AtomicU16,
    reject_next: Mutex<Option<(String, String)>>,
}

impl WikiState {
    /// Answer the next `n` requests with `503 Service Unavailable`.
    pub fn fail_next(&self, n: usize) {
        self.fail_next_with(n, StatusCode::SERVICE_UNAVAILABLE);
    }

    /// Answer the next `n` requests with `status` and an HTML error page, the
    /// way a proxy in front of the wiki would.
    pub fn fail_next_with(&self, n: usize, status: StatusCode) {
        self.fail_status.store(status.as_u16(), Ordering::SeqCst);
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Answer the next API request with an `{"error": …}` body.
    pub fn reject_next(&self, code: &str, info: &str) {
        *self.reject_next.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((code.to_owned(), info.to_owned()));
    }

    /// Requests received so far, on either route.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Count the request and consume one injected failure, if any is pending.
    fn begin(&self) -> Option<Response> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        injected.then(|| {
            let status = StatusCode::from_u16(self.fail_status.load(Ordering::SeqCst))
                .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
            (status, format!("<html><body>{status}</body></html>")).into_response()
        })
    }
}

/// Start an ephemeral mock wiki and return `(api_endpoint, state)`.
///
/// The endpoint is the full `api.php` URL, e.g.
/// `http://127.0.0.1:51234/w/api.php`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_wiki(fixture: Fixture) -> (String, Arc<WikiState>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");

    let state = Arc::new(WikiState {
        fixture,
        ..WikiState::default()
    });
    let router = Router::new()
        .route("/w/api.php", get(api))
        .route("/w/index.php", get(index))
        .with_state(Arc::clone(&state));

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("mock wiki error");
    });

    (format!("http://{addr}/w/api.php"), state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

type Params = HashMap<String, String>;

async fn api(State(state): State<Arc<WikiState>>, Query(params): Query<Params>) -> Response {
    if let Some(failure) = state.begin() {
        return failure;
    }

    let rejection = state
        .reject_next
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some((code, info)) = rejection {
        return api_error(&code, &info);
    }

    let param = |key: &str| params.get(key).map(String::as_str);
    if param("action") != Some("query") {
        return api_error("badvalue", "Unrecognized value for parameter \"action\".");
    }

    let fixture = &state.fixture;
    let body = match (param("list"), param("prop")) {
        (Some("users"), _) => users(fixture, param("ususers").unwrap_or_default()),
        (_, Some(prop @ ("info" | "revisions"))) => {
            pages(fixture, param("titles").unwrap_or_default(), prop == "revisions")
        }
        _ => json!({ "batchcomplete": "" }),
    };
    Json(body).into_response()
}

async fn index(State(state): State<Arc<WikiState>>, Query(params): Query<Params>) -> Response {
    if let Some(failure) = state.begin() {
        return failure;
    }
    if params.get("action").map(String::as_str) != Some("raw") {
        return (StatusCode::BAD_REQUEST, "unsupported action").into_response();
    }

    let title = normalize(params.get("title").map(String::as_str).unwrap_or_default());
    match state.fixture.pages.get(&title) {
        Some(text) => text.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn api_error(code: &str, info: &str) -> Response {
    Json(json!({ "error": { "code": code, "info": info } })).into_response()
}

fn users(fixture: &Fixture, names: &str) -> Value {
    let users: Vec<Value> = split(names)
        .map(|name| match fixture.users.get(name) {
            Some(id) => json!({ "userid": id, "name": name }),
            None => json!({ "name": name, "missing": "" }),
        })
        .collect();
    json!({ "batchcomplete": "", "query": { "users": users } })
}

fn pages(fixture: &Fixture, titles: &str, with_content: bool) -> Value {
    let mut normalized = Vec::new();
    let mut pages = Map::new();
    let mut missing = 0;

    for requested in split(titles) {
        let title = normalize(requested);
        if title != requested {
            normalized.push(json!({ "from": requested, "to": title }));
        }
        let ns = if title.starts_with(&format!("{TALK_NS}:")) { 1 } else { 0 };

        let (key, page) = match (fixture.page_id(&title), fixture.pages.get(&title)) {
            (Some(id), Some(text)) => {
                let mut page = json!({
                    "pageid": id,
                    "ns": ns,
                    "title": title,
                    "contentmodel": "wikitext",
                    "pagelanguage": "en",
                    "length": text.len(),
                });
                if fixture.redirects.contains(&title) {
                    page["redirect"] = json!("");
                }
                if with_content {
                    page["revisions"] = json!([{
                        "slots": { "main": {
                            "contentmodel": "wikitext",
                            "contentformat": "text/x-wiki",
                            "*": text,
                        } }
                    }]);
                }
                (id.to_string(), page)
            }
            _ => {
                missing += 1;
                (format!("-{missing}"), json!({ "ns": ns, "title": title, "missing": "" }))
            }
        };
        pages.insert(key, page);
    }

    if pages.is_empty() {
        return json!({ "batchcomplete": "" });
    }
    let mut query = json!({ "pages": pages });
    if !normalized.is_empty() {
        query["normalized"] = Value::Array(normalized);
    }
    json!({ "batchcomplete": "", "query": query })
}

fn split(values: &str) -> impl Iterator<Item = &str> {
    values.split('|').filter(|v| !v.is_empty())
}

/// Underscores to spaces, first letter upper-cased (after `Talk:` too).
fn normalize(title: &str) -> String {
    let title = title.trim().replace('_', " ");
    match title.split_once(':') {
        Some((ns, rest)) if ns.eq_ignore_ascii_case(TALK_NS) => {
            format!("{TALK_NS}:{}", capitalize(rest.trim_start()))
        }
        _ => capitalize(&title),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
