//! Page-level schemas: `prop=info` and `prop=revisions`.
//!
//! Pages come back keyed by page id. Missing pages get negative ids
//! (`"-1"`, `"-2"`, …), so the map order says nothing about the order of
//! the requested titles; look pages up by title.
//!
//! ```json
//! {
//!   "batchcomplete": "",
//!   "query": {
//!     "normalized": [ { "from": "Talk:banana", "to": "Talk:Banana" } ],
//!     "pages": {
//!       "-1":  { "ns": 1, "title": "Talk:Apple", "missing": "" },
//!       "812": { "pageid": 812, "ns": 1, "title": "Talk:Banana",
//!                "revisions": [ { "contentformat": "text/x-wiki", "*": "{{WikiProject Food}}" } ] }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::envelope::QueryEnvelope;
use crate::flag::{self, is_false};

/// Pages keyed by page id.
pub type Pages<P> = BTreeMap<String, P>;

/// Anything that can be stored in [`Pages`].
pub trait PageKey {
    /// The id under which `formatversion=2` list entries are re-keyed.
    fn page_id(&self) -> Option<u64>;
}

/// A `from` → `to` title mapping (normalisation or redirect resolution).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TitleMapping {
    pub from: String,
    pub to: String,
}

/// The `query` section of a page-oriented response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "P: Deserialize<'de> + PageKey"))]
pub struct PagesQuery<P> {
    /// Absent when the request named no resolvable titles.
    #[serde(
        default,
        deserialize_with = "deserialize_pages",
        skip_serializing_if = "Option::is_none"
    )]
    pub pages: Option<Pages<P>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub normalized: Vec<TitleMapping>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirects: Vec<TitleMapping>,
}

impl<P> Default for PagesQuery<P> {
    fn default() -> Self {
        Self {
            pages: None,
            normalized: Vec::new(),
            redirects: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PagesRepr<P> {
    Map(BTreeMap<String, P>),
    List(Vec<P>),
}

/// Accept both the keyed object (`formatversion=1`) and the list
/// (`formatversion=2`). List entries without an id are keyed `-1`, `-2`, …
fn deserialize_pages<'de, D, P>(deserializer: D) -> Result<Option<Pages<P>>, D::Error>
where
    D: Deserializer<'de>,
    P: Deserialize<'de> + PageKey,
{
    let repr = Option::<PagesRepr<P>>::deserialize(deserializer)?;
    Ok(repr.map(|repr| match repr {
        PagesRepr::Map(map) => map,
        PagesRepr::List(list) => {
            let mut missing = 0;
            list.into_iter()
                .map(|page| {
                    let key = match page.page_id() {
                        Some(id) => id.to_string(),
                        None => {
                            missing += 1;
                            format!("-{missing}")
                        }
                    };
                    (key, page)
                })
                .collect()
        }
    }))
}

// ---------------------------------------------------------------------------
// prop=info
// ---------------------------------------------------------------------------

/// One page entry of a `prop=info` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pageid: Option<u64>,

    #[serde(default)]
    pub ns: i64,

    pub title: String,

    #[serde(default, deserialize_with = "flag::deserialize", skip_serializing_if = "is_false")]
    pub missing: bool,

    #[serde(default, deserialize_with = "flag::deserialize", skip_serializing_if = "is_false")]
    pub invalid: bool,

    /// The page is a redirect to another page.
    #[serde(default, deserialize_with = "flag::deserialize", skip_serializing_if = "is_false")]
    pub redirect: bool,

    #[serde(default, deserialize_with = "flag::deserialize", skip_serializing_if = "is_false")]
    pub new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contentmodel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagelanguage: Option<String>,

    /// ISO 8601 timestamp of the last cache-relevant change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touched: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastrevid: Option<u64>,

    /// Page size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

impl PageKey for PageInfo {
    fn page_id(&self) -> Option<u64> {
        self.pageid
    }
}

/// Full decoded `prop=info` response.
pub type PageInfoResponse = QueryEnvelope<PagesQuery<PageInfo>>;

impl PageInfoResponse {
    /// The page entry with the lowest key, i.e. the only entry when a
    /// single title was requested.
    pub fn first_page(&self) -> Option<&PageInfo> {
        self.query
            .as_ref()
            .and_then(|q| q.pages.as_ref())
            .and_then(|pages| pages.values().next())
    }
}

// ---------------------------------------------------------------------------
// prop=revisions
// ---------------------------------------------------------------------------

/// Content of one revision slot (`rvslots=main`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    #[serde(rename = "*", default, skip_serializing_if = "Option::is_none")]
    pub legacy_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contentmodel: Option<String>,
}

impl Slot {
    fn text(&self) -> Option<&str> {
        self.content.as_deref().or(self.legacy_content.as_deref())
    }
}

/// One revision payload.
///
/// Depending on `rvslots` and `formatversion`, the wikitext sits under `*`,
/// `content`, or `slots.main.{*,content}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Revision {
    #[serde(rename = "*", default, skip_serializing_if = "Option::is_none")]
    pub legacy_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slots: BTreeMap<String, Slot>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contentformat: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contentmodel: Option<String>,
}

impl Revision {
    /// Raw wikitext of the main slot.
    pub fn wikitext(&self) -> Option<&str> {
        self.slots
            .get("main")
            .and_then(Slot::text)
            .or(self.content.as_deref())
            .or(self.legacy_content.as_deref())
    }
}

/// One page entry of a `prop=revisions` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pageid: Option<u64>,

    #[serde(default)]
    pub ns: i64,

    pub title: String,

    #[serde(default, deserialize_with = "flag::deserialize", skip_serializing_if = "is_false")]
    pub missing: bool,

    #[serde(default, deserialize_with = "flag::deserialize", skip_serializing_if = "is_false")]
    pub invalid: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revisions: Vec<Revision>,
}

impl PageRecord {
    /// Wikitext of the first revision, if the page exists and has one.
    pub fn first_wikitext(&self) -> Option<&str> {
        self.revisions.first().and_then(Revision::wikitext)
    }
}

impl PageKey for PageRecord {
    fn page_id(&self) -> Option<u64> {
        self.pageid
    }
}

/// Full decoded `prop=revisions` response.
pub type RevisionsResponse = QueryEnvelope<PagesQuery<PageRecord>>;

impl RevisionsResponse {
    /// Take the pages section, if the response has one.
    pub fn into_pages(self) -> Option<Pages<PageRecord>> {
        self.query.and_then(|q| q.pages)
    }
}
