//! Batch article rating lookup.
//!
//! Ratings live in WikiProject banners on each article's talk page. One
//! lookup fetches every talk page in a single `prop=revisions` request and
//! runs the client's [`RatingExtractor`](wikiquery::RatingExtractor) over
//! each page's wikitext.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;
use wikiquery::{normalize_title, sort_case_insensitive, strip_talk_prefix, talk_page, Rating};
use wikiquery_api::PageRecord;

use crate::client::WikiClient;
use crate::error::ClientError;
use crate::outcome::Outcome;

/// The rating of one article, or `None` when it has none.
///
/// Serialises as a single-entry map: `{"Banana": {"quality": …}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingEntry {
    /// Article title, spaces replaced by underscores.
    pub title: String,
    pub rating: Option<Rating>,
}

impl Serialize for RatingEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.title, &self.rating)?;
        map.end()
    }
}

/// Fold entries into a lookup map. Later duplicates win.
pub fn merge_ratings<I>(entries: I) -> BTreeMap<String, Option<Rating>>
where
    I: IntoIterator<Item = RatingEntry>,
{
    entries.into_iter().map(|e| (e.title, e.rating)).collect()
}

impl WikiClient {
    /// Ratings of `titles`, one entry per page the wiki returned.
    ///
    /// Entries come back sorted case-insensitively by title. If the batch
    /// fetch does not succeed the result is empty; the failure itself has
    /// already been reported on the sink.
    pub async fn get_article_rating<S: AsRef<str>>(
        &self,
        titles: &[S],
    ) -> Result<Vec<RatingEntry>, ClientError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let mut sorted: Vec<String> = titles.iter().map(|t| t.as_ref().to_owned()).collect();
        sort_case_insensitive(&mut sorted);
        let talk: Vec<String> = sorted.iter().map(|t| talk_page(t)).collect();

        let pages = match self.get_raw_page_content(&talk).await? {
            Outcome::Found(pages) => pages,
            other => {
                debug!("ratings: batch fetch of {} talk page(s) gave {other:?}", talk.len());
                return Ok(Vec::new());
            }
        };

        let mut entries: Vec<RatingEntry> = pages
            .values()
            .map(|page| RatingEntry {
                title: normalize_title(strip_talk_prefix(&page.title)),
                rating: self.parse_rating(Some(page)),
            })
            .collect();
        entries.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(entries)
    }

    /// Rating carried by one talk-page record.
    ///
    /// Absent and missing records have no rating.
    pub fn parse_rating(&self, record: Option<&PageRecord>) -> Option<Rating> {
        let record = record.filter(|r| !r.missing && !r.invalid)?;
        self.extractor.extract(record.first_wikitext()?)
    }
}
