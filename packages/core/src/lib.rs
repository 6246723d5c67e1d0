//! Pure-logic building blocks for wikiquery.
//!
//! This crate has no I/O. It defines what a remote call looks like and how
//! talk-page wikitext is classified; the network side lives in
//! `wikiquery-client`.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`query`] | [`Action`], [`Query`], [`QueryValue`] and their wire encoding |
//! | [`title`] | Talk-page addressing, title normalisation, deterministic ordering |
//! | [`rating`] | [`Rating`] and the [`RatingExtractor`] collaborator |
//!
//! # Quick start
//!
//! ```rust
//! use wikiquery::{BannerRatingExtractor, Query, RatingExtractor};
//!
//! let q = Query::new().with("list", "users").with("ususers", "Example");
//! assert_eq!(q.len(), 2);
//!
//! let rating = BannerRatingExtractor.extract("{{WikiProject Food|class=B}}");
//! assert!(rating.is_some());
//! ```

pub mod query;
pub mod rating;
pub mod title;

pub use query::{parse_param, Action, Query, QueryError, QueryValue};
pub use rating::{BannerRatingExtractor, Importance, QualityClass, Rating, RatingExtractor};
pub use title::{normalize_title, sort_case_insensitive, strip_talk_prefix, talk_page, TALK_PREFIX};
