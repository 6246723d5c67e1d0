//! Talk-page rating extraction.
//!
//! Articles are assessed through WikiProject banner templates placed on their
//! talk page, e.g.
//!
//! ```text
//! {{WikiProject banner shell|class=B|
//! {{WikiProject Food|importance=mid}}
//! {{WikiProject Plants|importance=high}}
//! }}
//! ```
//!
//! [`BannerRatingExtractor`] turns such wikitext into a [`Rating`]. Callers
//! that classify differently plug in their own [`RatingExtractor`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Quality assessment class, from the `class=` banner parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QualityClass {
    /// Featured article.
    Fa,
    /// Featured list.
    Fl,
    A,
    /// Good article.
    Ga,
    B,
    C,
    Start,
    Stub,
    List,
    /// A banner is present but carries no recognised class.
    Unassessed,
}

impl fmt::Display for QualityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityClass::Fa => "FA",
            QualityClass::Fl => "FL",
            QualityClass::A => "A",
            QualityClass::Ga => "GA",
            QualityClass::B => "B",
            QualityClass::C => "C",
            QualityClass::Start => "Start",
            QualityClass::Stub => "Stub",
            QualityClass::List => "List",
            QualityClass::Unassessed => "Unassessed",
        };
        f.write_str(s)
    }
}

/// Case-insensitive; surrounding whitespace is ignored.
impl FromStr for QualityClass {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fa" => Ok(QualityClass::Fa),
            "fl" => Ok(QualityClass::Fl),
            "a" => Ok(QualityClass::A),
            "ga" => Ok(QualityClass::Ga),
            "b" => Ok(QualityClass::B),
            "c" => Ok(QualityClass::C),
            "start" => Ok(QualityClass::Start),
            "stub" => Ok(QualityClass::Stub),
            "list" => Ok(QualityClass::List),
            _ => Err(format!("unknown quality class {:?}", s)),
        }
    }
}

/// Importance assessment, from the `importance=` banner parameter.
///
/// Ordered so that `Top` is the greatest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Unknown,
    Low,
    Mid,
    High,
    Top,
}

impl FromStr for Importance {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Importance::Low),
            "mid" => Ok(Importance::Mid),
            "high" => Ok(Importance::High),
            "top" => Ok(Importance::Top),
            _ => Err(format!("unknown importance {:?}", s)),
        }
    }
}

/// The classification of one article.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rating {
    pub quality: QualityClass,
    pub importance: Importance,
}

impl Rating {
    pub fn new(quality: QualityClass, importance: Importance) -> Self {
        Self {
            quality,
            importance,
        }
    }

    /// Banner present, nothing assessed yet.
    pub fn unassessed() -> Self {
        Self::new(QualityClass::Unassessed, Importance::Unknown)
    }
}

/// Turns raw talk-page wikitext into a [`Rating`].
///
/// Returns `None` when the text carries no rating at all.
pub trait RatingExtractor: Send + Sync {
    fn extract(&self, wikitext: &str) -> Option<Rating>;
}

impl<F> RatingExtractor for F
where
    F: Fn(&str) -> Option<Rating> + Send + Sync,
{
    fn extract(&self, wikitext: &str) -> Option<Rating> {
        self(wikitext)
    }
}

/// Reads `class=` and `importance=` from WikiProject banners.
///
/// - No banner: `None`.
/// - Quality: the first recognised `class=` value at or after the first
///   banner (the banner shell comes first when present), else `Unassessed`.
/// - Importance: the highest recognised `importance=` value, else `Unknown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BannerRatingExtractor;

impl RatingExtractor for BannerRatingExtractor {
    fn extract(&self, wikitext: &str) -> Option<Rating> {
        let start = BANNER_RE.find(wikitext)?.start();
        let banners = &wikitext[start..];

        let quality = CLASS_RE
            .captures_iter(banners)
            .find_map(|c| c[1].parse::<QualityClass>().ok())
            .unwrap_or(QualityClass::Unassessed);

        let importance = IMPORTANCE_RE
            .captures_iter(banners)
            .filter_map(|c| c[1].parse::<Importance>().ok())
            .max()
            .unwrap_or(Importance::Unknown);

        Some(Rating::new(quality, importance))
    }
}

/// `{{WikiProject …` or the `{{WP …` shorthand.
static BANNER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{\s*(?:wikiproject|wp)[\s_]").expect("invalid banner regex")
});

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\|\s*class\s*=\s*([^|}\n]*)").expect("invalid class regex")
});

static IMPORTANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\|\s*importance\s*=\s*([^|}\n]*)").expect("invalid importance regex")
});
