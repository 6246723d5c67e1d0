//! Actions and query parameter mappings.
//!
//! A [`Query`] is the argument set for one remote [`Action`]. Values are
//! strings, lists of strings, or nested mappings ([`QueryValue`]). Keys are
//! kept in a `BTreeMap` so the wire encoding is deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named remote operation.
///
/// Serialises as a lowercase snake_case string (e.g. `"get_wikitext"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// `action=query` on the API endpoint.
    Query,
    /// Raw wikitext of a single page.
    GetWikitext,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Query => write!(f, "query"),
            Action::GetWikitext => write!(f, "get_wikitext"),
        }
    }
}

impl FromStr for Action {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(Action::Query),
            "get_wikitext" => Ok(Action::GetWikitext),
            _ => Err(format!(
                "unknown action {:?}; expected one of: query, get_wikitext",
                s
            )),
        }
    }
}

/// One parameter value.
///
/// Deserialises untagged: a JSON string, array of strings, or object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum QueryValue {
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, QueryValue>),
}

impl QueryValue {
    /// Encode the value the way the action API expects it on the wire.
    ///
    /// Lists use the MediaWiki multi-value separator `|`. Nested mappings have
    /// no native encoding and are sent as compact JSON text.
    pub fn to_wire(&self) -> String {
        match self {
            QueryValue::Text(s) => s.clone(),
            QueryValue::List(items) => items.join("|"),
            // A map of strings always serialises.
            QueryValue::Map(map) => serde_json::to_string(map).unwrap_or_default(),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Text(s.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Text(s)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(items: Vec<String>) -> Self {
        QueryValue::List(items)
    }
}

impl From<&[&str]> for QueryValue {
    fn from(items: &[&str]) -> Self {
        QueryValue::List(items.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl From<BTreeMap<String, QueryValue>> for QueryValue {
    fn from(map: BTreeMap<String, QueryValue>) -> Self {
        QueryValue::Map(map)
    }
}

/// Parameter mapping for a single call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Query {
    params: BTreeMap<String, QueryValue>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. A later value for the same key replaces the earlier one.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.get(key)
    }

    /// The value under `key` if it is a plain string.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.params.get(key) {
            Some(QueryValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten into `(name, value)` string pairs in key order.
    pub fn to_wire_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_wire()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Errors returned by [`parse_param`].
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("parameter {0:?} must have the form key=value")]
    MissingSeparator(String),

    #[error("parameter name must not be empty in {0:?}")]
    EmptyKey(String),
}

/// Parse a `key=value` argument. A value containing `|` becomes a list.
///
/// ```
/// use wikiquery::{parse_param, QueryValue};
///
/// let (k, v) = parse_param("titles=Apple|Banana").unwrap();
/// assert_eq!(k, "titles");
/// assert_eq!(v, QueryValue::List(vec!["Apple".into(), "Banana".into()]));
/// ```
pub fn parse_param(raw: &str) -> Result<(String, QueryValue), QueryError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| QueryError::MissingSeparator(raw.to_owned()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(QueryError::EmptyKey(raw.to_owned()));
    }
    let value = if value.contains('|') {
        QueryValue::List(value.split('|').map(str::to_owned).collect())
    } else {
        QueryValue::Text(value.to_owned())
    };
    Ok((key.to_owned(), value))
}
