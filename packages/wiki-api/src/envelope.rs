//! The outer shape shared by every `action=query` response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::flag::{self, is_false};

/// Top-level `action=query` body. `Q` is the schema of the `query` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryEnvelope<Q> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Q>,

    /// All requested data fit into this response.
    #[serde(default, deserialize_with = "flag::deserialize", skip_serializing_if = "is_false")]
    pub batchcomplete: bool,

    /// Continuation parameters when the result was truncated.
    #[serde(
        rename = "continue",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub continuation: BTreeMap<String, Value>,

    /// Non-fatal warnings, keyed by module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Value>,
}
