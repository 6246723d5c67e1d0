//! MediaWiki boolean flags.
//!
//! With `formatversion=1` a true flag is an empty string (`"missing": ""`)
//! and a false flag is simply absent. With `formatversion=2` flags are real
//! booleans. [`deserialize`] accepts both; use it with `#[serde(default)]`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Present means set, unless the value is `false` or `null`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(!matches!(value, Value::Bool(false) | Value::Null))
}

pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}
