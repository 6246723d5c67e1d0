//! Semantic API errors.
//!
//! The action API reports a request it understood but refused in the body,
//! usually with HTTP 200:
//!
//! ```json
//! { "error": { "code": "badvalue", "info": "Unrecognized value for parameter \"list\": nope." } }
//! ```
//!
//! With `errorformat` set, the shape is a list instead:
//!
//! ```json
//! { "errors": [ { "code": "badvalue", "text": "Unrecognized value ..." } ] }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A remote-service-reported error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    /// Machine-readable error code (e.g. `"badvalue"`, `"readapidenied"`).
    pub code: String,

    /// Human-readable description.
    #[serde(default)]
    pub info: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            info: info.into(),
        }
    }

    /// Extract the error carried by a decoded response body, if any.
    pub fn from_body(body: &Value) -> Option<Self> {
        if let Some(err) = body.get("error") {
            return Some(Self::from_entry(err, "info"));
        }
        body.get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
            .map(|first| Self::from_entry(first, "text"))
    }

    fn from_entry(entry: &Value, text_key: &str) -> Self {
        let field = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            code: field("code").unwrap_or_else(|| "unknown".into()),
            info: field(text_key)
                .or_else(|| field("*"))
                .unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.info.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.info)
        }
    }
}
