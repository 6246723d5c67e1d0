//! The response of one remote call.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Decoded body of a response.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Payload {
    /// Structured data from an `action=query` call.
    Json(Value),
    /// Raw text, e.g. the wikitext of a page.
    Text(String),
}

/// A fully populated response: status code plus decoded payload.
///
/// There is no partially filled form; a failed call produces no
/// `ApiResponse` at all.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub payload: Payload,
}

impl ApiResponse {
    pub fn json(status: u16, data: Value) -> Self {
        Self {
            status,
            payload: Payload::Json(data),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            payload: Payload::Text(body.into()),
        }
    }

    /// `true` for HTTP 200 exactly.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// The structured payload, if this is a JSON response.
    pub fn data(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Json(v) => Some(v),
            Payload::Text(_) => None,
        }
    }

    /// Decode the payload into one of the typed schemas of this crate.
    ///
    /// A text payload is parsed as JSON first.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.payload {
            Payload::Json(v) => T::deserialize(v),
            Payload::Text(s) => serde_json::from_str(s),
        }
    }

    /// The body as a string. JSON string payloads are unwrapped; other JSON
    /// values are re-encoded.
    pub fn into_text(self) -> String {
        match self.payload {
            Payload::Text(s) => s,
            Payload::Json(Value::String(s)) => s,
            Payload::Json(other) => other.to_string(),
        }
    }
}
