//! `list=users` schema.
//!
//! Unknown names are not dropped from the list; they come back flagged:
//!
//! ```json
//! { "query": { "users": [ { "name": "NoSuchUser", "missing": "" } ] } }
//! ```

use serde::{Deserialize, Serialize};

use crate::envelope::QueryEnvelope;
use crate::flag::{self, is_false};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userid: Option<u64>,

    pub name: String,

    #[serde(default, deserialize_with = "flag::deserialize", skip_serializing_if = "is_false")]
    pub missing: bool,

    /// The name is not a valid user name (e.g. contains `#`).
    #[serde(default, deserialize_with = "flag::deserialize", skip_serializing_if = "is_false")]
    pub invalid: bool,
}

impl UserEntry {
    /// The numeric id of an existing user.
    pub fn id(&self) -> Option<u64> {
        if self.missing || self.invalid {
            None
        } else {
            self.userid
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UsersQuery {
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

/// Full decoded `list=users` response.
pub type UsersResponse = QueryEnvelope<UsersQuery>;

impl UsersResponse {
    pub fn users(&self) -> &[UserEntry] {
        self.query.as_ref().map(|q| q.users.as_slice()).unwrap_or(&[])
    }
}
