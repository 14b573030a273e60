//! Room model.
//!
//! A room hosts at most one defense at a time. Rooms are tried in the
//! order the operator configured them, so list order is a preference.

use serde::{Deserialize, Serialize};

/// A defense room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Display name, unique case-insensitively within a configuration.
    pub name: String,
}

impl Room {
    /// Creates a new room.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Creates a room whose id is its name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
        }
    }

    /// Name key used for uniqueness checks (trimmed, lowercase).
    pub fn name_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}
