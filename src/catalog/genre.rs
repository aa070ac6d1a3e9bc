use super::new_id;
use serde::{Deserialize, Serialize};

/// A book genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Unique identifier.
    pub id: String,
    /// Genre name, unique case-insensitively.
    pub name: String,
}

impl Genre {
    /// Create a genre with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
        }
    }

    /// Detail page URL.
    pub fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }
}
