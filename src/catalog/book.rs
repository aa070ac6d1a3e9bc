//! Book model.

use super::new_id;
use serde::{Deserialize, Serialize};

/// A catalogued title. Copies are tracked separately as book instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book.
    pub id: String,

    /// Book title.
    pub title: String,

    /// Author reference.
    pub author_id: String,

    /// Book description or summary.
    pub summary: String,

    /// ISBN.
    pub isbn: String,

    /// Genre references, without duplicates.
    pub genre_ids: Vec<String>,
}

impl Book {
    /// Create a book with a fresh identifier.
    pub fn new(
        title: impl Into<String>,
        author_id: impl Into<String>,
        summary: impl Into<String>,
        isbn: impl Into<String>,
        genre_ids: Vec<String>,
    ) -> Self {
        let mut book = Self {
            id: new_id(),
            title: title.into(),
            author_id: author_id.into(),
            summary: summary.into(),
            isbn: isbn.into(),
            genre_ids,
        };
        book.dedup_genres();
        book
    }

    /// Remove repeated genre references, keeping first occurrences.
    pub fn dedup_genres(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.genre_ids.retain(|g| seen.insert(g.clone()));
    }

    /// Whether the book is tagged with the given genre.
    pub fn has_genre(&self, genre_id: &str) -> bool {
        self.genre_ids.iter().any(|g| g == genre_id)
    }

    /// Detail page URL.
    pub fn url(&self) -> String {
        format!("/catalog/book/{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genres_are_deduplicated() {
        let book = Book::new(
            "Dune",
            "a1",
            "Spice",
            "978",
            vec!["g1".into(), "g2".into(), "g1".into()],
        );
        assert_eq!(book.genre_ids, vec!["g1".to_string(), "g2".to_string()]);
        assert!(book.has_genre("g2"));
        assert!(!book.has_genre("g3"));
    }
}
