//! Catalog records and their display logic.
//!
//! Records are plain data shared by every store adapter. Anything a page
//! needs to show (display names, formatted dates, URLs) is derived here once
//! instead of inside the adapters.

mod author;
mod book;
mod genre;
mod instance;

pub use author::Author;
pub use book::Book;
pub use genre::Genre;
pub use instance::{BookInstance, InstanceStatus};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Record counts shown on the catalog home page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCounts {
    /// Number of books.
    pub books: usize,
    /// Number of book copies.
    pub instances: usize,
    /// Number of copies with status `Available`.
    pub available_instances: usize,
    /// Number of authors.
    pub authors: usize,
    /// Number of genres.
    pub genres: usize,
}

/// Generate a new record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Medium-length date format, e.g. `Jan 5, 2020`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// ISO date for form inputs, e.g. `2020-01-05`.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_formats() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
        assert_eq!(format_date(date), "Jan 5, 2020");
        assert_eq!(iso_date(date), "2020-01-05");
        assert_eq!(parse_date(" 2020-01-05 "), Some(date));
        assert_eq!(parse_date("05/01/2020"), None);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
