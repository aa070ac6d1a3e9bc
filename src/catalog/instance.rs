use super::{format_date, iso_date, new_id};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Availability of a book copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InstanceStatus {
    /// On the shelf.
    Available,
    /// Being repaired or processed.
    #[default]
    Maintenance,
    /// Lent out.
    Loaned,
    /// Held for a patron.
    Reserved,
}

impl InstanceStatus {
    /// All statuses in form display order.
    pub const ALL: [InstanceStatus; 4] = [
        InstanceStatus::Maintenance,
        InstanceStatus::Available,
        InstanceStatus::Loaned,
        InstanceStatus::Reserved,
    ];

    /// Stored and displayed name.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Available => "Available",
            InstanceStatus::Maintenance => "Maintenance",
            InstanceStatus::Loaned => "Loaned",
            InstanceStatus::Reserved => "Reserved",
        }
    }

    /// CSS class used when rendering the status.
    pub fn css_class(&self) -> &'static str {
        match self {
            InstanceStatus::Available => "text-success",
            InstanceStatus::Maintenance => "text-danger",
            InstanceStatus::Loaned | InstanceStatus::Reserved => "text-warning",
        }
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown status: {}", s))
    }
}

/// A physical copy of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInstance {
    /// Unique identifier.
    pub id: String,
    /// The book this is a copy of.
    pub book_id: String,
    /// Publisher and edition details.
    pub imprint: String,
    /// Availability.
    pub status: InstanceStatus,
    /// Date the copy is due back, when loaned.
    pub due_back: Option<NaiveDate>,
}

impl BookInstance {
    /// Create a copy with a fresh identifier.
    pub fn new(
        book_id: impl Into<String>,
        imprint: impl Into<String>,
        status: InstanceStatus,
        due_back: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: new_id(),
            book_id: book_id.into(),
            imprint: imprint.into(),
            status,
            due_back,
        }
    }

    /// Due-back date as `Jan 5, 2020`, empty if unset.
    pub fn due_back_formatted(&self) -> String {
        self.due_back.map(format_date).unwrap_or_default()
    }

    /// Due-back date as `YYYY-MM-DD`, empty if unset.
    pub fn due_back_iso(&self) -> String {
        self.due_back.map(iso_date).unwrap_or_default()
    }

    /// Detail page URL.
    pub fn url(&self) -> String {
        format!("/catalog/bookinstance/{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!("loaned".parse::<InstanceStatus>(), Ok(InstanceStatus::Loaned));
        assert_eq!(
            " Available ".parse::<InstanceStatus>(),
            Ok(InstanceStatus::Available)
        );
        assert!("lost".parse::<InstanceStatus>().is_err());
        assert_eq!(InstanceStatus::default(), InstanceStatus::Maintenance);
    }

    #[test]
    fn due_back_formatting() {
        let mut copy = BookInstance::new("b1", "Gollancz, 2011", InstanceStatus::Loaned, None);
        assert_eq!(copy.due_back_formatted(), "");

        copy.due_back = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(copy.due_back_formatted(), "Mar 9, 2024");
        assert_eq!(copy.due_back_iso(), "2024-03-09");
    }
}
