use super::{format_date, new_id};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A book author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Unique identifier.
    pub id: String,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub family_name: String,

    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,

    /// Date of death.
    pub date_of_death: Option<NaiveDate>,

    /// Public path of the portrait image (e.g. `/uploads/<file>`).
    pub image: Option<String>,
}

impl Author {
    /// Create an author with a fresh identifier and no dates.
    pub fn new(first_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            first_name: first_name.into(),
            family_name: family_name.into(),
            date_of_birth: None,
            date_of_death: None,
            image: None,
        }
    }

    /// Display name, `Family, First`.
    pub fn name(&self) -> String {
        match (self.family_name.is_empty(), self.first_name.is_empty()) {
            (false, false) => format!("{}, {}", self.family_name, self.first_name),
            (false, true) => self.family_name.clone(),
            (true, false) => self.first_name.clone(),
            (true, true) => String::new(),
        }
    }

    /// Lifespan such as `Jan 5, 1900 - Mar 3, 1980`; empty when no dates are known.
    pub fn lifespan(&self) -> String {
        match (self.date_of_birth, self.date_of_death) {
            (Some(birth), Some(death)) => format!("{} - {}", format_date(birth), format_date(death)),
            (Some(birth), None) => format!("{} -", format_date(birth)),
            (None, Some(death)) => format!("- {}", format_date(death)),
            (None, None) => String::new(),
        }
    }

    /// Detail page URL.
    pub fn url(&self) -> String {
        format!("/catalog/author/{}", self.id)
    }

    /// Whether the author matches a lowercase search needle.
    pub fn matches(&self, needle: &str) -> bool {
        self.first_name.to_lowercase().contains(needle)
            || self.family_name.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_lifespan() {
        let mut author = Author::new("Isaac", "Asimov");
        assert_eq!(author.name(), "Asimov, Isaac");
        assert_eq!(author.lifespan(), "");

        author.date_of_birth = NaiveDate::from_ymd_opt(1920, 1, 2);
        assert_eq!(author.lifespan(), "Jan 2, 1920 -");

        author.date_of_death = NaiveDate::from_ymd_opt(1992, 4, 6);
        assert_eq!(author.lifespan(), "Jan 2, 1920 - Apr 6, 1992");
        assert_eq!(author.url(), format!("/catalog/author/{}", author.id));
    }

    #[test]
    fn name_with_missing_parts() {
        assert_eq!(Author::new("", "Homer").name(), "Homer");
        assert_eq!(Author::new("Plato", "").name(), "Plato");
    }
}
