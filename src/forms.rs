//! Submitted form decoding and validation.

use crate::catalog::{Author, Book, BookInstance, Genre, InstanceStatus, iso_date, parse_date};
use serde::Serialize;

/// Maximum length of a name or title field.
const MAX_NAME_LEN: usize = 100;

/// Decoded form fields, keeping repeated keys in submission order.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    /// Decode an `application/x-www-form-urlencoded` body.
    pub fn from_urlencoded(body: &[u8]) -> Self {
        Self {
            fields: url::form_urlencoded::parse(body)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// Append a field.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value of a field, trimmed; empty when absent.
    pub fn get(&self, name: &str) -> String {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Every non-empty value of a repeated field, trimmed.
    pub fn get_all(&self, name: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }
}

/// A validation message for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name.
    pub field: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn require(errors: &mut Vec<FieldError>, field: &'static str, label: &str, value: &str) {
    if value.is_empty() {
        errors.push(FieldError::new(field, format!("{} must be specified.", label)));
    }
}

fn optional_date(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    label: &str,
    value: &str,
) -> Option<chrono::NaiveDate> {
    if value.is_empty() {
        return None;
    }
    let date = parse_date(value);
    if date.is_none() {
        errors.push(FieldError::new(field, format!("Invalid {}.", label)));
    }
    date
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ' ' | '-' | '\'' | '.')
}

fn name_field(errors: &mut Vec<FieldError>, field: &'static str, label: &str, value: &str) {
    if value.is_empty() {
        errors.push(FieldError::new(field, format!("{} must be specified.", label)));
    } else if value.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new(
            field,
            format!("{} must be at most {} characters.", label, MAX_NAME_LEN),
        ));
    } else if !value.chars().all(is_name_char) {
        errors.push(FieldError::new(
            field,
            format!("{} has non-alphanumeric characters.", label),
        ));
    }
}

// ============================================================================
// AUTHOR
// ============================================================================

/// Author form values as submitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthorForm {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl AuthorForm {
    pub fn from_fields(form: &FormData) -> Self {
        Self {
            first_name: form.get("first_name"),
            family_name: form.get("family_name"),
            date_of_birth: form.get("date_of_birth"),
            date_of_death: form.get("date_of_death"),
        }
    }

    pub fn from_author(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            family_name: author.family_name.clone(),
            date_of_birth: author.date_of_birth.map(iso_date).unwrap_or_default(),
            date_of_death: author.date_of_death.map(iso_date).unwrap_or_default(),
        }
    }

    /// Validate into an author with the given id and portrait.
    pub fn to_author(&self, id: String, image: Option<String>) -> Result<Author, Vec<FieldError>> {
        let mut errors = Vec::new();

        name_field(&mut errors, "first_name", "First name", &self.first_name);
        name_field(&mut errors, "family_name", "Family name", &self.family_name);
        let date_of_birth =
            optional_date(&mut errors, "date_of_birth", "date of birth", &self.date_of_birth);
        let date_of_death =
            optional_date(&mut errors, "date_of_death", "date of death", &self.date_of_death);

        if let (Some(birth), Some(death)) = (date_of_birth, date_of_death)
            && death < birth
        {
            errors.push(FieldError::new(
                "date_of_death",
                "Date of death must not be before date of birth.",
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Author {
            id,
            first_name: self.first_name.clone(),
            family_name: self.family_name.clone(),
            date_of_birth,
            date_of_death,
            image,
        })
    }
}

// ============================================================================
// GENRE
// ============================================================================

/// Genre form values as submitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenreForm {
    pub name: String,
}

impl GenreForm {
    pub fn from_fields(form: &FormData) -> Self {
        Self {
            name: form.get("name"),
        }
    }

    pub fn from_genre(genre: &Genre) -> Self {
        Self {
            name: genre.name.clone(),
        }
    }

    /// Validate into a genre with the given id.
    pub fn to_genre(&self, id: String) -> Result<Genre, Vec<FieldError>> {
        let len = self.name.chars().count();
        if !(3..=MAX_NAME_LEN).contains(&len) {
            return Err(vec![FieldError::new(
                "name",
                format!("Genre name must contain 3 to {} characters.", MAX_NAME_LEN),
            )]);
        }

        Ok(Genre {
            id,
            name: self.name.clone(),
        })
    }
}

// ============================================================================
// BOOK
// ============================================================================

/// Book form values as submitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<String>,
}

impl BookForm {
    pub fn from_fields(form: &FormData) -> Self {
        Self {
            title: form.get("title"),
            author: form.get("author"),
            summary: form.get("summary"),
            isbn: form.get("isbn"),
            genre: form.get_all("genre"),
        }
    }

    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author_id.clone(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: book.genre_ids.clone(),
        }
    }

    /// Validate into a book with the given id. Reference existence is
    /// checked by the store.
    pub fn to_book(&self, id: String) -> Result<Book, Vec<FieldError>> {
        let mut errors = Vec::new();

        require(&mut errors, "title", "Title", &self.title);
        require(&mut errors, "author", "Author", &self.author);
        require(&mut errors, "summary", "Summary", &self.summary);
        require(&mut errors, "isbn", "ISBN", &self.isbn);
        if self.genre.is_empty() {
            errors.push(FieldError::new("genre", "Select at least one genre."));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut book = Book {
            id,
            title: self.title.clone(),
            author_id: self.author.clone(),
            summary: self.summary.clone(),
            isbn: self.isbn.clone(),
            genre_ids: self.genre.clone(),
        };
        book.dedup_genres();
        Ok(book)
    }
}

// ============================================================================
// BOOK INSTANCE
// ============================================================================

/// Copy form values as submitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstanceForm {
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: String,
}

impl InstanceForm {
    pub fn from_fields(form: &FormData) -> Self {
        Self {
            book: form.get("book"),
            imprint: form.get("imprint"),
            status: form.get("status"),
            due_back: form.get("due_back"),
        }
    }

    pub fn from_instance(instance: &BookInstance) -> Self {
        Self {
            book: instance.book_id.clone(),
            imprint: instance.imprint.clone(),
            status: instance.status.as_str().to_string(),
            due_back: instance.due_back_iso(),
        }
    }

    /// Validate into a copy with the given id.
    pub fn to_instance(&self, id: String) -> Result<BookInstance, Vec<FieldError>> {
        let mut errors = Vec::new();

        require(&mut errors, "book", "Book", &self.book);
        require(&mut errors, "imprint", "Imprint", &self.imprint);

        let status = match self.status.trim() {
            "" => Some(InstanceStatus::default()),
            value => match value.parse::<InstanceStatus>() {
                Ok(status) => Some(status),
                Err(_) => {
                    errors.push(FieldError::new("status", "Invalid status."));
                    None
                }
            },
        };
        let due_back = optional_date(&mut errors, "due_back", "date", &self.due_back);

        match status {
            Some(status) if errors.is_empty() => Ok(BookInstance {
                id,
                book_id: self.book.clone(),
                imprint: self.imprint.clone(),
                status,
                due_back,
            }),
            _ => Err(errors),
        }
    }
}
