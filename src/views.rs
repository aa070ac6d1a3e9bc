//! Server-side page rendering.
//!
//! Templates are compiled into the binary and registered once at startup.
//! Handlers hand over JSON built from the view models below; Handlebars
//! escapes every `{{value}}`, so stored text is never trusted as HTML.

use crate::catalog::{Author, Book, BookInstance, Genre, InstanceStatus, format_date, iso_date};
use crate::error::{AppError, Result};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Embedded templates, by registration name.
const TEMPLATES: &[(&str, &str)] = &[
    ("layout", include_str!("../templates/layout.hbs")),
    ("index", include_str!("../templates/index.hbs")),
    ("search_results", include_str!("../templates/search_results.hbs")),
    ("author_list", include_str!("../templates/author_list.hbs")),
    ("author_detail", include_str!("../templates/author_detail.hbs")),
    ("author_form", include_str!("../templates/author_form.hbs")),
    ("author_delete", include_str!("../templates/author_delete.hbs")),
    ("genre_list", include_str!("../templates/genre_list.hbs")),
    ("genre_detail", include_str!("../templates/genre_detail.hbs")),
    ("genre_form", include_str!("../templates/genre_form.hbs")),
    ("genre_delete", include_str!("../templates/genre_delete.hbs")),
    ("book_list", include_str!("../templates/book_list.hbs")),
    ("book_detail", include_str!("../templates/book_detail.hbs")),
    ("book_form", include_str!("../templates/book_form.hbs")),
    ("book_delete", include_str!("../templates/book_delete.hbs")),
    ("bookinstance_list", include_str!("../templates/bookinstance_list.hbs")),
    ("bookinstance_detail", include_str!("../templates/bookinstance_detail.hbs")),
    ("bookinstance_form", include_str!("../templates/bookinstance_form.hbs")),
    ("bookinstance_delete", include_str!("../templates/bookinstance_delete.hbs")),
];

/// Stylesheet served at `/static/style.css`.
pub const STYLESHEET: &str = include_str!("../templates/style.css");

/// Template registry.
pub struct Views {
    registry: Handlebars<'static>,
    site_title: String,
}

impl Views {
    /// Register all embedded templates.
    pub fn new(site_title: impl Into<String>) -> Result<Self> {
        let mut registry = Handlebars::new();

        for (name, source) in TEMPLATES {
            registry
                .register_template_string(name, *source)
                .map_err(|e| AppError::Internal(format!("Failed to register template {}: {}", name, e)))?;
        }

        tracing::debug!(templates = TEMPLATES.len(), "Registered templates");

        Ok(Self {
            registry,
            site_title: site_title.into(),
        })
    }

    /// Render a page. `data` must be a JSON object; `site_title` is added.
    pub fn render(&self, template: &str, mut data: Value) -> Result<String> {
        if let Some(object) = data.as_object_mut() {
            object.insert("site_title".to_string(), Value::from(self.site_title.as_str()));
        }

        Ok(self.registry.render(template, &data)?)
    }
}

// ============================================================================
// VIEW MODELS
// ============================================================================

/// Author as shown on pages.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub id: String,
    pub first_name: String,
    pub family_name: String,
    pub name: String,
    pub lifespan: String,
    pub date_of_birth: String,
    pub date_of_death: String,
    pub date_of_birth_formatted: String,
    pub date_of_death_formatted: String,
    pub image: Option<String>,
    pub url: String,
}

impl From<&Author> for AuthorView {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.clone(),
            first_name: author.first_name.clone(),
            family_name: author.family_name.clone(),
            name: author.name(),
            lifespan: author.lifespan(),
            date_of_birth: author.date_of_birth.map(iso_date).unwrap_or_default(),
            date_of_death: author.date_of_death.map(iso_date).unwrap_or_default(),
            date_of_birth_formatted: author.date_of_birth.map(format_date).unwrap_or_default(),
            date_of_death_formatted: author.date_of_death.map(format_date).unwrap_or_default(),
            image: author.image.clone(),
            url: author.url(),
        }
    }
}

/// Genre as shown on pages.
#[derive(Debug, Clone, Serialize)]
pub struct GenreView {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl From<&Genre> for GenreView {
    fn from(genre: &Genre) -> Self {
        Self {
            id: genre.id.clone(),
            name: genre.name.clone(),
            url: genre.url(),
        }
    }
}

/// Book with its author and genres resolved.
#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub url: String,
    pub author: Option<AuthorView>,
    pub genres: Vec<GenreView>,
}

impl BookView {
    /// Book without related records.
    pub fn bare(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            url: book.url(),
            author: None,
            genres: Vec::new(),
        }
    }

    /// Book with the author and genres found in the lookup maps.
    pub fn populated(
        book: &Book,
        authors: &HashMap<String, Author>,
        genres: &HashMap<String, Genre>,
    ) -> Self {
        Self {
            author: authors.get(&book.author_id).map(AuthorView::from),
            genres: book
                .genre_ids
                .iter()
                .filter_map(|id| genres.get(id))
                .map(GenreView::from)
                .collect(),
            ..Self::bare(book)
        }
    }
}

/// Book copy with its book resolved.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceView {
    pub id: String,
    pub imprint: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub due_back: String,
    pub due_back_formatted: String,
    pub url: String,
    pub book: Option<BookView>,
}

impl InstanceView {
    /// Copy with its book, if known.
    pub fn new(instance: &BookInstance, book: Option<&Book>) -> Self {
        Self {
            id: instance.id.clone(),
            imprint: instance.imprint.clone(),
            status: instance.status.as_str(),
            status_class: instance.status.css_class(),
            due_back: instance.due_back_iso(),
            due_back_formatted: instance.due_back_formatted(),
            url: instance.url(),
            book: book.map(BookView::bare),
        }
    }
}

/// One `<option>` or checkbox in a form.
#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Author choices for the book form.
pub fn author_options(authors: &[Author], selected: &str) -> Vec<OptionView> {
    authors
        .iter()
        .map(|a| OptionView {
            value: a.id.clone(),
            label: a.name(),
            selected: a.id == selected,
        })
        .collect()
}

/// Genre checkboxes for the book form.
pub fn genre_options(genres: &[Genre], checked: &[String]) -> Vec<OptionView> {
    genres
        .iter()
        .map(|g| OptionView {
            value: g.id.clone(),
            label: g.name.clone(),
            selected: checked.contains(&g.id),
        })
        .collect()
}

/// Book choices for the copy form.
pub fn book_options(books: &[Book], selected: &str) -> Vec<OptionView> {
    books
        .iter()
        .map(|b| OptionView {
            value: b.id.clone(),
            label: b.title.clone(),
            selected: b.id == selected,
        })
        .collect()
}

/// Status choices for the copy form.
pub fn status_options(selected: &str) -> Vec<OptionView> {
    let selected = selected
        .parse::<InstanceStatus>()
        .unwrap_or_default();

    InstanceStatus::ALL
        .iter()
        .map(|s| OptionView {
            value: s.as_str().to_string(),
            label: s.as_str().to_string(),
            selected: *s == selected,
        })
        .collect()
}

/// Index records by id for populating references.
pub fn by_id<T: Clone>(records: &[T], id: impl Fn(&T) -> &str) -> HashMap<String, T> {
    records
        .iter()
        .map(|r| (id(r).to_string(), r.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_templates_register_and_escape() {
        let views = Views::new("Test Library").unwrap();
        let mut author = Author::new("<b>Bold</b>", "O'Brien & Sons");
        author.date_of_birth = chrono::NaiveDate::from_ymd_opt(1901, 2, 3);

        let html = views
            .render(
                "author_list",
                json!({ "title": "Author List", "authors": [AuthorView::from(&author)] }),
            )
            .unwrap();

        assert!(html.contains("Test Library"));
        assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt;"));
        assert!(!html.contains("<b>Bold</b>"));
        assert!(html.contains("Feb 3, 1901"));
    }

    #[test]
    fn populated_book_resolves_references() {
        let author = Author::new("Ursula", "Le Guin");
        let genre = Genre::new("Fantasy");
        let book = Book::new(
            "A Wizard of Earthsea",
            author.id.clone(),
            "Ged",
            "978",
            vec![genre.id.clone(), "missing".to_string()],
        );

        let view = BookView::populated(
            &book,
            &by_id(std::slice::from_ref(&author), |a| a.id.as_str()),
            &by_id(std::slice::from_ref(&genre), |g| g.id.as_str()),
        );

        assert_eq!(view.author.unwrap().name, "Le Guin, Ursula");
        assert_eq!(view.genres.len(), 1);
        assert_eq!(view.genres[0].name, "Fantasy");
    }

    #[test]
    fn status_options_default_to_maintenance() {
        let options = status_options("");
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value, "Maintenance");

        let options = status_options("Loaned");
        assert!(options.iter().any(|o| o.selected && o.value == "Loaned"));
    }
}
