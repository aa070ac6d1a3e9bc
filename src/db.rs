//! Storage capability interface and its adapters.
//!
//! Handlers only ever see `Arc<dyn CatalogStore>`. The adapter is chosen once
//! at startup from [`DatabaseConfig::backend`].

mod memory;
mod schema;

pub use memory::MemoryStore;
pub use schema::Database;

use crate::catalog::{Author, Book, BookInstance, CatalogCounts, Genre};
use crate::config::{Backend, DatabaseConfig};
use crate::error::Result;
use std::sync::Arc;

/// Create, read, update and delete operations for every catalog record.
///
/// Each call is atomic with respect to the referential rules it checks:
/// deleting an author, genre or book that is still referenced fails with
/// [`AppError::InUse`](crate::error::AppError::InUse), and writing a book or
/// copy that points at a missing record fails with
/// [`AppError::Validation`](crate::error::AppError::Validation).
///
/// Update and delete return `false` when the id is unknown.
pub trait CatalogStore: Send + Sync {
    /// Record counts for the home page.
    fn counts(&self) -> Result<CatalogCounts>;

    /// All authors ordered by family name, then first name.
    fn list_authors(&self) -> Result<Vec<Author>>;
    /// Look up an author.
    fn get_author(&self, id: &str) -> Result<Option<Author>>;
    /// Insert a new author.
    fn insert_author(&self, author: &Author) -> Result<()>;
    /// Replace every field of an existing author.
    fn update_author(&self, author: &Author) -> Result<bool>;
    /// Delete an author that no book references.
    fn delete_author(&self, id: &str) -> Result<bool>;

    /// All genres ordered by name.
    fn list_genres(&self) -> Result<Vec<Genre>>;
    /// Look up a genre.
    fn get_genre(&self, id: &str) -> Result<Option<Genre>>;
    /// Look up a genre by name, ignoring case.
    fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>>;
    /// Insert a new genre.
    fn insert_genre(&self, genre: &Genre) -> Result<()>;
    /// Rename an existing genre.
    fn update_genre(&self, genre: &Genre) -> Result<bool>;
    /// Delete a genre that no book references.
    fn delete_genre(&self, id: &str) -> Result<bool>;

    /// All books ordered by title.
    fn list_books(&self) -> Result<Vec<Book>>;
    /// Look up a book, including its genre ids.
    fn get_book(&self, id: &str) -> Result<Option<Book>>;
    /// Books written by an author.
    fn books_by_author(&self, author_id: &str) -> Result<Vec<Book>>;
    /// Books tagged with a genre.
    fn books_by_genre(&self, genre_id: &str) -> Result<Vec<Book>>;
    /// Insert a new book and its genre links.
    fn insert_book(&self, book: &Book) -> Result<()>;
    /// Replace every field of an existing book, including its genre set.
    fn update_book(&self, book: &Book) -> Result<bool>;
    /// Delete a book that has no copies, along with its genre links.
    fn delete_book(&self, id: &str) -> Result<bool>;

    /// All copies ordered by book title, then imprint.
    fn list_instances(&self) -> Result<Vec<BookInstance>>;
    /// Look up a copy.
    fn get_instance(&self, id: &str) -> Result<Option<BookInstance>>;
    /// Copies of a book.
    fn instances_by_book(&self, book_id: &str) -> Result<Vec<BookInstance>>;
    /// Insert a new copy.
    fn insert_instance(&self, instance: &BookInstance) -> Result<()>;
    /// Replace every field of an existing copy.
    fn update_instance(&self, instance: &BookInstance) -> Result<bool>;
    /// Delete a copy.
    fn delete_instance(&self, id: &str) -> Result<bool>;

    /// Books whose title contains `query`, ignoring case.
    fn search_books(&self, query: &str) -> Result<Vec<Book>>;
    /// Authors whose first or family name contains `query`, ignoring case.
    fn search_authors(&self, query: &str) -> Result<Vec<Author>>;
}

/// Open the store selected by the configuration.
pub fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn CatalogStore>> {
    match config.backend {
        Backend::Sqlite => {
            tracing::info!(path = %config.path.display(), "Opening SQLite store");
            Ok(Arc::new(Database::open(&config.path)?))
        }
        Backend::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Whether a store holds no records at all.
pub fn is_empty(store: &dyn CatalogStore) -> Result<bool> {
    let counts = store.counts()?;
    Ok(counts.authors == 0 && counts.genres == 0 && counts.books == 0 && counts.instances == 0)
}
