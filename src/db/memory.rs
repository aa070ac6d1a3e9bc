//! Document-style store held in process memory.
//!
//! Every record is stored whole, references are plain ids, and each
//! operation runs under one lock so reference checks and writes cannot
//! interleave with other requests.

use super::CatalogStore;
use crate::catalog::{Author, Book, BookInstance, CatalogCounts, Genre, InstanceStatus};
use crate::error::{AppError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct Collections {
    authors: HashMap<String, Author>,
    genres: HashMap<String, Genre>,
    books: HashMap<String, Book>,
    instances: HashMap<String, BookInstance>,
}

impl Collections {
    fn check_book_references(&self, book: &Book) -> Result<()> {
        if !self.authors.contains_key(&book.author_id) {
            return Err(AppError::Validation(format!(
                "Author not found: {}",
                book.author_id
            )));
        }

        if let Some(missing) = book
            .genre_ids
            .iter()
            .find(|id| !self.genres.contains_key(*id))
        {
            return Err(AppError::Validation(format!("Genre not found: {}", missing)));
        }

        Ok(())
    }

    fn check_genre_name(&self, genre: &Genre) -> Result<()> {
        let taken = self
            .genres
            .values()
            .any(|g| g.id != genre.id && g.name.to_lowercase() == genre.name.to_lowercase());
        if taken {
            return Err(AppError::Validation(format!(
                "Genre '{}' already exists",
                genre.name
            )));
        }
        Ok(())
    }

    fn sorted_books<'a>(&self, books: impl Iterator<Item = &'a Book>) -> Vec<Book> {
        let mut books: Vec<Book> = books.cloned().collect();
        books.sort_by_key(|b| b.title.to_lowercase());
        books
    }

    fn book_title(&self, book_id: &str) -> String {
        self.books
            .get(book_id)
            .map(|b| b.title.to_lowercase())
            .unwrap_or_default()
    }
}

fn sort_authors(authors: &mut [Author]) {
    authors.sort_by_key(|a| (a.family_name.to_lowercase(), a.first_name.to_lowercase()));
}

/// In-memory catalog store.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for MemoryStore {
    fn counts(&self) -> Result<CatalogCounts> {
        let data = self.data.read();
        Ok(CatalogCounts {
            books: data.books.len(),
            instances: data.instances.len(),
            available_instances: data
                .instances
                .values()
                .filter(|i| i.status == InstanceStatus::Available)
                .count(),
            authors: data.authors.len(),
            genres: data.genres.len(),
        })
    }

    fn list_authors(&self) -> Result<Vec<Author>> {
        let mut authors: Vec<Author> = self.data.read().authors.values().cloned().collect();
        sort_authors(&mut authors);
        Ok(authors)
    }

    fn get_author(&self, id: &str) -> Result<Option<Author>> {
        Ok(self.data.read().authors.get(id).cloned())
    }

    fn insert_author(&self, author: &Author) -> Result<()> {
        let mut data = self.data.write();
        if data.authors.contains_key(&author.id) {
            return Err(AppError::Internal(format!(
                "Failed to create author: duplicate id {}",
                author.id
            )));
        }
        data.authors.insert(author.id.clone(), author.clone());
        Ok(())
    }

    fn update_author(&self, author: &Author) -> Result<bool> {
        let mut data = self.data.write();
        match data.authors.get_mut(&author.id) {
            Some(existing) => {
                *existing = author.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_author(&self, id: &str) -> Result<bool> {
        let mut data = self.data.write();
        let books = data.books.values().filter(|b| b.author_id == id).count();
        if books > 0 {
            return Err(AppError::InUse(format!(
                "Author has {} book(s) and cannot be deleted",
                books
            )));
        }
        Ok(data.authors.remove(id).is_some())
    }

    fn list_genres(&self) -> Result<Vec<Genre>> {
        let mut genres: Vec<Genre> = self.data.read().genres.values().cloned().collect();
        genres.sort_by_key(|g| g.name.to_lowercase());
        Ok(genres)
    }

    fn get_genre(&self, id: &str) -> Result<Option<Genre>> {
        Ok(self.data.read().genres.get(id).cloned())
    }

    fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>> {
        let needle = name.to_lowercase();
        Ok(self
            .data
            .read()
            .genres
            .values()
            .find(|g| g.name.to_lowercase() == needle)
            .cloned())
    }

    fn insert_genre(&self, genre: &Genre) -> Result<()> {
        let mut data = self.data.write();
        data.check_genre_name(genre)?;
        data.genres.insert(genre.id.clone(), genre.clone());
        Ok(())
    }

    fn update_genre(&self, genre: &Genre) -> Result<bool> {
        let mut data = self.data.write();
        if !data.genres.contains_key(&genre.id) {
            return Ok(false);
        }
        data.check_genre_name(genre)?;
        data.genres.insert(genre.id.clone(), genre.clone());
        Ok(true)
    }

    fn delete_genre(&self, id: &str) -> Result<bool> {
        let mut data = self.data.write();
        let books = data.books.values().filter(|b| b.has_genre(id)).count();
        if books > 0 {
            return Err(AppError::InUse(format!(
                "Genre has {} book(s) and cannot be deleted",
                books
            )));
        }
        Ok(data.genres.remove(id).is_some())
    }

    fn list_books(&self) -> Result<Vec<Book>> {
        let data = self.data.read();
        Ok(data.sorted_books(data.books.values()))
    }

    fn get_book(&self, id: &str) -> Result<Option<Book>> {
        Ok(self.data.read().books.get(id).cloned())
    }

    fn books_by_author(&self, author_id: &str) -> Result<Vec<Book>> {
        let data = self.data.read();
        Ok(data.sorted_books(data.books.values().filter(|b| b.author_id == author_id)))
    }

    fn books_by_genre(&self, genre_id: &str) -> Result<Vec<Book>> {
        let data = self.data.read();
        Ok(data.sorted_books(data.books.values().filter(|b| b.has_genre(genre_id))))
    }

    fn insert_book(&self, book: &Book) -> Result<()> {
        let mut data = self.data.write();
        data.check_book_references(book)?;

        let mut book = book.clone();
        book.dedup_genres();
        data.books.insert(book.id.clone(), book);
        Ok(())
    }

    fn update_book(&self, book: &Book) -> Result<bool> {
        let mut data = self.data.write();
        if !data.books.contains_key(&book.id) {
            return Ok(false);
        }
        data.check_book_references(book)?;

        let mut book = book.clone();
        book.dedup_genres();
        data.books.insert(book.id.clone(), book);
        Ok(true)
    }

    fn delete_book(&self, id: &str) -> Result<bool> {
        let mut data = self.data.write();
        let copies = data.instances.values().filter(|i| i.book_id == id).count();
        if copies > 0 {
            return Err(AppError::InUse(format!(
                "Book has {} copies and cannot be deleted",
                copies
            )));
        }
        Ok(data.books.remove(id).is_some())
    }

    fn list_instances(&self) -> Result<Vec<BookInstance>> {
        let data = self.data.read();
        let mut instances: Vec<BookInstance> = data.instances.values().cloned().collect();
        instances.sort_by_key(|i| (data.book_title(&i.book_id), i.imprint.to_lowercase()));
        Ok(instances)
    }

    fn get_instance(&self, id: &str) -> Result<Option<BookInstance>> {
        Ok(self.data.read().instances.get(id).cloned())
    }

    fn instances_by_book(&self, book_id: &str) -> Result<Vec<BookInstance>> {
        let mut instances: Vec<BookInstance> = self
            .data
            .read()
            .instances
            .values()
            .filter(|i| i.book_id == book_id)
            .cloned()
            .collect();
        instances.sort_by_key(|i| i.imprint.to_lowercase());
        Ok(instances)
    }

    fn insert_instance(&self, instance: &BookInstance) -> Result<()> {
        let mut data = self.data.write();
        if !data.books.contains_key(&instance.book_id) {
            return Err(AppError::Validation(format!(
                "Book not found: {}",
                instance.book_id
            )));
        }
        data.instances.insert(instance.id.clone(), instance.clone());
        Ok(())
    }

    fn update_instance(&self, instance: &BookInstance) -> Result<bool> {
        let mut data = self.data.write();
        if !data.instances.contains_key(&instance.id) {
            return Ok(false);
        }
        if !data.books.contains_key(&instance.book_id) {
            return Err(AppError::Validation(format!(
                "Book not found: {}",
                instance.book_id
            )));
        }
        data.instances.insert(instance.id.clone(), instance.clone());
        Ok(true)
    }

    fn delete_instance(&self, id: &str) -> Result<bool> {
        Ok(self.data.write().instances.remove(id).is_some())
    }

    fn search_books(&self, query: &str) -> Result<Vec<Book>> {
        let needle = query.to_lowercase();
        let data = self.data.read();
        Ok(data.sorted_books(
            data.books
                .values()
                .filter(|b| b.title.to_lowercase().contains(&needle)),
        ))
    }

    fn search_authors(&self, query: &str) -> Result<Vec<Author>> {
        let needle = query.to_lowercase();
        let mut authors: Vec<Author> = self
            .data
            .read()
            .authors
            .values()
            .filter(|a| a.matches(&needle))
            .cloned()
            .collect();
        sort_authors(&mut authors);
        Ok(authors)
    }
}
