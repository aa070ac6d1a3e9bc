//! Sample catalog for demos and manual testing.

use crate::catalog::{Author, Book, BookInstance, Genre, InstanceStatus};
use crate::db::{self, CatalogStore};
use crate::error::{AppError, Result};
use chrono::NaiveDate;

/// Number of records written by [`seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Authors written.
    pub authors: usize,
    /// Genres written.
    pub genres: usize,
    /// Books written.
    pub books: usize,
    /// Copies written.
    pub instances: usize,
}

type Ymd = (i32, u32, u32);

fn author(first: &str, family: &str, born: Option<Ymd>, died: Option<Ymd>) -> Author {
    let mut author = Author::new(first, family);
    author.date_of_birth = born.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
    author.date_of_death = died.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
    author
}

/// Ids written by one seeding run, so a failed run can be undone.
#[derive(Debug, Default)]
struct Written {
    authors: Vec<String>,
    genres: Vec<String>,
    books: Vec<String>,
    instances: Vec<String>,
}

impl Written {
    /// Delete everything written, dependents first.
    fn undo(&self, store: &dyn CatalogStore) {
        for id in self.instances.iter().rev() {
            log_undo("copy", id, store.delete_instance(id));
        }
        for id in self.books.iter().rev() {
            log_undo("book", id, store.delete_book(id));
        }
        for id in self.genres.iter().rev() {
            log_undo("genre", id, store.delete_genre(id));
        }
        for id in self.authors.iter().rev() {
            log_undo("author", id, store.delete_author(id));
        }
    }
}

fn log_undo(kind: &str, id: &str, result: Result<bool>) {
    if let Err(e) = result {
        tracing::warn!(kind, id, error = %e, "Failed to remove seeded record");
    }
}

/// Populate a store with a small fixed catalog.
///
/// Refuses to touch a store that already has records unless `force` is set.
/// If any write fails, records written by this run are removed again.
pub fn seed(store: &dyn CatalogStore, force: bool) -> Result<SeedSummary> {
    if !force && !db::is_empty(store)? {
        return Err(AppError::Validation(
            "Store already has records; use --force to seed anyway".to_string(),
        ));
    }

    let mut written = Written::default();
    match write_catalog(store, &mut written) {
        Ok(summary) => {
            tracing::info!(?summary, "Seeded sample catalog");
            Ok(summary)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Seeding failed, removing partial records");
            written.undo(store);
            Err(e)
        }
    }
}

fn write_catalog(store: &dyn CatalogStore, written: &mut Written) -> Result<SeedSummary> {

    let authors = [
        author("Patrick", "Rothfuss", Some((1973, 6, 6)), None),
        author("Ben", "Bova", Some((1932, 11, 8)), None),
        author("Isaac", "Asimov", Some((1920, 1, 2)), Some((1992, 4, 6))),
        author("Bob", "Billings", None, None),
        author("Jim", "Jones", Some((1971, 12, 16)), None),
    ];
    for a in &authors {
        store.insert_author(a)?;
        written.authors.push(a.id.clone());
    }

    // Genre names are unique, so a forced reseed reuses existing ones.
    let mut genres = Vec::new();
    for name in ["Fantasy", "Science Fiction", "French Poetry"] {
        let genre = match store.find_genre_by_name(name)? {
            Some(existing) => existing,
            None => {
                let genre = Genre::new(name);
                store.insert_genre(&genre)?;
                written.genres.push(genre.id.clone());
                genre
            }
        };
        genres.push(genre);
    }

    let [rothfuss, bova, _asimov, billings, _jones] = &authors;
    let (fantasy, science_fiction) = (&genres[0], &genres[1]);

    let books = [
        Book::new(
            "The Name of the Wind (The Kingkiller Chronicle, #1)",
            rothfuss.id.clone(),
            "I have stolen princesses back from sleeping barrow kings. I burned down the town of Trebon. I have spent the night with Felurian and left with both my sanity and my life.",
            "9781473211896",
            vec![fantasy.id.clone()],
        ),
        Book::new(
            "The Wise Man's Fear (The Kingkiller Chronicle, #2)",
            rothfuss.id.clone(),
            "Picking up the tale of Kvothe Kingkiller once again, we follow him into exile, into political intrigue, courtship, adventure, love and magic.",
            "9788401352836",
            vec![fantasy.id.clone()],
        ),
        Book::new(
            "The Slow Regard of Silent Things (Kingkiller Chronicle)",
            rothfuss.id.clone(),
            "Deep below the University, there is a dark place. Few people know of it: a broken web of ancient passageways and abandoned rooms.",
            "9780756411336",
            vec![fantasy.id.clone()],
        ),
        Book::new(
            "Apes and Angels",
            bova.id.clone(),
            "Humankind headed out to the stars not for conquest, nor exploration, nor even for curiosity. Humans went to the stars in a desperate crusade to save intelligent life wherever they found it.",
            "9780765379528",
            vec![science_fiction.id.clone()],
        ),
        Book::new(
            "Death Wave",
            bova.id.clone(),
            "In Ben Bova's previous novel New Earth, Jordan Kell led the first human mission beyond the solar system.",
            "9780765379504",
            vec![science_fiction.id.clone()],
        ),
        Book::new(
            "Test Book 1",
            billings.id.clone(),
            "Summary of test book 1",
            "ISBN111111",
            vec![fantasy.id.clone(), science_fiction.id.clone()],
        ),
        Book::new(
            "Test Book 2",
            billings.id.clone(),
            "Summary of test book 2",
            "ISBN222222",
            vec![science_fiction.id.clone()],
        ),
    ];
    for b in &books {
        store.insert_book(b)?;
        written.books.push(b.id.clone());
    }

    let due = NaiveDate::from_ymd_opt(2030, 1, 15);
    let tor_2016 = "New York Tom Doherty Associates, 2016.";
    let tor_2015 = "New York, NY Tom Doherty Associates, LLC, 2015.";
    let copies = [
        (0, "London Gollancz, 2014.", InstanceStatus::Available, None),
        (1, "Gollancz, 2011.", InstanceStatus::Loaned, due),
        (2, "Gollancz, 2015.", InstanceStatus::Maintenance, None),
        (3, tor_2016, InstanceStatus::Available, None),
        (3, tor_2016, InstanceStatus::Available, None),
        (3, tor_2016, InstanceStatus::Available, None),
        (4, tor_2015, InstanceStatus::Available, None),
        (4, tor_2015, InstanceStatus::Maintenance, None),
        (4, tor_2015, InstanceStatus::Loaned, due),
        (0, "Imprint XXX2", InstanceStatus::Maintenance, None),
        (1, "Imprint XXX3", InstanceStatus::Reserved, None),
    ];
    for (book, imprint, status, due_back) in copies {
        let copy = BookInstance::new(books[book].id.clone(), imprint, status, due_back);
        store.insert_instance(&copy)?;
        written.instances.push(copy.id);
    }

    Ok(SeedSummary {
        authors: authors.len(),
        genres: genres.len(),
        books: books.len(),
        instances: copies.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogCounts;
    use crate::db::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Memory store whose copy inserts fail once `copies_left` runs out.
    struct FlakyCopies {
        inner: MemoryStore,
        copies_left: AtomicUsize,
    }

    impl CatalogStore for FlakyCopies {
        fn counts(&self) -> Result<CatalogCounts> {
            self.inner.counts()
        }
        fn list_authors(&self) -> Result<Vec<Author>> {
            self.inner.list_authors()
        }
        fn get_author(&self, id: &str) -> Result<Option<Author>> {
            self.inner.get_author(id)
        }
        fn insert_author(&self, author: &Author) -> Result<()> {
            self.inner.insert_author(author)
        }
        fn update_author(&self, author: &Author) -> Result<bool> {
            self.inner.update_author(author)
        }
        fn delete_author(&self, id: &str) -> Result<bool> {
            self.inner.delete_author(id)
        }
        fn list_genres(&self) -> Result<Vec<Genre>> {
            self.inner.list_genres()
        }
        fn get_genre(&self, id: &str) -> Result<Option<Genre>> {
            self.inner.get_genre(id)
        }
        fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>> {
            self.inner.find_genre_by_name(name)
        }
        fn insert_genre(&self, genre: &Genre) -> Result<()> {
            self.inner.insert_genre(genre)
        }
        fn update_genre(&self, genre: &Genre) -> Result<bool> {
            self.inner.update_genre(genre)
        }
        fn delete_genre(&self, id: &str) -> Result<bool> {
            self.inner.delete_genre(id)
        }
        fn list_books(&self) -> Result<Vec<Book>> {
            self.inner.list_books()
        }
        fn get_book(&self, id: &str) -> Result<Option<Book>> {
            self.inner.get_book(id)
        }
        fn books_by_author(&self, author_id: &str) -> Result<Vec<Book>> {
            self.inner.books_by_author(author_id)
        }
        fn books_by_genre(&self, genre_id: &str) -> Result<Vec<Book>> {
            self.inner.books_by_genre(genre_id)
        }
        fn insert_book(&self, book: &Book) -> Result<()> {
            self.inner.insert_book(book)
        }
        fn update_book(&self, book: &Book) -> Result<bool> {
            self.inner.update_book(book)
        }
        fn delete_book(&self, id: &str) -> Result<bool> {
            self.inner.delete_book(id)
        }
        fn list_instances(&self) -> Result<Vec<BookInstance>> {
            self.inner.list_instances()
        }
        fn get_instance(&self, id: &str) -> Result<Option<BookInstance>> {
            self.inner.get_instance(id)
        }
        fn instances_by_book(&self, book_id: &str) -> Result<Vec<BookInstance>> {
            self.inner.instances_by_book(book_id)
        }
        fn insert_instance(&self, instance: &BookInstance) -> Result<()> {
            let left = self.copies_left.load(Ordering::SeqCst);
            if left == 0 {
                return Err(AppError::Internal("disk full".to_string()));
            }
            self.copies_left.store(left - 1, Ordering::SeqCst);
            self.inner.insert_instance(instance)
        }
        fn update_instance(&self, instance: &BookInstance) -> Result<bool> {
            self.inner.update_instance(instance)
        }
        fn delete_instance(&self, id: &str) -> Result<bool> {
            self.inner.delete_instance(id)
        }
        fn search_books(&self, query: &str) -> Result<Vec<Book>> {
            self.inner.search_books(query)
        }
        fn search_authors(&self, query: &str) -> Result<Vec<Author>> {
            self.inner.search_authors(query)
        }
    }

    #[test]
    fn failed_seed_leaves_store_empty() {
        let store = FlakyCopies {
            inner: MemoryStore::new(),
            copies_left: AtomicUsize::new(4),
        };

        assert!(matches!(seed(&store, false), Err(AppError::Internal(_))));
        assert_eq!(store.counts().unwrap(), CatalogCounts::default());

        // Nothing left behind, so a plain rerun is allowed.
        store.copies_left.store(usize::MAX, Ordering::SeqCst);
        assert_eq!(seed(&store, false).unwrap().instances, 11);
    }

    #[test]
    fn failed_forced_seed_keeps_existing_records() {
        let store = FlakyCopies {
            inner: MemoryStore::new(),
            copies_left: AtomicUsize::new(11),
        };
        seed(&store, false).unwrap();
        let before = store.counts().unwrap();

        store.copies_left.store(2, Ordering::SeqCst);
        assert!(seed(&store, true).is_err());
        assert_eq!(store.counts().unwrap(), before);
    }

    #[test]
    fn seed_populates_and_refuses_twice() {
        let store = MemoryStore::new();
        let summary = seed(&store, false).unwrap();

        let counts = store.counts().unwrap();
        assert_eq!(counts.authors, summary.authors);
        assert_eq!(counts.books, 7);
        assert_eq!(counts.instances, 11);
        assert_eq!(counts.available_instances, 5);

        assert!(matches!(seed(&store, false), Err(AppError::Validation(_))));
        assert!(seed(&store, true).is_ok());
        let counts = store.counts().unwrap();
        assert_eq!(counts.authors, 10);
        assert_eq!(counts.genres, 3);
    }
}
