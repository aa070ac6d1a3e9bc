use super::CatalogStore;
use crate::catalog::{Author, Book, BookInstance, CatalogCounts, Genre, InstanceStatus};
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::Arc;

/// Relational catalog store backed by SQLite.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

const AUTHOR_COLUMNS: &str = "id, first_name, family_name, date_of_birth, date_of_death, image";
const BOOK_COLUMNS: &str = "b.id, b.title, b.author_id, b.summary, b.isbn";
const INSTANCE_COLUMNS: &str = "i.id, i.book_id, i.imprint, i.status, i.due_back";

/// Map a SQLite error into an internal error with context.
fn db_err(context: &'static str) -> impl FnOnce(rusqlite::Error) -> AppError {
    move |e| AppError::Internal(format!("Failed to {}: {}", context, e))
}

/// Case key for genre names and search. SQLite's own folding is ASCII-only.
fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Build a `LIKE` pattern matching `query` anywhere, with wildcards in the
/// input escaped by `\`. Compared against `fold()`ed columns.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in fold(query).chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl ToSql for InstanceStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for InstanceStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        first_name: row.get(1)?,
        family_name: row.get(2)?,
        date_of_birth: row.get(3)?,
        date_of_death: row.get(4)?,
        image: row.get(5)?,
    })
}

fn genre_from_row(row: &Row<'_>) -> rusqlite::Result<Genre> {
    Ok(Genre {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author_id: row.get(2)?,
        summary: row.get(3)?,
        isbn: row.get(4)?,
        genre_ids: Vec::new(),
    })
}

fn instance_from_row(row: &Row<'_>) -> rusqlite::Result<BookInstance> {
    Ok(BookInstance {
        id: row.get(0)?,
        book_id: row.get(1)?,
        imprint: row.get(2)?,
        status: row.get(3)?,
        due_back: row.get(4)?,
    })
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(db_err("open database"))?;
        Self::with_connection(conn)
    }

    /// Open in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err("open database"))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.create_scalar_function(
            "fold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(fold(&ctx.get::<String>(0)?)),
        )
        .map_err(db_err("register functions"))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS authors (
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                family_name TEXT NOT NULL,
                date_of_birth TEXT,
                date_of_death TEXT,
                image TEXT
            );

            CREATE TABLE IF NOT EXISTS genres (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS books (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author_id TEXT NOT NULL,
                summary TEXT NOT NULL,
                isbn TEXT NOT NULL,
                FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE RESTRICT
            );

            -- Book <-> genre links; position keeps the submitted order
            CREATE TABLE IF NOT EXISTS book_genres (
                book_id TEXT NOT NULL,
                genre_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (book_id, genre_id),
                FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
                FOREIGN KEY (genre_id) REFERENCES genres(id) ON DELETE RESTRICT
            );

            CREATE TABLE IF NOT EXISTS book_instances (
                id TEXT PRIMARY KEY,
                book_id TEXT NOT NULL,
                imprint TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Maintenance',
                due_back TEXT,
                FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE RESTRICT
            );

            CREATE INDEX IF NOT EXISTS idx_books_author ON books(author_id);
            CREATE INDEX IF NOT EXISTS idx_book_genres_genre ON book_genres(genre_id);
            CREATE INDEX IF NOT EXISTS idx_instances_book ON book_instances(book_id);
            "#,
        )
        .map_err(db_err("initialize schema"))?;

        Ok(())
    }

    fn count(conn: &Connection, sql: &str, id: &str) -> Result<usize> {
        conn.query_row(sql, params![id], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(db_err("count references"))
    }

    fn exists(conn: &Connection, table: &'static str, id: &str) -> Result<bool> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?1", table);
        Ok(Self::count(conn, &sql, id)? > 0)
    }

    /// Genre ids of one book, in submitted order.
    fn genre_ids(conn: &Connection, book_id: &str) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare_cached(
                "SELECT genre_id FROM book_genres WHERE book_id = ?1 ORDER BY position",
            )
            .map_err(db_err("prepare query"))?;

        let ids = stmt
            .query_map(params![book_id], |row| row.get(0))
            .map_err(db_err("load book genres"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err("collect book genres"))?;

        Ok(ids)
    }

    /// Run a book query and attach genre ids to every row.
    fn query_books(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Book>> {
        let mut stmt = conn.prepare(sql).map_err(db_err("prepare query"))?;
        let mut books = stmt
            .query_map(params, book_from_row)
            .map_err(db_err("list books"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err("collect books"))?;

        for book in &mut books {
            book.genre_ids = Self::genre_ids(conn, &book.id)?;
        }

        Ok(books)
    }

    fn query_instances(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<BookInstance>> {
        let mut stmt = conn.prepare(sql).map_err(db_err("prepare query"))?;
        let instances = stmt
            .query_map(params, instance_from_row)
            .map_err(db_err("list book instances"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err("collect book instances"))?;

        Ok(instances)
    }

    /// Check the author and genres a book points at.
    fn check_book_references(conn: &Connection, book: &Book) -> Result<()> {
        if !Self::exists(conn, "authors", &book.author_id)? {
            return Err(AppError::Validation(format!(
                "Author not found: {}",
                book.author_id
            )));
        }

        for genre_id in &book.genre_ids {
            if !Self::exists(conn, "genres", genre_id)? {
                return Err(AppError::Validation(format!("Genre not found: {}", genre_id)));
            }
        }

        Ok(())
    }

    fn write_genre_links(conn: &Connection, book: &Book) -> Result<()> {
        conn.execute("DELETE FROM book_genres WHERE book_id = ?1", params![book.id])
            .map_err(db_err("clear book genres"))?;

        let mut seen = std::collections::HashSet::new();
        for (position, genre_id) in book.genre_ids.iter().enumerate() {
            if !seen.insert(genre_id) {
                continue;
            }
            conn.execute(
                "INSERT INTO book_genres (book_id, genre_id, position) VALUES (?1, ?2, ?3)",
                params![book.id, genre_id, position as i64],
            )
            .map_err(db_err("link book genre"))?;
        }

        Ok(())
    }

    fn map_genre_write(e: rusqlite::Error, genre: &Genre) -> AppError {
        if e.to_string().contains("UNIQUE constraint") {
            AppError::Validation(format!("Genre '{}' already exists", genre.name))
        } else {
            AppError::Internal(format!("Failed to save genre: {}", e))
        }
    }
}

impl CatalogStore for Database {
    fn counts(&self) -> Result<CatalogCounts> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM books),
                (SELECT COUNT(*) FROM book_instances),
                (SELECT COUNT(*) FROM book_instances WHERE status = 'Available'),
                (SELECT COUNT(*) FROM authors),
                (SELECT COUNT(*) FROM genres)",
            [],
            |row| {
                Ok(CatalogCounts {
                    books: row.get::<_, i64>(0)? as usize,
                    instances: row.get::<_, i64>(1)? as usize,
                    available_instances: row.get::<_, i64>(2)? as usize,
                    authors: row.get::<_, i64>(3)? as usize,
                    genres: row.get::<_, i64>(4)? as usize,
                })
            },
        )
        .map_err(db_err("count records"))
    }

    // ========== AUTHOR OPERATIONS ==========

    fn list_authors(&self) -> Result<Vec<Author>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM authors
                 ORDER BY family_name COLLATE NOCASE, first_name COLLATE NOCASE",
                AUTHOR_COLUMNS
            ))
            .map_err(db_err("prepare query"))?;

        let authors = stmt
            .query_map([], author_from_row)
            .map_err(db_err("list authors"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err("collect authors"))?;

        Ok(authors)
    }

    fn get_author(&self, id: &str) -> Result<Option<Author>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {} FROM authors WHERE id = ?1", AUTHOR_COLUMNS),
            params![id],
            author_from_row,
        )
        .optional()
        .map_err(db_err("get author"))
    }

    fn insert_author(&self, author: &Author) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO authors (id, first_name, family_name, date_of_birth, date_of_death, image)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                author.id,
                author.first_name,
                author.family_name,
                author.date_of_birth,
                author.date_of_death,
                author.image,
            ],
        )
        .map_err(db_err("create author"))?;
        Ok(())
    }

    fn update_author(&self, author: &Author) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute(
                "UPDATE authors SET first_name = ?2, family_name = ?3, date_of_birth = ?4,
                    date_of_death = ?5, image = ?6
                 WHERE id = ?1",
                params![
                    author.id,
                    author.first_name,
                    author.family_name,
                    author.date_of_birth,
                    author.date_of_death,
                    author.image,
                ],
            )
            .map_err(db_err("update author"))?;
        Ok(rows > 0)
    }

    fn delete_author(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let books = Self::count(&conn, "SELECT COUNT(*) FROM books WHERE author_id = ?1", id)?;
        if books > 0 {
            return Err(AppError::InUse(format!(
                "Author has {} book(s) and cannot be deleted",
                books
            )));
        }

        let rows = conn
            .execute("DELETE FROM authors WHERE id = ?1", params![id])
            .map_err(db_err("delete author"))?;
        Ok(rows > 0)
    }

    // ========== GENRE OPERATIONS ==========

    fn list_genres(&self) -> Result<Vec<Genre>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT id, name FROM genres ORDER BY name COLLATE NOCASE")
            .map_err(db_err("prepare query"))?;

        let genres = stmt
            .query_map([], genre_from_row)
            .map_err(db_err("list genres"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err("collect genres"))?;

        Ok(genres)
    }

    fn get_genre(&self, id: &str) -> Result<Option<Genre>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name FROM genres WHERE id = ?1",
            params![id],
            genre_from_row,
        )
        .optional()
        .map_err(db_err("get genre"))
    }

    fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name FROM genres WHERE name_key = ?1",
            params![fold(name)],
            genre_from_row,
        )
        .optional()
        .map_err(db_err("find genre"))
    }

    fn insert_genre(&self, genre: &Genre) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO genres (id, name, name_key) VALUES (?1, ?2, ?3)",
            params![genre.id, genre.name, fold(&genre.name)],
        )
        .map_err(|e| Self::map_genre_write(e, genre))?;
        Ok(())
    }

    fn update_genre(&self, genre: &Genre) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute(
                "UPDATE genres SET name = ?2, name_key = ?3 WHERE id = ?1",
                params![genre.id, genre.name, fold(&genre.name)],
            )
            .map_err(|e| Self::map_genre_write(e, genre))?;
        Ok(rows > 0)
    }

    fn delete_genre(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let books = Self::count(
            &conn,
            "SELECT COUNT(*) FROM book_genres WHERE genre_id = ?1",
            id,
        )?;
        if books > 0 {
            return Err(AppError::InUse(format!(
                "Genre has {} book(s) and cannot be deleted",
                books
            )));
        }

        let rows = conn
            .execute("DELETE FROM genres WHERE id = ?1", params![id])
            .map_err(db_err("delete genre"))?;
        Ok(rows > 0)
    }

    // ========== BOOK OPERATIONS ==========

    fn list_books(&self) -> Result<Vec<Book>> {
        let conn = self.conn.lock();
        Self::query_books(
            &conn,
            &format!(
                "SELECT {} FROM books b ORDER BY b.title COLLATE NOCASE",
                BOOK_COLUMNS
            ),
            [],
        )
    }

    fn get_book(&self, id: &str) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        let book = conn
            .query_row(
                &format!("SELECT {} FROM books b WHERE b.id = ?1", BOOK_COLUMNS),
                params![id],
                book_from_row,
            )
            .optional()
            .map_err(db_err("get book"))?;

        match book {
            Some(mut book) => {
                book.genre_ids = Self::genre_ids(&conn, &book.id)?;
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    fn books_by_author(&self, author_id: &str) -> Result<Vec<Book>> {
        let conn = self.conn.lock();
        Self::query_books(
            &conn,
            &format!(
                "SELECT {} FROM books b WHERE b.author_id = ?1 ORDER BY b.title COLLATE NOCASE",
                BOOK_COLUMNS
            ),
            params![author_id],
        )
    }

    fn books_by_genre(&self, genre_id: &str) -> Result<Vec<Book>> {
        let conn = self.conn.lock();
        Self::query_books(
            &conn,
            &format!(
                "SELECT {} FROM books b
                 JOIN book_genres bg ON bg.book_id = b.id
                 WHERE bg.genre_id = ?1
                 ORDER BY b.title COLLATE NOCASE",
                BOOK_COLUMNS
            ),
            params![genre_id],
        )
    }

    fn insert_book(&self, book: &Book) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err("begin transaction"))?;

        Self::check_book_references(&tx, book)?;
        tx.execute(
            "INSERT INTO books (id, title, author_id, summary, isbn) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![book.id, book.title, book.author_id, book.summary, book.isbn],
        )
        .map_err(db_err("create book"))?;
        Self::write_genre_links(&tx, book)?;

        tx.commit().map_err(db_err("commit book"))?;
        Ok(())
    }

    fn update_book(&self, book: &Book) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err("begin transaction"))?;

        if !Self::exists(&tx, "books", &book.id)? {
            return Ok(false);
        }

        Self::check_book_references(&tx, book)?;
        tx.execute(
            "UPDATE books SET title = ?2, author_id = ?3, summary = ?4, isbn = ?5 WHERE id = ?1",
            params![book.id, book.title, book.author_id, book.summary, book.isbn],
        )
        .map_err(db_err("update book"))?;
        Self::write_genre_links(&tx, book)?;

        tx.commit().map_err(db_err("commit book"))?;
        Ok(true)
    }

    fn delete_book(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err("begin transaction"))?;

        let copies = Self::count(
            &tx,
            "SELECT COUNT(*) FROM book_instances WHERE book_id = ?1",
            id,
        )?;
        if copies > 0 {
            return Err(AppError::InUse(format!(
                "Book has {} copies and cannot be deleted",
                copies
            )));
        }

        tx.execute("DELETE FROM book_genres WHERE book_id = ?1", params![id])
            .map_err(db_err("clear book genres"))?;
        let rows = tx
            .execute("DELETE FROM books WHERE id = ?1", params![id])
            .map_err(db_err("delete book"))?;

        tx.commit().map_err(db_err("commit book"))?;
        Ok(rows > 0)
    }

    // ========== BOOK INSTANCE OPERATIONS ==========

    fn list_instances(&self) -> Result<Vec<BookInstance>> {
        let conn = self.conn.lock();
        Self::query_instances(
            &conn,
            &format!(
                "SELECT {} FROM book_instances i
                 JOIN books b ON b.id = i.book_id
                 ORDER BY b.title COLLATE NOCASE, i.imprint COLLATE NOCASE",
                INSTANCE_COLUMNS
            ),
            [],
        )
    }

    fn get_instance(&self, id: &str) -> Result<Option<BookInstance>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {} FROM book_instances i WHERE i.id = ?1", INSTANCE_COLUMNS),
            params![id],
            instance_from_row,
        )
        .optional()
        .map_err(db_err("get book instance"))
    }

    fn instances_by_book(&self, book_id: &str) -> Result<Vec<BookInstance>> {
        let conn = self.conn.lock();
        Self::query_instances(
            &conn,
            &format!(
                "SELECT {} FROM book_instances i WHERE i.book_id = ?1
                 ORDER BY i.imprint COLLATE NOCASE",
                INSTANCE_COLUMNS
            ),
            params![book_id],
        )
    }

    fn insert_instance(&self, instance: &BookInstance) -> Result<()> {
        let conn = self.conn.lock();
        if !Self::exists(&conn, "books", &instance.book_id)? {
            return Err(AppError::Validation(format!(
                "Book not found: {}",
                instance.book_id
            )));
        }

        conn.execute(
            "INSERT INTO book_instances (id, book_id, imprint, status, due_back)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                instance.id,
                instance.book_id,
                instance.imprint,
                instance.status,
                instance.due_back,
            ],
        )
        .map_err(db_err("create book instance"))?;
        Ok(())
    }

    fn update_instance(&self, instance: &BookInstance) -> Result<bool> {
        let conn = self.conn.lock();
        if !Self::exists(&conn, "book_instances", &instance.id)? {
            return Ok(false);
        }
        if !Self::exists(&conn, "books", &instance.book_id)? {
            return Err(AppError::Validation(format!(
                "Book not found: {}",
                instance.book_id
            )));
        }

        let rows = conn
            .execute(
                "UPDATE book_instances SET book_id = ?2, imprint = ?3, status = ?4, due_back = ?5
                 WHERE id = ?1",
                params![
                    instance.id,
                    instance.book_id,
                    instance.imprint,
                    instance.status,
                    instance.due_back,
                ],
            )
            .map_err(db_err("update book instance"))?;
        Ok(rows > 0)
    }

    fn delete_instance(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM book_instances WHERE id = ?1", params![id])
            .map_err(db_err("delete book instance"))?;
        Ok(rows > 0)
    }

    // ========== SEARCH ==========

    fn search_books(&self, query: &str) -> Result<Vec<Book>> {
        let conn = self.conn.lock();
        Self::query_books(
            &conn,
            &format!(
                "SELECT {} FROM books b WHERE fold(b.title) LIKE ?1 ESCAPE '\\'
                 ORDER BY b.title COLLATE NOCASE",
                BOOK_COLUMNS
            ),
            params![like_pattern(query)],
        )
    }

    fn search_authors(&self, query: &str) -> Result<Vec<Author>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM authors
                 WHERE fold(first_name) LIKE ?1 ESCAPE '\\'
                    OR fold(family_name) LIKE ?1 ESCAPE '\\'
                 ORDER BY family_name COLLATE NOCASE, first_name COLLATE NOCASE",
                AUTHOR_COLUMNS
            ))
            .map_err(db_err("prepare query"))?;

        let authors = stmt
            .query_map(params![like_pattern(query)], author_from_row)
            .map_err(db_err("search authors"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err("collect authors"))?;

        Ok(authors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        assert_eq!(like_pattern("ÉLAN"), "%élan%");
    }

    #[test]
    fn fold_function_lowercases_unicode() {
        let db = Database::open_memory().unwrap();
        let folded: String = db
            .conn
            .lock()
            .query_row("SELECT fold('ÉPOPÉE Ärger')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "épopée ärger");
    }

    #[test]
    fn foreign_keys_are_enabled() {
        let db = Database::open_memory().unwrap();
        let enabled: i64 = db
            .conn
            .lock()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
