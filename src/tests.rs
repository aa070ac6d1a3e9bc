use crate::catalog::{Author, Book, BookInstance, Genre, InstanceStatus};
use crate::config::{Backend, Config};
use crate::db::{CatalogStore, Database, MemoryStore};
use crate::error::AppError;
use crate::server::{AppState, create_router};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

// ============================================================================
// STORE BEHAVIOUR (both adapters)
// ============================================================================

fn stores() -> Vec<(&'static str, Box<dyn CatalogStore>)> {
    let sqlite: Box<dyn CatalogStore> = Box::new(Database::open_memory().unwrap());
    let memory: Box<dyn CatalogStore> = Box::new(MemoryStore::new());
    vec![("sqlite", sqlite), ("memory", memory)]
}

/// One author, one genre, one book by that author in that genre.
fn seed_book(store: &dyn CatalogStore, title: &str) -> (Author, Genre, Book) {
    let author = Author::new("Ursula", "Le Guin");
    store.insert_author(&author).unwrap();

    let genre = Genre::new(format!("Genre for {}", title));
    store.insert_genre(&genre).unwrap();

    let book = Book::new(title, author.id.clone(), "Summary", "978", vec![genre.id.clone()]);
    store.insert_book(&book).unwrap();

    (author, genre, book)
}

#[test]
fn store_author_delete_blocked_by_books() {
    for (name, store) in stores() {
        let store = store.as_ref();
        let (author, _, book) = seed_book(store, "A Wizard of Earthsea");

        let result = store.delete_author(&author.id);
        assert!(matches!(result, Err(AppError::InUse(_))), "{}", name);
        assert!(store.get_author(&author.id).unwrap().is_some(), "{}", name);

        let lonely = Author::new("Jim", "Jones");
        store.insert_author(&lonely).unwrap();
        assert!(store.delete_author(&lonely.id).unwrap(), "{}", name);
        assert!(store.get_author(&lonely.id).unwrap().is_none(), "{}", name);
        assert!(!store.delete_author(&lonely.id).unwrap(), "{}", name);

        assert!(store.delete_book(&book.id).unwrap(), "{}", name);
        assert!(store.delete_author(&author.id).unwrap(), "{}", name);
    }
}

#[test]
fn store_genre_delete_blocked_by_books() {
    for (name, store) in stores() {
        let store = store.as_ref();
        let (_, genre, book) = seed_book(store, "The Dispossessed");

        assert!(
            matches!(store.delete_genre(&genre.id), Err(AppError::InUse(_))),
            "{}",
            name
        );
        assert!(store.get_genre(&genre.id).unwrap().is_some(), "{}", name);

        // Deleting the book drops its genre links.
        assert!(store.delete_book(&book.id).unwrap(), "{}", name);
        assert!(store.books_by_genre(&genre.id).unwrap().is_empty(), "{}", name);
        assert!(store.delete_genre(&genre.id).unwrap(), "{}", name);
    }
}

#[test]
fn store_book_delete_blocked_by_copies() {
    for (name, store) in stores() {
        let store = store.as_ref();
        let (_, _, book) = seed_book(store, "The Lathe of Heaven");

        let copy = BookInstance::new(book.id.clone(), "Harper, 1971", InstanceStatus::Loaned, None);
        store.insert_instance(&copy).unwrap();

        assert!(
            matches!(store.delete_book(&book.id), Err(AppError::InUse(_))),
            "{}",
            name
        );
        assert!(store.get_book(&book.id).unwrap().is_some(), "{}", name);

        assert!(store.delete_instance(&copy.id).unwrap(), "{}", name);
        assert!(!store.delete_instance(&copy.id).unwrap(), "{}", name);
        assert!(store.delete_book(&book.id).unwrap(), "{}", name);
    }
}

#[test]
fn store_rejects_dangling_references() {
    for (name, store) in stores() {
        let store = store.as_ref();
        let (author, genre, book) = seed_book(store, "Lavinia");

        let orphan = Book::new("Orphan", "no-such-author", "S", "1", vec![genre.id.clone()]);
        assert!(
            matches!(store.insert_book(&orphan), Err(AppError::Validation(_))),
            "{}",
            name
        );

        let untagged = Book::new("Untagged", author.id.clone(), "S", "1", vec!["nope".into()]);
        assert!(
            matches!(store.insert_book(&untagged), Err(AppError::Validation(_))),
            "{}",
            name
        );
        assert_eq!(store.list_books().unwrap().len(), 1, "{}", name);

        let stray = BookInstance::new("no-such-book", "Imprint", InstanceStatus::Available, None);
        assert!(
            matches!(store.insert_instance(&stray), Err(AppError::Validation(_))),
            "{}",
            name
        );

        let mut moved = BookInstance::new(book.id.clone(), "Imprint", InstanceStatus::Available, None);
        store.insert_instance(&moved).unwrap();
        moved.book_id = "no-such-book".into();
        assert!(
            matches!(store.update_instance(&moved), Err(AppError::Validation(_))),
            "{}",
            name
        );

        let ghost = Author::new("No", "Body");
        assert!(!store.update_author(&ghost).unwrap(), "{}", name);
        assert!(!store.update_book(&orphan).unwrap(), "{}", name);
    }
}

#[test]
fn store_update_replaces_genre_set() {
    for (name, store) in stores() {
        let store = store.as_ref();
        let (_, first, mut book) = seed_book(store, "Tehanu");
        let second = Genre::new("Young Adult");
        let third = Genre::new("Mythology");
        store.insert_genre(&second).unwrap();
        store.insert_genre(&third).unwrap();

        book.genre_ids = vec![third.id.clone(), second.id.clone(), third.id.clone()];
        book.title = "Tehanu (Earthsea, #4)".into();
        assert!(store.update_book(&book).unwrap(), "{}", name);

        let stored = store.get_book(&book.id).unwrap().unwrap();
        assert_eq!(stored.title, "Tehanu (Earthsea, #4)", "{}", name);
        assert_eq!(stored.genre_ids, vec![third.id.clone(), second.id.clone()], "{}", name);
        assert!(store.books_by_genre(&first.id).unwrap().is_empty(), "{}", name);
        assert!(store.delete_genre(&first.id).unwrap(), "{}", name);
    }
}

#[test]
fn store_genre_names_unique_ignoring_case() {
    for (name, store) in stores() {
        let store = store.as_ref();
        let fantasy = Genre::new("Fantasy");
        store.insert_genre(&fantasy).unwrap();

        assert!(
            matches!(store.insert_genre(&Genre::new("fantasy")), Err(AppError::Validation(_))),
            "{}",
            name
        );
        assert_eq!(
            store.find_genre_by_name("FANTASY").unwrap().map(|g| g.id),
            Some(fantasy.id.clone()),
            "{}",
            name
        );

        let mut poetry = Genre::new("Poetry");
        store.insert_genre(&poetry).unwrap();
        poetry.name = "FANTASY".into();
        assert!(
            matches!(store.update_genre(&poetry), Err(AppError::Validation(_))),
            "{}",
            name
        );

        // Renaming to a different case of its own name is allowed.
        let mut renamed = fantasy.clone();
        renamed.name = "FANTASY".into();
        assert!(store.update_genre(&renamed).unwrap(), "{}", name);

        // Case folding covers accented letters too.
        let epic = Genre::new("Épopée");
        store.insert_genre(&epic).unwrap();
        assert!(
            matches!(store.insert_genre(&Genre::new("épopée")), Err(AppError::Validation(_))),
            "{}",
            name
        );
        assert_eq!(
            store.find_genre_by_name("ÉPOPÉE").unwrap().map(|g| g.id),
            Some(epic.id.clone()),
            "{}",
            name
        );
        assert_eq!(store.list_genres().unwrap().len(), 3, "{}", name);
    }
}

#[test]
fn store_lists_are_ordered() {
    for (name, store) in stores() {
        let store = store.as_ref();
        for (first, family) in [("Isaac", "asimov"), ("Ben", "Bova"), ("Anne", "Asimov")] {
            store.insert_author(&Author::new(first, family)).unwrap();
        }
        let names: Vec<String> = store.list_authors().unwrap().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Asimov, Anne", "asimov, Isaac", "Bova, Ben"], "{}", name);

        seed_book(store, "zebra");
        seed_book(store, "Apple");
        let titles: Vec<String> = store.list_books().unwrap().into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["Apple", "zebra"], "{}", name);
    }
}

#[test]
fn store_search_treats_input_literally() {
    for (name, store) in stores() {
        let store = store.as_ref();
        let tricky = "100% _Pure_ \\ Rust'; DROP TABLE books;--";
        seed_book(store, tricky);
        seed_book(store, "1000 Pure Rust");

        let found = store.search_books("0% _").unwrap();
        assert_eq!(found.len(), 1, "{}", name);
        assert_eq!(found[0].title, tricky, "{}", name);

        assert_eq!(store.search_books("\\").unwrap().len(), 1, "{}", name);
        assert_eq!(store.search_books("'; drop").unwrap().len(), 1, "{}", name);
        assert_eq!(store.search_books("pure").unwrap().len(), 2, "{}", name);
        assert!(store.search_books("%%").unwrap().is_empty(), "{}", name);

        let author = Author::new("Flannery", "O'Connor");
        store.insert_author(&author).unwrap();
        let authors = store.search_authors("o'con").unwrap();
        assert_eq!(authors.len(), 1, "{}", name);
        assert_eq!(authors[0].family_name, "O'Connor", "{}", name);

        seed_book(store, "Élan Vital");
        let accented = store.search_books("élan").unwrap();
        assert_eq!(accented.len(), 1, "{}", name);
        assert_eq!(accented[0].title, "Élan Vital", "{}", name);

        store.insert_author(&Author::new("Émile", "Zola")).unwrap();
        assert_eq!(store.search_authors("ÉMILE").unwrap().len(), 1, "{}", name);

        // Stored verbatim.
        let stored = store.get_book(&found[0].id).unwrap().unwrap();
        assert_eq!(stored.title, tricky, "{}", name);
    }
}

#[test]
fn store_counts_available_copies() {
    for (name, store) in stores() {
        let store = store.as_ref();
        let (_, _, book) = seed_book(store, "Always Coming Home");
        for status in [
            InstanceStatus::Available,
            InstanceStatus::Available,
            InstanceStatus::Loaned,
        ] {
            store
                .insert_instance(&BookInstance::new(book.id.clone(), "Imprint", status, None))
                .unwrap();
        }

        let counts = store.counts().unwrap();
        assert_eq!(counts.books, 1, "{}", name);
        assert_eq!(counts.instances, 3, "{}", name);
        assert_eq!(counts.available_instances, 2, "{}", name);
        assert_eq!(counts.authors, 1, "{}", name);
        assert_eq!(counts.genres, 1, "{}", name);
    }
}

#[test]
fn sqlite_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("library.db");

    let mut author = Author::new("Octavia", "Butler");
    author.date_of_birth = chrono::NaiveDate::from_ymd_opt(1947, 6, 22);
    author.image = Some("/uploads/x.png".into());
    {
        let db = Database::open(&path).unwrap();
        db.insert_author(&author).unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_author(&author.id).unwrap(), Some(author));
}

// ============================================================================
// CONFIG & ERRORS
// ============================================================================

#[test]
fn config_parse_toml() {
    let toml = r#"
[server]
bind = "127.0.0.1:9090"
title = "Branch Library"

[database]
backend = "memory"
path = "/tmp/test.db"

[uploads]
dir = "/tmp/portraits"
max_bytes = 1024
"#;
    let config = Config::parse(toml).unwrap();
    assert_eq!(config.server.bind.port(), 9090);
    assert_eq!(config.server.title, "Branch Library");
    assert_eq!(config.database.backend, Backend::Memory);
    assert_eq!(config.uploads.dir, std::path::PathBuf::from("/tmp/portraits"));
    assert_eq!(config.uploads.max_bytes, 1024);
}

#[test]
fn config_default_values() {
    let config = Config::default();
    assert_eq!(config.server.bind.port(), 3000);
    assert_eq!(config.database.backend, Backend::Sqlite);
    assert_eq!(config.uploads.max_bytes, 2 * 1024 * 1024);

    // The generated file parses back to the defaults.
    let generated = Config::parse(&Config::generate_default()).unwrap();
    assert_eq!(generated.server.bind, config.server.bind);
    assert_eq!(generated.database.path, config.database.path);
}

#[test]
fn config_rejects_unknown_backend() {
    let result = Config::parse("[database]\nbackend = \"postgres\"\n");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn error_status_codes() {
    assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    assert_eq!(
        AppError::Validation("x".into()).status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(AppError::InUse("x".into()).status(), StatusCode::CONFLICT);
    assert_eq!(
        AppError::Internal("x".into()).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn error_page_escapes_message() {
    let html = crate::error::error_page(StatusCode::NOT_FOUND, "<script>alert(1)</script>");
    assert!(html.contains("404 Not Found"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

// ============================================================================
// ROUTES
// ============================================================================

struct TestApp {
    router: Router,
    store: Arc<dyn CatalogStore>,
    uploads: TempDir,
}

/// One app per storage adapter.
fn test_apps() -> Vec<(&'static str, TestApp)> {
    let sqlite: Arc<dyn CatalogStore> = Arc::new(Database::open_memory().unwrap());
    let memory: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
    vec![("sqlite", test_app(sqlite)), ("memory", test_app(memory))]
}

fn test_app(store: Arc<dyn CatalogStore>) -> TestApp {
    let uploads = TempDir::new().unwrap();
    let mut config = Config::default();
    config.server.title = "Test Library".into();
    config.uploads.dir = uploads.path().to_path_buf();

    let state = AppState::new(config, store.clone()).unwrap();

    TestApp {
        router: create_router(state),
        store,
        uploads,
    }
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }

    async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> TestResponse {
        const BOUNDARY: &str = "----local-library-test";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((content_type, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"author_image\"; filename=\"portrait\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    async fn post_empty(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

#[tokio::test]
async fn route_home_redirects_to_catalog() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let response = app.get("/").await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location.as_deref(), Some("/catalog"));

        let index = app.get("/catalog").await;
        assert_eq!(index.status, StatusCode::OK);
        assert!(index.body.contains("Test Library"));
    }
}

#[tokio::test]
async fn route_create_author_then_detail() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let created = app
            .post_multipart(
                "/catalog/author/create",
                &[
                    ("first_name", "Patrick"),
                    ("family_name", "Rothfuss"),
                    ("date_of_birth", "1973-06-06"),
                    ("date_of_death", ""),
                ],
                None,
            )
            .await;
        assert_eq!(created.status, StatusCode::SEE_OTHER);
        let location = created.location.unwrap();
        assert!(location.starts_with("/catalog/author/"));

        let detail = app.get(&location).await;
        assert_eq!(detail.status, StatusCode::OK);
        assert!(detail.body.contains("Rothfuss, Patrick"));
        assert!(detail.body.contains("Jun 6, 1973"));

        let list = app.get("/catalog/authors").await;
        assert!(list.body.contains(&location));
    }
}

#[tokio::test]
async fn route_invalid_author_rerenders_form() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let response = app
            .post_multipart(
                "/catalog/author/create",
                &[("first_name", "Kate"), ("family_name", ""), ("date_of_birth", "soon")],
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.body.contains("Family name must be specified."));
        assert!(response.body.contains("value=\"Kate\""));
        assert!(app.store.list_authors().unwrap().is_empty());
    }
}

#[tokio::test]
async fn route_author_portrait_upload() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let rejected = app
            .post_multipart(
                "/catalog/author/create",
                &[("first_name", "Mary"), ("family_name", "Shelley")],
                Some(("image/png", b"<svg onload=alert(1)>")),
            )
            .await;
        assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(app.store.list_authors().unwrap().is_empty());

        let created = app
            .post_multipart(
                "/catalog/author/create",
                &[("first_name", "Mary"), ("family_name", "Shelley")],
                Some(("image/png", PNG_MAGIC)),
            )
            .await;
        assert_eq!(created.status, StatusCode::SEE_OTHER);

        let author = app.store.list_authors().unwrap().remove(0);
        let image = author.image.clone().unwrap();
        assert!(image.starts_with("/uploads/"));

        let served = app.get(&image).await;
        assert_eq!(served.status, StatusCode::OK);

        // Updating without a new file keeps the portrait.
        let updated = app
            .post_multipart(
                &format!("/catalog/author/{}/update", author.id),
                &[("first_name", "Mary W."), ("family_name", "Shelley")],
                None,
            )
            .await;
        assert_eq!(updated.status, StatusCode::SEE_OTHER);
        let stored = app.store.get_author(&author.id).unwrap().unwrap();
        assert_eq!(stored.first_name, "Mary W.");
        assert_eq!(stored.image, Some(image.clone()));

        // Deleting the author removes the file.
        let deleted = app.post_empty(&format!("/catalog/author/{}/delete", author.id)).await;
        assert_eq!(deleted.status, StatusCode::SEE_OTHER);
        let file = app.uploads.path().join(image.trim_start_matches("/uploads/"));
        assert!(!file.exists());
    }
}

#[tokio::test]
async fn route_delete_author_with_books_is_rejected() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let (author, _, _) = seed_book(app.store.as_ref(), "The Name of the Wind");

        let confirm = app.get(&format!("/catalog/author/{}/delete", author.id)).await;
        assert_eq!(confirm.status, StatusCode::OK);
        assert!(confirm.body.contains("The Name of the Wind"));

        let rejected = app.post_empty(&format!("/catalog/author/{}/delete", author.id)).await;
        assert_eq!(rejected.status, StatusCode::CONFLICT);
        assert!(rejected.body.contains("The Name of the Wind"));
        assert!(app.store.get_author(&author.id).unwrap().is_some());

        let lonely = Author::new("Bob", "Billings");
        app.store.insert_author(&lonely).unwrap();
        let deleted = app.post_empty(&format!("/catalog/author/{}/delete", lonely.id)).await;
        assert_eq!(deleted.status, StatusCode::SEE_OTHER);
        assert_eq!(deleted.location.as_deref(), Some("/catalog/authors"));

        let list = app.get("/catalog/authors").await;
        assert!(!list.body.contains("Billings"));
        assert!(list.body.contains("Le Guin"));
    }
}

#[tokio::test]
async fn route_delete_genre_and_book_with_dependents_is_rejected() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let (_, genre, book) = seed_book(app.store.as_ref(), "Earthsea");
        app.store
            .insert_instance(&BookInstance::new(
                book.id.clone(),
                "Parnassus, 1968",
                InstanceStatus::Available,
                None,
            ))
            .unwrap();

        let genre_delete = app.post_empty(&format!("/catalog/genre/{}/delete", genre.id)).await;
        assert_eq!(genre_delete.status, StatusCode::CONFLICT);
        assert!(genre_delete.body.contains("Earthsea"));

        let book_delete = app.post_empty(&format!("/catalog/book/{}/delete", book.id)).await;
        assert_eq!(book_delete.status, StatusCode::CONFLICT);
        assert!(book_delete.body.contains("Parnassus, 1968"));

        assert!(app.store.get_genre(&genre.id).unwrap().is_some());
        assert!(app.store.get_book(&book.id).unwrap().is_some());
    }
}

#[tokio::test]
async fn route_unknown_ids_are_not_found() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        for kind in ["author", "genre", "book", "bookinstance"] {
            let detail = app.get(&format!("/catalog/{}/missing", kind)).await;
            assert_eq!(detail.status, StatusCode::NOT_FOUND, "{}", kind);

            let update = app.get(&format!("/catalog/{}/missing/update", kind)).await;
            assert_eq!(update.status, StatusCode::NOT_FOUND, "{}", kind);
        }

        // Deleting a missing author, genre or book returns to its list.
        let gone = app.post_empty("/catalog/book/missing/delete").await;
        assert_eq!(gone.status, StatusCode::SEE_OTHER);
        assert_eq!(gone.location.as_deref(), Some("/catalog/books"));

        let copy = app.post_empty("/catalog/bookinstance/missing/delete").await;
        assert_eq!(copy.status, StatusCode::NOT_FOUND);

        let unknown = app.get("/no/such/page").await;
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);
        assert!(unknown.body.contains("404"));
    }
}

#[tokio::test]
async fn route_search_finds_books_and_authors() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        seed_book(app.store.as_ref(), "The Left Hand of Darkness");

        let found = app.get("/search?q=hand%20of").await;
        assert_eq!(found.status, StatusCode::OK);
        assert!(found.body.contains("The Left Hand of Darkness"));

        let by_author = app.get("/search?q=guin").await;
        assert!(by_author.body.contains("Le Guin, Ursula"));

        let nothing = app.get("/search?q=").await;
        assert_eq!(nothing.status, StatusCode::OK);
        assert!(!nothing.body.contains("The Left Hand of Darkness"));
    }
}

#[tokio::test]
async fn route_genre_create_reuses_existing_name() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let created = app.post_form("/catalog/genre/create", "name=Science+Fiction").await;
        assert_eq!(created.status, StatusCode::SEE_OTHER);
        let location = created.location.unwrap();

        let again = app.post_form("/catalog/genre/create", "name=science+fiction").await;
        assert_eq!(again.status, StatusCode::SEE_OTHER);
        assert_eq!(again.location.as_deref(), Some(location.as_str()));
        assert_eq!(app.store.list_genres().unwrap().len(), 1);

        let short = app.post_form("/catalog/genre/create", "name=SF").await;
        assert_eq!(short.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn route_book_and_copy_lifecycle() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let author = Author::new("Ursula", "Le Guin");
        app.store.insert_author(&author).unwrap();
        let fantasy = Genre::new("Fantasy");
        let young = Genre::new("Young Adult");
        app.store.insert_genre(&fantasy).unwrap();
        app.store.insert_genre(&young).unwrap();

        let form = app.get("/catalog/book/create").await;
        assert!(form.body.contains("Le Guin, Ursula"));
        assert!(form.body.contains("Young Adult"));

        let missing_genre = app
            .post_form(
                "/catalog/book/create",
                &format!("title=Tehanu&author={}&summary=S&isbn=1", author.id),
            )
            .await;
        assert_eq!(missing_genre.status, StatusCode::UNPROCESSABLE_ENTITY);

        let created = app
            .post_form(
                "/catalog/book/create",
                &format!(
                    "title=Tehanu&author={}&summary=Fourth+book&isbn=978&genre={}&genre={}",
                    author.id, fantasy.id, young.id
                ),
            )
            .await;
        assert_eq!(created.status, StatusCode::SEE_OTHER);
        let book_url = created.location.unwrap();
        let book_id = book_url.trim_start_matches("/catalog/book/").to_string();

        let detail = app.get(&book_url).await;
        assert!(detail.body.contains("Fantasy"));
        assert!(detail.body.contains("Young Adult"));
        assert!(detail.body.contains("Le Guin, Ursula"));

        let copy = app
            .post_form(
                "/catalog/bookinstance/create",
                &format!("book={}&imprint=Atheneum+1990&status=Loaned&due_back=2030-02-01", book_id),
            )
            .await;
        assert_eq!(copy.status, StatusCode::SEE_OTHER);
        let copy_url = copy.location.unwrap();
        assert!(copy_url.starts_with("/catalog/bookinstance/"));

        let copy_detail = app.get(&copy_url).await;
        assert!(copy_detail.body.contains("Tehanu"));
        assert!(copy_detail.body.contains("Feb 1, 2030"));
        assert!(copy_detail.body.contains("text-warning"));

        let list = app.get("/catalog/bookinstances").await;
        assert!(list.body.contains("Atheneum 1990"));

        let deleted = app.post_empty(&format!("{}/delete", copy_url)).await;
        assert_eq!(deleted.status, StatusCode::SEE_OTHER);
        assert_eq!(deleted.location.as_deref(), Some("/catalog/bookinstances"));

        let book_deleted = app.post_empty(&format!("{}/delete", book_url)).await;
        assert_eq!(book_deleted.status, StatusCode::SEE_OTHER);
        assert!(app.store.list_books().unwrap().is_empty());
    }
}

#[tokio::test]
async fn route_genre_update_submit() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let (_, genre, _) = seed_book(app.store.as_ref(), "Dune");
        let opera = Genre::new("Space Opera");
        app.store.insert_genre(&opera).unwrap();
        let uri = format!("/catalog/genre/{}/update", genre.id);

        let collision = app.post_form(&uri, "name=space+opera").await;
        assert_eq!(collision.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(collision.body.contains("already exists"));
        assert!(collision.body.contains("value=\"space opera\""));
        assert_eq!(app.store.get_genre(&genre.id).unwrap().unwrap().name, genre.name);

        let renamed = app.post_form(&uri, "name=Desert+Planets").await;
        assert_eq!(renamed.status, StatusCode::SEE_OTHER);
        assert_eq!(renamed.location, Some(genre.url()));
        assert_eq!(
            app.store.get_genre(&genre.id).unwrap().unwrap().name,
            "Desert Planets"
        );

        let missing = app.post_form("/catalog/genre/missing/update", "name=Anything").await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        let missing_invalid = app.post_form("/catalog/genre/missing/update", "name=").await;
        assert_eq!(missing_invalid.status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn route_book_update_submit() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let (author, first, book) = seed_book(app.store.as_ref(), "Dune");
        let second = Genre::new("Space Opera");
        let third = Genre::new("Ecology");
        app.store.insert_genre(&second).unwrap();
        app.store.insert_genre(&third).unwrap();
        let uri = format!("/catalog/book/{}/update", book.id);

        let invalid = app
            .post_form(&uri, &format!("title=&author={}&summary=S&isbn=1", author.id))
            .await;
        assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(app.store.get_book(&book.id).unwrap().unwrap().title, "Dune");

        let updated = app
            .post_form(
                &uri,
                &format!(
                    "title=Dune+Messiah&author={}&summary=Second+book&isbn=0399&genre={}&genre={}",
                    author.id, third.id, second.id
                ),
            )
            .await;
        assert_eq!(updated.status, StatusCode::SEE_OTHER);
        assert_eq!(updated.location, Some(book.url()));

        let stored = app.store.get_book(&book.id).unwrap().unwrap();
        assert_eq!(stored.title, "Dune Messiah");
        assert_eq!(stored.summary, "Second book");
        assert_eq!(stored.isbn, "0399");
        assert_eq!(stored.genre_ids, vec![third.id.clone(), second.id.clone()]);
        assert!(app.store.books_by_genre(&first.id).unwrap().is_empty());

        let unknown_genre = app
            .post_form(
                &uri,
                &format!("title=Dune&author={}&summary=S&isbn=1&genre=nope", author.id),
            )
            .await;
        assert_eq!(unknown_genre.status, StatusCode::UNPROCESSABLE_ENTITY);

        let missing = app
            .post_form(
                "/catalog/book/missing/update",
                &format!("title=X&author={}&summary=S&isbn=1&genre={}", author.id, first.id),
            )
            .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        let missing_invalid = app.post_form("/catalog/book/missing/update", "title=").await;
        assert_eq!(missing_invalid.status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn route_copy_update_submit() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let (_, _, book) = seed_book(app.store.as_ref(), "Dune");
        let copy = BookInstance::new(book.id.clone(), "Ace 1", InstanceStatus::Available, None);
        app.store.insert_instance(&copy).unwrap();
        let uri = format!("/catalog/bookinstance/{}/update", copy.id);

        let invalid = app
            .post_form(&uri, &format!("book={}&imprint=Ace+2&status=Lost", book.id))
            .await;
        assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);

        let updated = app
            .post_form(
                &uri,
                &format!("book={}&imprint=Ace+2&status=Reserved&due_back=", book.id),
            )
            .await;
        assert_eq!(updated.status, StatusCode::SEE_OTHER);
        assert_eq!(updated.location, Some(copy.url()));

        let stored = app.store.get_instance(&copy.id).unwrap().unwrap();
        assert_eq!(stored.imprint, "Ace 2");
        assert_eq!(stored.status, InstanceStatus::Reserved);
        assert_eq!(stored.due_back, None);

        // A blank status falls back to the default.
        let blank = app
            .post_form(&uri, &format!("book={}&imprint=Ace+3&status=", book.id))
            .await;
        assert_eq!(blank.status, StatusCode::SEE_OTHER);
        let stored = app.store.get_instance(&copy.id).unwrap().unwrap();
        assert_eq!(stored.status, InstanceStatus::Maintenance);

        let dangling = app
            .post_form(&uri, "book=no-such-book&imprint=Ace+2&status=Available")
            .await;
        assert_eq!(dangling.status, StatusCode::UNPROCESSABLE_ENTITY);

        let missing_invalid = app
            .post_form("/catalog/bookinstance/missing/update", "imprint=")
            .await;
        assert_eq!(missing_invalid.status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn route_stylesheet_is_served() {
    for (backend, app) in test_apps() {
        eprintln!("backend: {}", backend);
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/static/style.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/css")
        );
    }
}
