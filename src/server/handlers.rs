//! HTTP request handlers.

use crate::catalog::{Author, Book, BookInstance, Genre, new_id};
use crate::error::{AppError, Result};
use crate::forms::{AuthorForm, BookForm, FieldError, FormData, GenreForm, InstanceForm};
use crate::server::AppState;
use crate::uploads;
use crate::views::{self, AuthorView, BookView, GenreView, InstanceView, STYLESHEET};
use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, RawForm, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

/// Single error not tied to a form field.
fn page_error(message: impl Into<String>) -> Vec<FieldError> {
    vec![FieldError {
        field: "",
        message: message.into(),
    }]
}

// ============================================================================
// SITE
// ============================================================================

/// Home page redirects to the catalog.
pub async fn home() -> Redirect {
    Redirect::to("/catalog")
}

/// Stylesheet.
pub async fn stylesheet() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        STYLESHEET,
    )
}

/// Unmatched routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}

/// Catalog home page with record counts.
pub async fn catalog_index(State(state): State<AppState>) -> Result<Response> {
    let counts = state.store.counts()?;
    state.render(
        "index",
        json!({ "title": "Local Library Home", "counts": counts }),
    )
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

/// Search books by title and authors by name.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let query = params.q.trim();

    let (books, authors) = if query.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let authors = views::by_id(&state.store.list_authors()?, |a| a.id.as_str());
        let books: Vec<BookView> = state
            .store
            .search_books(query)?
            .iter()
            .map(|b| BookView::populated(b, &authors, &HashMap::new()))
            .collect();
        let matched: Vec<AuthorView> = state
            .store
            .search_authors(query)?
            .iter()
            .map(AuthorView::from)
            .collect();
        (books, matched)
    };

    tracing::debug!(query = %query, books = books.len(), authors = authors.len(), "Search");

    state.render(
        "search_results",
        json!({
            "title": "Search",
            "query": query,
            "books": books,
            "authors": authors,
        }),
    )
}

// ============================================================================
// AUTHORS
// ============================================================================

/// Author form as submitted, plus the optional portrait part.
struct AuthorSubmission {
    form: AuthorForm,
    image: Option<(String, Bytes)>,
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed form data: {}", e))
}

async fn read_author_submission(mut multipart: Multipart) -> Result<AuthorSubmission> {
    let mut fields = FormData::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "author_image" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(malformed)?;
            // Browsers send an empty part when no file is chosen.
            if !data.is_empty() {
                image = Some((content_type, data));
            }
        } else {
            let value = field.text().await.map_err(malformed)?;
            fields.push(name, value);
        }
    }

    Ok(AuthorSubmission {
        form: AuthorForm::from_fields(&fields),
        image,
    })
}

/// Validate an author submission, including the portrait's type.
fn validate_author(
    submission: &AuthorSubmission,
    id: String,
    image: Option<String>,
) -> std::result::Result<Author, Vec<FieldError>> {
    let result = submission.form.to_author(id, image);
    let image_error = submission
        .image
        .as_ref()
        .and_then(|(content_type, data)| uploads::image_extension(content_type, data).err());

    match (result, image_error) {
        (Ok(author), None) => Ok(author),
        (result, image_error) => {
            let mut errors = result.err().unwrap_or_default();
            if let Some(e) = image_error {
                errors.push(FieldError {
                    field: "author_image",
                    message: e.to_string(),
                });
            }
            Err(errors)
        }
    }
}

fn author_form_page(
    state: &AppState,
    status: StatusCode,
    title: &str,
    form: &AuthorForm,
    image: Option<&str>,
    errors: &[FieldError],
) -> Result<Response> {
    state.page(
        status,
        "author_form",
        json!({ "title": title, "author": form, "image": image, "errors": errors }),
    )
}

fn author_delete_page(
    state: &AppState,
    status: StatusCode,
    author: &Author,
    errors: &[FieldError],
) -> Result<Response> {
    let books: Vec<BookView> = state
        .store
        .books_by_author(&author.id)?
        .iter()
        .map(BookView::bare)
        .collect();

    state.page(
        status,
        "author_delete",
        json!({
            "title": "Delete Author",
            "author": AuthorView::from(author),
            "author_books": books,
            "errors": errors,
        }),
    )
}

/// All authors.
pub async fn author_list(State(state): State<AppState>) -> Result<Response> {
    let authors: Vec<AuthorView> = state
        .store
        .list_authors()?
        .iter()
        .map(AuthorView::from)
        .collect();

    state.render(
        "author_list",
        json!({ "title": "Author List", "authors": authors }),
    )
}

/// Author with their books.
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let author = state
        .store
        .get_author(&id)?
        .ok_or_else(|| AppError::NotFound(format!("Author not found: {}", id)))?;

    let books: Vec<BookView> = state
        .store
        .books_by_author(&id)?
        .iter()
        .map(BookView::bare)
        .collect();

    state.render(
        "author_detail",
        json!({
            "title": "Author Detail",
            "author": AuthorView::from(&author),
            "author_books": books,
        }),
    )
}

/// Empty author form.
pub async fn author_create_form(State(state): State<AppState>) -> Result<Response> {
    author_form_page(
        &state,
        StatusCode::OK,
        "Create Author",
        &AuthorForm::default(),
        None,
        &[],
    )
}

/// Create an author from a multipart submission.
pub async fn author_create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let submission = read_author_submission(multipart).await?;

    let mut author = match validate_author(&submission, new_id(), None) {
        Ok(author) => author,
        Err(errors) => {
            return author_form_page(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Create Author",
                &submission.form,
                None,
                &errors,
            );
        }
    };

    if let Some((content_type, data)) = &submission.image {
        author.image = Some(uploads::save_image(&state.config.uploads.dir, content_type, data).await?);
    }

    if let Err(e) = state.store.insert_author(&author) {
        if let Some(image) = &author.image {
            uploads::remove_image(&state.config.uploads.dir, image).await;
        }
        return Err(e);
    }

    tracing::info!(id = %author.id, name = %author.name(), "Created author");
    Ok(Redirect::to(&author.url()).into_response())
}

/// Author form filled with current values.
pub async fn author_update_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let author = state
        .store
        .get_author(&id)?
        .ok_or_else(|| AppError::NotFound(format!("Author not found: {}", id)))?;

    author_form_page(
        &state,
        StatusCode::OK,
        "Update Author",
        &AuthorForm::from_author(&author),
        author.image.as_deref(),
        &[],
    )
}

/// Update an author. Without a new portrait the current one is kept.
pub async fn author_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let existing = state
        .store
        .get_author(&id)?
        .ok_or_else(|| AppError::NotFound(format!("Author not found: {}", id)))?;

    let submission = read_author_submission(multipart).await?;

    let mut author = match validate_author(&submission, existing.id.clone(), existing.image.clone())
    {
        Ok(author) => author,
        Err(errors) => {
            return author_form_page(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Update Author",
                &submission.form,
                existing.image.as_deref(),
                &errors,
            );
        }
    };

    let uploads_dir = &state.config.uploads.dir;
    let new_image = match &submission.image {
        Some((content_type, data)) => Some(uploads::save_image(uploads_dir, content_type, data).await?),
        None => None,
    };
    if let Some(path) = &new_image {
        author.image = Some(path.clone());
    }

    let updated = match state.store.update_author(&author) {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(path) = &new_image {
                uploads::remove_image(uploads_dir, path).await;
            }
            return Err(e);
        }
    };

    if !updated {
        if let Some(path) = &new_image {
            uploads::remove_image(uploads_dir, path).await;
        }
        return Err(AppError::NotFound(format!("Author not found: {}", id)));
    }

    if new_image.is_some()
        && let Some(old) = &existing.image
    {
        uploads::remove_image(uploads_dir, old).await;
    }

    tracing::info!(id = %author.id, name = %author.name(), "Updated author");
    Ok(Redirect::to(&author.url()).into_response())
}

/// Delete confirmation listing the author's books.
pub async fn author_delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    match state.store.get_author(&id)? {
        Some(author) => author_delete_page(&state, StatusCode::OK, &author, &[]),
        None => Ok(Redirect::to("/catalog/authors").into_response()),
    }
}

/// Delete an author that has no books.
pub async fn author_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let Some(author) = state.store.get_author(&id)? else {
        return Ok(Redirect::to("/catalog/authors").into_response());
    };

    match state.store.delete_author(&id) {
        Ok(_) => {
            if let Some(image) = &author.image {
                uploads::remove_image(&state.config.uploads.dir, image).await;
            }
            tracing::info!(id = %id, name = %author.name(), "Deleted author");
            Ok(Redirect::to("/catalog/authors").into_response())
        }
        Err(AppError::InUse(message)) => {
            tracing::info!(id = %id, reason = %message, "Rejected author delete");
            author_delete_page(&state, StatusCode::CONFLICT, &author, &page_error(message))
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// GENRES
// ============================================================================

fn genre_form_page(
    state: &AppState,
    status: StatusCode,
    title: &str,
    form: &GenreForm,
    errors: &[FieldError],
) -> Result<Response> {
    state.page(
        status,
        "genre_form",
        json!({ "title": title, "genre": form, "errors": errors }),
    )
}

fn genre_delete_page(
    state: &AppState,
    status: StatusCode,
    genre: &Genre,
    errors: &[FieldError],
) -> Result<Response> {
    let books: Vec<BookView> = state
        .store
        .books_by_genre(&genre.id)?
        .iter()
        .map(BookView::bare)
        .collect();

    state.page(
        status,
        "genre_delete",
        json!({
            "title": "Delete Genre",
            "genre": GenreView::from(genre),
            "genre_books": books,
            "errors": errors,
        }),
    )
}

/// All genres.
pub async fn genre_list(State(state): State<AppState>) -> Result<Response> {
    let genres: Vec<GenreView> = state
        .store
        .list_genres()?
        .iter()
        .map(GenreView::from)
        .collect();

    state.render(
        "genre_list",
        json!({ "title": "Genre List", "genres": genres }),
    )
}

/// Genre with its books.
pub async fn genre_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let genre = state
        .store
        .get_genre(&id)?
        .ok_or_else(|| AppError::NotFound(format!("Genre not found: {}", id)))?;

    let books: Vec<BookView> = state
        .store
        .books_by_genre(&id)?
        .iter()
        .map(BookView::bare)
        .collect();

    state.render(
        "genre_detail",
        json!({
            "title": "Genre Detail",
            "genre": GenreView::from(&genre),
            "genre_books": books,
        }),
    )
}

/// Empty genre form.
pub async fn genre_create_form(State(state): State<AppState>) -> Result<Response> {
    genre_form_page(
        &state,
        StatusCode::OK,
        "Create Genre",
        &GenreForm::default(),
        &[],
    )
}

/// Create a genre, or redirect to an existing one with the same name.
pub async fn genre_create(
    State(state): State<AppState>,
    RawForm(body): RawForm,
) -> Result<Response> {
    let form = GenreForm::from_fields(&FormData::from_urlencoded(&body));

    let genre = match form.to_genre(new_id()) {
        Ok(genre) => genre,
        Err(errors) => {
            return genre_form_page(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Create Genre",
                &form,
                &errors,
            );
        }
    };

    if let Some(existing) = state.store.find_genre_by_name(&genre.name)? {
        tracing::debug!(id = %existing.id, name = %existing.name, "Genre already exists");
        return Ok(Redirect::to(&existing.url()).into_response());
    }

    match state.store.insert_genre(&genre) {
        Ok(()) => {
            tracing::info!(id = %genre.id, name = %genre.name, "Created genre");
            Ok(Redirect::to(&genre.url()).into_response())
        }
        Err(AppError::Validation(message)) => genre_form_page(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Create Genre",
            &form,
            &page_error(message),
        ),
        Err(e) => Err(e),
    }
}

/// Genre form filled with current values.
pub async fn genre_update_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let genre = state
        .store
        .get_genre(&id)?
        .ok_or_else(|| AppError::NotFound(format!("Genre not found: {}", id)))?;

    genre_form_page(
        &state,
        StatusCode::OK,
        "Update Genre",
        &GenreForm::from_genre(&genre),
        &[],
    )
}

/// Rename a genre.
pub async fn genre_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawForm(body): RawForm,
) -> Result<Response> {
    if state.store.get_genre(&id)?.is_none() {
        return Err(AppError::NotFound(format!("Genre not found: {}", id)));
    }

    let form = GenreForm::from_fields(&FormData::from_urlencoded(&body));

    let genre = match form.to_genre(id.clone()) {
        Ok(genre) => genre,
        Err(errors) => {
            return genre_form_page(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Update Genre",
                &form,
                &errors,
            );
        }
    };

    match state.store.update_genre(&genre) {
        Ok(true) => {
            tracing::info!(id = %genre.id, name = %genre.name, "Updated genre");
            Ok(Redirect::to(&genre.url()).into_response())
        }
        Ok(false) => Err(AppError::NotFound(format!("Genre not found: {}", id))),
        Err(AppError::Validation(message)) => genre_form_page(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Update Genre",
            &form,
            &page_error(message),
        ),
        Err(e) => Err(e),
    }
}

/// Delete confirmation listing the genre's books.
pub async fn genre_delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    match state.store.get_genre(&id)? {
        Some(genre) => genre_delete_page(&state, StatusCode::OK, &genre, &[]),
        None => Ok(Redirect::to("/catalog/genres").into_response()),
    }
}

/// Delete a genre that no book uses.
pub async fn genre_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let Some(genre) = state.store.get_genre(&id)? else {
        return Ok(Redirect::to("/catalog/genres").into_response());
    };

    match state.store.delete_genre(&id) {
        Ok(_) => {
            tracing::info!(id = %id, name = %genre.name, "Deleted genre");
            Ok(Redirect::to("/catalog/genres").into_response())
        }
        Err(AppError::InUse(message)) => {
            tracing::info!(id = %id, reason = %message, "Rejected genre delete");
            genre_delete_page(&state, StatusCode::CONFLICT, &genre, &page_error(message))
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// BOOKS
// ============================================================================

fn book_form_page(
    state: &AppState,
    status: StatusCode,
    title: &str,
    form: &BookForm,
    errors: &[FieldError],
) -> Result<Response> {
    let authors = state.store.list_authors()?;
    let genres = state.store.list_genres()?;

    state.page(
        status,
        "book_form",
        json!({
            "title": title,
            "book": form,
            "authors": views::author_options(&authors, &form.author),
            "genres": views::genre_options(&genres, &form.genre),
            "errors": errors,
        }),
    )
}

/// Book with author, genres and copies resolved.
fn populated_book(state: &AppState, book: &Book) -> Result<BookView> {
    let authors: HashMap<String, Author> = state
        .store
        .get_author(&book.author_id)?
        .map(|a| (a.id.clone(), a))
        .into_iter()
        .collect();
    let genres = views::by_id(&state.store.list_genres()?, |g| g.id.as_str());

    Ok(BookView::populated(book, &authors, &genres))
}

fn book_copies(state: &AppState, book_id: &str) -> Result<Vec<InstanceView>> {
    Ok(state
        .store
        .instances_by_book(book_id)?
        .iter()
        .map(|i| InstanceView::new(i, None))
        .collect())
}

fn book_delete_page(
    state: &AppState,
    status: StatusCode,
    book: &Book,
    errors: &[FieldError],
) -> Result<Response> {
    state.page(
        status,
        "book_delete",
        json!({
            "title": "Delete Book",
            "book": populated_book(state, book)?,
            "book_instances": book_copies(state, &book.id)?,
            "errors": errors,
        }),
    )
}

/// All books with their authors.
pub async fn book_list(State(state): State<AppState>) -> Result<Response> {
    let authors = views::by_id(&state.store.list_authors()?, |a| a.id.as_str());
    let books: Vec<BookView> = state
        .store
        .list_books()?
        .iter()
        .map(|b| BookView::populated(b, &authors, &HashMap::new()))
        .collect();

    state.render("book_list", json!({ "title": "Book List", "books": books }))
}

/// Book with author, genres and copies.
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let book = state
        .store
        .get_book(&id)?
        .ok_or_else(|| AppError::NotFound(format!("Book not found: {}", id)))?;

    state.render(
        "book_detail",
        json!({
            "title": book.title,
            "book": populated_book(&state, &book)?,
            "book_instances": book_copies(&state, &id)?,
        }),
    )
}

/// Empty book form with author and genre choices.
pub async fn book_create_form(State(state): State<AppState>) -> Result<Response> {
    book_form_page(
        &state,
        StatusCode::OK,
        "Create Book",
        &BookForm::default(),
        &[],
    )
}

/// Create a book.
pub async fn book_create(
    State(state): State<AppState>,
    RawForm(body): RawForm,
) -> Result<Response> {
    let form = BookForm::from_fields(&FormData::from_urlencoded(&body));

    let book = match form.to_book(new_id()) {
        Ok(book) => book,
        Err(errors) => {
            return book_form_page(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Create Book",
                &form,
                &errors,
            );
        }
    };

    match state.store.insert_book(&book) {
        Ok(()) => {
            tracing::info!(id = %book.id, title = %book.title, "Created book");
            Ok(Redirect::to(&book.url()).into_response())
        }
        Err(AppError::Validation(message)) => book_form_page(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Create Book",
            &form,
            &page_error(message),
        ),
        Err(e) => Err(e),
    }
}

/// Book form filled with current values.
pub async fn book_update_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let book = state
        .store
        .get_book(&id)?
        .ok_or_else(|| AppError::NotFound(format!("Book not found: {}", id)))?;

    book_form_page(
        &state,
        StatusCode::OK,
        "Update Book",
        &BookForm::from_book(&book),
        &[],
    )
}

/// Replace a book and its genre set.
pub async fn book_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawForm(body): RawForm,
) -> Result<Response> {
    if state.store.get_book(&id)?.is_none() {
        return Err(AppError::NotFound(format!("Book not found: {}", id)));
    }

    let form = BookForm::from_fields(&FormData::from_urlencoded(&body));

    let book = match form.to_book(id.clone()) {
        Ok(book) => book,
        Err(errors) => {
            return book_form_page(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Update Book",
                &form,
                &errors,
            );
        }
    };

    match state.store.update_book(&book) {
        Ok(true) => {
            tracing::info!(id = %book.id, title = %book.title, "Updated book");
            Ok(Redirect::to(&book.url()).into_response())
        }
        Ok(false) => Err(AppError::NotFound(format!("Book not found: {}", id))),
        Err(AppError::Validation(message)) => book_form_page(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Update Book",
            &form,
            &page_error(message),
        ),
        Err(e) => Err(e),
    }
}

/// Delete confirmation listing the book's copies.
pub async fn book_delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    match state.store.get_book(&id)? {
        Some(book) => book_delete_page(&state, StatusCode::OK, &book, &[]),
        None => Ok(Redirect::to("/catalog/books").into_response()),
    }
}

/// Delete a book that has no copies.
pub async fn book_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let Some(book) = state.store.get_book(&id)? else {
        return Ok(Redirect::to("/catalog/books").into_response());
    };

    match state.store.delete_book(&id) {
        Ok(_) => {
            tracing::info!(id = %id, title = %book.title, "Deleted book");
            Ok(Redirect::to("/catalog/books").into_response())
        }
        Err(AppError::InUse(message)) => {
            tracing::info!(id = %id, reason = %message, "Rejected book delete");
            book_delete_page(&state, StatusCode::CONFLICT, &book, &page_error(message))
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// BOOK INSTANCES
// ============================================================================

fn instance_form_page(
    state: &AppState,
    status: StatusCode,
    title: &str,
    form: &InstanceForm,
    errors: &[FieldError],
) -> Result<Response> {
    let books = state.store.list_books()?;

    state.page(
        status,
        "bookinstance_form",
        json!({
            "title": title,
            "bookinstance": form,
            "books": views::book_options(&books, &form.book),
            "statuses": views::status_options(&form.status),
            "errors": errors,
        }),
    )
}

/// Copy with its book resolved.
fn instance_view(state: &AppState, instance: &BookInstance) -> Result<InstanceView> {
    let book = state.store.get_book(&instance.book_id)?;
    Ok(InstanceView::new(instance, book.as_ref()))
}

fn find_instance(state: &AppState, id: &str) -> Result<BookInstance> {
    state
        .store
        .get_instance(id)?
        .ok_or_else(|| AppError::NotFound(format!("Book copy not found: {}", id)))
}

/// All copies with their books.
pub async fn instance_list(State(state): State<AppState>) -> Result<Response> {
    let books = views::by_id(&state.store.list_books()?, |b| b.id.as_str());
    let instances: Vec<InstanceView> = state
        .store
        .list_instances()?
        .iter()
        .map(|i| InstanceView::new(i, books.get(&i.book_id)))
        .collect();

    state.render(
        "bookinstance_list",
        json!({ "title": "Book Instance List", "bookinstances": instances }),
    )
}

/// Copy with its book.
pub async fn instance_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let instance = find_instance(&state, &id)?;

    state.render(
        "bookinstance_detail",
        json!({
            "title": "Book Instance Detail",
            "bookinstance": instance_view(&state, &instance)?,
        }),
    )
}

/// Empty copy form with book choices.
pub async fn instance_create_form(State(state): State<AppState>) -> Result<Response> {
    instance_form_page(
        &state,
        StatusCode::OK,
        "Create Book Instance",
        &InstanceForm::default(),
        &[],
    )
}

/// Create a copy.
pub async fn instance_create(
    State(state): State<AppState>,
    RawForm(body): RawForm,
) -> Result<Response> {
    let form = InstanceForm::from_fields(&FormData::from_urlencoded(&body));

    let instance = match form.to_instance(new_id()) {
        Ok(instance) => instance,
        Err(errors) => {
            return instance_form_page(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Create Book Instance",
                &form,
                &errors,
            );
        }
    };

    match state.store.insert_instance(&instance) {
        Ok(()) => {
            tracing::info!(id = %instance.id, book = %instance.book_id, "Created book copy");
            Ok(Redirect::to(&instance.url()).into_response())
        }
        Err(AppError::Validation(message)) => instance_form_page(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Create Book Instance",
            &form,
            &page_error(message),
        ),
        Err(e) => Err(e),
    }
}

/// Copy form filled with current values.
pub async fn instance_update_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let instance = find_instance(&state, &id)?;

    instance_form_page(
        &state,
        StatusCode::OK,
        "Update Book Instance",
        &InstanceForm::from_instance(&instance),
        &[],
    )
}

/// Replace a copy.
pub async fn instance_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawForm(body): RawForm,
) -> Result<Response> {
    find_instance(&state, &id)?;

    let form = InstanceForm::from_fields(&FormData::from_urlencoded(&body));

    let instance = match form.to_instance(id.clone()) {
        Ok(instance) => instance,
        Err(errors) => {
            return instance_form_page(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Update Book Instance",
                &form,
                &errors,
            );
        }
    };

    match state.store.update_instance(&instance) {
        Ok(true) => {
            tracing::info!(id = %instance.id, status = %instance.status, "Updated book copy");
            Ok(Redirect::to(&instance.url()).into_response())
        }
        Ok(false) => Err(AppError::NotFound(format!("Book copy not found: {}", id))),
        Err(AppError::Validation(message)) => instance_form_page(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Update Book Instance",
            &form,
            &page_error(message),
        ),
        Err(e) => Err(e),
    }
}

/// Delete confirmation for a copy.
pub async fn instance_delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let instance = find_instance(&state, &id)?;

    state.render(
        "bookinstance_delete",
        json!({
            "title": "Delete Book Instance",
            "bookinstance": instance_view(&state, &instance)?,
        }),
    )
}

/// Delete a copy.
pub async fn instance_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    if !state.store.delete_instance(&id)? {
        return Err(AppError::NotFound(format!("Book copy not found: {}", id)));
    }

    tracing::info!(id = %id, "Deleted book copy");
    Ok(Redirect::to("/catalog/bookinstances").into_response())
}
