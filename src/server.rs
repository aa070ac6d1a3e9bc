//! HTTP server and routes.

mod handlers;
mod state;

pub use state::AppState;

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let catalog_routes = Router::new()
        .route("/", get(handlers::catalog_index))
        // Authors
        .route("/authors", get(handlers::author_list))
        .route(
            "/author/create",
            get(handlers::author_create_form).post(handlers::author_create),
        )
        .route("/author/{id}", get(handlers::author_detail))
        .route(
            "/author/{id}/update",
            get(handlers::author_update_form).post(handlers::author_update),
        )
        .route(
            "/author/{id}/delete",
            get(handlers::author_delete_form).post(handlers::author_delete),
        )
        // Genres
        .route("/genres", get(handlers::genre_list))
        .route(
            "/genre/create",
            get(handlers::genre_create_form).post(handlers::genre_create),
        )
        .route("/genre/{id}", get(handlers::genre_detail))
        .route(
            "/genre/{id}/update",
            get(handlers::genre_update_form).post(handlers::genre_update),
        )
        .route(
            "/genre/{id}/delete",
            get(handlers::genre_delete_form).post(handlers::genre_delete),
        )
        // Books
        .route("/books", get(handlers::book_list))
        .route(
            "/book/create",
            get(handlers::book_create_form).post(handlers::book_create),
        )
        .route("/book/{id}", get(handlers::book_detail))
        .route(
            "/book/{id}/update",
            get(handlers::book_update_form).post(handlers::book_update),
        )
        .route(
            "/book/{id}/delete",
            get(handlers::book_delete_form).post(handlers::book_delete),
        )
        // Copies
        .route("/bookinstances", get(handlers::instance_list))
        .route(
            "/bookinstance/create",
            get(handlers::instance_create_form).post(handlers::instance_create),
        )
        .route("/bookinstance/{id}", get(handlers::instance_detail))
        .route(
            "/bookinstance/{id}/update",
            get(handlers::instance_update_form).post(handlers::instance_update),
        )
        .route(
            "/bookinstance/{id}/delete",
            get(handlers::instance_delete_form).post(handlers::instance_delete),
        );

    let uploads = ServeDir::new(&state.config.uploads.dir);
    let body_limit = state.config.uploads.max_bytes;

    Router::new()
        .route("/", get(handlers::home))
        .route("/search", get(handlers::search))
        .route("/static/style.css", get(handlers::stylesheet))
        .nest("/catalog", catalog_routes)
        .nest_service("/uploads", uploads)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
