//! Application state shared across handlers.

use crate::config::Config;
use crate::db::CatalogStore;
use crate::error::Result;
use crate::views::Views;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::Value;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Catalog store selected at startup.
    pub store: Arc<dyn CatalogStore>,
    /// Compiled page templates.
    views: Arc<Views>,
}

impl AppState {
    /// Create application state, compiling the page templates.
    pub fn new(config: Config, store: Arc<dyn CatalogStore>) -> Result<Self> {
        let views = Views::new(config.server.title.clone())?;

        Ok(Self {
            config: Arc::new(config),
            store,
            views: Arc::new(views),
        })
    }

    /// Render a page with status 200.
    pub fn render(&self, template: &str, data: Value) -> Result<Response> {
        self.page(StatusCode::OK, template, data)
    }

    /// Render a page with the given status.
    pub fn page(&self, status: StatusCode, template: &str, data: Value) -> Result<Response> {
        let html = self.views.render(template, data)?;
        Ok((status, Html(html)).into_response())
    }
}
