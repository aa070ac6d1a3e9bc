use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error.
    #[error("{0}")]
    NotFound(String),

    /// Submitted data failed validation or references a missing record.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Record cannot be deleted while other records reference it.
    #[error("{0}")]
    InUse(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InUse(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request error");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Html(error_page(status, &self.to_string()))).into_response()
    }
}

/// Render the catch-all HTML error page.
pub fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{code} {reason}</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <main class="content">
        <h1>{code} {reason}</h1>
        <p class="error">{message}</p>
        <p><a href="/catalog">Back to the catalog</a></p>
    </main>
</body>
</html>"#,
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        message = handlebars::html_escape(message),
    )
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
