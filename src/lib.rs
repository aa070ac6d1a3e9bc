//! local-library: a server-rendered catalog of authors, books, genres and
//! the copies on a library's shelves.
//!
//! # Features
//!
//! - List, detail, create, update and delete pages for every record kind
//! - Referential rules enforced by the store (no orphaned books or copies)
//! - Two interchangeable stores: SQLite or in-process memory
//! - Author portrait uploads
//! - Search by book title and author name
//! - Sample data loader

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Catalog records and display helpers.
pub mod catalog;
/// Configuration and CLI.
pub mod config;
/// Catalog storage.
pub mod db;
/// Error types.
pub mod error;
/// Sample data.
pub mod seed;
/// HTTP server.
pub mod server;

mod forms;
mod uploads;
mod views;

#[cfg(test)]
mod tests;

pub use config::{Cli, Command, Config};
pub use db::{CatalogStore, Database, MemoryStore};
pub use error::{AppError, Result};
pub use server::AppState;
