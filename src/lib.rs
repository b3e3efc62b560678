//! Tunedeck Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog;
pub mod config;
pub mod library;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog::{CatalogApi, SpotifyCatalogClient};
pub use library::{LibraryStore, SqliteLibraryStore};
pub use server::{run_server, RequestsLoggingLevel};
