//! # Cadastro - Person Registry Service
//!
//! CRUD record management for a person registry backed by SQLite,
//! exposed over HTTP, with deduplicated batch import.
//!
//! Cadastro provides:
//! - A declarative field catalog shared by schema, store and importer
//! - SQLite-backed storage with a uniqueness-enforced natural key
//! - All-or-nothing batch import that silently skips duplicate keys
//! - An axum HTTP surface with CORS and static frontend serving

pub mod config;
pub mod fields;
pub mod person;
pub mod server;
pub mod storage;

// Re-exports for convenient access
pub use fields::{FieldDef, SchemaVariant};
pub use person::{Person, PersonDraft};
pub use storage::PersonStore;

/// Result type alias for Cadastro operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Cadastro operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The natural key (national identifier) already belongs to another row
    #[error("duplicate national identifier: {0}")]
    Duplicate(String),

    #[error("person {0} not found")]
    NotFound(i64),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A batch transaction hit a non-duplicate failure and was rolled back
    #[error("batch import failed: {0}")]
    BatchImport(#[source] Box<Error>),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
