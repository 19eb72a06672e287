//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with a single table:
//! - pessoas(id, cns_cpf, nome, ...) — columns generated from the field
//!   catalog, with `cns_cpf` NOT NULL UNIQUE and `id` auto-incrementing
//!
//! Uniqueness and dedup correctness rely on the store's constraint
//! enforcement, never on application-level existence checks.

pub mod import;
pub mod schema;
pub mod sqlite;

pub use sqlite::PersonStore;
