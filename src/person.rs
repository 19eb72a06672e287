//! Person record types
//!
//! A person is a server-assigned identifier plus a set of named, nullable
//! text fields. The record is schema-agnostic: which fields exist is
//! decided by the active [`crate::fields::SchemaVariant`], not by this
//! type, so both registry shapes share one representation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored person record.
///
/// Serializes as a flat JSON object: `{"id": 7, "nome": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Identifier assigned by the store at creation; immutable afterwards
    pub id: i64,
    /// Field name to value; absent optional fields are `None`
    #[serde(flatten)]
    pub fields: BTreeMap<String, Option<String>>,
}

impl Person {
    /// Look up a field value by its JSON name
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }
}

/// A candidate person record, before an identifier has been assigned.
///
/// This is the request-body shape for create, update and batch import.
/// Unknown fields deserialize fine but only catalog fields are persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonDraft {
    #[serde(flatten)]
    pub fields: BTreeMap<String, Option<String>>,
}

impl PersonDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field value by its JSON name
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }

    /// Set a field value, consuming and returning the draft
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), Some(value.into()));
        self
    }
}
