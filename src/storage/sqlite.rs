//! SQLite record store
//!
//! All statements are generated from the field catalog: column lists,
//! placeholders and bound values come from the same iteration, so the
//! single-create and batch-import paths can never disagree on parameter
//! positions.

use rusqlite::{Connection, OptionalExtension, params_from_iter};
use std::path::Path;

use crate::fields::{FieldDef, SchemaVariant};
use crate::person::{Person, PersonDraft};
use crate::storage::schema;
use crate::{Error, Result};

/// SQLite-backed store for person records.
///
/// Owns a single connection; a batch import therefore runs its whole
/// transaction on one session and commit/rollback never spans connections.
pub struct PersonStore {
    pub(crate) conn: Connection,
    pub(crate) variant: SchemaVariant,
}

impl PersonStore {
    /// Open a database file (creates if doesn't exist) and ensure the schema
    pub fn open(path: &Path, variant: SchemaVariant) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::ensure_schema(&conn, variant)?;
        Ok(Self { conn, variant })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory(variant: SchemaVariant) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::ensure_schema(&conn, variant)?;
        Ok(Self { conn, variant })
    }

    /// The field set this store was opened with
    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    /// List all people, ordered by name ascending
    pub fn list(&self) -> Result<Vec<Person>> {
        let fields = self.variant.fields();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY nome ASC",
            select_list(fields),
            schema::TABLE
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let people = stmt
            .query_map([], |row| row_to_person(fields, row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(people)
    }

    /// Get a person by identifier
    pub fn get(&self, id: i64) -> Result<Option<Person>> {
        let fields = self.variant.fields();
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            select_list(fields),
            schema::TABLE
        );
        self.conn
            .query_row(&sql, [id], |row| row_to_person(fields, row))
            .optional()
            .map_err(Into::into)
    }

    /// Insert a new person and return the stored record with its id.
    ///
    /// Fails with [`Error::Duplicate`] when the national identifier is
    /// already registered.
    pub fn create(&self, draft: &PersonDraft) -> Result<Person> {
        let fields = self.variant.fields();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema::TABLE,
            column_list(fields),
            placeholder_list(fields.len())
        );

        self.conn
            .execute(&sql, params_from_iter(draft_values(fields, draft)))
            .map_err(|err| self.classify_write_error(err, draft))?;

        let id = self.conn.last_insert_rowid();
        self.get(id)?.ok_or(Error::NotFound(id))
    }

    /// Replace every field of the person with the given identifier.
    ///
    /// Fails with [`Error::NotFound`] when no row matches and with
    /// [`Error::Duplicate`] when the replacement national identifier
    /// collides with a different row.
    pub fn update(&self, id: i64, draft: &PersonDraft) -> Result<Person> {
        let fields = self.variant.fields();
        let assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{} = ?{}", f.column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            schema::TABLE,
            assignments.join(", "),
            fields.len() + 1
        );

        let mut values: Vec<rusqlite::types::Value> = draft_values(fields, draft)
            .into_iter()
            .map(|v| match v {
                Some(s) => rusqlite::types::Value::Text(s.to_string()),
                None => rusqlite::types::Value::Null,
            })
            .collect();
        values.push(rusqlite::types::Value::Integer(id));

        let changed = self
            .conn
            .execute(&sql, params_from_iter(values))
            .map_err(|err| self.classify_write_error(err, draft))?;

        if changed == 0 {
            return Err(Error::NotFound(id));
        }
        self.get(id)?.ok_or(Error::NotFound(id))
    }

    /// Remove the person with the given identifier
    pub fn delete(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", schema::TABLE),
            [id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(id));
        }
        Ok(())
    }

    /// Count all people
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", schema::TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Reclassify a unique-constraint failure as a domain conflict;
    /// everything else passes through with the cause attached
    fn classify_write_error(&self, err: rusqlite::Error, draft: &PersonDraft) -> Error {
        if is_unique_violation(&err) {
            let key = self.variant.natural_key();
            Error::Duplicate(draft.get(key.name).unwrap_or_default().to_string())
        } else {
            Error::Storage(err)
        }
    }
}

/// Store-adapter capability: is this error a uniqueness-constraint
/// violation? Only SQLite knows its own codes; callers stay agnostic.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// `cns_cpf, nome, ...` in catalog order
pub(crate) fn column_list(fields: &[FieldDef]) -> String {
    fields
        .iter()
        .map(|f| f.column)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `?1, ?2, ...` matching the catalog order
pub(crate) fn placeholder_list(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `id, cns_cpf, nome, ...` for SELECTs
fn select_list(fields: &[FieldDef]) -> String {
    format!("id, {}", column_list(fields))
}

/// Bind values for a draft, in catalog order; absent fields become NULL
pub(crate) fn draft_values<'a>(fields: &[FieldDef], draft: &'a PersonDraft) -> Vec<Option<&'a str>> {
    fields.iter().map(|f| draft.get(f.name)).collect()
}

/// Read a row produced by [`select_list`] back into a Person
fn row_to_person(fields: &[FieldDef], row: &rusqlite::Row) -> rusqlite::Result<Person> {
    let id: i64 = row.get(0)?;
    let mut values = std::collections::BTreeMap::new();
    for (i, field) in fields.iter().enumerate() {
        let value: Option<String> = row.get(i + 1)?;
        values.insert(field.name.to_string(), value);
    }
    Ok(Person { id, fields: values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_draft(name: &str, key: &str) -> PersonDraft {
        PersonDraft::new()
            .with("nome", name)
            .with("cnsCpf", key)
            .with("municipio", "Sobral")
    }

    #[test]
    fn create_then_list_roundtrips() {
        let store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();

        let created = store.create(&sample_draft("Maria", "100")).unwrap();
        assert_eq!(created.get("nome"), Some("Maria"));
        assert_eq!(created.get("cnsCpf"), Some("100"));
        // optional fields come back as explicit nulls
        assert!(created.fields.contains_key("telefone"));
        assert_eq!(created.get("telefone"), None);

        let people = store.list().unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0], created);

        store.delete(created.id).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn identifiers_start_at_one_and_increase() {
        let store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        let a = store.create(&sample_draft("A", "1")).unwrap();
        let b = store.create(&sample_draft("B", "2")).unwrap();
        assert_eq!(a.id, 1);
        assert!(b.id > a.id);
    }

    #[test]
    fn duplicate_national_identifier_is_rejected() {
        let store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        store.create(&sample_draft("Maria", "100")).unwrap();

        let err = store.create(&sample_draft("Outra Maria", "100")).unwrap_err();
        assert!(matches!(err, Error::Duplicate(ref key) if key == "100"));

        // the failed attempt left nothing behind
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn missing_national_identifier_is_a_storage_error_not_a_conflict() {
        let store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        let err = store
            .create(&PersonDraft::new().with("nome", "Sem Documento"))
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn update_replaces_every_field() {
        let store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        let created = store.create(&sample_draft("Maria", "100")).unwrap();

        let replacement = PersonDraft::new().with("nome", "Maria Silva").with("cnsCpf", "100");
        let updated = store.update(created.id, &replacement).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.get("nome"), Some("Maria Silva"));
        // full-record replace: fields absent from the payload are cleared
        assert_eq!(updated.get("municipio"), None);
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        let err = store.update(999, &sample_draft("Ghost", "1")).unwrap_err();
        assert!(matches!(err, Error::NotFound(999)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn update_colliding_with_another_row_is_a_conflict() {
        let store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        store.create(&sample_draft("Maria", "100")).unwrap();
        let other = store.create(&sample_draft("João", "200")).unwrap();

        let err = store
            .update(other.id, &sample_draft("João", "100"))
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));

        // keeping your own key is not a collision
        store.update(other.id, &sample_draft("João", "200")).unwrap();
    }

    #[test]
    fn delete_missing_row_is_not_found() {
        let store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        assert!(matches!(store.delete(42).unwrap_err(), Error::NotFound(42)));
    }

    #[test]
    fn list_is_sorted_by_name_regardless_of_insertion_order() {
        let store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        store.create(&sample_draft("Carla", "3")).unwrap();
        store.create(&sample_draft("Ana", "1")).unwrap();
        store.create(&sample_draft("Bruno", "2")).unwrap();

        let names: Vec<_> = store
            .list()
            .unwrap()
            .iter()
            .map(|p| p.get("nome").unwrap().to_string())
            .collect();
        assert_eq!(names, ["Ana", "Bruno", "Carla"]);
    }

    #[test]
    fn extended_variant_persists_scheduling_fields() {
        let store = PersonStore::open_in_memory(SchemaVariant::Extended).unwrap();
        let draft = sample_draft("Maria", "100")
            .with("procedimento", "Hemodiálise")
            .with("dataViagem", "2024-03-12")
            .with("tipoTransporte", "van");

        let created = store.create(&draft).unwrap();
        assert_eq!(created.get("procedimento"), Some("Hemodiálise"));
        assert_eq!(created.get("dataViagem"), Some("2024-03-12"));
        assert_eq!(created.get("tipoTransporte"), Some("van"));
    }

    #[test]
    fn unknown_fields_in_the_payload_are_ignored() {
        let store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        let draft = sample_draft("Maria", "100").with("procedimento", "ignored");
        let created = store.create(&draft).unwrap();
        assert!(!created.fields.contains_key("procedimento"));
    }
}
