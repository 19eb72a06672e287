//! Batch import - all-or-nothing bulk loading with duplicate skipping
//!
//! Candidates are applied in order inside one transaction on the store's
//! single connection. Deduplication is pushed down to the store as an
//! atomic conditional insert (`ON CONFLICT ... DO NOTHING`), never an
//! application-level existence check, so it holds up against concurrent
//! writers. Any non-duplicate failure rolls the whole batch back.

use rusqlite::params_from_iter;

use crate::person::PersonDraft;
use crate::storage::schema;
use crate::storage::sqlite::{PersonStore, column_list, draft_values, placeholder_list};
use crate::{Error, Result};

impl PersonStore {
    /// Apply the candidates in one transaction and return how many rows
    /// were actually inserted.
    ///
    /// A candidate whose national identifier already exists — in the
    /// table or earlier in the same batch — is skipped silently and not
    /// counted; the first occurrence of a key wins. Any other failure
    /// (a missing national identifier included) aborts and rolls back
    /// the entire batch, surfacing as [`Error::BatchImport`].
    pub fn import_batch(&mut self, candidates: &[PersonDraft]) -> Result<usize> {
        let fields = self.variant.fields();
        let key = self.variant.natural_key();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO NOTHING",
            schema::TABLE,
            column_list(fields),
            placeholder_list(fields.len()),
            key.column
        );

        // Dropping the transaction on any error path rolls it back, so no
        // open transaction ever outlives this call.
        let tx = self.conn.transaction()?;
        let mut imported = 0;
        {
            let mut stmt = tx.prepare(&sql).map_err(batch_failure)?;
            for candidate in candidates {
                let inserted = stmt
                    .execute(params_from_iter(draft_values(fields, candidate)))
                    .map_err(batch_failure)?;
                imported += inserted;
            }
        }
        tx.commit().map_err(batch_failure)?;

        tracing::info!(
            imported,
            skipped = candidates.len() - imported,
            "batch import committed"
        );
        Ok(imported)
    }
}

fn batch_failure(err: rusqlite::Error) -> Error {
    Error::BatchImport(Box::new(Error::Storage(err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::SchemaVariant;

    fn draft(name: &str, key: &str) -> PersonDraft {
        PersonDraft::new().with("nome", name).with("cnsCpf", key)
    }

    #[test]
    fn duplicates_within_a_batch_are_skipped_and_the_first_wins() {
        let mut store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();

        let imported = store
            .import_batch(&[draft("A", "1"), draft("B", "2"), draft("C", "1")])
            .unwrap();
        assert_eq!(imported, 2);

        let people = store.list().unwrap();
        assert_eq!(people.len(), 2);
        let holder = people.iter().find(|p| p.get("cnsCpf") == Some("1")).unwrap();
        assert_eq!(holder.get("nome"), Some("A"));
    }

    #[test]
    fn pre_existing_keys_are_skipped_and_not_counted() {
        let mut store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        store.create(&draft("Velha", "9")).unwrap();

        let imported = store
            .import_batch(&[draft("Nova", "9"), draft("Outra", "10")])
            .unwrap();
        assert_eq!(imported, 1);

        // the pre-existing payload was not overwritten
        let people = store.list().unwrap();
        let holder = people.iter().find(|p| p.get("cnsCpf") == Some("9")).unwrap();
        assert_eq!(holder.get("nome"), Some("Velha"));
    }

    #[test]
    fn a_non_duplicate_failure_rolls_back_the_whole_batch() {
        let mut store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();

        // 4th candidate has no national identifier: NOT NULL violation
        let batch = [
            draft("A", "1"),
            draft("B", "2"),
            draft("C", "3"),
            PersonDraft::new().with("nome", "Sem Documento"),
            draft("E", "5"),
        ];
        let err = store.import_batch(&batch).unwrap_err();
        assert!(matches!(err, Error::BatchImport(_)));

        // zero of the five persisted
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn the_store_stays_usable_after_a_rolled_back_batch() {
        let mut store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();

        let bad = [PersonDraft::new().with("nome", "Sem Documento")];
        assert!(store.import_batch(&bad).is_err());

        // no transaction was left open
        let imported = store.import_batch(&[draft("A", "1")]).unwrap();
        assert_eq!(imported, 1);
        store.create(&draft("B", "2")).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn an_empty_batch_imports_nothing() {
        let mut store = PersonStore::open_in_memory(SchemaVariant::Minimal).unwrap();
        assert_eq!(store.import_batch(&[]).unwrap(), 0);
    }

    #[test]
    fn partial_rows_are_stored_with_nulls() {
        let mut store = PersonStore::open_in_memory(SchemaVariant::Extended).unwrap();

        let imported = store
            .import_batch(&[PersonDraft::new().with("cnsCpf", "77")])
            .unwrap();
        assert_eq!(imported, 1);

        let person = &store.list().unwrap()[0];
        assert_eq!(person.get("cnsCpf"), Some("77"));
        assert_eq!(person.get("nome"), None);
        assert_eq!(person.get("procedimento"), None);
    }
}
