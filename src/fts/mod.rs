//! FTS Manager (spec §4.2): create/drop/repopulate full-text indices across
//! dialects, and build per-dialect match predicates for the Info Printer's
//! pattern-filtered queries.
//!
//! No FTS code exists in the teacher repo; this module follows spec.md
//! §4.2's per-dialect algorithm description directly, in the small
//! "pure function + dialect match" style used throughout the teacher's
//! `sync/hash.rs`.

use crate::backend::{Catalog, TxnMode};
use crate::error::Result;

/// Drop and recreate the FTS indices, then repopulate them from the base
/// tables. Runs inside one exclusive transaction on backends that allow DDL
/// in a transaction; partial content after an abort is fine because the
/// next rebuild discards and recreates (spec §4.2).
pub fn create_fts_indices(cat: &mut Catalog) -> Result<()> {
    let rebuild = |cat: &mut Catalog| -> Result<()> {
        for stmt in cat.dialect().drop_fts_tables() {
            cat.execute(stmt, &[])?;
        }
        for stmt in cat.dialect().create_fts_tables() {
            cat.execute(stmt, &[])?;
        }
        let populate_storages = cat.dialect().populate_fts_storages();
        if !populate_storages.is_empty() {
            cat.execute(populate_storages, &[])?;
        }
        let populate_entries = cat.dialect().populate_fts_entries();
        if !populate_entries.is_empty() {
            cat.execute(populate_entries, &[])?;
        }
        Ok(())
    };

    if cat.dialect().can_ddl_in_transaction() {
        cat.transaction(TxnMode::Exclusive, rebuild)
    } else {
        rebuild(cat)
    }
}

/// Build a WHERE-clause fragment matching `pattern` against `column`
/// (`"storageId"` or `"entryId"`), delegating tokenization/predicate syntax
/// to the active dialect. An empty pattern yields an unfiltered (empty)
/// predicate (spec §4.2).
#[must_use]
pub fn build_match_predicate(cat: &Catalog, column: &str, pattern: &str) -> String {
    cat.dialect().build_fts_match_predicate(column, pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CatalogUri;
    use crate::schema;

    fn seeded_catalog() -> Catalog {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut cat, false).unwrap();
        cat.execute(
            "INSERT INTO uuids (id, jobUuid) VALUES (1, 'job-a')",
            &[],
        )
        .unwrap();
        cat.execute(
            "INSERT INTO entities (id, uuidId, jobUuid, created) VALUES (1, 1, 'job-a', 0)",
            &[],
        )
        .unwrap();
        cat.execute(
            "INSERT INTO storages (id, uuidId, entityId, name, created) VALUES (1, 1, 1, 'archive-2024.bar', 0)",
            &[],
        )
        .unwrap();
        cat
    }

    #[test]
    fn create_fts_indices_populates_from_base_tables() {
        let mut cat = seeded_catalog();
        create_fts_indices(&mut cat).unwrap();
        let rows = cat.query("SELECT storageId FROM FTS_storages", &[]).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn match_predicate_empty_for_blank_pattern() {
        let cat = seeded_catalog();
        assert_eq!(build_match_predicate(&cat, "storageId", ""), "");
    }

    #[test]
    fn match_predicate_finds_seeded_storage() {
        let mut cat = seeded_catalog();
        create_fts_indices(&mut cat).unwrap();
        let predicate = build_match_predicate(&cat, "storageId", "archive");
        let sql = format!("SELECT id FROM storages WHERE {predicate}");
        let rows = cat.query(&sql, &[]).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
