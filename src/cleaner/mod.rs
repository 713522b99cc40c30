//! Cleaner (spec §4.7): ten orphan-cleanup stages plus the duplicate-storage
//! cleaner, run as bounded batches so a single enormous delete never
//! exceeds one transaction.
//!
//! Grounded almost directly on
//! `other_examples/621dbc0d_gaspardpetit-findx__src-maintain.rs.rs`'s
//! `clean_orphans` (batched `DELETE ... WHERE id IN (...)`, collect-then-act
//! loop); `arrays.c`'s "dynamic array with batch growth" in
//! `original_source/` is the origin of the "collect a bounded batch, act,
//! repeat until empty" idiom (spec §0.2).

use crate::backend::{Catalog, TxnMode, Value};
use crate::error::Result;

/// Batch size for id-list deletes (spec §4.7).
const BATCH_SIZE: i64 = 4096;

/// Collect up to `BATCH_SIZE` ids matching `select_ids_sql`, delete them
/// from `table` by `key_column`, and repeat until the collector returns
/// nothing. Each batch commits in its own exclusive transaction (spec §4.7:
/// "so that very large deletes do not exceed transaction limits"). Most
/// callers are keyed by the table's `id` column; the FTS5 virtual tables
/// (stage 9) have no `id` column and are keyed by `rowid` instead.
fn delete_in_batches(cat: &mut Catalog, select_ids_sql: &str, table: &str, key_column: &str) -> Result<u64> {
    let mut total = 0u64;
    loop {
        let batch = cat.transaction(TxnMode::Exclusive, |cat| {
            let rows = cat.query(&format!("{select_ids_sql} LIMIT {BATCH_SIZE}"), &[])?;
            let ids: Vec<i64> = rows.iter().filter_map(|r| r.get(0).as_i64()).collect();
            if ids.is_empty() {
                return Ok(0u64);
            }
            let placeholders = vec!["?"; ids.len()].join(",");
            let sql = format!("DELETE FROM {table} WHERE {key_column} IN ({placeholders})");
            let params: Vec<Value> = ids.iter().map(|id| Value::Integer(*id)).collect();
            cat.execute(&sql, &params)?;
            Ok(ids.len() as u64)
        })?;
        if batch == 0 {
            break;
        }
        total += batch;
    }
    Ok(total)
}

/// Stage 1: `entryFragments`/`directoryEntries`/`linkEntries`/
/// `specialEntries` whose storage is missing or name-empty.
fn stage_1_fragments_with_missing_storage(cat: &mut Catalog) -> Result<u64> {
    let mut total = 0;
    total += delete_in_batches(
        cat,
        "SELECT f.id FROM entryFragments f LEFT JOIN storages s ON s.id = f.storageId \
         WHERE s.id IS NULL OR s.name IS NULL OR s.name = ''",
        "entryFragments",
        "id",
    )?;
    total += delete_in_batches(
        cat,
        "SELECT d.id FROM directoryEntries d LEFT JOIN storages s ON s.id = d.storageId \
         WHERE s.id IS NULL OR s.name IS NULL OR s.name = ''",
        "directoryEntries",
        "id",
    )?;
    total += delete_in_batches(
        cat,
        "SELECT l.id FROM linkEntries l LEFT JOIN storages s ON s.id = l.storageId \
         WHERE s.id IS NULL OR s.name IS NULL OR s.name = ''",
        "linkEntries",
        "id",
    )?;
    total += delete_in_batches(
        cat,
        "SELECT sp.id FROM specialEntries sp LEFT JOIN storages s ON s.id = sp.storageId \
         WHERE s.id IS NULL OR s.name IS NULL OR s.name = ''",
        "specialEntries",
        "id",
    )?;
    Ok(total)
}

/// Stage 2: file/image/hardlink entries with no fragments.
fn stage_2_fragmentless_entries(cat: &mut Catalog) -> Result<u64> {
    delete_in_batches(
        cat,
        "SELECT e.id FROM entries e WHERE e.type IN (1, 2, 5) \
         AND NOT EXISTS (SELECT 1 FROM entryFragments f WHERE f.entryId = e.id)",
        "entries",
        "id",
    )
}

/// Stage 3: entries of each type with no corresponding type-row.
fn stage_3_entries_without_type_row(cat: &mut Catalog) -> Result<u64> {
    const TYPE_TABLES: &[(i64, &str)] = &[
        (1, "fileEntries"),
        (2, "imageEntries"),
        (5, "hardlinkEntries"),
        (3, "directoryEntries"),
        (4, "linkEntries"),
        (6, "specialEntries"),
    ];
    let mut total = 0;
    for (entry_type, type_table) in TYPE_TABLES {
        total += delete_in_batches(
            cat,
            &format!(
                "SELECT e.id FROM entries e WHERE e.type = {entry_type} \
                 AND NOT EXISTS (SELECT 1 FROM {type_table} t WHERE t.entryId = e.id)"
            ),
            "entries",
            "id",
        )?;
    }
    Ok(total)
}

/// Stage 4: entries whose `entityId` disagrees with their fragment's
/// `storage.entityId`. This is a repair, not a delete (spec §4.7). Only
/// fragmented types (file/image/hardlink) are reachable through
/// `entryFragments`; directory/link/special entries carry `storageId`
/// directly and cannot disagree with their own storage by construction, so
/// this stage is preserved exactly as scoped in spec.md even though it
/// reads like it should also cover those types — see `DESIGN.md`.
fn stage_4_repair_entity_id_mismatch(cat: &mut Catalog) -> Result<u64> {
    cat.transaction(TxnMode::Exclusive, |cat| {
        let affected = cat.execute(
            "UPDATE entries SET entityId = (\
                SELECT s.entityId FROM entryFragments f JOIN storages s ON s.id = f.storageId \
                WHERE f.entryId = entries.id LIMIT 1\
            ) \
             WHERE entries.id IN (\
                SELECT e.id FROM entries e JOIN entryFragments f ON f.entryId = e.id \
                JOIN storages s ON s.id = f.storageId WHERE s.entityId != e.entityId\
            )",
            &[],
        )?;
        Ok(affected)
    })
}

/// Stage 5: storages with empty or null name.
fn stage_5_nameless_storages(cat: &mut Catalog) -> Result<u64> {
    delete_in_batches(cat, "SELECT id FROM storages WHERE name IS NULL OR name = ''", "storages", "id")
}

/// Stage 6: storages with out-of-range state.
fn stage_6_invalid_state_storages(cat: &mut Catalog) -> Result<u64> {
    delete_in_batches(cat, "SELECT id FROM storages WHERE state < 0 OR state > 5", "storages", "id")
}

/// Stage 7: entities (excluding id 0) with no live entries and no live
/// newest rows.
fn stage_7_entities_without_entries(cat: &mut Catalog) -> Result<u64> {
    delete_in_batches(
        cat,
        "SELECT e.id FROM entities e WHERE e.id != 0 \
         AND NOT EXISTS (SELECT 1 FROM entries x WHERE x.entityId = e.id AND x.deletedFlag = 0) \
         AND NOT EXISTS (SELECT 1 FROM entryNewest n WHERE n.entityId = e.id)",
        "entities",
        "id",
    )
}

/// Stage 8: entities with no live storages.
fn stage_8_entities_without_storages(cat: &mut Catalog) -> Result<u64> {
    delete_in_batches(
        cat,
        "SELECT e.id FROM entities e WHERE e.id != 0 \
         AND NOT EXISTS (SELECT 1 FROM storages s WHERE s.entityId = e.id AND s.deletedFlag = 0)",
        "entities",
        "id",
    )
}

/// Stage 9: FTS rows whose base row is gone (embedded backend only; the
/// client/server dialects keep FTS state in the base tables, spec §4.2, and
/// have no `FTS_storages`/`FTS_entries` tables to query).
fn stage_9_orphan_fts_rows(cat: &mut Catalog) -> Result<u64> {
    if !matches!(cat.backend(), crate::backend::Backend::Sqlite) {
        return Ok(0);
    }
    let mut total = 0;
    total += delete_in_batches(
        cat,
        "SELECT f.rowid FROM FTS_storages f WHERE NOT EXISTS (SELECT 1 FROM storages s WHERE s.id = f.storageId)",
        "FTS_storages",
        "rowid",
    )?;
    total += delete_in_batches(
        cat,
        "SELECT f.rowid FROM FTS_entries f WHERE NOT EXISTS (SELECT 1 FROM entries e WHERE e.id = f.entryId)",
        "FTS_entries",
        "rowid",
    )?;
    Ok(total)
}

/// Stage 10: newest-entry rows whose base entry is gone.
fn stage_10_orphan_newest_rows(cat: &mut Catalog) -> Result<u64> {
    delete_in_batches(
        cat,
        "SELECT n.id FROM entryNewest n WHERE NOT EXISTS (SELECT 1 FROM entries e WHERE e.id = n.entryId)",
        "entryNewest",
        "id",
    )
}

/// Run all ten orphan-cleanup stages in order (spec §4.7).
pub fn clean_orphaned(cat: &mut Catalog) -> Result<u64> {
    let mut total = 0;
    total += stage_1_fragments_with_missing_storage(cat)?;
    total += stage_2_fragmentless_entries(cat)?;
    total += stage_3_entries_without_type_row(cat)?;
    total += stage_4_repair_entity_id_mismatch(cat)?;
    total += stage_5_nameless_storages(cat)?;
    total += stage_6_invalid_state_storages(cat)?;
    total += stage_7_entities_without_entries(cat)?;
    total += stage_8_entities_without_storages(cat)?;
    total += stage_9_orphan_fts_rows(cat)?;
    total += stage_10_orphan_newest_rows(cat)?;
    Ok(total)
}

/// Duplicate cleaner: enumerate non-deleted storages ordered by name; for
/// every row whose name equals the previous row's name, soft-delete it
/// (spec §4.7 "Duplicate cleaner").
pub fn clean_duplicates(cat: &mut Catalog) -> Result<u64> {
    let rows = cat.query("SELECT id, name FROM storages WHERE deletedFlag = 0 ORDER BY name", &[])?;
    let mut previous_name: Option<String> = None;
    let mut duplicate_ids = Vec::new();
    for row in &rows {
        let name = row.get(1).as_str().map(str::to_string);
        if name.is_some() && name == previous_name {
            if let Some(id) = row.get(0).as_i64() {
                duplicate_ids.push(id);
            }
        }
        if name.is_some() {
            previous_name = name;
        }
    }
    if duplicate_ids.is_empty() {
        return Ok(0);
    }
    cat.transaction(TxnMode::Exclusive, |cat| {
        let placeholders = vec!["?"; duplicate_ids.len()].join(",");
        let sql = format!("UPDATE storages SET deletedFlag = 1 WHERE id IN ({placeholders})");
        let params: Vec<Value> = duplicate_ids.iter().map(|id| Value::Integer(*id)).collect();
        cat.execute(&sql, &params)
    })?;
    Ok(duplicate_ids.len() as u64)
}

/// `--clean`: run both the orphan and duplicate cleaners.
pub fn clean(cat: &mut Catalog) -> Result<u64> {
    Ok(clean_orphaned(cat)? + clean_duplicates(cat)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CatalogUri;
    use crate::schema;

    fn memory() -> Catalog {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut cat, false).unwrap();
        cat.execute("INSERT INTO uuids (id, jobUuid) VALUES (1, 'job-a')", &[]).unwrap();
        cat.execute("INSERT INTO entities (id, uuidId, jobUuid, created) VALUES (1, 1, 'job-a', 0)", &[]).unwrap();
        cat
    }

    #[test]
    fn stage_5_removes_nameless_storages() {
        let mut cat = memory();
        cat.execute("INSERT INTO storages (id, uuidId, entityId, name, created) VALUES (1, 1, 1, '', 0)", &[]).unwrap();
        assert_eq!(stage_5_nameless_storages(&mut cat).unwrap(), 1);
        let rows = cat.query("SELECT COUNT(*) FROM storages", &[]).unwrap();
        assert_eq!(rows[0].get(0).as_i64(), Some(0));
    }

    #[test]
    fn stage_7_removes_entityless_entities_excluding_default() {
        let mut cat = memory();
        cat.execute("INSERT INTO entities (id, uuidId, jobUuid, created) VALUES (0, 1, 'job-a', 0)", &[]).unwrap();
        assert_eq!(stage_7_entities_without_entries(&mut cat).unwrap(), 1);
        let rows = cat.query("SELECT id FROM entities", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0).as_i64(), Some(0));
    }

    #[test]
    fn stage_9_removes_orphan_fts_storage_row() {
        let mut cat = memory();
        cat.execute("INSERT INTO storages (id, uuidId, entityId, name, created) VALUES (1, 1, 1, 's.bar', 0)", &[])
            .unwrap();
        crate::fts::create_fts_indices(&mut cat).unwrap();
        cat.execute("DELETE FROM storages WHERE id = 1", &[]).unwrap();
        assert_eq!(stage_9_orphan_fts_rows(&mut cat).unwrap(), 1);
        let rows = cat.query("SELECT COUNT(*) FROM FTS_storages", &[]).unwrap();
        assert_eq!(rows[0].get(0).as_i64(), Some(0));
    }

    #[test]
    fn clean_duplicates_soft_deletes_later_rows() {
        let mut cat = memory();
        cat.execute("INSERT INTO storages (id, uuidId, entityId, name, created) VALUES (1, 1, 1, 'dup.bar', 0)", &[]).unwrap();
        cat.execute("INSERT INTO storages (id, uuidId, entityId, name, created) VALUES (2, 1, 1, 'dup.bar', 1)", &[]).unwrap();
        assert_eq!(clean_duplicates(&mut cat).unwrap(), 1);
        let rows = cat.query("SELECT deletedFlag FROM storages WHERE id = 2", &[]).unwrap();
        assert_eq!(rows[0].get(0).as_i64(), Some(1));
    }
}
