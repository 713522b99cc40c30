//! Purger (spec §4.8): cascading hard delete of storages and entities.
//!
//! `deletedFlag` only marks rows invisible; this module is the sole path
//! that removes rows outright. Grounded on the same batched
//! collect-then-delete idiom as the Cleaner
//! (`other_examples/621dbc0d_gaspardpetit-findx__src-maintain.rs.rs`), with
//! the ten-step per-storage cascade following spec.md §4.8 directly.

use crate::backend::{Catalog, TxnMode, Value};
use crate::error::Result;
use crate::model::DEFAULT_ENTITY_ID;
use crate::progress::Progress;

const BATCH_SIZE: usize = 4096;

/// Ids of every entry reachable from `storage_id` through fragments,
/// directory/link/special entries (spec §4.8 step 2).
fn collect_storage_entry_ids(cat: &mut Catalog, storage_id: i64) -> Result<Vec<i64>> {
    let rows = cat.query(
        "SELECT entryId FROM entryFragments WHERE storageId = ? \
         UNION SELECT entryId FROM directoryEntries WHERE storageId = ? \
         UNION SELECT entryId FROM linkEntries WHERE storageId = ? \
         UNION SELECT entryId FROM specialEntries WHERE storageId = ?",
        &[
            Value::Integer(storage_id),
            Value::Integer(storage_id),
            Value::Integer(storage_id),
            Value::Integer(storage_id),
        ],
    )?;
    Ok(rows.iter().filter_map(|r| r.get(0).as_i64()).collect())
}

fn has_remaining_fragments(cat: &mut Catalog, entry_id: i64) -> Result<bool> {
    let rows = cat.query(
        "SELECT COUNT(*) FROM entryFragments WHERE entryId = ?",
        &[Value::Integer(entry_id)],
    )?;
    Ok(rows.first().and_then(|r| r.get(0).as_i64()).unwrap_or(0) > 0)
}

// `delete_fts_by_key` itself returns an empty statement for dialects whose
// FTS state rides on the base row (client/server backends) — deleting the
// base row is enough there, so only the embedded dialect's virtual-table
// rows need an explicit companion delete.
fn delete_fts_entry_row(cat: &mut Catalog, entry_id: i64) -> Result<()> {
    let sql = cat.dialect().delete_fts_by_key("FTS_entries", "entryId");
    if sql.is_empty() {
        return Ok(());
    }
    cat.execute(&sql, &[Value::Integer(entry_id)])?;
    Ok(())
}

fn delete_fts_storage_row(cat: &mut Catalog, storage_id: i64) -> Result<()> {
    let sql = cat.dialect().delete_fts_by_key("FTS_storages", "storageId");
    if sql.is_empty() {
        return Ok(());
    }
    cat.execute(&sql, &[Value::Integer(storage_id)])?;
    Ok(())
}

/// Purge one storage end to end (spec §4.8, steps 1-10). Caller is already
/// inside the per-storage exclusive transaction.
fn purge_one_storage(cat: &mut Catalog, storage_id: i64) -> Result<()> {
    let header = cat.query(
        "SELECT storages.entityId, entities.jobUuid, entities.uuidId \
         FROM storages JOIN entities ON entities.id = storages.entityId \
         WHERE storages.id = ?",
        &[Value::Integer(storage_id)],
    )?;
    let Some(header_row) = header.into_iter().next() else {
        return Ok(());
    };
    let entity_id = header_row.get(0).as_i64().unwrap_or(DEFAULT_ENTITY_ID);
    let job_uuid = header_row.get(1).as_str().map(str::to_string);

    let entry_ids = collect_storage_entry_ids(cat, storage_id)?;

    cat.execute("DELETE FROM entryFragments WHERE storageId = ?", &[Value::Integer(storage_id)])?;

    for &entry_id in &entry_ids {
        if !has_remaining_fragments(cat, entry_id)? {
            delete_fts_entry_row(cat, entry_id)?;
        }
    }

    cat.execute("DELETE FROM directoryEntries WHERE storageId = ?", &[Value::Integer(storage_id)])?;
    cat.execute("DELETE FROM linkEntries WHERE storageId = ?", &[Value::Integer(storage_id)])?;
    cat.execute("DELETE FROM specialEntries WHERE storageId = ?", &[Value::Integer(storage_id)])?;

    delete_fts_storage_row(cat, storage_id)?;

    cat.execute("DELETE FROM storages WHERE id = ?", &[Value::Integer(storage_id)])?;

    for &entry_id in &entry_ids {
        if !has_remaining_fragments(cat, entry_id)? {
            cat.execute("DELETE FROM entries WHERE id = ?", &[Value::Integer(entry_id)])?;
        }
    }

    if entity_id != DEFAULT_ENTITY_ID {
        let remaining = cat.query(
            "SELECT \
                (SELECT COUNT(*) FROM entries WHERE entityId = ?) + \
                (SELECT COUNT(*) FROM entryNewest WHERE entityId = ?)",
            &[Value::Integer(entity_id), Value::Integer(entity_id)],
        )?;
        if remaining.first().and_then(|r| r.get(0).as_i64()).unwrap_or(0) == 0 {
            cat.execute("DELETE FROM entities WHERE id = ?", &[Value::Integer(entity_id)])?;
        }
    }

    if let Some(job_uuid) = job_uuid {
        let referenced = cat.query(
            "SELECT COUNT(*) FROM entities WHERE jobUuid = ?",
            &[Value::Text(job_uuid.clone())],
        )?;
        if referenced.first().and_then(|r| r.get(0).as_i64()).unwrap_or(0) == 0 {
            cat.execute("DELETE FROM uuids WHERE jobUuid = ?", &[Value::Text(job_uuid)])?;
        }
    }

    Ok(())
}

/// Purge the given storage ids, one exclusive transaction per storage so a
/// failure on one storage never rolls back the others already committed.
pub fn purge_storages(cat: &mut Catalog, storage_ids: &[i64], progress: &mut dyn Progress) -> Result<u64> {
    progress.init(storage_ids.len() as u64);
    let mut purged = 0u64;
    for (i, &storage_id) in storage_ids.iter().enumerate() {
        cat.transaction(TxnMode::Exclusive, |cat| purge_one_storage(cat, storage_id))?;
        purged += 1;
        progress.step((((i + 1) * 1000) / storage_ids.len().max(1)) as u32);
    }
    progress.done(0.0);
    Ok(purged)
}

fn storages_of_entity(cat: &mut Catalog, entity_id: i64) -> Result<Vec<i64>> {
    let rows = cat.query("SELECT id FROM storages WHERE entityId = ?", &[Value::Integer(entity_id)])?;
    Ok(rows.iter().filter_map(|r| r.get(0).as_i64()).collect())
}

fn delete_entries_in_batches(cat: &mut Catalog, entity_id: i64) -> Result<u64> {
    let mut total = 0u64;
    loop {
        let batch = cat.transaction(TxnMode::Exclusive, |cat| {
            let rows = cat.query(
                &format!("SELECT id FROM entries WHERE entityId = ? LIMIT {BATCH_SIZE}"),
                &[Value::Integer(entity_id)],
            )?;
            let ids: Vec<i64> = rows.iter().filter_map(|r| r.get(0).as_i64()).collect();
            if ids.is_empty() {
                return Ok(0u64);
            }
            let placeholders = vec!["?"; ids.len()].join(",");
            let sql = format!("DELETE FROM entries WHERE id IN ({placeholders})");
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

/// Purge the given entity ids, recursively purging each entity's storages
/// first (spec §4.8 "Purge entities"). Entity id 0 (the default entity) and
/// any null/absent id are ignored.
pub fn purge_entities(cat: &mut Catalog, entity_ids: &[i64], progress: &mut dyn Progress) -> Result<u64> {
    let entity_ids: Vec<i64> = entity_ids.iter().copied().filter(|&id| id != DEFAULT_ENTITY_ID).collect();
    progress.init(entity_ids.len() as u64);
    let mut purged = 0u64;
    for (i, &entity_id) in entity_ids.iter().enumerate() {
        let storage_ids = storages_of_entity(cat, entity_id)?;
        purge_storages(cat, &storage_ids, &mut crate::progress::NullProgress)?;
        delete_entries_in_batches(cat, entity_id)?;

        cat.transaction(TxnMode::Exclusive, |cat| {
            cat.execute("DELETE FROM skippedEntries WHERE entityId = ?", &[Value::Integer(entity_id)])?;

            let job_uuid = cat
                .query("SELECT jobUuid FROM entities WHERE id = ?", &[Value::Integer(entity_id)])?
                .into_iter()
                .next()
                .and_then(|r| r.get(0).as_str().map(str::to_string));

            let still_referenced = cat.query(
                "SELECT \
                    (SELECT COUNT(*) FROM entries WHERE entityId = ?) + \
                    (SELECT COUNT(*) FROM storages WHERE entityId = ?)",
                &[Value::Integer(entity_id), Value::Integer(entity_id)],
            )?;
            if still_referenced.first().and_then(|r| r.get(0).as_i64()).unwrap_or(0) == 0 {
                cat.execute("DELETE FROM entities WHERE id = ?", &[Value::Integer(entity_id)])?;
            }

            if let Some(job_uuid) = job_uuid {
                let referenced = cat.query(
                    "SELECT COUNT(*) FROM entities WHERE jobUuid = ?",
                    &[Value::Text(job_uuid.clone())],
                )?;
                if referenced.first().and_then(|r| r.get(0).as_i64()).unwrap_or(0) == 0 {
                    cat.execute("DELETE FROM uuids WHERE jobUuid = ?", &[Value::Text(job_uuid)])?;
                }
            }
            Ok(())
        })?;
        purged += 1;
        progress.step((((i + 1) * 1000) / entity_ids.len().max(1)) as u32);
    }
    progress.done(0.0);
    Ok(purged)
}

/// Select every soft-deleted storage id (spec §4.8 "Purge deleted
/// storages").
pub fn deleted_storage_ids(cat: &mut Catalog) -> Result<Vec<i64>> {
    let rows = cat.query("SELECT id FROM storages WHERE deletedFlag = 1", &[])?;
    Ok(rows.iter().filter_map(|r| r.get(0).as_i64()).collect())
}

/// Select every soft-deleted entity id (spec §4.8 "Purge deleted
/// entities").
pub fn deleted_entity_ids(cat: &mut Catalog) -> Result<Vec<i64>> {
    let rows = cat.query("SELECT id FROM entities WHERE deletedFlag = 1", &[])?;
    Ok(rows.iter().filter_map(|r| r.get(0).as_i64()).collect())
}

/// Select storages stuck in the `error` state and not yet soft-deleted
/// (spec §4.8 "Purge-with-error"). `state = 5` is the `error`
/// `StorageState` ordinal (spec §3).
pub fn error_storage_ids(cat: &mut Catalog) -> Result<Vec<i64>> {
    let rows = cat.query(
        "SELECT id FROM storages WHERE state = ? AND deletedFlag = 0",
        &[Value::Integer(crate::model::StorageState::Error as i64)],
    )?;
    Ok(rows.iter().filter_map(|r| r.get(0).as_i64()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CatalogUri;
    use crate::progress::NullProgress;
    use crate::schema;

    fn seeded_catalog() -> Catalog {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut cat, false).unwrap();
        cat.execute("INSERT INTO uuids (id, jobUuid) VALUES (1, 'job-a')", &[]).unwrap();
        cat.execute(
            "INSERT INTO entities (id, uuidId, jobUuid, created) VALUES (1, 1, 'job-a', 0)",
            &[],
        )
        .unwrap();
        cat.execute(
            "INSERT INTO storages (id, uuidId, entityId, name, created, deletedFlag) VALUES (1, 1, 1, 'vol.bar', 0, 1)",
            &[],
        )
        .unwrap();
        cat.execute(
            "INSERT INTO entries (id, uuidId, entityId, type, name, timeLastChanged) VALUES (1, 1, 1, 1, 'f', 0)",
            &[],
        )
        .unwrap();
        cat.execute(
            "INSERT INTO entryFragments (storageId, entryId, offset, size) VALUES (1, 1, 0, 10)",
            &[],
        )
        .unwrap();
        cat.execute("INSERT INTO fileEntries (entryId, size) VALUES (1, 10)", &[]).unwrap();
        cat
    }

    #[test]
    fn purge_storage_cascades_to_entry_entity_and_uuid() {
        let mut cat = seeded_catalog();
        purge_storages(&mut cat, &[1], &mut NullProgress).unwrap();

        assert_eq!(cat.query("SELECT COUNT(*) FROM storages", &[]).unwrap()[0].get(0).as_i64(), Some(0));
        assert_eq!(cat.query("SELECT COUNT(*) FROM entries", &[]).unwrap()[0].get(0).as_i64(), Some(0));
        assert_eq!(cat.query("SELECT COUNT(*) FROM entryFragments", &[]).unwrap()[0].get(0).as_i64(), Some(0));
        assert_eq!(cat.query("SELECT COUNT(*) FROM entities", &[]).unwrap()[0].get(0).as_i64(), Some(0));
        assert_eq!(cat.query("SELECT COUNT(*) FROM uuids", &[]).unwrap()[0].get(0).as_i64(), Some(0));
    }

    #[test]
    fn default_entity_is_never_purged() {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut cat, false).unwrap();
        cat.execute("INSERT INTO uuids (id, jobUuid) VALUES (1, 'job-a')", &[]).unwrap();
        cat.execute(
            "INSERT INTO entities (id, uuidId, jobUuid, created) VALUES (0, 1, 'job-a', 0)",
            &[],
        )
        .unwrap();
        purge_entities(&mut cat, &[0, DEFAULT_ENTITY_ID], &mut NullProgress).unwrap();
        assert_eq!(cat.query("SELECT COUNT(*) FROM entities WHERE id = 0", &[]).unwrap()[0].get(0).as_i64(), Some(1));
    }

    #[test]
    fn deleted_storage_ids_finds_soft_deleted_row() {
        let mut cat = seeded_catalog();
        assert_eq!(deleted_storage_ids(&mut cat).unwrap(), vec![1]);
    }
}
