//! Aggregator (spec §4.6): recompute the 22 per-entity and per-storage
//! count/size columns.
//!
//! Grounded on the teacher's `storage/sqlite.rs` `get_project_counts`/
//! `count_embedding_status` (one query computing several `COUNT`
//! sub-aggregates into a single struct), generalized here into a single
//! `UPDATE` per row instead of a read.

use crate::backend::{Catalog, TxnMode, Value};
use crate::error::Result;
use crate::progress::Progress;

// Spec §4.6: "All twenty updates to one entity happen in a single UPDATE."
// Since a SET clause's expressions all see the row's pre-update values, the
// four roll-up columns cannot reference sibling SET targets by name (that
// would read the old value, not the freshly computed one) — they repeat the
// same sub-select expressions inline instead.
const ENTITY_AGGREGATE_UPDATE: &str = "\
UPDATE entities SET
    totalFileCount = (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 1),
    totalImageCount = (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 2),
    totalDirectoryCount = (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 3),
    totalLinkCount = (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 4),
    totalHardlinkCount = (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 5),
    totalSpecialCount = (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 6),
    totalFileSize = (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE e.entityId = entities.id AND e.deletedFlag = 0 AND e.type = 1),
    totalImageSize = (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE e.entityId = entities.id AND e.deletedFlag = 0 AND e.type = 2),
    totalHardlinkSize = (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE e.entityId = entities.id AND e.deletedFlag = 0 AND e.type = 5),
    totalFileCountNewest = (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 1),
    totalImageCountNewest = (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 2),
    totalDirectoryCountNewest = (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 3),
    totalLinkCountNewest = (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 4),
    totalHardlinkCountNewest = (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 5),
    totalSpecialCountNewest = (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 6),
    totalFileSizeNewest = (SELECT COALESCE(SUM(size), 0) FROM entryNewest WHERE entityId = entities.id AND type = 1),
    totalImageSizeNewest = (SELECT COALESCE(SUM(size), 0) FROM entryNewest WHERE entityId = entities.id AND type = 2),
    totalHardlinkSizeNewest = (SELECT COALESCE(SUM(size), 0) FROM entryNewest WHERE entityId = entities.id AND type = 5),
    totalEntryCount = (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 1)
        + (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 2)
        + (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 3)
        + (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 4)
        + (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 5)
        + (SELECT COUNT(*) FROM entries WHERE entityId = entities.id AND deletedFlag = 0 AND type = 6),
    totalEntrySize = (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE e.entityId = entities.id AND e.deletedFlag = 0 AND e.type = 1)
        + (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE e.entityId = entities.id AND e.deletedFlag = 0 AND e.type = 2)
        + (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE e.entityId = entities.id AND e.deletedFlag = 0 AND e.type = 5),
    totalEntryCountNewest = (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 1)
        + (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 2)
        + (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 3)
        + (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 4)
        + (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 5)
        + (SELECT COUNT(*) FROM entryNewest WHERE entityId = entities.id AND type = 6),
    totalEntrySizeNewest = (SELECT COALESCE(SUM(size), 0) FROM entryNewest WHERE entityId = entities.id AND type = 1)
        + (SELECT COALESCE(SUM(size), 0) FROM entryNewest WHERE entityId = entities.id AND type = 2)
        + (SELECT COALESCE(SUM(size), 0) FROM entryNewest WHERE entityId = entities.id AND type = 5)
WHERE id = ?";

/// `COUNT(DISTINCT entries.id)` is required for file/image/hardlink because
/// a single entry can have multiple fragments in the same storage
/// (spec §4.6 "Per-storage aggregator").
const STORAGE_AGGREGATE_UPDATE: &str = "\
UPDATE storages SET
    totalFileCount = (SELECT COUNT(DISTINCT e.id) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 1),
    totalImageCount = (SELECT COUNT(DISTINCT e.id) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 2),
    totalDirectoryCount = (SELECT COUNT(*) FROM directoryEntries d JOIN entries e ON e.id = d.entryId WHERE d.storageId = storages.id AND e.deletedFlag = 0),
    totalLinkCount = (SELECT COUNT(*) FROM linkEntries l JOIN entries e ON e.id = l.entryId WHERE l.storageId = storages.id AND e.deletedFlag = 0),
    totalHardlinkCount = (SELECT COUNT(DISTINCT e.id) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 5),
    totalSpecialCount = (SELECT COUNT(*) FROM specialEntries sp JOIN entries e ON e.id = sp.entryId WHERE sp.storageId = storages.id AND e.deletedFlag = 0),
    totalFileSize = (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 1),
    totalImageSize = (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 2),
    totalHardlinkSize = (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 5),
    totalFileCountNewest = (SELECT COUNT(DISTINCT n.id) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 1),
    totalImageCountNewest = (SELECT COUNT(DISTINCT n.id) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 2),
    totalDirectoryCountNewest = (SELECT COUNT(*) FROM entryNewest n JOIN directoryEntries d ON d.entryId = n.entryId WHERE d.storageId = storages.id AND n.type = 3),
    totalLinkCountNewest = (SELECT COUNT(*) FROM entryNewest n JOIN linkEntries l ON l.entryId = n.entryId WHERE l.storageId = storages.id AND n.type = 4),
    totalHardlinkCountNewest = (SELECT COUNT(DISTINCT n.id) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 5),
    totalSpecialCountNewest = (SELECT COUNT(*) FROM entryNewest n JOIN specialEntries sp ON sp.entryId = n.entryId WHERE sp.storageId = storages.id AND n.type = 6),
    totalFileSizeNewest = (SELECT COALESCE(SUM(f.size), 0) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 1),
    totalImageSizeNewest = (SELECT COALESCE(SUM(f.size), 0) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 2),
    totalHardlinkSizeNewest = (SELECT COALESCE(SUM(f.size), 0) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 5),
    totalEntryCount = (SELECT COUNT(DISTINCT e.id) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 1)
        + (SELECT COUNT(DISTINCT e.id) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 2)
        + (SELECT COUNT(*) FROM directoryEntries d JOIN entries e ON e.id = d.entryId WHERE d.storageId = storages.id AND e.deletedFlag = 0)
        + (SELECT COUNT(*) FROM linkEntries l JOIN entries e ON e.id = l.entryId WHERE l.storageId = storages.id AND e.deletedFlag = 0)
        + (SELECT COUNT(DISTINCT e.id) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 5)
        + (SELECT COUNT(*) FROM specialEntries sp JOIN entries e ON e.id = sp.entryId WHERE sp.storageId = storages.id AND e.deletedFlag = 0),
    totalEntrySize = (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 1)
        + (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 2)
        + (SELECT COALESCE(SUM(f.size), 0) FROM entries e JOIN entryFragments f ON f.entryId = e.id WHERE f.storageId = storages.id AND e.deletedFlag = 0 AND e.type = 5),
    totalEntryCountNewest = (SELECT COUNT(DISTINCT n.id) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 1)
        + (SELECT COUNT(DISTINCT n.id) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 2)
        + (SELECT COUNT(*) FROM entryNewest n JOIN directoryEntries d ON d.entryId = n.entryId WHERE d.storageId = storages.id AND n.type = 3)
        + (SELECT COUNT(*) FROM entryNewest n JOIN linkEntries l ON l.entryId = n.entryId WHERE l.storageId = storages.id AND n.type = 4)
        + (SELECT COUNT(DISTINCT n.id) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 5)
        + (SELECT COUNT(*) FROM entryNewest n JOIN specialEntries sp ON sp.entryId = n.entryId WHERE sp.storageId = storages.id AND n.type = 6),
    totalEntrySizeNewest = (SELECT COALESCE(SUM(f.size), 0) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 1)
        + (SELECT COALESCE(SUM(f.size), 0) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 2)
        + (SELECT COALESCE(SUM(f.size), 0) FROM entryNewest n JOIN entryFragments f ON f.entryId = n.entryId WHERE f.storageId = storages.id AND n.type = 5)
WHERE id = ?";

/// Recompute every aggregate column for the given entity ids, or for every
/// live entity when `entity_ids` is empty (spec §4.6 "Per-entity
/// aggregator"). Runs inside one exclusive transaction.
pub fn recompute_entities(cat: &mut Catalog, entity_ids: &[i64], progress: &mut dyn Progress) -> Result<()> {
    let ids = resolve_ids(cat, entity_ids, "SELECT id FROM entities WHERE deletedFlag = 0")?;
    progress.init(ids.len() as u64);
    cat.transaction(TxnMode::Exclusive, |cat| {
        for (i, id) in ids.iter().enumerate() {
            cat.execute(ENTITY_AGGREGATE_UPDATE, &[Value::Integer(*id)])?;
            progress.step((((i as u64 + 1) * 1000) / ids.len().max(1) as u64) as u32);
        }
        Ok(())
    })?;
    progress.done(0.0);
    Ok(())
}

/// Recompute every aggregate column for the given storage ids, or for
/// every live storage when `storage_ids` is empty (spec §4.6 "Per-storage
/// aggregator").
pub fn recompute_storages(cat: &mut Catalog, storage_ids: &[i64], progress: &mut dyn Progress) -> Result<()> {
    let ids = resolve_ids(cat, storage_ids, "SELECT id FROM storages WHERE deletedFlag = 0")?;
    progress.init(ids.len() as u64);
    cat.transaction(TxnMode::Exclusive, |cat| {
        for (i, id) in ids.iter().enumerate() {
            cat.execute(STORAGE_AGGREGATE_UPDATE, &[Value::Integer(*id)])?;
            progress.step((((i as u64 + 1) * 1000) / ids.len().max(1) as u64) as u32);
        }
        Ok(())
    })?;
    progress.done(0.0);
    Ok(())
}

fn resolve_ids(cat: &mut Catalog, requested: &[i64], all_live_sql: &str) -> Result<Vec<i64>> {
    if !requested.is_empty() {
        return Ok(requested.to_vec());
    }
    let rows = cat.query(all_live_sql, &[])?;
    Ok(rows.iter().filter_map(|r| r.get(0).as_i64()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CatalogUri;
    use crate::progress::NullProgress;
    use crate::schema;

    fn seeded() -> Catalog {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut cat, false).unwrap();
        cat.execute("INSERT INTO uuids (id, jobUuid) VALUES (1, 'job-a')", &[]).unwrap();
        cat.execute("INSERT INTO entities (id, uuidId, jobUuid, created) VALUES (1, 1, 'job-a', 0)", &[]).unwrap();
        cat.execute(
            "INSERT INTO storages (id, uuidId, entityId, name, created) VALUES (1, 1, 1, 's.bar', 0)",
            &[],
        )
        .unwrap();
        cat.execute(
            "INSERT INTO entries (id, uuidId, entityId, type, name, timeLastChanged) VALUES (1, 1, 1, 1, 'a.txt', 10)",
            &[],
        )
        .unwrap();
        cat.execute(
            "INSERT INTO entryFragments (storageId, entryId, offset, size) VALUES (1, 1, 0, 2048)",
            &[],
        )
        .unwrap();
        cat
    }

    #[test]
    fn entity_aggregates_count_file_entries() {
        let mut cat = seeded();
        let mut progress = NullProgress;
        recompute_entities(&mut cat, &[], &mut progress).unwrap();
        let rows = cat.query("SELECT totalFileCount, totalFileSize, totalEntryCount FROM entities WHERE id = 1", &[]).unwrap();
        assert_eq!(rows[0].get(0).as_i64(), Some(1));
        assert_eq!(rows[0].get(1).as_i64(), Some(2048));
        assert_eq!(rows[0].get(2).as_i64(), Some(1));
    }

    #[test]
    fn storage_aggregates_use_distinct_entry_count() {
        let mut cat = seeded();
        cat.execute(
            "INSERT INTO entryFragments (storageId, entryId, offset, size) VALUES (1, 1, 2048, 1024)",
            &[],
        )
        .unwrap();
        let mut progress = NullProgress;
        recompute_storages(&mut cat, &[], &mut progress).unwrap();
        let rows = cat.query("SELECT totalFileCount, totalFileSize FROM storages WHERE id = 1", &[]).unwrap();
        assert_eq!(rows[0].get(0).as_i64(), Some(1));
        assert_eq!(rows[0].get(1).as_i64(), Some(3072));
    }

    #[test]
    fn explicit_entity_ids_are_respected() {
        let mut cat = seeded();
        let mut progress = NullProgress;
        recompute_entities(&mut cat, &[1], &mut progress).unwrap();
        let rows = cat.query("SELECT totalEntryCount FROM entities WHERE id = 1", &[]).unwrap();
        assert_eq!(rows[0].get(0).as_i64(), Some(1));
    }
}
