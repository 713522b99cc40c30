//! Newest-Entry Projector (spec §4.5): maintains `entryNewest`, the
//! "newest version per name" projection, either by full rebuild or
//! incrementally per storage.
//!
//! Grounded on the teacher's `storage/sqlite.rs` upsert-by-name methods
//! (`INSERT ... ON CONFLICT DO UPDATE`).

use crate::backend::{Backend, Catalog, TxnMode, Value};
use crate::error::Result;
use crate::progress::Progress;

/// One row collected from the four entry/relation tables that a storage
/// owns (spec §4.5 step (a)).
#[derive(Debug, Clone)]
struct CollectedEntry {
    entry_id: i64,
    uuid_id: i64,
    entity_id: i64,
    entry_type: i64,
    name: String,
    time_last_changed: i64,
    user_id: i64,
    group_id: i64,
    permission: i64,
    size: i64,
}

fn row_to_entry(row: &crate::backend::Row) -> CollectedEntry {
    CollectedEntry {
        entry_id: row.get(0).as_i64().unwrap_or(0),
        uuid_id: row.get(1).as_i64().unwrap_or(0),
        entity_id: row.get(2).as_i64().unwrap_or(0),
        entry_type: row.get(3).as_i64().unwrap_or(0),
        name: row.get(4).as_str().unwrap_or_default().to_string(),
        time_last_changed: row.get(5).as_i64().unwrap_or(0),
        user_id: row.get(6).as_i64().unwrap_or(0),
        group_id: row.get(7).as_i64().unwrap_or(0),
        permission: row.get(8).as_i64().unwrap_or(0),
        size: row.get(9).as_i64().unwrap_or(0),
    }
}

const ENTRY_COLUMNS: &str =
    "e.id, e.uuidId, e.entityId, e.type, e.name, e.timeLastChanged, e.userId, e.groupId, e.permission, e.size";

/// Entries owned by `storage_id` across the four relation tables, ordered
/// newest-first with `entry id DESC` as a deterministic tie-break
/// (spec §4.5 "Tie-breaks" **[ADDED]**, resolving the open question).
fn owned_entries(cat: &mut Catalog, storage_id: i64, live_only: bool) -> Result<Vec<CollectedEntry>> {
    let live_clause = if live_only { "AND e.deletedFlag = 0" } else { "" };
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM entries e JOIN entryFragments f ON f.entryId = e.id \
           WHERE f.storageId = ? {live_clause} \
         UNION \
         SELECT {ENTRY_COLUMNS} FROM entries e JOIN directoryEntries d ON d.entryId = e.id \
           WHERE d.storageId = ? {live_clause} \
         UNION \
         SELECT {ENTRY_COLUMNS} FROM entries e JOIN linkEntries l ON l.entryId = e.id \
           WHERE l.storageId = ? {live_clause} \
         UNION \
         SELECT {ENTRY_COLUMNS} FROM entries e JOIN specialEntries sp ON sp.entryId = e.id \
           WHERE sp.storageId = ? {live_clause} \
         ORDER BY timeLastChanged DESC, id DESC"
    );
    let params = [
        Value::Integer(storage_id),
        Value::Integer(storage_id),
        Value::Integer(storage_id),
        Value::Integer(storage_id),
    ];
    let rows = cat.query(&sql, &params)?;
    Ok(rows.iter().map(row_to_entry).collect())
}

/// The latest live entry named `name`, owned by some storage other than
/// `exclude_storage_id` (spec §4.5 `removeFromNewest` step (b)).
fn find_replacement(cat: &mut Catalog, name: &str, exclude_storage_id: i64) -> Result<Option<CollectedEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM entries e JOIN entryFragments f ON f.entryId = e.id \
           WHERE e.name = ? AND e.deletedFlag = 0 AND f.storageId != ? \
         UNION \
         SELECT {ENTRY_COLUMNS} FROM entries e JOIN directoryEntries d ON d.entryId = e.id \
           WHERE e.name = ? AND e.deletedFlag = 0 AND d.storageId != ? \
         UNION \
         SELECT {ENTRY_COLUMNS} FROM entries e JOIN linkEntries l ON l.entryId = e.id \
           WHERE e.name = ? AND e.deletedFlag = 0 AND l.storageId != ? \
         UNION \
         SELECT {ENTRY_COLUMNS} FROM entries e JOIN specialEntries sp ON sp.entryId = e.id \
           WHERE e.name = ? AND e.deletedFlag = 0 AND sp.storageId != ? \
         ORDER BY timeLastChanged DESC, id DESC"
    );
    let params = [
        Value::Text(name.to_string()),
        Value::Integer(exclude_storage_id),
        Value::Text(name.to_string()),
        Value::Integer(exclude_storage_id),
        Value::Text(name.to_string()),
        Value::Integer(exclude_storage_id),
        Value::Text(name.to_string()),
        Value::Integer(exclude_storage_id),
    ];
    let rows = cat.query(&sql, &params)?;
    Ok(rows.first().map(row_to_entry))
}

fn current_newest_timestamp(cat: &mut Catalog, name: &str) -> Result<Option<i64>> {
    let rows = cat.query(
        "SELECT timeLastChanged FROM entryNewest WHERE name = ?",
        &[Value::Text(name.to_string())],
    )?;
    Ok(rows.first().and_then(|r| r.get(0).as_i64()))
}

fn upsert_newest(cat: &mut Catalog, entry: &CollectedEntry) -> Result<()> {
    let sql = match cat.backend() {
        Backend::Sqlite | Backend::Postgres => {
            "INSERT INTO entryNewest \
                (uuidId, entityId, entryId, type, name, timeLastChanged, userId, groupId, permission, size) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (name) DO UPDATE SET \
                uuidId = excluded.uuidId, entityId = excluded.entityId, entryId = excluded.entryId, \
                type = excluded.type, timeLastChanged = excluded.timeLastChanged, userId = excluded.userId, \
                groupId = excluded.groupId, permission = excluded.permission, size = excluded.size"
        }
        Backend::MariaDb => {
            "INSERT INTO entryNewest \
                (uuidId, entityId, entryId, type, name, timeLastChanged, userId, groupId, permission, size) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE \
                uuidId = VALUES(uuidId), entityId = VALUES(entityId), entryId = VALUES(entryId), \
                type = VALUES(type), timeLastChanged = VALUES(timeLastChanged), userId = VALUES(userId), \
                groupId = VALUES(groupId), permission = VALUES(permission), size = VALUES(size)"
        }
    };
    cat.execute(
        sql,
        &[
            Value::Integer(entry.uuid_id),
            Value::Integer(entry.entity_id),
            Value::Integer(entry.entry_id),
            Value::Integer(entry.entry_type),
            Value::Text(entry.name.clone()),
            Value::Integer(entry.time_last_changed),
            Value::Integer(entry.user_id),
            Value::Integer(entry.group_id),
            Value::Integer(entry.permission),
            Value::Integer(entry.size),
        ],
    )?;
    Ok(())
}

/// `addToNewest(storageId)` (spec §4.5).
pub fn add_to_newest(cat: &mut Catalog, storage_id: i64) -> Result<()> {
    let entries = owned_entries(cat, storage_id, true)?;
    for entry in entries {
        let current = current_newest_timestamp(cat, &entry.name)?;
        if current.is_none_or(|ts| entry.time_last_changed > ts) {
            upsert_newest(cat, &entry)?;
        }
    }
    Ok(())
}

/// `removeFromNewest(storageId)` (spec §4.5).
pub fn remove_from_newest(cat: &mut Catalog, storage_id: i64) -> Result<()> {
    let owned = owned_entries(cat, storage_id, false)?;
    let mut seen_names = std::collections::HashSet::new();
    for entry in owned {
        if !seen_names.insert(entry.name.clone()) {
            continue;
        }
        cat.execute("DELETE FROM entryNewest WHERE entryId = ?", &[Value::Integer(entry.entry_id)])?;
        if let Some(replacement) = find_replacement(cat, &entry.name, storage_id)? {
            upsert_newest(cat, &replacement)?;
        }
    }
    Ok(())
}

fn live_storage_ids(cat: &mut Catalog) -> Result<Vec<i64>> {
    let rows = cat.query("SELECT id FROM storages WHERE deletedFlag = 0", &[])?;
    Ok(rows.iter().filter_map(|r| r.get(0).as_i64()).collect())
}

/// Full rebuild: purge `entryNewest` in batches of 1000 inside one
/// exclusive transaction, then call `addToNewest` for every live storage
/// (spec §4.5 mode 1).
pub fn rebuild(cat: &mut Catalog, progress: &mut dyn Progress) -> Result<()> {
    cat.transaction(TxnMode::Exclusive, |cat| {
        loop {
            let affected = cat.execute("DELETE FROM entryNewest WHERE id IN (SELECT id FROM entryNewest LIMIT 1000)", &[])?;
            if affected == 0 {
                break;
            }
        }
        Ok(())
    })?;

    let storages = live_storage_ids(cat)?;
    progress.init(storages.len() as u64);
    for (i, storage_id) in storages.iter().enumerate() {
        add_to_newest(cat, *storage_id)?;
        progress.step((((i as u64 + 1) * 1000) / storages.len().max(1) as u64) as u32);
    }
    progress.done(0.0);
    Ok(())
}

/// Incremental mode: remove then re-add the projection for each named
/// storage (spec §4.5 mode 2).
pub fn refresh_storages(cat: &mut Catalog, storage_ids: &[i64], progress: &mut dyn Progress) -> Result<()> {
    progress.init(storage_ids.len() as u64);
    for (i, storage_id) in storage_ids.iter().enumerate() {
        remove_from_newest(cat, *storage_id)?;
        add_to_newest(cat, *storage_id)?;
        progress.step((((i as u64 + 1) * 1000) / storage_ids.len().max(1) as u64) as u32);
    }
    progress.done(0.0);
    Ok(())
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
        cat
    }

    fn insert_storage(cat: &mut Catalog, id: i64) {
        cat.execute(
            "INSERT INTO storages (id, uuidId, entityId, name, created) VALUES (?, 1, 1, ?, 0)",
            &[Value::Integer(id), Value::Text(format!("storage-{id}.bar"))],
        )
        .unwrap();
    }

    fn insert_file_entry(cat: &mut Catalog, id: i64, storage_id: i64, name: &str, time: i64) {
        cat.execute(
            "INSERT INTO entries (id, uuidId, entityId, type, name, timeLastChanged) VALUES (?, 1, 1, 1, ?, ?)",
            &[Value::Integer(id), Value::Text(name.to_string()), Value::Integer(time)],
        )
        .unwrap();
        cat.execute(
            "INSERT INTO entryFragments (storageId, entryId, offset, size) VALUES (?, ?, 0, 100)",
            &[Value::Integer(storage_id), Value::Integer(id)],
        )
        .unwrap();
    }

    #[test]
    fn add_to_newest_picks_the_most_recent_timestamp() {
        let mut cat = seeded();
        insert_storage(&mut cat, 1);
        insert_storage(&mut cat, 2);
        insert_file_entry(&mut cat, 1, 1, "report.txt", 100);
        insert_file_entry(&mut cat, 2, 2, "report.txt", 200);

        add_to_newest(&mut cat, 1).unwrap();
        add_to_newest(&mut cat, 2).unwrap();

        let rows = cat.query("SELECT entryId, timeLastChanged FROM entryNewest WHERE name = ?", &[Value::Text("report.txt".into())]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0).as_i64(), Some(2));
        assert_eq!(rows[0].get(1).as_i64(), Some(200));
    }

    #[test]
    fn remove_from_newest_promotes_the_next_candidate() {
        let mut cat = seeded();
        insert_storage(&mut cat, 1);
        insert_storage(&mut cat, 2);
        insert_file_entry(&mut cat, 1, 1, "report.txt", 100);
        insert_file_entry(&mut cat, 2, 2, "report.txt", 200);
        add_to_newest(&mut cat, 1).unwrap();
        add_to_newest(&mut cat, 2).unwrap();

        remove_from_newest(&mut cat, 2).unwrap();

        let rows = cat.query("SELECT entryId FROM entryNewest WHERE name = ?", &[Value::Text("report.txt".into())]).unwrap();
        assert_eq!(rows[0].get(0).as_i64(), Some(1));
    }

    #[test]
    fn rebuild_visits_every_live_storage() {
        let mut cat = seeded();
        insert_storage(&mut cat, 1);
        insert_file_entry(&mut cat, 1, 1, "a.txt", 50);
        let mut progress = NullProgress;
        rebuild(&mut cat, &mut progress).unwrap();
        let rows = cat.query("SELECT COUNT(*) FROM entryNewest", &[]).unwrap();
        assert_eq!(rows[0].get(0).as_i64(), Some(1));
    }
}
