//! Importer (spec §4.3): migrate a source catalog's live rows into the
//! currently-open destination catalog.
//!
//! No importer exists in the teacher repo; the version-dispatch-then-copy
//! shape follows the Schema Manager's own `CURRENT_SCHEMA_VERSION` gate
//! (`src/schema/mod.rs`) and reuses its table list from `schema::ddl` so the
//! two stay in lockstep.

use crate::backend::{Catalog, CatalogUri, TxnMode};
use crate::error::{Error, Result};
use crate::progress::Progress;
use crate::schema;

/// Versions below this are from a schema generation this tool never
/// supported (spec §4.3: "versions ≤ 5 fail with 'unsupported'").
const MIN_SUPPORTED_VERSION: i64 = 6;

/// Highest version this binary understands. Also `schema::CURRENT_SCHEMA_VERSION`.
const MAX_SUPPORTED_VERSION: i64 = 8;

const AGGREGATE_COLUMNS: [&str; 22] = [
    "totalFileCount",
    "totalImageCount",
    "totalDirectoryCount",
    "totalLinkCount",
    "totalHardlinkCount",
    "totalSpecialCount",
    "totalFileSize",
    "totalImageSize",
    "totalHardlinkSize",
    "totalEntryCount",
    "totalEntrySize",
    "totalFileCountNewest",
    "totalImageCountNewest",
    "totalDirectoryCountNewest",
    "totalLinkCountNewest",
    "totalHardlinkCountNewest",
    "totalSpecialCountNewest",
    "totalFileSizeNewest",
    "totalImageSizeNewest",
    "totalHardlinkSizeNewest",
    "totalEntryCountNewest",
    "totalEntrySizeNewest",
];

/// One table's shape for the generic copy loop: its column list (id first)
/// and whether only `deletedFlag = 0` rows should be carried across.
struct TableSpec {
    name: &'static str,
    columns: Vec<&'static str>,
    live_only: bool,
}

fn table_specs() -> Vec<TableSpec> {
    let mut entity_columns = vec!["id", "uuidId", "jobUuid", "type", "scheduleUuid", "created", "lockedCount", "deletedFlag"];
    entity_columns.extend_from_slice(&AGGREGATE_COLUMNS);

    let mut storage_columns = vec![
        "id", "uuidId", "entityId", "name", "created", "hostName", "userName", "comment", "state", "mode",
        "lastChecked", "errorMessage", "deletedFlag",
    ];
    storage_columns.extend_from_slice(&AGGREGATE_COLUMNS);

    vec![
        TableSpec { name: "uuids", columns: vec!["id", "jobUuid"], live_only: false },
        TableSpec { name: "entities", columns: entity_columns, live_only: true },
        TableSpec { name: "storages", columns: storage_columns, live_only: true },
        TableSpec {
            name: "entries",
            columns: vec![
                "id", "uuidId", "entityId", "type", "name", "timeLastChanged", "userId", "groupId", "permission",
                "size", "deletedFlag",
            ],
            live_only: true,
        },
        TableSpec {
            name: "entryFragments",
            columns: vec!["id", "storageId", "entryId", "offset", "size"],
            live_only: false,
        },
        TableSpec { name: "fileEntries", columns: vec!["id", "entryId", "size"], live_only: false },
        TableSpec { name: "imageEntries", columns: vec!["id", "entryId", "size"], live_only: false },
        TableSpec { name: "hardlinkEntries", columns: vec!["id", "entryId", "size"], live_only: false },
        TableSpec { name: "directoryEntries", columns: vec!["id", "storageId", "entryId"], live_only: false },
        TableSpec { name: "linkEntries", columns: vec!["id", "storageId", "entryId"], live_only: false },
        TableSpec { name: "specialEntries", columns: vec!["id", "storageId", "entryId"], live_only: false },
        TableSpec {
            name: "entryNewest",
            columns: vec![
                "id", "uuidId", "entityId", "entryId", "type", "name", "timeLastChanged", "userId", "groupId",
                "permission", "size",
            ],
            live_only: false,
        },
        TableSpec {
            name: "skippedEntries",
            columns: vec!["id", "entityId", "storageId", "name", "reason"],
            live_only: false,
        },
    ]
}

/// Read `meta.version` from an already-open catalog.
fn read_version(cat: &mut Catalog) -> Result<i64> {
    schema::read_meta_version(cat)?.ok_or_else(|| Error::Schema("source catalog has no meta.version row".to_string()))
}

fn count_live_rows(cat: &mut Catalog, specs: &[TableSpec]) -> Result<u64> {
    let mut total = 0u64;
    for spec in specs {
        let sql = if spec.live_only {
            format!("SELECT COUNT(*) FROM {} WHERE deletedFlag = 0", spec.name)
        } else {
            format!("SELECT COUNT(*) FROM {}", spec.name)
        };
        let rows = cat.query(&sql, &[])?;
        total += rows.first().and_then(|r| r.get(0).as_i64()).unwrap_or(0) as u64;
    }
    Ok(total)
}

fn copy_table(source: &mut Catalog, dest: &mut Catalog, spec: &TableSpec) -> Result<u64> {
    let column_list = spec.columns.join(", ");
    let select_sql = if spec.live_only {
        format!("SELECT {column_list} FROM {} WHERE deletedFlag = 0", spec.name)
    } else {
        format!("SELECT {column_list} FROM {}", spec.name)
    };
    let rows = source.query(&select_sql, &[])?;

    let placeholders = vec!["?"; spec.columns.len()].join(", ");
    let insert_sql = format!("INSERT INTO {} ({column_list}) VALUES ({placeholders})", spec.name);

    for row in &rows {
        dest.execute(&insert_sql, &row.0)?;
    }
    Ok(rows.len() as u64)
}

/// Open `source_uri`, read its schema version, and dispatch to the
/// version-specific import (spec §4.3). Every supported version shares the
/// same table shape as [`crate::schema`]; the dispatch exists as a gate, not
/// a per-version code path, since no schema-shape break happened between 6
/// and 8 (see `DESIGN.md`).
pub fn import(dest: &mut Catalog, source_uri: &CatalogUri, progress: &mut dyn Progress) -> Result<u64> {
    let mut source = Catalog::open_read_only(source_uri)?;
    let version = read_version(&mut source)?;

    if version < MIN_SUPPORTED_VERSION {
        return Err(Error::UnsupportedVersion { version });
    }
    if version > MAX_SUPPORTED_VERSION {
        return Err(Error::UnknownVersion { version });
    }

    let specs = table_specs();
    let total = count_live_rows(&mut source, &specs)?;
    progress.init(total);

    let mut copied = 0u64;
    dest.transaction(TxnMode::Exclusive, |dest| {
        for spec in &specs {
            copied += copy_table(&mut source, dest, spec)?;
            progress.step(((copied * 1000) / total.max(1)) as u32);
        }
        Ok(())
    })?;
    progress.done(0.0);
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CatalogUri;
    use crate::progress::NullProgress;
    use crate::schema;

    fn seeded_source() -> Catalog {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut cat, false).unwrap();
        cat.execute("INSERT INTO uuids (id, jobUuid) VALUES (1, 'job-a')", &[]).unwrap();
        cat.execute(
            "INSERT INTO entities (id, uuidId, jobUuid, created) VALUES (1, 1, 'job-a', 0)",
            &[],
        )
        .unwrap();
        cat.execute(
            "INSERT INTO storages (id, uuidId, entityId, name, created) VALUES (1, 1, 1, 'vol.bar', 0)",
            &[],
        )
        .unwrap();
        cat
    }

    #[test]
    fn read_version_reports_current_schema_version() {
        let mut cat = seeded_source();
        assert_eq!(read_version(&mut cat).unwrap(), schema::CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn version_five_is_rejected_as_unsupported() {
        let mut cat = seeded_source();
        cat.execute("UPDATE meta SET value = '5' WHERE name = 'version'", &[]).unwrap();
        let version = read_version(&mut cat).unwrap();
        assert!(version < MIN_SUPPORTED_VERSION);
    }

    #[test]
    fn import_copies_seeded_rows_into_a_fresh_destination() {
        // The source catalog's Cargo temp file stands in for a real path;
        // here we exercise copy_table/count_live_rows directly since `import`
        // itself needs a URI it can re-open rather than a live handle.
        let mut source = seeded_source();
        let mut dest = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut dest, false).unwrap();

        let specs = table_specs();
        let total = count_live_rows(&mut source, &specs).unwrap();
        assert!(total >= 3);

        let mut progress = NullProgress;
        progress.init(total);
        let mut copied = 0u64;
        dest.transaction(crate::backend::TxnMode::Exclusive, |dest| {
            for spec in &specs {
                copied += copy_table(&mut source, dest, spec)?;
            }
            Ok(())
        })
        .unwrap();
        progress.done(0.0);

        assert_eq!(copied, total);
        let rows = dest.query("SELECT COUNT(*) FROM storages", &[]).unwrap();
        assert_eq!(rows[0].get(0).as_i64(), Some(1));
    }
}
