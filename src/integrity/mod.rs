//! Integrity Checker (spec §4.4): quick/foreign-key/full consistency
//! checks, plus the orphan and duplicate audits.
//!
//! The PRAGMA-driven checks are grounded on the teacher's
//! `storage/schema.rs` test module (`test_foreign_keys_enabled`,
//! `test_priority_constraint`); the orphan queries follow the
//! `NOT IN (SELECT ...)` anti-join shape in
//! `other_examples/621dbc0d_gaspardpetit-findx__src-maintain.rs.rs`'s
//! `clean_orphans`.

use crate::backend::{Backend, Catalog};
use crate::error::{Error, Result};

/// One named orphan-audit finding (spec §4.4, invariants 1-8).
#[derive(Debug, Clone)]
pub struct OrphanFinding {
    pub description: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub orphans: Vec<OrphanFinding>,
    pub duplicate_storages: u64,
}

impl IntegrityReport {
    #[must_use]
    pub fn total_orphans(&self) -> u64 {
        self.orphans.iter().map(|f| f.count).sum()
    }

    #[must_use]
    pub fn total_findings(&self) -> u64 {
        self.total_orphans() + self.duplicate_storages
    }
}

const ORPHAN_QUERIES: &[(&str, &str)] = &[
    (
        "entryFragments without a named storage",
        "SELECT COUNT(*) FROM entryFragments f \
         JOIN storages s ON s.id = f.storageId \
         WHERE s.name IS NULL OR s.name = ''",
    ),
    (
        "file/image/hardlink entries without fragments",
        "SELECT COUNT(*) FROM entries e \
         WHERE e.deletedFlag = 0 AND e.type IN (1, 2, 5) \
           AND NOT EXISTS (SELECT 1 FROM entryFragments f WHERE f.entryId = e.id)",
    ),
    (
        "entries without a matching type-row",
        "SELECT \
            (SELECT COUNT(*) FROM entries e WHERE e.deletedFlag = 0 AND e.type = 1 \
                AND NOT EXISTS (SELECT 1 FROM fileEntries t WHERE t.entryId = e.id)) + \
            (SELECT COUNT(*) FROM entries e WHERE e.deletedFlag = 0 AND e.type = 2 \
                AND NOT EXISTS (SELECT 1 FROM imageEntries t WHERE t.entryId = e.id)) + \
            (SELECT COUNT(*) FROM entries e WHERE e.deletedFlag = 0 AND e.type = 5 \
                AND NOT EXISTS (SELECT 1 FROM hardlinkEntries t WHERE t.entryId = e.id)) + \
            (SELECT COUNT(*) FROM entries e WHERE e.deletedFlag = 0 AND e.type = 3 \
                AND NOT EXISTS (SELECT 1 FROM directoryEntries t WHERE t.entryId = e.id)) + \
            (SELECT COUNT(*) FROM entries e WHERE e.deletedFlag = 0 AND e.type = 4 \
                AND NOT EXISTS (SELECT 1 FROM linkEntries t WHERE t.entryId = e.id)) + \
            (SELECT COUNT(*) FROM entries e WHERE e.deletedFlag = 0 AND e.type = 6 \
                AND NOT EXISTS (SELECT 1 FROM specialEntries t WHERE t.entryId = e.id))",
    ),
    (
        "entries whose entityId disagrees with their fragment's storage.entityId",
        "SELECT COUNT(DISTINCT e.id) FROM entries e \
         JOIN entryFragments f ON f.entryId = e.id \
         JOIN storages s ON s.id = f.storageId \
         WHERE e.deletedFlag = 0 AND s.entityId != e.entityId",
    ),
    (
        "storages without a name or with an out-of-range state",
        "SELECT COUNT(*) FROM storages \
         WHERE deletedFlag = 0 AND (name IS NULL OR name = '' OR state < 0 OR state > 5)",
    ),
    (
        "entities with neither live entries nor live storages",
        "SELECT COUNT(*) FROM entities e \
         WHERE e.id != 0 AND e.deletedFlag = 0 \
           AND NOT EXISTS (SELECT 1 FROM entries x WHERE x.entityId = e.id AND x.deletedFlag = 0) \
           AND NOT EXISTS (SELECT 1 FROM storages x WHERE x.entityId = e.id AND x.deletedFlag = 0)",
    ),
    (
        "newest-entry rows without a base entry",
        "SELECT COUNT(*) FROM entryNewest n \
         WHERE NOT EXISTS (SELECT 1 FROM entries e WHERE e.id = n.entryId AND e.deletedFlag = 0)",
    ),
];

/// FTS orphan counts are queried separately because the embedded backend
/// keeps auxiliary FTS tables while MariaDB/PostgreSQL fold FTS into the
/// base tables (spec §4.2) — there is nothing to orphan on those two.
fn fts_orphan_count(cat: &mut Catalog) -> Result<u64> {
    if !matches!(cat.backend(), Backend::Sqlite) {
        return Ok(0);
    }
    let storages = cat.query(
        "SELECT COUNT(*) FROM FTS_storages f \
         WHERE NOT EXISTS (SELECT 1 FROM storages s WHERE s.id = f.storageId)",
        &[],
    )?;
    let entries = cat.query(
        "SELECT COUNT(*) FROM FTS_entries f \
         WHERE NOT EXISTS (SELECT 1 FROM entries e WHERE e.id = f.entryId)",
        &[],
    )?;
    let storages_count = storages.first().and_then(|r| r.get(0).as_i64()).unwrap_or(0);
    let entries_count = entries.first().and_then(|r| r.get(0).as_i64()).unwrap_or(0);
    Ok((storages_count + entries_count) as u64)
}

/// Count rows violating invariants 1-8 (spec §4.4 "Orphan audit").
pub fn audit_orphans(cat: &mut Catalog) -> Result<Vec<OrphanFinding>> {
    let mut findings = Vec::with_capacity(ORPHAN_QUERIES.len() + 1);
    for (description, sql) in ORPHAN_QUERIES {
        let rows = cat.query(sql, &[])?;
        let count = rows.first().and_then(|r| r.get(0).as_i64()).unwrap_or(0) as u64;
        findings.push(OrphanFinding { description, count });
    }
    findings.push(OrphanFinding {
        description: "FTS rows without a base row",
        count: fts_orphan_count(cat)?,
    });
    Ok(findings)
}

/// Count adjacent duplicate storage names among non-deleted storages,
/// ordered by the database's default collation (spec §4.4 "Duplicate
/// audit").
pub fn audit_duplicates(cat: &mut Catalog) -> Result<u64> {
    let rows = cat.query(
        "SELECT name FROM storages WHERE deletedFlag = 0 ORDER BY name",
        &[],
    )?;
    let mut duplicates = 0u64;
    let mut previous: Option<String> = None;
    for row in &rows {
        let name = row.get(0).as_str().map(str::to_string);
        if name.is_some() && name == previous {
            duplicates += 1;
        }
        if name.is_some() {
            previous = name;
        }
    }
    Ok(duplicates)
}

/// Run both higher-level audits and combine them (spec §6 `--check`).
pub fn check(cat: &mut Catalog) -> Result<IntegrityReport> {
    Ok(IntegrityReport {
        orphans: audit_orphans(cat)?,
        duplicate_storages: audit_duplicates(cat)?,
    })
}

/// Structural self-check (embedded backend: `PRAGMA quick_check`;
/// client/server backends have no direct equivalent and are treated as
/// always-passing at this level, per spec §4.4's "three pluggable depth
/// levels").
pub fn check_quick(cat: &mut Catalog) -> Result<()> {
    if !matches!(cat.backend(), Backend::Sqlite) {
        return Ok(());
    }
    let rows = cat.query("PRAGMA quick_check", &[])?;
    match rows.first().and_then(|r| r.get(0).as_str()) {
        Some("ok") | None => Ok(()),
        Some(other) => Err(Error::IntegrityViolation { count: 1, detail: other.to_string() }),
    }
}

/// Foreign-key self-check (embedded backend: `PRAGMA foreign_key_check`).
pub fn check_foreign_keys(cat: &mut Catalog) -> Result<()> {
    if !matches!(cat.backend(), Backend::Sqlite) {
        return Ok(());
    }
    let rows = cat.query("PRAGMA foreign_key_check", &[])?;
    if rows.is_empty() {
        Ok(())
    } else {
        Err(Error::IntegrityViolation { count: rows.len() as u64, detail: "foreign key check reported violations".to_string() })
    }
}

/// Full self-check (embedded backend: `PRAGMA integrity_check`).
pub fn check_full(cat: &mut Catalog) -> Result<()> {
    if !matches!(cat.backend(), Backend::Sqlite) {
        return Ok(());
    }
    let rows = cat.query("PRAGMA integrity_check", &[])?;
    match rows.first().and_then(|r| r.get(0).as_str()) {
        Some("ok") | None => Ok(()),
        Some(other) => Err(Error::IntegrityViolation { count: 1, detail: other.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CatalogUri;
    use crate::schema;

    fn memory() -> Catalog {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut cat, false).unwrap();
        cat
    }

    #[test]
    fn clean_catalog_has_no_orphans() {
        let mut cat = memory();
        let findings = audit_orphans(&mut cat).unwrap();
        assert!(findings.iter().all(|f| f.count == 0));
    }

    #[test]
    fn fragment_without_storage_name_is_an_orphan() {
        let mut cat = memory();
        cat.execute("INSERT INTO uuids (id, jobUuid) VALUES (1, 'job-a')", &[]).unwrap();
        cat.execute("INSERT INTO entities (id, uuidId, jobUuid, created) VALUES (1, 1, 'job-a', 0)", &[]).unwrap();
        cat.execute(
            "INSERT INTO storages (id, uuidId, entityId, name, created) VALUES (1, 1, 1, '', 0)",
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

        let findings = audit_orphans(&mut cat).unwrap();
        assert_eq!(findings[0].count, 1);
    }

    #[test]
    fn duplicate_storage_names_are_counted() {
        let mut cat = memory();
        cat.execute("INSERT INTO uuids (id, jobUuid) VALUES (1, 'job-a')", &[]).unwrap();
        cat.execute("INSERT INTO entities (id, uuidId, jobUuid, created) VALUES (1, 1, 'job-a', 0)", &[]).unwrap();
        for id in [1, 2] {
            cat.execute(
                "INSERT INTO storages (id, uuidId, entityId, name, created) VALUES (?, 1, 1, 'dup.bar', 0)",
                &[crate::backend::Value::Integer(id)],
            )
            .unwrap();
        }
        assert_eq!(audit_duplicates(&mut cat).unwrap(), 1);
    }

    #[test]
    fn quick_check_passes_on_fresh_catalog() {
        let mut cat = memory();
        check_quick(&mut cat).unwrap();
        check_foreign_keys(&mut cat).unwrap();
        check_full(&mut cat).unwrap();
    }
}
