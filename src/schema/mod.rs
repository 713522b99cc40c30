//! Schema Manager (spec §4.1): create/drop tables, views, indices, triggers
//! across the three dialects.
//!
//! Grounded on the teacher's `storage/schema.rs` (`SCHEMA_SQL` constant
//! applied as one `execute_batch`, idempotent `IF NOT EXISTS` DDL),
//! generalized here to per-object drop/create entry points and three
//! dialects.

pub mod ddl;

use crate::backend::{Backend, Catalog, TxnMode};
use crate::error::Result;

/// Schema version written by `create_schema` and read by the Importer
/// (spec §6 "Persisted state layout").
pub const CURRENT_SCHEMA_VERSION: i64 = 8;

fn execute_each(cat: &mut Catalog, statements: &[&str]) -> Result<()> {
    for stmt in statements {
        cat.execute(stmt, &[])?;
    }
    Ok(())
}

/// Create the full schema. With `force`, existing triggers/indices/views/
/// tables are dropped first, in that order, ignoring failures (spec §4.1).
pub fn create_schema(cat: &mut Catalog, force: bool) -> Result<()> {
    if force {
        let _ = drop_triggers(cat);
        let _ = drop_indices(cat);
        let _ = drop_views(cat);
        let _ = drop_tables(cat);
    }

    match cat.backend() {
        Backend::Sqlite => cat.execute_batch(ddl::sqlite::CREATE_TABLES)?,
        Backend::MariaDb => execute_each(cat, ddl::mariadb::CREATE_TABLES)?,
        Backend::Postgres => execute_each(cat, ddl::postgres::CREATE_TABLES)?,
    }

    create_indices(cat)?;
    create_triggers(cat)?;
    set_meta_version(cat, CURRENT_SCHEMA_VERSION)?;
    Ok(())
}

fn set_meta_version(cat: &mut Catalog, version: i64) -> Result<()> {
    let sql = match cat.backend() {
        Backend::Sqlite | Backend::Postgres => {
            "INSERT INTO meta (name, value) VALUES ('version', ?) \
             ON CONFLICT (name) DO UPDATE SET value = excluded.value"
        }
        Backend::MariaDb => {
            "INSERT INTO meta (name, value) VALUES ('version', ?) \
             ON DUPLICATE KEY UPDATE value = VALUES(value)"
        }
    };
    cat.execute(sql, &[version.to_string().into()])?;
    Ok(())
}

/// Read `meta.name = 'version'`. Returns `None` if the catalog has no
/// schema yet.
pub fn read_meta_version(cat: &mut Catalog) -> Result<Option<i64>> {
    let rows = cat.query("SELECT value FROM meta WHERE name = 'version'", &[])?;
    Ok(rows.first().and_then(|r| r.get(0).as_str().and_then(|s| s.parse().ok())))
}

pub fn drop_tables(cat: &mut Catalog) -> Result<()> {
    for table in ddl::TABLE_NAMES.iter().rev() {
        let _ = cat.execute(&format!("DROP TABLE IF EXISTS {table}"), &[]);
    }
    Ok(())
}

pub fn drop_views(cat: &mut Catalog) -> Result<()> {
    for view in ddl::VIEW_NAMES {
        let _ = cat.execute(&format!("DROP VIEW IF EXISTS {view}"), &[]);
    }
    Ok(())
}

pub fn drop_indices(cat: &mut Catalog) -> Result<()> {
    if matches!(cat.backend(), Backend::Sqlite) {
        for index in ddl::INDEX_NAMES {
            let _ = cat.execute(&format!("DROP INDEX IF EXISTS {index}"), &[]);
        }
    }
    // MariaDB/PostgreSQL: indices are declared in the table DDL (spec
    // §4.1), so there is nothing to drop independently of the tables.
    Ok(())
}

pub fn drop_triggers(cat: &mut Catalog) -> Result<()> {
    for trigger in ddl::TRIGGER_NAMES {
        let stmt = match cat.backend() {
            Backend::Sqlite | Backend::MariaDb => format!("DROP TRIGGER IF EXISTS {trigger}"),
            Backend::Postgres => continue,
        };
        let _ = cat.execute(&stmt, &[]);
    }
    Ok(())
}

/// Drop then recreate every trigger, inside one exclusive transaction on
/// backends that allow DDL in a transaction (spec §4.1).
pub fn create_triggers(cat: &mut Catalog) -> Result<()> {
    let create = |cat: &mut Catalog| -> Result<()> {
        drop_triggers(cat)?;
        match cat.backend() {
            Backend::Sqlite => cat.execute_batch(ddl::sqlite::CREATE_TRIGGERS)?,
            Backend::MariaDb => execute_each(cat, ddl::mariadb::CREATE_TRIGGERS)?,
            Backend::Postgres => execute_each(cat, ddl::postgres::CREATE_TRIGGERS)?,
        }
        Ok(())
    };

    if cat.dialect().can_ddl_in_transaction() {
        cat.transaction(TxnMode::Exclusive, create)
    } else {
        create(cat)
    }
}

/// Drop then recreate every index. On the embedded backend this restores
/// any indices missing since the last run; on client/server backends it is
/// a no-op (spec §4.1).
pub fn create_indices(cat: &mut Catalog) -> Result<()> {
    let create = |cat: &mut Catalog| -> Result<()> {
        drop_indices(cat)?;
        match cat.backend() {
            Backend::Sqlite => cat.execute_batch(ddl::sqlite::CREATE_INDICES)?,
            Backend::MariaDb | Backend::Postgres => {}
        }
        Ok(())
    };

    if cat.dialect().can_ddl_in_transaction() {
        cat.transaction(TxnMode::Exclusive, create)
    } else {
        create(cat)
    }
}

pub fn list_tables(cat: &mut Catalog) -> Result<Vec<String>> {
    let sql = match cat.backend() {
        Backend::Sqlite => "SELECT name FROM sqlite_master WHERE type = 'table'",
        Backend::MariaDb => "SHOW TABLES",
        Backend::Postgres => "SELECT tablename FROM pg_catalog.pg_tables WHERE schemaname = 'public'",
    };
    let rows = cat.query(sql, &[])?;
    Ok(rows.iter().filter_map(|r| r.get(0).as_str().map(str::to_string)).collect())
}

pub fn list_indices(cat: &mut Catalog) -> Result<Vec<String>> {
    let sql = match cat.backend() {
        Backend::Sqlite => "SELECT name FROM sqlite_master WHERE type = 'index'",
        Backend::MariaDb => "SELECT DISTINCT index_name FROM information_schema.statistics WHERE table_schema = DATABASE()",
        Backend::Postgres => "SELECT indexname FROM pg_catalog.pg_indexes WHERE schemaname = 'public'",
    };
    let rows = cat.query(sql, &[])?;
    Ok(rows.iter().filter_map(|r| r.get(0).as_str().map(str::to_string)).collect())
}

pub fn list_triggers(cat: &mut Catalog) -> Result<Vec<String>> {
    let sql = match cat.backend() {
        Backend::Sqlite => "SELECT name FROM sqlite_master WHERE type = 'trigger'",
        Backend::MariaDb => "SHOW TRIGGERS",
        Backend::Postgres => "SELECT trigger_name FROM information_schema.triggers",
    };
    let rows = cat.query(sql, &[])?;
    Ok(rows.iter().filter_map(|r| r.get(0).as_str().map(str::to_string)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CatalogUri;

    fn memory() -> Catalog {
        Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap()
    }

    #[test]
    fn create_schema_then_list_tables() {
        let mut cat = memory();
        create_schema(&mut cat, false).unwrap();
        let tables = list_tables(&mut cat).unwrap();
        assert!(tables.contains(&"entities".to_string()));
        assert!(tables.contains(&"meta".to_string()));
    }

    #[test]
    fn create_schema_writes_version() {
        let mut cat = memory();
        create_schema(&mut cat, false).unwrap();
        assert_eq!(read_meta_version(&mut cat).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn force_recreate_is_idempotent() {
        let mut cat = memory();
        create_schema(&mut cat, false).unwrap();
        create_schema(&mut cat, true).unwrap();
        assert_eq!(read_meta_version(&mut cat).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn create_indices_is_idempotent() {
        let mut cat = memory();
        create_schema(&mut cat, false).unwrap();
        create_indices(&mut cat).unwrap();
        let indices = list_indices(&mut cat).unwrap();
        assert!(indices.contains(&"indexEntriesName".to_string()));
    }
}
