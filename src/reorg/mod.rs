//! Reorg (spec §6 "Reorg" group): backend-native `--optimize`/`--reindex`/
//! `--vacuum` commands. Each is a single statement (or a small per-table
//! batch) with no parameters and no row results, so this module is a thin
//! dispatch over `Catalog::backend()` rather than a `Dialect` method —
//! unlike FTS or schema DDL, the three backends don't share a common shape
//! here worth abstracting behind a trait.

use crate::backend::{Backend, Catalog};
use crate::error::Result;
use crate::schema::ddl::TABLE_NAMES;

fn live_table_names() -> impl Iterator<Item = &'static &'static str> {
    TABLE_NAMES.iter().filter(|name| **name != "meta")
}

/// `--optimize`: refresh the backend's query planner statistics.
pub fn optimize(cat: &mut Catalog) -> Result<()> {
    match cat.backend() {
        Backend::Sqlite => cat.execute_batch("PRAGMA optimize")?,
        Backend::MariaDb => {
            let sql = live_table_names().map(|t| format!("ANALYZE TABLE {t}")).collect::<Vec<_>>().join("; ");
            cat.execute_batch(&sql)?
        }
        Backend::Postgres => cat.execute_batch("ANALYZE")?,
    };
    Ok(())
}

/// `--reindex`: rebuild every index.
pub fn reindex(cat: &mut Catalog) -> Result<()> {
    match cat.backend() {
        Backend::Sqlite => cat.execute_batch("REINDEX")?,
        Backend::MariaDb => {
            let sql = live_table_names().map(|t| format!("OPTIMIZE TABLE {t}")).collect::<Vec<_>>().join("; ");
            cat.execute_batch(&sql)?
        }
        Backend::Postgres => {
            let sql = live_table_names().map(|t| format!("REINDEX TABLE {t}")).collect::<Vec<_>>().join("; ");
            cat.execute_batch(&sql)?
        }
    };
    Ok(())
}

/// `--vacuum [<file>]`: reclaim free space. On the embedded backend, an
/// explicit file path vacuums into a fresh copy instead of in place.
pub fn vacuum(cat: &mut Catalog, into_file: Option<&str>) -> Result<()> {
    match (cat.backend(), into_file) {
        (Backend::Sqlite, Some(path)) => cat.execute_batch(&format!("VACUUM INTO '{path}'"))?,
        (Backend::Sqlite, None) => cat.execute_batch("VACUUM")?,
        (Backend::MariaDb, _) => {
            let sql = live_table_names().map(|t| format!("OPTIMIZE TABLE {t}")).collect::<Vec<_>>().join("; ");
            cat.execute_batch(&sql)?
        }
        (Backend::Postgres, _) => cat.execute_batch("VACUUM")?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CatalogUri;
    use crate::schema;

    #[test]
    fn optimize_runs_on_a_fresh_sqlite_catalog() {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut cat, false).unwrap();
        optimize(&mut cat).unwrap();
    }

    #[test]
    fn reindex_runs_on_a_fresh_sqlite_catalog() {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut cat, false).unwrap();
        reindex(&mut cat).unwrap();
    }

    #[test]
    fn vacuum_without_a_file_runs_in_place() {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        schema::create_schema(&mut cat, false).unwrap();
        vacuum(&mut cat, None).unwrap();
    }
}
