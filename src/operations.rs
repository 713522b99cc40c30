//! Operations driver (spec §2, §9 "Global mutable flags").
//!
//! Command-line parsing produces one `Operations` value; `run` executes the
//! requested subset in the fixed order spec §2 assigns to the nine
//! components, short-circuiting on the first error (spec §7
//! "Propagation").

use crate::backend::{Catalog, CatalogUri};
use crate::error::Result;
use crate::progress::Progress;
use crate::{aggregator, cleaner, fts, importer, integrity, newest, printer, purger, reorg, schema};

/// One field per CLI flag (spec §6's option table), collected up front so
/// the driver never re-parses argv (spec §9: "re-architect as one explicit
/// `Operations` structure... passed by value to a single driver function").
#[derive(Debug, Clone, Default)]
pub struct Operations {
    pub info: bool,
    pub info_jobs: Option<Vec<String>>,
    pub info_entities: Option<Vec<i64>>,
    pub info_entries: Option<Vec<String>>,
    pub entry_type: Option<i64>,
    pub info_storages: Option<Vec<i64>>,
    pub info_lost_storages: bool,
    pub info_lost_entries: bool,

    pub check_integrity: bool,
    pub check_orphaned: bool,
    pub check_duplicates: bool,
    pub check: bool,

    pub create: bool,
    pub create_triggers: bool,
    pub create_indices: bool,
    pub create_fts_indices: bool,
    pub create_newest: Option<Vec<i64>>,
    pub create_aggregates_entities: Option<Vec<i64>>,
    pub create_aggregates_storages: Option<Vec<i64>>,
    pub create_aggregates: bool,

    pub clean_orphaned: bool,
    pub clean_duplicates: bool,
    pub clean: bool,

    pub purge_storage_ids: Option<Vec<i64>>,
    pub purge_entity_ids: Option<Vec<i64>>,
    pub purge_deleted_storages: bool,
    pub purge_deleted_entities: bool,
    pub purge_with_error: bool,

    pub drop_tables: bool,
    pub drop_triggers: bool,
    pub drop_indices: bool,

    pub optimize: bool,
    pub reindex: bool,
    pub vacuum: bool,
    pub vacuum_into: Option<String>,

    pub force: bool,
    pub no_foreign_keys: bool,
    pub transaction: bool,
    pub import_uri: Option<CatalogUri>,

    /// Trailing SQL words joined back into one statement, run last
    /// (spec §6 "Pass-through").
    pub pass_through_sql: Option<String>,
    pub explain_query: bool,
}

/// Totals carried back to the CLI layer so it can decide the process exit
/// code (spec §6 "Exit codes": non-zero check findings also fail the run).
#[derive(Debug, Clone, Default)]
pub struct OperationsOutcome {
    pub integrity_findings: u64,
    pub orphans_found: u64,
    pub duplicates_found: u64,
}

/// Run every requested operation against `cat`, in the fixed component
/// order of spec §2 (C1 Schema Manager .. C9 Info Printer). The first error
/// aborts the remaining steps (spec §7).
pub fn run(
    ops: &Operations,
    cat: &mut Catalog,
    progress: &mut dyn Progress,
    out: &mut dyn std::io::Write,
) -> Result<OperationsOutcome> {
    let mut outcome = OperationsOutcome::default();

    if ops.no_foreign_keys && cat.backend() == crate::backend::Backend::Sqlite {
        cat.execute("PRAGMA foreign_keys=OFF", &[])?;
    }

    if ops.drop_tables {
        schema::drop_tables(cat)?;
    }
    if ops.drop_triggers {
        schema::drop_triggers(cat)?;
    }
    if ops.drop_indices {
        schema::drop_indices(cat)?;
    }

    if ops.create {
        schema::create_schema(cat, ops.force)?;
    }
    if ops.create_triggers {
        schema::create_triggers(cat)?;
    }
    if ops.create_indices {
        schema::create_indices(cat)?;
    }
    if ops.create_fts_indices {
        fts::create_fts_indices(cat)?;
    }

    if let Some(source_uri) = &ops.import_uri {
        importer::import(cat, source_uri, progress)?;
    }

    if ops.check_integrity {
        integrity::check_quick(cat)?;
        integrity::check_foreign_keys(cat)?;
        integrity::check_full(cat)?;
    }
    if ops.check_orphaned || ops.check {
        let findings = integrity::audit_orphans(cat)?;
        outcome.orphans_found = findings.iter().map(|f| f.count).sum();
    }
    if ops.check_duplicates || ops.check {
        outcome.duplicates_found = integrity::audit_duplicates(cat)?;
    }
    outcome.integrity_findings = outcome.orphans_found + outcome.duplicates_found;

    if let Some(storage_ids) = &ops.create_newest {
        if storage_ids.is_empty() {
            newest::rebuild(cat, progress)?;
        } else {
            newest::refresh_storages(cat, storage_ids, progress)?;
        }
    }

    if let Some(entity_ids) = &ops.create_aggregates_entities {
        aggregator::recompute_entities(cat, entity_ids, progress)?;
    }
    if let Some(storage_ids) = &ops.create_aggregates_storages {
        aggregator::recompute_storages(cat, storage_ids, progress)?;
    }
    if ops.create_aggregates {
        aggregator::recompute_entities(cat, &[], progress)?;
        aggregator::recompute_storages(cat, &[], progress)?;
    }

    if ops.clean_orphaned || ops.clean {
        cleaner::clean_orphaned(cat)?;
    }
    if ops.clean_duplicates || ops.clean {
        cleaner::clean_duplicates(cat)?;
    }

    if let Some(storage_ids) = &ops.purge_storage_ids {
        purger::purge_storages(cat, storage_ids, progress)?;
    }
    if let Some(entity_ids) = &ops.purge_entity_ids {
        purger::purge_entities(cat, entity_ids, progress)?;
    }
    if ops.purge_deleted_storages {
        let ids = purger::deleted_storage_ids(cat)?;
        purger::purge_storages(cat, &ids, progress)?;
    }
    if ops.purge_deleted_entities {
        let ids = purger::deleted_entity_ids(cat)?;
        purger::purge_entities(cat, &ids, progress)?;
    }
    if ops.purge_with_error {
        let ids = purger::error_storage_ids(cat)?;
        purger::purge_storages(cat, &ids, progress)?;
    }

    if ops.optimize {
        reorg::optimize(cat)?;
    }
    if ops.reindex {
        reorg::reindex(cat)?;
    }
    if ops.vacuum {
        reorg::vacuum(cat, ops.vacuum_into.as_deref())?;
    }

    if ops.info {
        printer::print_catalog_summary(cat, out)?;
    }
    if let Some(job_ids) = &ops.info_jobs {
        printer::print_jobs(cat, job_ids, out)?;
    }
    if let Some(entity_ids) = &ops.info_entities {
        printer::print_entities(cat, entity_ids, out)?;
    }
    if let Some(entry_ids) = &ops.info_entries {
        printer::print_entries(cat, entry_ids, ops.entry_type, out)?;
    }
    if let Some(storage_ids) = &ops.info_storages {
        printer::print_storages(cat, storage_ids, out)?;
    }
    if ops.info_lost_storages {
        printer::print_lost_storages(cat, out)?;
    }
    if ops.info_lost_entries {
        printer::print_lost_entries(cat, out)?;
    }

    if let Some(sql) = &ops.pass_through_sql {
        run_pass_through(cat, sql, ops.explain_query, ops.transaction, out)?;
    }

    Ok(outcome)
}

/// Run trailing SQL words as one raw statement against the open catalog,
/// printing result rows in the same column/row shape the Info Printer uses
/// (spec §6 "Pass-through"). `--transaction` wraps the statement in an
/// explicit transaction instead of relying on the backend's autocommit;
/// `--explain-query` prepends `EXPLAIN`.
fn run_pass_through(
    cat: &mut Catalog,
    sql: &str,
    explain_query: bool,
    transaction: bool,
    out: &mut dyn std::io::Write,
) -> Result<()> {
    let sql = if explain_query { format!("EXPLAIN {sql}") } else { sql.to_string() };
    let rows = if transaction {
        cat.transaction(crate::backend::TxnMode::Immediate, |cat| cat.query(&sql, &[]))?
    } else {
        cat.query(&sql, &[])?
    };
    if rows.is_empty() {
        return Ok(());
    }
    let column_count = rows[0].len();
    let columns: Vec<String> = (0..column_count).map(|i| format!("col{i}")).collect();
    let widths = printer::column_widths(&columns, &rows);
    printer::print_rows(&columns, &rows, &widths, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CatalogUri;
    use crate::progress::NullProgress;

    #[test]
    fn create_then_check_on_an_empty_catalog_is_a_no_op() {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        let ops = Operations { create: true, check: true, ..Default::default() };
        let mut progress = NullProgress;
        let mut out = Vec::new();
        let outcome = run(&ops, &mut cat, &mut progress, &mut out).unwrap();
        assert_eq!(outcome.integrity_findings, 0);
    }

    #[test]
    fn clean_runs_after_create_without_error() {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        let ops = Operations { create: true, clean: true, ..Default::default() };
        let mut progress = NullProgress;
        let mut out = Vec::new();
        run(&ops, &mut cat, &mut progress, &mut out).unwrap();
    }

    #[test]
    fn pass_through_sql_prints_result_rows() {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        let ops = Operations {
            create: true,
            pass_through_sql: Some("SELECT 1, 'hi'".to_string()),
            ..Default::default()
        };
        let mut progress = NullProgress;
        let mut out = Vec::new();
        run(&ops, &mut cat, &mut progress, &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains('1'));
        assert!(printed.contains("hi"));
    }

    #[test]
    fn vacuum_runs_after_create_without_error() {
        let mut cat = Catalog::open(&CatalogUri::Sqlite { path: ":memory:".to_string() }).unwrap();
        let ops = Operations { create: true, vacuum: true, ..Default::default() };
        let mut progress = NullProgress;
        let mut out = Vec::new();
        run(&ops, &mut cat, &mut progress, &mut out).unwrap();
    }
}
