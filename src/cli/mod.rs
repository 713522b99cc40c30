//! Flat-flag command-line surface (spec §6).
//!
//! Unlike the teacher's subcommand tree (`Cli { command: Commands }`), this
//! tool's option table is shaped like `original_source/bar/cmdoptions.h`: one
//! flat set of long flags selecting a subset of maintenance operations,
//! always executed in the fixed order `operations::run` assigns them.

use clap::Parser;

use crate::backend::CatalogUri;
use crate::error::{Error, Result};
use crate::operations::Operations;

fn parse_i64_list(raw: &str) -> Vec<i64> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).filter_map(|s| s.parse().ok()).collect()
}

fn parse_string_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(ToString::to_string).collect()
}

/// `ixctl [options] <database-uri> [SQL-command…]` (spec §6 "Command
/// surface"). Every flag is independent; `operations::from_cli` decides
/// which ones fire and in what order.
#[derive(Parser, Debug)]
#[command(name = "ixctl", version, about = "Maintenance engine for a deduplicating backup catalog's relational index")]
pub struct Cli {
    // ── Ops ──────────────────────────────────────────────
    /// Print an overall catalog summary.
    #[arg(long)]
    pub info: bool,

    /// Print per-UUID detail for the given job ids/UUIDs.
    #[arg(long, value_name = "ID|UUID,…")]
    pub info_jobs: Option<String>,

    /// Print per-entity detail for the given entity ids.
    #[arg(long, value_name = "ID,…")]
    pub info_entities: Option<String>,

    /// Print per-entry detail for the given entry ids/names.
    #[arg(long, value_name = "ID|NAME,…")]
    pub info_entries: Option<String>,

    /// Restrict `--info-entries` to one `EntryType` ordinal.
    #[arg(long, value_name = "TYPE")]
    pub entry_type: Option<i64>,

    /// Print per-storage detail for the given storage ids.
    #[arg(long, value_name = "ID,…")]
    pub info_storages: Option<String>,

    /// Print entries whose owning storage is gone.
    #[arg(long)]
    pub info_lost_storages: bool,

    /// Print entries whose owning storage is gone.
    #[arg(long)]
    pub info_lost_entries: bool,

    // ── Check ────────────────────────────────────────────
    /// Run quick/foreign-key/full consistency checks.
    #[arg(long)]
    pub check_integrity: bool,

    /// Audit for orphaned rows without deleting them.
    #[arg(long)]
    pub check_orphaned: bool,

    /// Audit for duplicate-named storages without deleting them.
    #[arg(long)]
    pub check_duplicates: bool,

    /// Run both orphan and duplicate audits.
    #[arg(long)]
    pub check: bool,

    // ── Create ───────────────────────────────────────────
    /// Create the schema (tables, triggers, indices).
    #[arg(long)]
    pub create: bool,

    /// Create only the triggers.
    #[arg(long)]
    pub create_triggers: bool,

    /// Create only the indices.
    #[arg(long)]
    pub create_indices: bool,

    /// Create or repopulate the FTS indices.
    #[arg(long)]
    pub create_fts_indices: bool,

    /// Rebuild the newest-entry projection. Empty value means a full
    /// rebuild; a comma list means an incremental refresh of just those
    /// storages.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "", value_name = "STORAGE-IDS")]
    pub create_newest: Option<String>,

    /// Recompute aggregates for the given entity ids, or every live entity
    /// when no value is given.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "", value_name = "ENTITY-IDS")]
    pub create_aggregates_entities: Option<String>,

    /// Recompute aggregates for the given storage ids, or every live storage
    /// when no value is given.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "", value_name = "STORAGE-IDS")]
    pub create_aggregates_storages: Option<String>,

    /// Recompute aggregates for every live entity and storage.
    #[arg(long)]
    pub create_aggregates: bool,

    // ── Clean ────────────────────────────────────────────
    /// Delete orphaned rows across the ten cleanup stages.
    #[arg(long)]
    pub clean_orphaned: bool,

    /// Soft-delete duplicate-named storages.
    #[arg(long)]
    pub clean_duplicates: bool,

    /// Run both cleaners.
    #[arg(long)]
    pub clean: bool,

    // ── Purge ────────────────────────────────────────────
    /// Hard-delete every storage/entity already marked `deletedFlag`.
    #[arg(long)]
    pub purge: bool,

    /// Hard-delete every storage stuck in the `error` state.
    #[arg(long)]
    pub purge_with_error: bool,

    // ── Reorg ────────────────────────────────────────────
    /// Refresh the backend's query planner statistics.
    #[arg(long)]
    pub optimize: bool,

    /// Rebuild every index.
    #[arg(long)]
    pub reindex: bool,

    /// Reclaim free space, optionally into a fresh file (embedded backend
    /// only).
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "", value_name = "FILE")]
    pub vacuum: Option<String>,

    // ── Drop ─────────────────────────────────────────────
    /// Drop all tables.
    #[arg(long)]
    pub drop_tables: bool,

    /// Drop all triggers.
    #[arg(long)]
    pub drop_triggers: bool,

    /// Drop all indices.
    #[arg(long)]
    pub drop_indices: bool,

    // ── Misc ─────────────────────────────────────────────
    /// With `--create`, drop the existing schema first instead of failing
    /// on conflict.
    #[arg(long)]
    pub force: bool,

    /// Wrap pass-through SQL in an explicit transaction.
    #[arg(long)]
    pub transaction: bool,

    /// Disable `PRAGMA foreign_keys` on the embedded backend.
    #[arg(long)]
    pub no_foreign_keys: bool,

    /// Emit machine-readable JSON instead of human-readable text.
    #[arg(long)]
    pub pipe: bool,

    /// Suppress progress reporting.
    #[arg(long)]
    pub quiet: bool,

    /// Report wall-clock time for the whole run.
    #[arg(long)]
    pub time: bool,

    /// Prepend `EXPLAIN` to pass-through SQL.
    #[arg(long)]
    pub explain_query: bool,

    /// Increase log verbosity; repeatable (`-v`, `-vv`).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    // ── Import ───────────────────────────────────────────
    /// Migrate a source catalog's live rows into this one.
    #[arg(long, value_name = "URI")]
    pub import: Option<String>,

    /// `<database-uri> [SQL-command…]`: the catalog to open, followed by
    /// optional trailing words run as raw SQL.
    #[arg(required = true, value_name = "DATABASE-URI [SQL-COMMAND…]")]
    pub args: Vec<String>,
}

impl Cli {
    /// Split the positional args into the database URI and the
    /// pass-through SQL, if any trailing words were given.
    #[must_use]
    pub fn database_uri_arg(&self) -> &str {
        &self.args[0]
    }

    #[must_use]
    pub fn pass_through_sql(&self) -> Option<String> {
        if self.args.len() > 1 {
            Some(self.args[1..].join(" "))
        } else {
            None
        }
    }

    /// Parse the positional database URI (spec §6 "Command surface").
    pub fn parse_database_uri(&self) -> Result<CatalogUri> {
        CatalogUri::parse(self.database_uri_arg())
    }

    /// Parse `--import=<uri>`, if given.
    pub fn parse_import_uri(&self) -> Result<Option<CatalogUri>> {
        self.import.as_deref().map(CatalogUri::parse).transpose()
    }

    /// Build the `Operations` value this invocation requests.
    pub fn to_operations(&self) -> Result<Operations> {
        if self.purge && self.purge_with_error {
            return Err(Error::InvalidArgument(
                "--purge and --purge-with-error select overlapping storage sets; pass one at a time".to_string(),
            ));
        }

        Ok(Operations {
            info: self.info,
            info_jobs: self.info_jobs.as_deref().map(parse_string_list),
            info_entities: self.info_entities.as_deref().map(parse_i64_list),
            info_entries: self.info_entries.as_deref().map(parse_string_list),
            entry_type: self.entry_type,
            info_storages: self.info_storages.as_deref().map(parse_i64_list),
            info_lost_storages: self.info_lost_storages,
            info_lost_entries: self.info_lost_entries,

            check_integrity: self.check_integrity,
            check_orphaned: self.check_orphaned,
            check_duplicates: self.check_duplicates,
            check: self.check,

            create: self.create,
            create_triggers: self.create_triggers,
            create_indices: self.create_indices,
            create_fts_indices: self.create_fts_indices,
            create_newest: self.create_newest.as_deref().map(parse_i64_list),
            create_aggregates_entities: self.create_aggregates_entities.as_deref().map(parse_i64_list),
            create_aggregates_storages: self.create_aggregates_storages.as_deref().map(parse_i64_list),
            create_aggregates: self.create_aggregates,

            clean_orphaned: self.clean_orphaned,
            clean_duplicates: self.clean_duplicates,
            clean: self.clean,

            purge_storage_ids: None,
            purge_entity_ids: None,
            purge_deleted_storages: self.purge,
            purge_deleted_entities: self.purge,
            purge_with_error: self.purge_with_error,

            drop_tables: self.drop_tables,
            drop_triggers: self.drop_triggers,
            drop_indices: self.drop_indices,

            optimize: self.optimize,
            reindex: self.reindex,
            vacuum: self.vacuum.is_some(),
            vacuum_into: self.vacuum.as_ref().filter(|s| !s.is_empty()).cloned(),

            force: self.force,
            no_foreign_keys: self.no_foreign_keys,
            transaction: self.transaction,
            import_uri: self.parse_import_uri()?,

            pass_through_sql: self.pass_through_sql(),
            explain_query: self.explain_query,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["ixctl"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn bare_uri_has_no_pass_through_sql() {
        let cli = parse(&["/tmp/index.db"]);
        assert_eq!(cli.database_uri_arg(), "/tmp/index.db");
        assert_eq!(cli.pass_through_sql(), None);
    }

    #[test]
    fn trailing_words_join_into_one_sql_statement() {
        let cli = parse(&["/tmp/index.db", "SELECT", "*", "FROM", "entities"]);
        assert_eq!(cli.pass_through_sql(), Some("SELECT * FROM entities".to_string()));
    }

    #[test]
    fn create_newest_with_no_value_means_full_rebuild() {
        let cli = parse(&["--create-newest", "/tmp/index.db"]);
        let ops = cli.to_operations().unwrap();
        assert_eq!(ops.create_newest, Some(Vec::new()));
    }

    #[test]
    fn create_newest_with_ids_means_incremental_refresh() {
        let cli = parse(&["--create-newest=3,7", "/tmp/index.db"]);
        let ops = cli.to_operations().unwrap();
        assert_eq!(ops.create_newest, Some(vec![3, 7]));
    }

    #[test]
    fn purge_and_purge_with_error_together_are_rejected() {
        let cli = parse(&["--purge", "--purge-with-error", "/tmp/index.db"]);
        assert!(cli.to_operations().is_err());
    }

    #[test]
    fn vacuum_with_a_file_is_distinguished_from_vacuum_in_place() {
        let in_place = parse(&["--vacuum", "/tmp/index.db"]).to_operations().unwrap();
        assert!(in_place.vacuum);
        assert_eq!(in_place.vacuum_into, None);

        let into_file = parse(&["--vacuum=/tmp/copy.db", "/tmp/index.db"]).to_operations().unwrap();
        assert!(into_file.vacuum);
        assert_eq!(into_file.vacuum_into, Some("/tmp/copy.db".to_string()));
    }
}
