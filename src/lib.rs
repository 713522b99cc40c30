//! ixctl - maintenance engine for a deduplicating backup system's
//! relational index catalog.
//!
//! The catalog itself is written by an external backup engine; this crate
//! is the offline toolkit that keeps its invariants intact across three SQL
//! backends (embedded SQLite, MariaDB, PostgreSQL).
//!
//! # Architecture
//!
//! - [`backend`] - the `Catalog`/`Dialect` abstraction shared by every other
//!   module; nothing downstream names a `rusqlite`/`sqlx` type directly.
//! - [`model`] - row types and enums for the catalog's data model.
//! - [`schema`] - Schema Manager: create/drop tables, triggers, indices.
//! - [`fts`] - FTS Manager: per-dialect full-text search.
//! - [`importer`] - Importer: migrate an older-schema catalog's live rows.
//! - [`integrity`] - Integrity Checker: quick/foreign-key/full checks,
//!   orphan and duplicate audits.
//! - [`newest`] - Newest-Entry Projector: maintains `entryNewest`.
//! - [`aggregator`] - Aggregator: recomputes per-entity/per-storage totals.
//! - [`cleaner`] - Cleaner: orphan cleanup and duplicate-storage soft-delete.
//! - [`purger`] - Purger: cascading hard delete.
//! - [`reorg`] - backend-native optimize/reindex/vacuum.
//! - [`printer`] - Info Printer: human-readable summaries.
//! - [`operations`] - the driver that runs a requested subset of the above
//!   in a fixed order.
//! - [`cli`] - command-line surface, built on `clap`.
//! - [`error`] - error taxonomy and exit codes.
//! - [`progress`] - progress-reporting trait used by long-running modules.

pub mod aggregator;
pub mod backend;
pub mod cleaner;
pub mod cli;
pub mod error;
pub mod fts;
pub mod importer;
pub mod integrity;
pub mod model;
pub mod newest;
pub mod operations;
pub mod printer;
pub mod progress;
pub mod purger;
pub mod reorg;
pub mod schema;
pub mod text;

pub use error::{Error, Result};
