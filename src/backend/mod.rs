//! Catalog backend abstraction (spec §0.1/§5/§9).
//!
//! Three SQL backends share one synchronous `Catalog` façade: an embedded
//! SQLite file (via `rusqlite`) and two client/server databases, MariaDB and
//! PostgreSQL (via `sqlx`). The client/server backends are driven through a
//! small current-thread Tokio runtime so every `Catalog` method blocks to
//! completion and the rest of the crate never has to think about `.await`.

pub mod client_server;
pub mod sqlite;
pub mod uri;

pub use uri::CatalogUri;

use crate::error::{Error, Result};
use sqlx::any::AnyConnection;
use tokio::runtime::Runtime;

/// Which of the three backends a `Catalog` is talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    MariaDb,
    Postgres,
}

/// A backend-neutral scalar. Query rows and bound parameters both travel as
/// `Value`, so the rest of the crate never names `rusqlite`/`sqlx` types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Real(v) => Some(*v as i64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// One result row: positional scalar columns, matching `spec.md`'s
/// "typed relational API" framing — callers index by column position, never
/// by a backend-specific row type.
#[derive(Debug, Clone, Default)]
pub struct Row(pub Vec<Value>);

impl Row {
    #[must_use]
    pub fn get(&self, idx: usize) -> &Value {
        self.0.get(idx).unwrap_or(&Value::Null)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Transaction isolation requested by the caller (spec §5: "exclusive mode,
/// wait-forever").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnMode {
    Exclusive,
    Immediate,
}

/// Per-backend differences used by the Schema and FTS managers (spec §9,
/// "Dialect polymorphism").
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// `true` if DDL may run inside an open transaction (embedded backend
    /// only; client/server backends commit DDL implicitly, spec §5).
    fn can_ddl_in_transaction(&self) -> bool;

    /// `true` if the backend has an explicit `ANALYZE`/`OPTIMIZE` statement
    /// distinct from `VACUUM`.
    fn supports_analyze_command(&self) -> bool;

    /// DDL that creates this dialect's FTS tables (spec §4.2). Empty for
    /// dialects (MariaDB) whose FTS rides on the base tables.
    fn create_fts_tables(&self) -> &'static [&'static str];

    fn drop_fts_tables(&self) -> &'static [&'static str];

    /// Statement that (re)populates the storages FTS index/column from the
    /// base `storages` table.
    fn populate_fts_storages(&self) -> &'static str;

    /// Statement that (re)populates the entries FTS index/column from the
    /// base `entries` table.
    fn populate_fts_entries(&self) -> &'static str;

    /// Build a match predicate for `column` against a raw search pattern
    /// (spec §4.2: tokenize, prefix-match each token, AND-join). Returns an
    /// empty string for an empty pattern.
    fn build_fts_match_predicate(&self, column: &str, pattern: &str) -> String;

    /// Statement deleting an FTS row by the id of its base row.
    fn delete_fts_by_key(&self, fts_table: &str, key_column: &str) -> String;
}

enum Conn {
    Sqlite(rusqlite::Connection),
    ClientServer(AnyConnection),
}

/// The open catalog connection plus (for client/server backends) the
/// blocking runtime that drives it.
pub struct Catalog {
    conn: Conn,
    runtime: Option<Runtime>,
    backend: Backend,
}

impl Catalog {
    /// Open a catalog, prompting for nothing — `uri` must already carry a
    /// password if the backend requires one (spec §6 handles the prompt at
    /// the CLI layer, not here).
    pub fn open(uri: &CatalogUri) -> Result<Self> {
        match uri {
            CatalogUri::Sqlite { path } => sqlite::open(path),
            CatalogUri::MariaDb { server, user, password } => {
                client_server::open_mariadb(server, user, password.as_deref())
            }
            CatalogUri::Postgres { server, user, password } => {
                client_server::open_postgres(server, user, password.as_deref())
            }
        }
    }

    /// Open a catalog read-only where the backend supports it (spec §4.3:
    /// the importer's source catalog is opened read-only). The embedded
    /// backend enforces this at the connection level; the client/server
    /// backends have no equivalent connection-scoped flag in this crate's
    /// abstraction, so they fall back to an ordinary connection — the
    /// importer never writes to `source`, so this is a naming gap, not a
    /// safety one.
    pub fn open_read_only(uri: &CatalogUri) -> Result<Self> {
        match uri {
            CatalogUri::Sqlite { path } => sqlite::open_read_only(path),
            CatalogUri::MariaDb { server, user, password } => {
                client_server::open_mariadb(server, user, password.as_deref())
            }
            CatalogUri::Postgres { server, user, password } => {
                client_server::open_postgres(server, user, password.as_deref())
            }
        }
    }

    pub(crate) fn from_sqlite(conn: rusqlite::Connection) -> Self {
        Self { conn: Conn::Sqlite(conn), runtime: None, backend: Backend::Sqlite }
    }

    pub(crate) fn from_client_server(backend: Backend, conn: AnyConnection, runtime: Runtime) -> Self {
        debug_assert!(matches!(backend, Backend::MariaDb | Backend::Postgres));
        Self { conn: Conn::ClientServer(conn), runtime: Some(runtime), backend }
    }

    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    #[must_use]
    pub fn dialect(&self) -> &'static dyn Dialect {
        match self.backend {
            Backend::Sqlite => &sqlite::SqliteDialect,
            Backend::MariaDb => &client_server::MariaDbDialect,
            Backend::Postgres => &client_server::PostgresDialect,
        }
    }

    /// Execute a single statement that doesn't return rows; returns the
    /// number of affected rows.
    pub fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        match &mut self.conn {
            Conn::Sqlite(conn) => sqlite::execute(conn, sql, params),
            Conn::ClientServer(conn) => {
                let rt = self.runtime.as_ref().expect("client/server catalog always carries a runtime");
                client_server::execute(rt, conn, sql, params)
            }
        }
    }

    /// Run a statement that returns rows.
    pub fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        match &mut self.conn {
            Conn::Sqlite(conn) => sqlite::query(conn, sql, params),
            Conn::ClientServer(conn) => {
                let rt = self.runtime.as_ref().expect("client/server catalog always carries a runtime");
                client_server::query(rt, conn, sql, params)
            }
        }
    }

    /// Run a batch of `;`-separated DDL statements outside any transaction
    /// control this type manages (spec §4.1: "applies the ordered DDL
    /// list").
    pub fn execute_batch(&mut self, sql: &str) -> Result<()> {
        match &mut self.conn {
            Conn::Sqlite(conn) => sqlite::execute_batch(conn, sql),
            Conn::ClientServer(conn) => {
                let rt = self.runtime.as_ref().expect("client/server catalog always carries a runtime");
                client_server::execute_batch(rt, conn, sql)
            }
        }
    }

    fn begin_statement(mode: TxnMode, backend: Backend) -> &'static str {
        match (backend, mode) {
            (Backend::Sqlite, TxnMode::Exclusive) => "BEGIN EXCLUSIVE",
            (Backend::Sqlite, TxnMode::Immediate) => "BEGIN IMMEDIATE",
            // MariaDB/PostgreSQL serialize writers within one connection
            // already; both modes map to a plain BEGIN (spec §5 requires
            // exclusivity of the database handle, not a stricter SQL mode).
            (Backend::MariaDb | Backend::Postgres, _) => "BEGIN",
        }
    }

    /// Run `f` inside one transaction, committing on `Ok` and rolling back
    /// on `Err` (spec §5: "failure of any sub-operation triggers an
    /// abort").
    pub fn transaction<F, R>(&mut self, mode: TxnMode, f: F) -> Result<R>
    where
        F: FnOnce(&mut Catalog) -> Result<R>,
    {
        let begin = Self::begin_statement(mode, self.backend);
        self.execute(begin, &[])?;
        match f(self) {
            Ok(value) => {
                self.execute("COMMIT", &[])?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.execute("ROLLBACK", &[]);
                Err(err)
            }
        }
    }
}
