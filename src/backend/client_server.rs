//! Client/server catalog backends (MariaDB, PostgreSQL) over `sqlx`'s
//! backend-erased `Any` driver, blocked to a synchronous call surface on a
//! small current-thread runtime (spec §0.1/§5).
//!
//! Grounded on the teacher's `storage/sqlite.rs` connection-setup shape
//! (open, set pragma-equivalents, return a ready handle); the sync-over-async
//! wrapper itself has no teacher precedent and is noted as such in
//! `DESIGN.md`.

use super::{Backend, Catalog, Dialect, Row, Value};
use crate::error::{Error, Result};
use sqlx::any::{AnyConnectOptions, AnyConnection, AnyRow};
use sqlx::{Column, ConnectOptions, Connection, Row as _};
use std::str::FromStr;
use tokio::runtime::Runtime;

fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::BackendUnavailable(e.to_string()))
}

fn connect_url(scheme: &str, server: &str, user: &str, password: Option<&str>) -> String {
    match password {
        Some(pw) => format!("{scheme}://{user}:{pw}@{server}/"),
        None => format!("{scheme}://{user}@{server}/"),
    }
}

pub(super) fn open_mariadb(server: &str, user: &str, password: Option<&str>) -> Result<Catalog> {
    open(Backend::MariaDb, "mysql", server, user, password)
}

pub(super) fn open_postgres(server: &str, user: &str, password: Option<&str>) -> Result<Catalog> {
    open(Backend::Postgres, "postgres", server, user, password)
}

fn open(backend: Backend, scheme: &str, server: &str, user: &str, password: Option<&str>) -> Result<Catalog> {
    sqlx::any::install_default_drivers();
    let runtime = build_runtime()?;
    let url = connect_url(scheme, server, user, password);
    let conn = runtime
        .block_on(async {
            let opts = AnyConnectOptions::from_str(&url)?.disable_statement_logging();
            AnyConnection::connect_with(&opts).await
        })
        .map_err(map_connect_error)?;
    Ok(Catalog::from_client_server(backend, conn, runtime))
}

fn map_connect_error(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.message().to_lowercase().contains("access denied") => {
            Error::AuthorizationRequired { server: db.message().to_string() }
        }
        _ => Error::BackendUnavailable(err.to_string()),
    }
}

fn bind_params<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>>,
    params: &'q [Value],
) -> sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(v) => query.bind(*v),
            Value::Real(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

fn row_to_generic(row: &AnyRow) -> Row {
    let mut values = Vec::with_capacity(row.columns().len());
    for idx in 0..row.columns().len() {
        if let Ok(v) = row.try_get::<i64, _>(idx) {
            values.push(Value::Integer(v));
        } else if let Ok(v) = row.try_get::<f64, _>(idx) {
            values.push(Value::Real(v));
        } else if let Ok(v) = row.try_get::<String, _>(idx) {
            values.push(Value::Text(v));
        } else {
            values.push(Value::Null);
        }
    }
    Row(values)
}

pub(super) fn execute(rt: &Runtime, conn: &mut AnyConnection, sql: &str, params: &[Value]) -> Result<u64> {
    rt.block_on(async {
        let query = bind_params(sqlx::query(sql), params);
        let result = query.execute(conn).await.map_err(|e| Error::Query(e.to_string()))?;
        Ok(result.rows_affected())
    })
}

pub(super) fn query(rt: &Runtime, conn: &mut AnyConnection, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    rt.block_on(async {
        let query = bind_params(sqlx::query(sql), params);
        let rows = query.fetch_all(conn).await.map_err(|e| Error::Query(e.to_string()))?;
        Ok(rows.iter().map(row_to_generic).collect())
    })
}

pub(super) fn execute_batch(rt: &Runtime, conn: &mut AnyConnection, sql: &str) -> Result<()> {
    rt.block_on(async {
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&mut *conn)
                .await
                .map_err(|e| Error::Schema(e.to_string()))?;
        }
        Ok(())
    })
}

/// MariaDB dialect: `MATCH … AGAINST` directly on the base tables, no
/// auxiliary FTS tables (spec §4.2).
pub struct MariaDbDialect;

impl Dialect for MariaDbDialect {
    fn name(&self) -> &'static str {
        "mariadb"
    }

    fn can_ddl_in_transaction(&self) -> bool {
        false
    }

    fn supports_analyze_command(&self) -> bool {
        true
    }

    fn create_fts_tables(&self) -> &'static [&'static str] {
        &[]
    }

    fn drop_fts_tables(&self) -> &'static [&'static str] {
        &[]
    }

    fn populate_fts_storages(&self) -> &'static str {
        ""
    }

    fn populate_fts_entries(&self) -> &'static str {
        ""
    }

    fn build_fts_match_predicate(&self, column: &str, pattern: &str) -> String {
        let tokens = crate::text::tokenize(pattern);
        if tokens.is_empty() {
            return String::new();
        }
        let table = if column == "storageId" { "storages" } else { "entries" };
        let boolean = tokens.iter().map(|t| format!("+{t}*")).collect::<Vec<_>>().join(" ");
        format!("{table}.name IN (SELECT name FROM {table} WHERE MATCH(name) AGAINST ('{boolean}' IN BOOLEAN MODE))")
    }

    fn delete_fts_by_key(&self, _fts_table: &str, _key_column: &str) -> String {
        String::new()
    }
}

/// PostgreSQL dialect: a precomputed `tsvector` column plus `to_tsquery`
/// (spec §4.2).
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn can_ddl_in_transaction(&self) -> bool {
        false
    }

    fn supports_analyze_command(&self) -> bool {
        true
    }

    fn create_fts_tables(&self) -> &'static [&'static str] {
        &[
            "ALTER TABLE storages ADD COLUMN IF NOT EXISTS nameTsv tsvector",
            "ALTER TABLE entries ADD COLUMN IF NOT EXISTS nameTsv tsvector",
        ]
    }

    fn drop_fts_tables(&self) -> &'static [&'static str] {
        &[
            "ALTER TABLE storages DROP COLUMN IF EXISTS nameTsv",
            "ALTER TABLE entries DROP COLUMN IF EXISTS nameTsv",
        ]
    }

    fn populate_fts_storages(&self) -> &'static str {
        "UPDATE storages SET nameTsv = to_tsvector('simple', name)"
    }

    fn populate_fts_entries(&self) -> &'static str {
        "UPDATE entries SET nameTsv = to_tsvector('simple', name)"
    }

    fn build_fts_match_predicate(&self, column: &str, pattern: &str) -> String {
        let tokens = crate::text::tokenize(pattern);
        if tokens.is_empty() {
            return String::new();
        }
        let table = if column == "storageId" { "storages" } else { "entries" };
        let tsquery = tokens.iter().map(|t| format!("{t}:*")).collect::<Vec<_>>().join(" & ");
        format!("{table}.nameTsv @@ to_tsquery('simple', '{tsquery}')")
    }

    fn delete_fts_by_key(&self, _fts_table: &str, _key_column: &str) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mariadb_predicate_is_empty_for_blank_pattern() {
        assert_eq!(MariaDbDialect.build_fts_match_predicate("entryId", ""), "");
    }

    #[test]
    fn postgres_predicate_joins_tokens_with_ampersand() {
        let predicate = PostgresDialect.build_fts_match_predicate("entryId", "foo bar");
        assert!(predicate.contains("foo:* & bar:*"));
    }

    #[test]
    fn connect_url_omits_colon_with_no_password() {
        assert_eq!(connect_url("mysql", "db.example.com", "backup", None), "mysql://backup@db.example.com/");
    }
}
