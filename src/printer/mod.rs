//! Info Printer (spec §4.9): canonical textual summaries plus the
//! column-width/row-print passes used by the pass-through SQL mode.
//!
//! No printer exists in the teacher repo; grounded on `cli/src/cli/mod.rs`'s
//! small formatting helpers (`OutputFormat`, `csv_escape`) for the
//! "hand-rolled helpers, no external table crate" idiom.

use crate::backend::{Catalog, Row, Value};
use crate::error::Result;
use chrono::{Local, TimeZone};
use std::fmt::Write as _;

const BINARY_UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

/// Format a byte count with binary prefixes (spec §4.9: "KiB, MiB, GiB,
/// TiB, PiB"). Values under 1024 print as a plain byte count.
#[must_use]
pub fn format_bytes(bytes: i64) -> String {
    let mut value = bytes.unsigned_abs() as f64;
    if value < 1024.0 {
        return format!("{bytes} B");
    }
    let mut unit = "B";
    for candidate in BINARY_UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = candidate;
    }
    let sign = if bytes < 0 { "-" } else { "" };
    format!("{sign}{value:.2} {unit}")
}

/// Format a Unix timestamp in local time (spec §4.9).
#[must_use]
pub fn format_local_time(unix_seconds: i64) -> String {
    match Local.timestamp_opt(unix_seconds, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
        _ => format!("<invalid timestamp {unix_seconds}>"),
    }
}

/// Catalog-wide summary: row counts per table (spec §4.9 "overall index
/// info").
pub fn print_catalog_summary(cat: &mut Catalog, out: &mut dyn std::io::Write) -> Result<()> {
    writeln!(out, "Catalog summary ({})", cat.dialect().name())?;
    for (label, sql) in [
        ("uuids", "SELECT COUNT(*) FROM uuids"),
        ("entities", "SELECT COUNT(*) FROM entities WHERE deletedFlag = 0"),
        ("storages", "SELECT COUNT(*) FROM storages WHERE deletedFlag = 0"),
        ("entries", "SELECT COUNT(*) FROM entries WHERE deletedFlag = 0"),
        ("newest entries", "SELECT COUNT(*) FROM entryNewest"),
    ] {
        let rows = cat.query(sql, &[])?;
        let count = rows.first().and_then(|r| r.get(0).as_i64()).unwrap_or(0);
        writeln!(out, "  {label:<16}{count}")?;
    }
    Ok(())
}

/// Per-UUID detail: the job uuid and how many live entities reference it
/// (spec §4.9 "UUIDs").
pub fn print_jobs(cat: &mut Catalog, job_ids: &[String], out: &mut dyn std::io::Write) -> Result<()> {
    let rows = if job_ids.is_empty() {
        cat.query(
            "SELECT uuids.id, uuids.jobUuid, \
                (SELECT COUNT(*) FROM entities e WHERE e.uuidId = uuids.id AND e.deletedFlag = 0) \
             FROM uuids",
            &[],
        )?
    } else {
        let placeholders = vec!["?"; job_ids.len()].join(",");
        let sql = format!(
            "SELECT uuids.id, uuids.jobUuid, \
                (SELECT COUNT(*) FROM entities e WHERE e.uuidId = uuids.id AND e.deletedFlag = 0) \
             FROM uuids WHERE uuids.jobUuid IN ({placeholders}) OR CAST(uuids.id AS TEXT) IN ({placeholders})"
        );
        let mut params: Vec<Value> = job_ids.iter().map(|id| Value::Text(id.clone())).collect();
        params.extend(job_ids.iter().map(|id| Value::Text(id.clone())));
        cat.query(&sql, &params)?
    };
    for row in &rows {
        writeln!(
            out,
            "job {} (id={}): {} live entit{}",
            row.get(1).as_str().unwrap_or("?"),
            row.get(0).as_i64().unwrap_or(0),
            row.get(2).as_i64().unwrap_or(0),
            if row.get(2).as_i64() == Some(1) { "y" } else { "ies" },
        )?;
    }
    Ok(())
}

/// Per-entity detail: aggregate counters (spec §4.9 "entities").
pub fn print_entities(cat: &mut Catalog, entity_ids: &[i64], out: &mut dyn std::io::Write) -> Result<()> {
    let rows = if entity_ids.is_empty() {
        cat.query(
            "SELECT id, jobUuid, type, created, totalEntryCount, totalEntrySize, deletedFlag \
             FROM entities ORDER BY id",
            &[],
        )?
    } else {
        let placeholders = vec!["?"; entity_ids.len()].join(",");
        let sql = format!(
            "SELECT id, jobUuid, type, created, totalEntryCount, totalEntrySize, deletedFlag \
             FROM entities WHERE id IN ({placeholders}) ORDER BY id"
        );
        let params: Vec<Value> = entity_ids.iter().map(|id| Value::Integer(*id)).collect();
        cat.query(&sql, &params)?
    };
    for row in &rows {
        writeln!(
            out,
            "entity {} job={} type={} created={} entries={} size={}{}",
            row.get(0).as_i64().unwrap_or(0),
            row.get(1).as_str().unwrap_or("?"),
            row.get(2).as_i64().unwrap_or(0),
            format_local_time(row.get(3).as_i64().unwrap_or(0)),
            row.get(4).as_i64().unwrap_or(0),
            format_bytes(row.get(5).as_i64().unwrap_or(0)),
            if row.get(6).as_i64() == Some(1) { " (deleted)" } else { "" },
        )?;
    }
    Ok(())
}

/// Per-storage detail (spec §4.9 "storages").
pub fn print_storages(cat: &mut Catalog, storage_ids: &[i64], out: &mut dyn std::io::Write) -> Result<()> {
    let rows = if storage_ids.is_empty() {
        cat.query(
            "SELECT id, entityId, name, state, created, totalEntryCount, totalEntrySize, deletedFlag \
             FROM storages ORDER BY id",
            &[],
        )?
    } else {
        let placeholders = vec!["?"; storage_ids.len()].join(",");
        let sql = format!(
            "SELECT id, entityId, name, state, created, totalEntryCount, totalEntrySize, deletedFlag \
             FROM storages WHERE id IN ({placeholders}) ORDER BY id"
        );
        let params: Vec<Value> = storage_ids.iter().map(|id| Value::Integer(*id)).collect();
        cat.query(&sql, &params)?
    };
    for row in &rows {
        writeln!(
            out,
            "storage {} entity={} name={} state={} created={} entries={} size={}{}",
            row.get(0).as_i64().unwrap_or(0),
            row.get(1).as_i64().unwrap_or(0),
            row.get(2).as_str().unwrap_or(""),
            row.get(3).as_i64().unwrap_or(0),
            format_local_time(row.get(4).as_i64().unwrap_or(0)),
            row.get(5).as_i64().unwrap_or(0),
            format_bytes(row.get(6).as_i64().unwrap_or(0)),
            if row.get(7).as_i64() == Some(1) { " (deleted)" } else { "" },
        )?;
    }
    Ok(())
}

/// Storages with `deletedFlag = 0` that still own no live entries (spec
/// §6 `--info-lost-storages`).
pub fn print_lost_storages(cat: &mut Catalog, out: &mut dyn std::io::Write) -> Result<()> {
    let rows = cat.query(
        "SELECT id, name FROM storages s WHERE s.deletedFlag = 0 \
         AND NOT EXISTS (SELECT 1 FROM entryFragments f WHERE f.storageId = s.id) \
         AND NOT EXISTS (SELECT 1 FROM directoryEntries d WHERE d.storageId = s.id) \
         AND NOT EXISTS (SELECT 1 FROM linkEntries l WHERE l.storageId = s.id) \
         AND NOT EXISTS (SELECT 1 FROM specialEntries sp WHERE sp.storageId = s.id)",
        &[],
    )?;
    for row in &rows {
        writeln!(out, "lost storage {} name={}", row.get(0).as_i64().unwrap_or(0), row.get(1).as_str().unwrap_or(""))?;
    }
    Ok(())
}

/// Per-entry detail, optionally filtered by type (spec §4.9 "entries").
pub fn print_entries(
    cat: &mut Catalog,
    entry_ids: &[String],
    entry_type: Option<i64>,
    out: &mut dyn std::io::Write,
) -> Result<()> {
    let mut sql = "SELECT id, entityId, type, name, timeLastChanged, size, deletedFlag FROM entries".to_string();
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if !entry_ids.is_empty() {
        let placeholders = vec!["?"; entry_ids.len()].join(",");
        clauses.push(format!("(CAST(id AS TEXT) IN ({placeholders}) OR name IN ({placeholders}))"));
        for id in entry_ids {
            params.push(Value::Text(id.clone()));
        }
        for id in entry_ids {
            params.push(Value::Text(id.clone()));
        }
    }
    if let Some(t) = entry_type {
        clauses.push("type = ?".to_string());
        params.push(Value::Integer(t));
    }
    if !clauses.is_empty() {
        let _ = write!(sql, " WHERE {}", clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY id");

    let rows = cat.query(&sql, &params)?;
    for row in &rows {
        writeln!(
            out,
            "entry {} entity={} type={} name={} changed={} size={}{}",
            row.get(0).as_i64().unwrap_or(0),
            row.get(1).as_i64().unwrap_or(0),
            row.get(2).as_i64().unwrap_or(0),
            row.get(3).as_str().unwrap_or(""),
            format_local_time(row.get(4).as_i64().unwrap_or(0)),
            format_bytes(row.get(5).as_i64().unwrap_or(0)),
            if row.get(6).as_i64() == Some(1) { " (deleted)" } else { "" },
        )?;
    }
    Ok(())
}

/// Entries whose owning storage is gone (spec §6 `--info-lost-entries`).
pub fn print_lost_entries(cat: &mut Catalog, out: &mut dyn std::io::Write) -> Result<()> {
    let rows = cat.query(
        "SELECT e.id, e.name FROM entries e \
         WHERE e.deletedFlag = 0 AND e.type IN (1, 2, 5) \
         AND NOT EXISTS (SELECT 1 FROM entryFragments f WHERE f.entryId = e.id)",
        &[],
    )?;
    for row in &rows {
        writeln!(out, "lost entry {} name={}", row.get(0).as_i64().unwrap_or(0), row.get(1).as_str().unwrap_or(""))?;
    }
    Ok(())
}

/// Compute the printable column widths for a result set (spec §4.9: "a
/// separate column-width computation pass and a row-print pass").
#[must_use]
pub fn column_widths(columns: &[String], rows: &[Row]) -> Vec<usize> {
    let mut widths: Vec<usize> = columns.iter().map(String::len).collect();
    for row in rows {
        for (i, width) in widths.iter_mut().enumerate() {
            let cell = value_to_cell(row.get(i));
            *width = (*width).max(cell.len());
        }
    }
    widths
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(s) => s.clone(),
    }
}

/// Print a header line and every row, padded to `widths` (pass-through SQL
/// mode, spec §6).
pub fn print_rows(
    columns: &[String],
    rows: &[Row],
    widths: &[usize],
    out: &mut dyn std::io::Write,
) -> Result<()> {
    let header: Vec<String> =
        columns.iter().zip(widths).map(|(c, w)| format!("{c:<w$}")).collect();
    writeln!(out, "{}", header.join("  "))?;
    for row in rows {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| format!("{:<w$}", value_to_cell(row.get(i)), w = w))
            .collect();
        writeln!(out, "{}", cells.join("  "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_picks_binary_prefix() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
    }

    #[test]
    fn column_widths_grow_to_fit_longest_cell() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![Row(vec![Value::Integer(1), Value::Text("archive-2024.bar".to_string())])];
        let widths = column_widths(&columns, &rows);
        assert_eq!(widths, vec![2, "archive-2024.bar".len()]);
    }

    #[test]
    fn print_rows_pads_to_computed_widths() {
        let columns = vec!["id".to_string()];
        let rows = vec![Row(vec![Value::Integer(42)])];
        let widths = column_widths(&columns, &rows);
        let mut out = Vec::new();
        print_rows(&columns, &rows, &widths, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("42"));
    }
}
