//! Parquet output through an in-memory `DuckDB` table.

use std::path::Path;

use duckdb::Connection;
use road_risk_features_models::{Column, ColumnType, SegmentYearRecord};

use crate::PipelineError;

const TABLE: &str = "segment_year_features";

const fn sql_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Text => "VARCHAR",
        ColumnType::Int32 | ColumnType::Flag => "INTEGER",
        ColumnType::Int64 => "BIGINT",
        ColumnType::Float64 => "DOUBLE",
    }
}

fn create_table_sql() -> String {
    let columns: Vec<String> = Column::all()
        .into_iter()
        .map(|c| {
            let nullable = if c.column_type() == ColumnType::Text && c != Column::SegmentId {
                ""
            } else {
                " NOT NULL"
            };
            format!("{c} {}{nullable}", sql_type(c.column_type()))
        })
        .collect();
    format!("CREATE TABLE {TABLE} ({})", columns.join(", "))
}

/// Writes `records` to a Parquet file at `path`, creating parent
/// directories. Columns follow [`Column`] order; rows are sorted by
/// segment identifier (integer identifiers numerically), then year.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`PipelineError`] if the directory cannot be created or any
/// `DuckDB` operation fails.
pub fn write_parquet(records: &[SegmentYearRecord], path: &Path) -> Result<u64, PipelineError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open_in_memory()?;
    conn.execute_batch(&create_table_sql())?;

    let placeholders = vec!["?"; Column::all().len()].join(", ");
    let mut stmt = conn.prepare(&format!("INSERT INTO {TABLE} VALUES ({placeholders})"))?;

    let mut ordered: Vec<&SegmentYearRecord> = records.iter().collect();
    ordered.sort_by(|a, b| (&a.segment_id, a.year).cmp(&(&b.segment_id, b.year)));

    for r in ordered {
        stmt.execute(duckdb::params![
            r.segment_id.as_str(),
            r.year,
            r.collisions_total,
            r.fatal_major,
            r.injuries_total,
            r.length_m,
            r.subtype_text.as_deref(),
            r.subclass.as_deref(),
            r.ownership.as_deref(),
            r.flow.as_deref(),
            r.grade_separated.as_deref(),
            i32::from(r.construction_flag),
            r.collisions_prev_year,
            r.fatal_prev_year,
            r.injuries_prev_year,
            i32::from(r.high_risk),
        ])?;
    }
    drop(stmt);

    let target = path.to_string_lossy().replace('\'', "''");
    conn.execute_batch(&format!(
        "COPY (SELECT * FROM {TABLE} ORDER BY rowid) TO '{target}' (FORMAT PARQUET)"
    ))?;

    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(records.len() as u64)
}
