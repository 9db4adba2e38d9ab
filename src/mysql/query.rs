use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::{Column, Row, TypeInfo};

use super::params::bind_params;
use crate::error::ChildesDbError;
use crate::results::ResultSet;
use crate::types::{QueryAndParams, RowValues};

/// Extract a `RowValues` from a MySQL row, dispatching on the column's declared type.
///
/// # Errors
/// Returns `ChildesDbError::MySqlError` if the cell cannot be decoded.
#[allow(clippy::cast_precision_loss)]
pub fn extract_value(row: &MySqlRow, idx: usize) -> Result<RowValues, ChildesDbError> {
    let type_name = row.column(idx).type_info().name().to_ascii_uppercase();
    let value = match type_name.as_str() {
        "BOOLEAN" => row.try_get::<Option<bool>, _>(idx)?.map(RowValues::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<Option<i64>, _>(idx)?.map(RowValues::Int)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row.try_get::<Option<u64>, _>(idx)?.map(|u| {
            i64::try_from(u).map_or(RowValues::Float(u as f64), RowValues::Int)
        }),
        "FLOAT" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(|f| RowValues::Float(f64::from(f))),
        "DOUBLE" => row.try_get::<Option<f64>, _>(idx)?.map(RowValues::Float),
        // DECIMAL arrives as text on both protocols
        "DECIMAL" => row
            .try_get_unchecked::<Option<String>, _>(idx)?
            .map(|s| s.parse::<f64>().map_or(RowValues::Text(s), RowValues::Float)),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(idx)?
            .map(RowValues::Timestamp),
        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(idx)?
            .map(|d| RowValues::Text(d.format("%Y-%m-%d").to_string())),
        "TIME" => row
            .try_get::<Option<chrono::NaiveTime>, _>(idx)?
            .map(|t| RowValues::Text(t.format("%H:%M:%S").to_string())),
        "JSON" => row
            .try_get_unchecked::<Option<String>, _>(idx)?
            .map(|s| serde_json::from_str(&s).map_or(RowValues::Text(s), RowValues::JSON)),
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            row.try_get::<Option<String>, _>(idx)?.map(RowValues::Text)
        }
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(idx)?
            .map(RowValues::Blob),
        _ => fallback_value(row, idx),
    };
    Ok(value.unwrap_or(RowValues::Null))
}

// Types without a dedicated arm (YEAR, BIT, ...): take the first decoding that works.
fn fallback_value(row: &MySqlRow, idx: usize) -> Option<RowValues> {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(RowValues::Int);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(RowValues::Float);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(RowValues::Text);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v.map(RowValues::Blob);
    }
    None
}

/// Build a result set from fetched MySQL rows.
///
/// Column names come from the first row, so an empty fetch yields a result
/// set with no columns.
///
/// # Errors
/// Returns `ChildesDbError` if any cell fails to decode.
pub fn build_result_set(rows: &[MySqlRow]) -> Result<ResultSet, ChildesDbError> {
    let column_names: Vec<String> = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let col_count = column_names.len();
    let mut result_set = ResultSet::with_capacity(column_names, rows.len());

    for row in rows {
        let mut row_values = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            row_values.push(extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values)?;
    }
    Ok(result_set)
}

/// Run a SELECT on the pool and materialize every row.
///
/// # Errors
/// Returns `ChildesDbError::MySqlError` if the query fails.
pub async fn execute_select(
    pool: &MySqlPool,
    qp: &QueryAndParams,
) -> Result<ResultSet, ChildesDbError> {
    let rows = bind_params(sqlx::query(&qp.query), &qp.params)
        .fetch_all(pool)
        .await?;
    build_result_set(&rows)
}

/// Round-trip a trivial statement to prove the connection works.
///
/// # Errors
/// Returns `ChildesDbError::MySqlError` if the server does not answer.
pub async fn ping(pool: &MySqlPool) -> Result<(), ChildesDbError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
