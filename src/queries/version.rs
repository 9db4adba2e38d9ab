use crate::connection::{ChildesConnection, QueryScope};
use crate::error::ChildesDbError;
use crate::results::ResultSet;
use crate::sql_guard::ensure_read_only;
use crate::types::{QueryAndParams, RowValues};

/// The version string recorded in the database's `admin` table.
///
/// # Errors
/// Returns `ChildesDbError::ExecutionError` if the table holds no version, or
/// a connection or execution error.
pub async fn get_database_version(scope: &QueryScope<'_>) -> Result<String, ChildesDbError> {
    let conn = scope.resolve().await?;
    let result = database_version_on(&conn).await;
    conn.finish().await;
    result
}

async fn database_version_on(conn: &ChildesConnection) -> Result<String, ChildesDbError> {
    let admin = conn.get_table("admin").await?;
    admin
        .iter()
        .filter_map(|row| row.get("version"))
        .find(|v| !v.is_null())
        .map(RowValues::to_cell)
        .ok_or_else(|| {
            ChildesDbError::ExecutionError("admin table does not record a version".into())
        })
}

/// Run caller-supplied SQL, restricted to a single read-only statement.
///
/// # Errors
/// Returns `ChildesDbError::ParameterError` for anything other than one
/// read-only statement, or a connection or execution error.
pub async fn get_sql_query(sql: &str, scope: &QueryScope<'_>) -> Result<ResultSet, ChildesDbError> {
    let statement = ensure_read_only(sql)?;
    let conn = scope.resolve().await?;
    let result = conn
        .execute_select(&QueryAndParams::new_without_params(statement))
        .await;
    conn.finish().await;
    result
}
