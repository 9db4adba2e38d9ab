use rusqlite::OpenFlags;
use tracing::debug;

use super::connection::SqliteConnection;
use crate::config::SqliteOptions;
use crate::error::ChildesDbError;

/// Open an existing mirror file, read-only.
///
/// The file is never created: a path that does not exist is a connection
/// error rather than an empty database that silently returns no rows.
///
/// # Errors
/// Returns `ChildesDbError::ConnectionError` if the file cannot be opened.
pub async fn open(opts: &SqliteOptions) -> Result<SqliteConnection, ChildesDbError> {
    let db_path = opts.db_path.clone();
    debug!(db_path = %db_path, "opening SQLite mirror");
    let conn = tokio::task::spawn_blocking(move || {
        rusqlite::Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            ChildesDbError::ConnectionError(format!("Failed to open SQLite mirror {db_path}: {e}"))
        })
    })
    .await
    .map_err(|e| {
        ChildesDbError::ConnectionError(format!("sqlite spawn_blocking join error: {e}"))
    })??;
    Ok(SqliteConnection::new(conn))
}
