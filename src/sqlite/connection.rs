use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::params::Params;
use super::query::build_result_set;
use crate::error::ChildesDbError;
use crate::results::ResultSet;
use crate::types::QueryAndParams;

pub(crate) type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// A `SQLite` mirror handle; rusqlite calls run on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteConnection {
    conn: SharedSqliteConnection,
}

impl SqliteConnection {
    pub(crate) fn new(conn: rusqlite::Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `func` against the underlying connection on the blocking pool.
    ///
    /// # Errors
    /// Returns whatever `func` returns, or `ChildesDbError::ExecutionError` if the task panics.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, ChildesDbError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, ChildesDbError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(Arc::clone(&self.conn), func).await
    }

    /// Execute a SELECT and materialize into a `ResultSet`.
    ///
    /// # Errors
    /// Returns `ChildesDbError` if preparing or executing the query fails.
    pub async fn execute_select(&self, qp: &QueryAndParams) -> Result<ResultSet, ChildesDbError> {
        let sql_owned = qp.query.clone();
        let params = Params::convert(&qp.params);
        self.with_connection(move |guard| {
            let mut stmt = guard.prepare(&sql_owned)?;
            build_result_set(&mut stmt, params.as_values())
        })
        .await
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("conn", &"<rusqlite::Connection>")
            .finish()
    }
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, ChildesDbError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, ChildesDbError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| ChildesDbError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}
