use std::ops::Deref;

use tracing::debug;

use crate::config::{ConnectOptions, SqliteOptions};
use crate::error::ChildesDbError;
use crate::manifest::{HttpManifest, ManifestSource};
use crate::query_builder::validate_identifier;
use crate::results::ResultSet;
use crate::types::{DatabaseType, QueryAndParams};

#[cfg(feature = "mysql")]
use crate::config::DbArgs;
#[cfg(feature = "mysql")]
use crate::manifest::translate_version;
#[cfg(feature = "mysql")]
use crate::mysql;
#[cfg(feature = "mysql")]
use sqlx::mysql::MySqlPool;

#[cfg(feature = "sqlite")]
use crate::sqlite::{self, SqliteConnection};

enum Backend {
    #[cfg(feature = "mysql")]
    MySql(MySqlPool),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteConnection),
}

/// An open connection to one CHILDES database.
///
/// Every result that comes back through this connection has its
/// missing-string markers replaced with NULL.
pub struct ChildesConnection {
    backend: Backend,
    database: String,
    missing_markers: Vec<String>,
}

impl std::fmt::Debug for ChildesConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildesConnection")
            .field("database_type", &self.database_type())
            .field("database", &self.database)
            .field("missing_markers", &self.missing_markers)
            .finish()
    }
}

impl ChildesConnection {
    /// Open a local `SQLite` mirror.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ConnectionError` if the file cannot be opened.
    #[cfg(feature = "sqlite")]
    pub async fn open_sqlite(opts: &SqliteOptions) -> Result<Self, ChildesDbError> {
        let conn = sqlite::open(opts).await?;
        Ok(Self {
            backend: Backend::Sqlite(conn),
            database: opts.db_path.clone(),
            missing_markers: opts.missing_markers.clone(),
        })
    }

    /// The backend this connection talks to.
    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self.backend {
            #[cfg(feature = "mysql")]
            Backend::MySql(_) => DatabaseType::MySql,
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(_) => DatabaseType::Sqlite,
        }
    }

    /// The database name (MySQL) or mirror path (`SQLite`).
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn missing_markers(&self) -> &[String] {
        &self.missing_markers
    }

    /// Run a SELECT and normalise missing-string markers to NULL.
    ///
    /// # Errors
    /// Returns the backend's error if the query fails.
    pub async fn execute_select(&self, qp: &QueryAndParams) -> Result<ResultSet, ChildesDbError> {
        debug!(sql = %qp.query, params = qp.params.len(), "executing select");
        let mut result_set = match &self.backend {
            #[cfg(feature = "mysql")]
            Backend::MySql(pool) => mysql::execute_select(pool, qp).await?,
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(conn) => conn.execute_select(qp).await?,
        };
        let replaced = result_set.normalize_missing(&self.missing_markers);
        debug!(rows = result_set.len(), replaced, "select finished");
        Ok(result_set)
    }

    /// `SELECT * FROM <name>`.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for a name that is not a plain
    /// identifier, or the backend's error if the query fails.
    pub async fn get_table(&self, name: &str) -> Result<ResultSet, ChildesDbError> {
        let table = validate_identifier(name)?;
        self.execute_select(&QueryAndParams::new_without_params(format!(
            "SELECT * FROM {table}"
        )))
        .await
    }

    /// Round-trip a trivial statement.
    ///
    /// # Errors
    /// Returns the backend's error if the database does not answer.
    pub async fn ping(&self) -> Result<(), ChildesDbError> {
        match &self.backend {
            #[cfg(feature = "mysql")]
            Backend::MySql(pool) => mysql::ping(pool).await,
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(conn) => {
                conn.with_connection(|guard| {
                    guard.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                    Ok(())
                })
                .await
            }
        }
    }

    /// Close the connection, releasing pooled server connections.
    pub async fn close(self) {
        match self.backend {
            #[cfg(feature = "mysql")]
            Backend::MySql(pool) => pool.close().await,
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(conn) => drop(conn),
        }
        debug!(database = %self.database, "connection closed");
    }
}

/// Connect to CHILDES, fetching the manifest from `opts.manifest_url`.
///
/// # Errors
/// Returns `ChildesDbError::UnresolvedVersion` if the requested version is not
/// hosted, or a manifest/connection error.
#[cfg(feature = "mysql")]
pub async fn connect_to_childes(opts: &ConnectOptions) -> Result<ChildesConnection, ChildesDbError> {
    let manifest = HttpManifest::new(&opts.manifest_url, opts.connect_timeout)?;
    connect_with_manifest(opts, &manifest).await
}

/// Connect to CHILDES, resolving the version against `source`.
///
/// The manifest is always consulted: it decides whether `opts.db_args` points at
/// the hosted server, where `db_version` rules, or at another server, where
/// `db_name` does.
///
/// # Errors
/// Returns `ChildesDbError::UnresolvedVersion` if the requested version is not
/// hosted, or a manifest/connection error.
#[cfg(feature = "mysql")]
pub async fn connect_with_manifest(
    opts: &ConnectOptions,
    source: &dyn ManifestSource,
) -> Result<ChildesConnection, ChildesDbError> {
    let (args, db_name) = resolve_target(opts, source).await?;
    let pool = mysql::connect_pool(&args, &db_name, opts).await?;
    Ok(ChildesConnection {
        backend: Backend::MySql(pool),
        database: db_name,
        missing_markers: opts.missing_markers.clone(),
    })
}

#[cfg(feature = "mysql")]
async fn resolve_target(
    opts: &ConnectOptions,
    source: &dyn ManifestSource,
) -> Result<(DbArgs, String), ChildesDbError> {
    let info = source.fetch().await?;
    let db_name = translate_version(&opts.db_version, opts.db_args.as_ref(), &info)
        .ok_or_else(|| ChildesDbError::UnresolvedVersion(opts.db_version.clone()))?;
    let args = opts.db_args.clone().unwrap_or_else(|| DbArgs::from(&info));
    Ok((args, db_name))
}

/// Whether a connection can be opened and answers a trivial query.
///
/// Never fails: every error becomes `false`.
#[cfg(feature = "mysql")]
pub async fn check_connection(opts: &ConnectOptions) -> bool {
    match HttpManifest::new(&opts.manifest_url, opts.connect_timeout) {
        Ok(manifest) => check_connection_with(opts, &manifest).await,
        Err(e) => {
            debug!(error = %e, "connection check failed");
            false
        }
    }
}

/// `check_connection` with an explicit manifest source.
#[cfg(feature = "mysql")]
pub async fn check_connection_with(opts: &ConnectOptions, source: &dyn ManifestSource) -> bool {
    match connect_with_manifest(opts, source).await {
        Ok(conn) => answers_ping(conn).await,
        Err(e) => {
            debug!(error = %e, "connection check failed");
            false
        }
    }
}

/// Whether a `SQLite` mirror can be opened and queried.
#[cfg(feature = "sqlite")]
pub async fn check_sqlite_connection(opts: &SqliteOptions) -> bool {
    match ChildesConnection::open_sqlite(opts).await {
        Ok(conn) => answers_ping(conn).await,
        Err(e) => {
            debug!(error = %e, "connection check failed");
            false
        }
    }
}

async fn answers_ping(conn: ChildesConnection) -> bool {
    let ok = match conn.ping().await {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "connection check failed");
            false
        }
    };
    conn.close().await;
    ok
}

/// Close every connection handed in.
pub async fn clear_connections<I>(connections: I)
where
    I: IntoIterator<Item = ChildesConnection>,
{
    for conn in connections {
        conn.close().await;
    }
}

/// A connection that is either the caller's or opened for one call.
#[derive(Debug)]
pub enum ResolvedConnection<'a> {
    Borrowed(&'a ChildesConnection),
    Owned(ChildesConnection),
}

impl Deref for ResolvedConnection<'_> {
    type Target = ChildesConnection;

    fn deref(&self) -> &ChildesConnection {
        match self {
            ResolvedConnection::Borrowed(conn) => conn,
            ResolvedConnection::Owned(conn) => conn,
        }
    }
}

impl ResolvedConnection<'_> {
    /// Close the connection if it was opened for this call.
    pub async fn finish(self) {
        if let ResolvedConnection::Owned(conn) = self {
            conn.close().await;
        }
    }
}

/// Use `connection` if given, otherwise connect with `opts`.
///
/// # Errors
/// Returns the connection error when a new connection has to be opened and fails.
pub async fn resolve_connection<'a>(
    connection: Option<&'a ChildesConnection>,
    opts: &ConnectOptions,
) -> Result<ResolvedConnection<'a>, ChildesDbError> {
    if let Some(conn) = connection {
        return Ok(ResolvedConnection::Borrowed(conn));
    }
    #[cfg(feature = "mysql")]
    {
        connect_to_childes(opts).await.map(ResolvedConnection::Owned)
    }
    #[cfg(not(feature = "mysql"))]
    {
        let _ = opts;
        Err(ChildesDbError::Unimplemented(
            "opening a connection on demand needs the `mysql` feature; pass a connection".into(),
        ))
    }
}

/// Where a query function gets its connection from.
///
/// With a borrowed connection every call reuses it. Without one, each call
/// connects with `options` and closes the connection before returning.
#[derive(Debug, Clone, Default)]
pub struct QueryScope<'a> {
    pub connection: Option<&'a ChildesConnection>,
    pub options: ConnectOptions,
}

impl<'a> QueryScope<'a> {
    #[must_use]
    pub fn with_connection(connection: &'a ChildesConnection) -> Self {
        Self {
            connection: Some(connection),
            options: ConnectOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(options: ConnectOptions) -> Self {
        Self {
            connection: None,
            options,
        }
    }

    /// # Errors
    /// Returns the connection error when a new connection has to be opened and fails.
    pub async fn resolve(&self) -> Result<ResolvedConnection<'a>, ChildesDbError> {
        resolve_connection(self.connection, &self.options).await
    }
}
