use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::debug;

use crate::config::{ConnectOptions, DbArgs};
use crate::error::ChildesDbError;

/// Connect options for one database on the server described by `args`.
#[must_use]
pub fn connect_options(args: &DbArgs, db_name: &str) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&args.host)
        .port(args.port)
        .username(&args.user)
        .password(&args.password)
        .database(db_name)
        .charset("utf8mb4")
}

/// Open a pool against `db_name` and make sure one connection can be acquired.
///
/// # Errors
/// Returns `ChildesDbError::ConnectionError` if the server cannot be reached or
/// rejects the credentials.
pub async fn connect_pool(
    args: &DbArgs,
    db_name: &str,
    opts: &ConnectOptions,
) -> Result<MySqlPool, ChildesDbError> {
    debug!(host = %args.host, port = args.port, db_name, "opening MySQL pool");
    MySqlPoolOptions::new()
        .max_connections(opts.max_connections)
        .acquire_timeout(opts.connect_timeout)
        .connect_with(connect_options(args, db_name))
        .await
        .map_err(|e| {
            ChildesDbError::ConnectionError(format!(
                "Failed to connect to {}:{}/{db_name}: {e}",
                args.host, args.port
            ))
        })
}
