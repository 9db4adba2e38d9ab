//! Async access to the CHILDES child-language corpus database.
//!
//! Connections go either to the hosted MySQL server, with the database
//! version resolved through a JSON manifest, or to a local `SQLite` mirror of
//! the same schema. Query functions return a [`ResultSet`] in which the
//! database's missing-value markers have already been turned into NULL.
//!
//! ```rust,no_run
//! use childes_db::prelude::*;
//!
//! # async fn demo() -> Result<(), ChildesDbError> {
//! let conn = ChildesConnection::open_sqlite(&SqliteOptions::new("childes.sqlite3")).await?;
//! let scope = QueryScope::with_connection(&conn);
//! let filter = ParticipantFilter::default().corpus("Brown").role("Target_Child").age([24, 36]);
//! let children = get_participants(&filter, &scope).await?;
//! println!("{} participants", children.len());
//! conn.close().await;
//! # Ok(()) }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod filter;
pub mod manifest;
pub mod prelude;
pub mod queries;
pub mod query_builder;
pub mod results;
pub mod sql_guard;
pub mod types;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use error::ChildesDbError;
pub use results::{CustomDbRow, ResultSet};
pub use types::{DatabaseType, QueryAndParams, RowValues};
