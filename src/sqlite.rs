// SQLite module - local mirrors of the CHILDES tables
//
// - config: opening a mirror file
// - connection: the shared handle and blocking-pool execution
// - params: `RowValues` to rusqlite values
// - query: cell extraction and result-set building

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::open;
pub use connection::SqliteConnection;
pub use query::build_result_set;
