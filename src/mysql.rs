// MySQL module - talks to the hosted CHILDES server (or a local install of a dump)
//
// - config: connect options and pool setup
// - params: binding `RowValues` onto sqlx queries
// - query: cell extraction and result-set building

pub mod config;
pub mod params;
pub mod query;

pub use config::connect_pool;
pub use query::{build_result_set, execute_select, ping};
