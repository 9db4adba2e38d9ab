use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;

use crate::types::RowValues;

/// Bind middleware values onto a sqlx query, in placeholder order.
pub fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [RowValues],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            RowValues::Int(i) => query.bind(*i),
            RowValues::Float(f) => query.bind(*f),
            RowValues::Text(s) => query.bind(s.as_str()),
            RowValues::Bool(b) => query.bind(*b),
            RowValues::Timestamp(dt) => query.bind(*dt),
            RowValues::Null => query.bind(None::<String>),
            RowValues::JSON(value) => query.bind(value.to_string()),
            RowValues::Blob(bytes) => query.bind(bytes.as_slice()),
        };
    }
    query
}
