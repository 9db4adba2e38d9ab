use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ChildesDbError;
use crate::filter::{AgeFilter, FilterValue};
use crate::types::{QueryAndParams, RowValues};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Reject anything that is not a bare SQL identifier.
///
/// Table and column names are interpolated into SQL text, so they are checked
/// here; values always go through bound parameters.
///
/// # Errors
/// Returns `ChildesDbError::ParameterError` if `name` is not a plain identifier.
pub fn validate_identifier(name: &str) -> Result<&str, ChildesDbError> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(ChildesDbError::ParameterError(format!(
            "'{name}' is not a valid table or column name"
        )))
    }
}

/// Builds a single `SELECT * FROM <table> WHERE ...` statement.
///
/// Placeholders are bare `?`, which MySQL and `SQLite` both accept. Each filter
/// method is a no-op when handed `None`, so an unfiltered call produces exactly
/// `SELECT * FROM <table>`:
/// ```rust
/// use childes_db::prelude::*;
///
/// # fn demo() -> Result<(), ChildesDbError> {
/// let corpus = FilterValue::from(["Brown", "Sachs"]);
/// let qp = SelectBuilder::new("transcript")?
///     .is_in("corpus_name", Some(&corpus))?
///     .is_in("target_child_name", None)?
///     .build();
/// assert_eq!(qp.query, "SELECT * FROM transcript WHERE corpus_name IN (?, ?)");
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    clauses: Vec<String>,
    params: Vec<RowValues>,
    order_by: Vec<String>,
}

impl SelectBuilder {
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` if `table` is not a plain identifier.
    pub fn new(table: &str) -> Result<Self, ChildesDbError> {
        Ok(Self {
            table: validate_identifier(table)?.to_string(),
            clauses: Vec::new(),
            params: Vec::new(),
            order_by: Vec::new(),
        })
    }

    /// `column IN (...)`.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for an invalid column or an empty list.
    pub fn is_in(
        &mut self,
        column: &str,
        filter: Option<&FilterValue>,
    ) -> Result<&mut Self, ChildesDbError> {
        let Some(filter) = filter else {
            return Ok(self);
        };
        let column = validate_identifier(column)?;
        let values = non_empty(column, filter)?;
        self.clauses
            .push(format!("{column} IN ({})", placeholders(values.len())));
        self.params.extend(values);
        Ok(self)
    }

    /// `column NOT IN (...)`, keeping rows where `column` is NULL.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for an invalid column or an empty list.
    pub fn not_in(
        &mut self,
        column: &str,
        filter: Option<&FilterValue>,
    ) -> Result<&mut Self, ChildesDbError> {
        let Some(filter) = filter else {
            return Ok(self);
        };
        let column = validate_identifier(column)?;
        let values = non_empty(column, filter)?;
        self.clauses.push(format!(
            "({column} IS NULL OR {column} NOT IN ({}))",
            placeholders(values.len())
        ));
        self.params.extend(values);
        Ok(self)
    }

    /// `column LIKE ?` for any of the patterns (`%` matches any run, `_` one character).
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for an invalid column or non-text patterns.
    pub fn like_any(
        &mut self,
        column: &str,
        patterns: Option<&FilterValue>,
    ) -> Result<&mut Self, ChildesDbError> {
        let Some(patterns) = patterns else {
            return Ok(self);
        };
        let column = validate_identifier(column)?;
        let patterns = patterns.expect_text(column)?;
        let ors = vec![format!("{column} LIKE ?"); patterns.len()].join(" OR ");
        self.clauses.push(if patterns.len() == 1 {
            ors
        } else {
            format!("({ors})")
        });
        self.params
            .extend(patterns.iter().cloned().map(RowValues::Text));
        Ok(self)
    }

    /// Age filter against rows that carry an age span (`min_col`..=`max_col`).
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for invalid columns or a malformed age.
    pub fn age_span(
        &mut self,
        min_col: &str,
        max_col: &str,
        age: Option<&FilterValue>,
    ) -> Result<&mut Self, ChildesDbError> {
        let Some(age) = age else {
            return Ok(self);
        };
        let min_col = validate_identifier(min_col)?;
        let max_col = validate_identifier(max_col)?;
        let (lo, hi, inclusive) = AgeFilter::try_from(age)?.span_bounds();
        let below = if inclusive { "<=" } else { "<" };
        self.clauses.push(format!("{max_col} >= ?"));
        self.clauses.push(format!("{min_col} {below} ?"));
        self.params.push(RowValues::Float(lo));
        self.params.push(RowValues::Float(hi));
        Ok(self)
    }

    /// Age filter against rows recorded at a single age.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for an invalid column or a malformed age.
    pub fn age_point(
        &mut self,
        column: &str,
        age: Option<&FilterValue>,
    ) -> Result<&mut Self, ChildesDbError> {
        let Some(age) = age else {
            return Ok(self);
        };
        let column = validate_identifier(column)?;
        let (lo, hi) = AgeFilter::try_from(age)?.point_bounds();
        self.clauses.push(format!("{column} >= ?"));
        self.clauses.push(format!("{column} < ?"));
        self.params.push(RowValues::Float(lo));
        self.params.push(RowValues::Float(hi));
        Ok(self)
    }

    /// `column IN (...)` over already-typed values, e.g. ids read back from a result.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for an invalid column or no values.
    pub fn is_in_values(
        &mut self,
        column: &str,
        values: Vec<RowValues>,
    ) -> Result<&mut Self, ChildesDbError> {
        let column = validate_identifier(column)?;
        if values.is_empty() {
            return Err(ChildesDbError::ParameterError(format!(
                "`{column}` filter must not be an empty list"
            )));
        }
        self.clauses
            .push(format!("{column} IN ({})", placeholders(values.len())));
        self.params.extend(values);
        Ok(self)
    }

    /// Rows whose `group_col` equals a key and whose `order_col` lies within
    /// that key's inclusive bounds, for any of `ranges`.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for invalid columns or no ranges.
    pub fn within_any_range(
        &mut self,
        group_col: &str,
        order_col: &str,
        ranges: &[(RowValues, i64, i64)],
    ) -> Result<&mut Self, ChildesDbError> {
        let group_col = validate_identifier(group_col)?;
        let order_col = validate_identifier(order_col)?;
        if ranges.is_empty() {
            return Err(ChildesDbError::ParameterError(format!(
                "`{group_col}` ranges must not be empty"
            )));
        }
        let one = format!("({group_col} = ? AND {order_col} >= ? AND {order_col} <= ?)");
        self.clauses
            .push(format!("({})", vec![one; ranges.len()].join(" OR ")));
        for (key, lo, hi) in ranges {
            self.params.push(key.clone());
            self.params.push(RowValues::Int(*lo));
            self.params.push(RowValues::Int(*hi));
        }
        Ok(self)
    }

    /// `column = ?`.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for an invalid column.
    pub fn eq(&mut self, column: &str, value: RowValues) -> Result<&mut Self, ChildesDbError> {
        let column = validate_identifier(column)?;
        self.clauses.push(format!("{column} = ?"));
        self.params.push(value);
        Ok(self)
    }

    /// Append an ascending sort key.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for an invalid column.
    pub fn order_by(&mut self, column: &str) -> Result<&mut Self, ChildesDbError> {
        self.order_by.push(validate_identifier(column)?.to_string());
        Ok(self)
    }

    #[must_use]
    pub fn build(&self) -> QueryAndParams {
        let mut query = format!("SELECT * FROM {}", self.table);
        if !self.clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.clauses.join(" AND "));
        }
        if !self.order_by.is_empty() {
            query.push_str(" ORDER BY ");
            query.push_str(&self.order_by.join(", "));
        }
        QueryAndParams::new(query, self.params.clone())
    }
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn non_empty(column: &str, filter: &FilterValue) -> Result<Vec<RowValues>, ChildesDbError> {
    if filter.is_empty() {
        return Err(ChildesDbError::ParameterError(format!(
            "`{column}` filter must not be an empty list"
        )));
    }
    Ok(filter.to_params())
}
