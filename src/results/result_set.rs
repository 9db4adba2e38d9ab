use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::row::{CustomDbRow, build_column_index, unique_column_names};
use crate::error::ChildesDbError;
use crate::types::RowValues;

/// A result set from a query
///
/// This is the local, request-scoped snapshot of a CHILDES table: it carries no
/// identity and is never written back.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<CustomDbRow>,
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    /// Create an empty result set with the given columns and initial capacity.
    ///
    /// Repeated names get a `.1`, `.2`, ... suffix.
    #[must_use]
    pub fn with_capacity(column_names: Vec<String>, capacity: usize) -> ResultSet {
        let column_names = unique_column_names(column_names);
        let column_index = Arc::new(build_column_index(&column_names));
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: Arc::new(column_names),
            column_index,
        }
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn has_column(&self, column_name: &str) -> bool {
        self.column_index.contains_key(column_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CustomDbRow> {
        self.results.iter()
    }

    /// Append a row of values.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ExecutionError` if the value count does not match the column count.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) -> Result<(), ChildesDbError> {
        if row_values.len() != self.column_names.len() {
            return Err(ChildesDbError::ExecutionError(format!(
                "row has {} values but result set has {} columns",
                row_values.len(),
                self.column_names.len()
            )));
        }
        self.results.push(CustomDbRow {
            column_names: Arc::clone(&self.column_names),
            values: row_values,
            column_index_cache: Arc::clone(&self.column_index),
        });
        Ok(())
    }

    /// Values of one column, top to bottom. `None` if the column does not exist.
    #[must_use]
    pub fn column_values(&self, column_name: &str) -> Option<Vec<&RowValues>> {
        let idx = *self.column_index.get(column_name)?;
        Some(self.results.iter().map(|row| &row.values[idx]).collect())
    }

    /// Replace every text cell equal to one of `markers` with `RowValues::Null`.
    ///
    /// Returns the number of cells rewritten.
    pub fn normalize_missing<S: AsRef<str>>(&mut self, markers: &[S]) -> usize {
        if markers.is_empty() {
            return 0;
        }
        let mut replaced = 0;
        for row in &mut self.results {
            for value in &mut row.values {
                let is_marker = value
                    .as_text()
                    .is_some_and(|text| markers.iter().any(|m| m.as_ref() == text));
                if is_marker {
                    *value = RowValues::Null;
                    replaced += 1;
                }
            }
        }
        replaced
    }

    /// Overwrite `target` with `source` wherever `source` holds a non-empty value.
    ///
    /// Returns the number of rows rewritten; a result set missing either column
    /// is left untouched.
    pub fn coalesce_column(&mut self, target: &str, source: &str) -> usize {
        if !self.has_column(target) || !self.has_column(source) {
            return 0;
        }
        let mut rewritten = 0;
        for row in &mut self.results {
            let replacement = match row.get(source) {
                Some(RowValues::Null) | None => continue,
                Some(RowValues::Text(s)) if s.is_empty() => continue,
                Some(value) => value.clone(),
            };
            if let Some(slot) = row.get_mut(target) {
                *slot = replacement;
                rewritten += 1;
            }
        }
        rewritten
    }

    /// Keep only the first row for each distinct value of `column_name`.
    ///
    /// NULL keys are never considered duplicates of each other.
    pub fn dedup_by(&mut self, column_name: &str) {
        let Some(&idx) = self.column_index.get(column_name) else {
            return;
        };
        let mut seen = HashSet::new();
        self.results.retain(|row| match &row.values[idx] {
            RowValues::Null => true,
            key => seen.insert(key.to_cell()),
        });
    }

    /// Write the result set as CSV with a header row.
    ///
    /// # Errors
    /// Returns `ChildesDbError::CsvError` if writing fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ChildesDbError> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(self.column_names.iter())?;
        for row in &self.results {
            out.write_record(row.values.iter().map(RowValues::to_cell))?;
        }
        out.flush()?;
        Ok(())
    }

    /// Convert into a JSON array of objects keyed by column name.
    ///
    /// # Errors
    /// Returns `ChildesDbError::JsonError` if serialization fails.
    pub fn to_json(&self) -> Result<serde_json::Value, ChildesDbError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.results.iter())
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a CustomDbRow;
    type IntoIter = std::slice::Iter<'a, CustomDbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        let mut rs = ResultSet::with_capacity(
            vec!["id".into(), "gloss".into(), "replacement".into()],
            3,
        );
        rs.add_row_values(vec![
            RowValues::Int(1),
            RowValues::Text("doggy".into()),
            RowValues::Text(String::new()),
        ])
        .unwrap();
        rs.add_row_values(vec![
            RowValues::Int(2),
            RowValues::Text("gonna".into()),
            RowValues::Text("going_to".into()),
        ])
        .unwrap();
        rs.add_row_values(vec![
            RowValues::Int(2),
            RowValues::Text("NA".into()),
            RowValues::Null,
        ])
        .unwrap();
        rs
    }

    #[test]
    fn rejects_short_rows() {
        let mut rs = sample();
        assert!(rs.add_row_values(vec![RowValues::Int(3)]).is_err());
    }

    #[test]
    fn missing_markers_become_null() {
        let mut rs = sample();
        let replaced = rs.normalize_missing(&["NA"]);
        assert_eq!(replaced, 1);
        assert!(rs.results[2].get("gloss").unwrap().is_null());
        assert_eq!(rs.results[0].get("gloss").unwrap().as_text(), Some("doggy"));
    }

    #[test]
    fn coalesce_skips_empty_and_null() {
        let mut rs = sample();
        assert_eq!(rs.coalesce_column("gloss", "replacement"), 1);
        assert_eq!(rs.results[0].get("gloss").unwrap().as_text(), Some("doggy"));
        assert_eq!(rs.results[1].get("gloss").unwrap().as_text(), Some("going_to"));
    }

    #[test]
    fn dedup_keeps_first() {
        let mut rs = sample();
        rs.dedup_by("id");
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.results[1].get("gloss").unwrap().as_text(), Some("gonna"));
    }

    #[test]
    fn csv_and_json_output() {
        let mut rs = sample();
        rs.normalize_missing(&["NA"]);
        let mut buf = Vec::new();
        rs.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("id,gloss,replacement\n1,doggy,\n"));

        let json = rs.to_json().unwrap();
        assert_eq!(json[1]["replacement"], "going_to");
        assert!(json[2]["gloss"].is_null());
    }

    #[test]
    fn repeated_column_names_stay_addressable() {
        let mut rs = ResultSet::with_capacity(
            vec!["id".into(), "id".into(), "id.1".into(), "id".into()],
            1,
        );
        assert_eq!(rs.column_names(), &["id", "id.1", "id.1.1", "id.2"]);
        rs.add_row_values(vec![
            RowValues::Int(1),
            RowValues::Int(2),
            RowValues::Int(3),
            RowValues::Int(4),
        ])
        .unwrap();
        let json = rs.to_json().unwrap();
        assert_eq!(json[0].as_object().unwrap().len(), 4);
        assert_eq!(json[0]["id.2"], 4);
    }
}
