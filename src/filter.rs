//! Filter arguments accepted by the query functions.
//!
//! Every filter is optional; `None` always means "do not filter on this
//! column". A bare scalar and a one-element list produce the same
//! [`FilterValue`], so `"Brown"` and `vec!["Brown"]` are interchangeable.

use serde_json::Value as JsonValue;

use crate::error::ChildesDbError;
use crate::types::RowValues;

/// A coerced filter argument.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Bool(bool),
    Text(Vec<String>),
    /// Integers are widened to floats, as age columns are fractional months.
    Number(Vec<f64>),
}

impl FilterValue {
    /// Coerce a dynamically typed argument, e.g. one decoded from JSON or a CLI flag.
    ///
    /// `null` yields `Ok(None)`. Lists must be homogeneous: all strings, or all
    /// numbers (integers and floats may be mixed). Nested or mixed lists are a
    /// `ParameterError`.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` for objects, nested arrays, or mixed arrays.
    pub fn from_json(value: JsonValue) -> Result<Option<FilterValue>, ChildesDbError> {
        match value {
            JsonValue::Null => Ok(None),
            JsonValue::Bool(b) => Ok(Some(FilterValue::Bool(b))),
            JsonValue::String(s) => Ok(Some(FilterValue::Text(vec![s]))),
            JsonValue::Number(n) => Ok(Some(FilterValue::Number(vec![json_number(&n)?]))),
            JsonValue::Array(items) => coerce_list(items).map(Some),
            JsonValue::Object(_) => Err(ChildesDbError::ParameterError(
                "filter arguments cannot be objects".into(),
            )),
        }
    }

    /// Number of elements; a boolean counts as one.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            FilterValue::Bool(_) => 1,
            FilterValue::Text(values) => values.len(),
            FilterValue::Number(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the text elements, failing with a message naming `arg`.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` unless the value is a non-empty text list.
    pub fn expect_text(&self, arg: &str) -> Result<&[String], ChildesDbError> {
        match self {
            FilterValue::Text(values) if !values.is_empty() => Ok(values),
            FilterValue::Text(_) => Err(ChildesDbError::ParameterError(format!(
                "`{arg}` must not be an empty list"
            ))),
            other => Err(ChildesDbError::ParameterError(format!(
                "`{arg}` expects one or more strings, got {other:?}"
            ))),
        }
    }

    /// Borrow the numeric elements, failing with a message naming `arg`.
    ///
    /// # Errors
    /// Returns `ChildesDbError::ParameterError` unless the value is a non-empty numeric list.
    pub fn expect_numbers(&self, arg: &str) -> Result<&[f64], ChildesDbError> {
        match self {
            FilterValue::Number(values) if !values.is_empty() => Ok(values),
            FilterValue::Number(_) => Err(ChildesDbError::ParameterError(format!(
                "`{arg}` must not be an empty list"
            ))),
            other => Err(ChildesDbError::ParameterError(format!(
                "`{arg}` expects one or more numbers, got {other:?}"
            ))),
        }
    }

    /// The elements as bindable parameters.
    #[must_use]
    pub fn to_params(&self) -> Vec<RowValues> {
        match self {
            FilterValue::Bool(b) => vec![RowValues::Bool(*b)],
            FilterValue::Text(values) => values.iter().cloned().map(RowValues::Text).collect(),
            FilterValue::Number(values) => values.iter().copied().map(RowValues::Float).collect(),
        }
    }
}

fn json_number(n: &serde_json::Number) -> Result<f64, ChildesDbError> {
    n.as_f64()
        .ok_or_else(|| ChildesDbError::ParameterError(format!("number {n} is not representable")))
}

fn coerce_list(items: Vec<JsonValue>) -> Result<FilterValue, ChildesDbError> {
    if items.iter().all(JsonValue::is_string) {
        let values = items
            .into_iter()
            .filter_map(|item| match item {
                JsonValue::String(s) => Some(s),
                _ => None,
            })
            .collect();
        return Ok(FilterValue::Text(values));
    }
    if items.iter().all(JsonValue::is_number) {
        let values = items
            .iter()
            .filter_map(JsonValue::as_number)
            .map(json_number)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(FilterValue::Number(values));
    }
    if let [JsonValue::Bool(b)] = items.as_slice() {
        return Ok(FilterValue::Bool(*b));
    }
    Err(ChildesDbError::ParameterError(
        "list arguments must be all strings or all numbers".into(),
    ))
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(vec![value.to_string()])
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(vec![value])
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::Text(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::Text(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for FilterValue {
    fn from(values: &[&str]) -> Self {
        FilterValue::Text(values.iter().map(|s| (*s).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterValue {
    fn from(values: [&str; N]) -> Self {
        FilterValue::Text(values.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(vec![value])
    }
}

impl From<Vec<f64>> for FilterValue {
    fn from(values: Vec<f64>) -> Self {
        FilterValue::Number(values)
    }
}

impl<const N: usize> From<[f64; N]> for FilterValue {
    fn from(values: [f64; N]) -> Self {
        FilterValue::Number(values.to_vec())
    }
}

macro_rules! impl_from_integer {
    ($($int:ty),*) => {
        $(
            impl From<$int> for FilterValue {
                fn from(value: $int) -> Self {
                    FilterValue::Number(vec![f64::from(value)])
                }
            }

            impl From<Vec<$int>> for FilterValue {
                fn from(values: Vec<$int>) -> Self {
                    FilterValue::Number(values.into_iter().map(f64::from).collect())
                }
            }

            impl<const N: usize> From<[$int; N]> for FilterValue {
                fn from(values: [$int; N]) -> Self {
                    FilterValue::Number(values.into_iter().map(f64::from).collect())
                }
            }
        )*
    };
}

impl_from_integer!(i32, u32, i16, u16, u8);

/// Age filter in months.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgeFilter {
    /// A single age.
    At(f64),
    /// The half-open interval `[min, max)`.
    Between { min: f64, max: f64 },
}

impl AgeFilter {
    /// Inclusive lower bound and exclusive upper bound used against a point age.
    ///
    /// A single age selects the month it falls in.
    #[must_use]
    pub fn point_bounds(&self) -> (f64, f64) {
        match *self {
            AgeFilter::At(age) => (age, age + 1.0),
            AgeFilter::Between { min, max } => (min, max),
        }
    }

    /// Bounds used against an age span `[min_age, max_age]`: a row matches when
    /// `max_age >= lo` and `min_age` is below `hi`. The upper bound is
    /// inclusive (`true`) for a single age and exclusive for a range.
    #[must_use]
    pub fn span_bounds(&self) -> (f64, f64, bool) {
        match *self {
            AgeFilter::At(age) => (age, age, true),
            AgeFilter::Between { min, max } => (min, max, false),
        }
    }
}

impl TryFrom<&FilterValue> for AgeFilter {
    type Error = ChildesDbError;

    fn try_from(value: &FilterValue) -> Result<Self, Self::Error> {
        let ages = value.expect_numbers("age")?;
        match *ages {
            [age] => Ok(AgeFilter::At(age)),
            [min, max] if min <= max => Ok(AgeFilter::Between { min, max }),
            [min, max] => Err(ChildesDbError::ParameterError(format!(
                "`age` range [{min}, {max}) has its bounds reversed"
            ))),
            _ => Err(ChildesDbError::ParameterError(format!(
                "`age` argument must be of length 1 or 2, got {}",
                ages.len()
            ))),
        }
    }
}

/// How many utterances to return before and after each target utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextWindow {
    pub before: u32,
    pub after: u32,
}

impl ContextWindow {
    #[must_use]
    pub fn new(before: u32, after: u32) -> Self {
        Self { before, after }
    }
}

impl TryFrom<&FilterValue> for ContextWindow {
    type Error = ChildesDbError;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn try_from(value: &FilterValue) -> Result<Self, Self::Error> {
        let sizes = value.expect_numbers("window")?;
        let [before, after] = *sizes else {
            return Err(ChildesDbError::ParameterError(format!(
                "`window` must have exactly two elements, got {}",
                sizes.len()
            )));
        };
        for size in [before, after] {
            if size < 0.0 || size.fract() != 0.0 || size > f64::from(u32::MAX) {
                return Err(ChildesDbError::ParameterError(format!(
                    "`window` sizes must be non-negative integers, got {size}"
                )));
            }
        }
        Ok(ContextWindow::new(before as u32, after as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_and_singleton_list_coincide() {
        assert_eq!(FilterValue::from("Brown"), FilterValue::from(vec!["Brown"]));
        assert_eq!(FilterValue::from(24), FilterValue::from(vec![24.0]));
        assert_eq!(
            FilterValue::from_json(json!("Eve")).unwrap(),
            FilterValue::from_json(json!(["Eve"])).unwrap()
        );
    }

    #[test]
    fn json_dispatch() {
        assert_eq!(FilterValue::from_json(json!(null)).unwrap(), None);
        assert_eq!(
            FilterValue::from_json(json!(true)).unwrap(),
            Some(FilterValue::Bool(true))
        );
        assert_eq!(
            FilterValue::from_json(json!([12, 24.5])).unwrap(),
            Some(FilterValue::Number(vec![12.0, 24.5]))
        );
        assert_eq!(
            FilterValue::from_json(json!(["CHI", "MOT"])).unwrap(),
            Some(FilterValue::Text(vec!["CHI".into(), "MOT".into()]))
        );
    }

    #[test]
    fn mixed_lists_are_rejected() {
        assert!(FilterValue::from_json(json!(["CHI", 3])).is_err());
        assert!(FilterValue::from_json(json!([["CHI"]])).is_err());
        assert!(FilterValue::from_json(json!({"role": "CHI"})).is_err());
    }

    #[test]
    fn age_shapes() {
        assert_eq!(
            AgeFilter::try_from(&FilterValue::from(24)).unwrap(),
            AgeFilter::At(24.0)
        );
        assert_eq!(
            AgeFilter::try_from(&FilterValue::from([12, 36])).unwrap(),
            AgeFilter::Between { min: 12.0, max: 36.0 }
        );
        assert!(AgeFilter::try_from(&FilterValue::from([1, 2, 3])).is_err());
        assert!(AgeFilter::try_from(&FilterValue::from([36, 12])).is_err());
        assert!(AgeFilter::try_from(&FilterValue::from("two")).is_err());
    }

    #[test]
    fn age_bounds() {
        assert_eq!(AgeFilter::At(24.0).span_bounds(), (24.0, 24.0, true));
        assert_eq!(AgeFilter::At(24.0).point_bounds(), (24.0, 25.0));

        // [min, max) excludes the upper bound either way
        let range = AgeFilter::Between { min: 12.0, max: 24.0 };
        assert_eq!(range.span_bounds(), (12.0, 24.0, false));
        assert_eq!(range.point_bounds(), (12.0, 24.0));
    }

    #[test]
    fn window_parsing() {
        assert_eq!(
            ContextWindow::try_from(&FilterValue::from([2, 1])).unwrap(),
            ContextWindow::new(2, 1)
        );
        assert!(ContextWindow::try_from(&FilterValue::from([2])).is_err());
        assert!(ContextWindow::try_from(&FilterValue::from(vec![-1.0, 0.0])).is_err());
        assert!(ContextWindow::try_from(&FilterValue::from(vec![0.5, 0.0])).is_err());
    }
}
