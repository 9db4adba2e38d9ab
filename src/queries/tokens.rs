use tracing::debug;

use super::speakers::SpeakerFilter;
use super::text;
use crate::connection::{ChildesConnection, QueryScope};
use crate::error::ChildesDbError;
use crate::filter::FilterValue;
use crate::query_builder::SelectBuilder;
use crate::results::ResultSet;

/// Filters for [`get_tokens`]. The token pattern is required.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenFilter {
    /// `LIKE` patterns matched against the transcribed gloss, OR-ed together.
    pub token: FilterValue,
    pub speakers: SpeakerFilter,
    /// `LIKE` patterns matched against the stem.
    pub stem: Option<FilterValue>,
    pub part_of_speech: Option<FilterValue>,
    /// Report the replacement form (when there is one) in place of the gloss.
    pub replace: bool,
}

impl TokenFilter {
    #[must_use]
    pub fn new(token: impl Into<FilterValue>) -> Self {
        Self {
            token: token.into(),
            speakers: SpeakerFilter::default(),
            stem: None,
            part_of_speech: None,
            replace: true,
        }
    }

    #[must_use]
    pub fn speakers(mut self, speakers: SpeakerFilter) -> Self {
        self.speakers = speakers;
        self
    }

    #[must_use]
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

filter_setters!(TokenFilter {
    stem,
    part_of_speech
});

/// Tokens whose gloss matches any of the token patterns.
///
/// Patterns use SQL `LIKE` syntax: `%` matches any run of characters and `_`
/// a single character. Matching is done on the gloss as transcribed; with
/// `replace` set the returned `gloss` column then carries the replacement.
///
/// # Errors
/// Returns `ChildesDbError::ParameterError` for malformed filters, or a
/// connection or execution error.
pub async fn get_tokens(
    filter: &TokenFilter,
    scope: &QueryScope<'_>,
) -> Result<ResultSet, ChildesDbError> {
    let conn = scope.resolve().await?;
    let result = tokens_on(&conn, filter).await;
    conn.finish().await;
    result
}

pub(crate) async fn tokens_on(
    conn: &ChildesConnection,
    filter: &TokenFilter,
) -> Result<ResultSet, ChildesDbError> {
    let mut builder = SelectBuilder::new("token")?;
    builder.like_any("gloss", Some(&filter.token))?;
    filter.speakers.apply(&mut builder)?;
    builder
        .like_any("stem", filter.stem.as_ref())?
        .is_in(
            "part_of_speech",
            text(filter.part_of_speech.as_ref(), "part_of_speech")?,
        )?;

    let mut tokens = conn.execute_select(&builder.build()).await?;
    if filter.replace {
        let replaced = tokens.coalesce_column("gloss", "replacement");
        debug!(replaced, "applied token replacements");
    }
    Ok(tokens)
}

/// Filters for [`get_types`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeFilter {
    /// `LIKE` patterns matched against the type's gloss.
    pub type_pattern: Option<FilterValue>,
    pub speakers: SpeakerFilter,
}

impl TypeFilter {
    #[must_use]
    pub fn speakers(mut self, speakers: SpeakerFilter) -> Self {
        self.speakers = speakers;
        self
    }
}

filter_setters!(TypeFilter { type_pattern });

/// Per-transcript type frequencies.
///
/// # Errors
/// Returns `ChildesDbError::ParameterError` for malformed filters, or a
/// connection or execution error.
pub async fn get_types(
    filter: &TypeFilter,
    scope: &QueryScope<'_>,
) -> Result<ResultSet, ChildesDbError> {
    let conn = scope.resolve().await?;
    let result = types_on(&conn, filter).await;
    conn.finish().await;
    result
}

async fn types_on(
    conn: &ChildesConnection,
    filter: &TypeFilter,
) -> Result<ResultSet, ChildesDbError> {
    let mut builder = SelectBuilder::new("token_frequency")?;
    builder.like_any("gloss", filter.type_pattern.as_ref())?;
    filter.speakers.apply(&mut builder)?;
    conn.execute_select(&builder.build()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_defaults() {
        let filter = TokenFilter::new("dog%");
        assert!(filter.replace);
        assert_eq!(filter.token, FilterValue::Text(vec!["dog%".into()]));
        assert_eq!(filter.speakers, SpeakerFilter::default());

        let filter = filter.replace(false).stem(["dog", "cat"]);
        assert!(!filter.replace);
        assert_eq!(filter.stem.map(|s| s.len()), Some(2));
    }

    #[test]
    fn type_filter_is_empty_by_default() {
        let filter = TypeFilter::default();
        assert!(filter.type_pattern.is_none());
        let filter = filter.type_pattern("%ing");
        assert_eq!(filter.type_pattern, Some(FilterValue::from("%ing")));
    }
}
