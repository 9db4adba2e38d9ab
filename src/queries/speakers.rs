use super::text;
use crate::connection::{ChildesConnection, QueryScope};
use crate::error::ChildesDbError;
use crate::filter::FilterValue;
use crate::query_builder::SelectBuilder;
use crate::results::ResultSet;

/// Filters for participants and per-transcript speaker statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantFilter {
    pub collection: Option<FilterValue>,
    pub corpus: Option<FilterValue>,
    pub target_child: Option<FilterValue>,
    pub role: Option<FilterValue>,
    pub role_exclude: Option<FilterValue>,
    /// Months; one value or a `[min, max)` pair.
    pub age: Option<FilterValue>,
    pub sex: Option<FilterValue>,
}

filter_setters!(ParticipantFilter {
    collection,
    corpus,
    target_child,
    role,
    role_exclude,
    age,
    sex
});

/// Filters shared by every speaker-level table (tokens, types, utterances).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakerFilter {
    pub collection: Option<FilterValue>,
    pub language: Option<FilterValue>,
    pub corpus: Option<FilterValue>,
    pub target_child: Option<FilterValue>,
    pub role: Option<FilterValue>,
    pub role_exclude: Option<FilterValue>,
    pub age: Option<FilterValue>,
    pub sex: Option<FilterValue>,
}

filter_setters!(SpeakerFilter {
    collection,
    language,
    corpus,
    target_child,
    role,
    role_exclude,
    age,
    sex
});

impl SpeakerFilter {
    /// Add this filter's clauses, with the age compared against the target
    /// child's age when the row was recorded.
    pub(crate) fn apply(&self, builder: &mut SelectBuilder) -> Result<(), ChildesDbError> {
        builder
            .is_in("collection_name", text(self.collection.as_ref(), "collection")?)?
            .is_in("language", text(self.language.as_ref(), "language")?)?
            .is_in("corpus_name", text(self.corpus.as_ref(), "corpus")?)?
            .is_in(
                "target_child_name",
                text(self.target_child.as_ref(), "target_child")?,
            )?
            .is_in("speaker_role", text(self.role.as_ref(), "role")?)?
            .not_in(
                "speaker_role",
                text(self.role_exclude.as_ref(), "role_exclude")?,
            )?
            .age_point("target_child_age", self.age.as_ref())?
            .is_in("target_child_sex", text(self.sex.as_ref(), "sex")?)?;
        Ok(())
    }
}

/// Participants. A participant's ages span a range, so a single `age`
/// matches when it falls inside that span and an `[a, b)` pair matches on
/// overlap.
///
/// # Errors
/// Returns `ChildesDbError::ParameterError` for malformed filters, or a
/// connection or execution error.
pub async fn get_participants(
    filter: &ParticipantFilter,
    scope: &QueryScope<'_>,
) -> Result<ResultSet, ChildesDbError> {
    let conn = scope.resolve().await?;
    let result = participants_on(&conn, filter).await;
    conn.finish().await;
    result
}

async fn participants_on(
    conn: &ChildesConnection,
    filter: &ParticipantFilter,
) -> Result<ResultSet, ChildesDbError> {
    let qp = SelectBuilder::new("participant")?
        .is_in("collection_name", text(filter.collection.as_ref(), "collection")?)?
        .is_in("corpus_name", text(filter.corpus.as_ref(), "corpus")?)?
        .is_in(
            "target_child_name",
            text(filter.target_child.as_ref(), "target_child")?,
        )?
        .is_in("role", text(filter.role.as_ref(), "role")?)?
        .not_in("role", text(filter.role_exclude.as_ref(), "role_exclude")?)?
        .age_span("min_age", "max_age", filter.age.as_ref())?
        .is_in("sex", text(filter.sex.as_ref(), "sex")?)?
        .build();
    conn.execute_select(&qp).await
}

/// Per-transcript, per-speaker statistics.
///
/// # Errors
/// Returns `ChildesDbError::ParameterError` for malformed filters, or a
/// connection or execution error.
pub async fn get_speaker_statistics(
    filter: &ParticipantFilter,
    scope: &QueryScope<'_>,
) -> Result<ResultSet, ChildesDbError> {
    let conn = scope.resolve().await?;
    let result = speaker_statistics_on(&conn, filter).await;
    conn.finish().await;
    result
}

async fn speaker_statistics_on(
    conn: &ChildesConnection,
    filter: &ParticipantFilter,
) -> Result<ResultSet, ChildesDbError> {
    let qp = SelectBuilder::new("transcript_by_speaker")?
        .is_in("collection_name", text(filter.collection.as_ref(), "collection")?)?
        .is_in("corpus_name", text(filter.corpus.as_ref(), "corpus")?)?
        .is_in(
            "target_child_name",
            text(filter.target_child.as_ref(), "target_child")?,
        )?
        .is_in("speaker_role", text(filter.role.as_ref(), "role")?)?
        .not_in(
            "speaker_role",
            text(filter.role_exclude.as_ref(), "role_exclude")?,
        )?
        .age_point("target_child_age", filter.age.as_ref())?
        .is_in("target_child_sex", text(filter.sex.as_ref(), "sex")?)?
        .build();
    conn.execute_select(&qp).await
}
