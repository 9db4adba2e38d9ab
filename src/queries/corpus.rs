use super::text;
use crate::connection::{ChildesConnection, QueryScope};
use crate::error::ChildesDbError;
use crate::filter::FilterValue;
use crate::query_builder::SelectBuilder;
use crate::results::ResultSet;

/// Every collection.
///
/// # Errors
/// Returns a connection or execution error.
pub async fn get_collections(scope: &QueryScope<'_>) -> Result<ResultSet, ChildesDbError> {
    let conn = scope.resolve().await?;
    let result = conn.get_table("collection").await;
    conn.finish().await;
    result
}

/// Every corpus.
///
/// # Errors
/// Returns a connection or execution error.
pub async fn get_corpora(scope: &QueryScope<'_>) -> Result<ResultSet, ChildesDbError> {
    let conn = scope.resolve().await?;
    let result = conn.get_table("corpus").await;
    conn.finish().await;
    result
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptFilter {
    pub collection: Option<FilterValue>,
    pub corpus: Option<FilterValue>,
    pub target_child: Option<FilterValue>,
}

filter_setters!(TranscriptFilter {
    collection,
    corpus,
    target_child
});

/// Transcripts, filtered by collection, corpus and target child.
///
/// # Errors
/// Returns `ChildesDbError::ParameterError` for malformed filters, or a
/// connection or execution error.
pub async fn get_transcripts(
    filter: &TranscriptFilter,
    scope: &QueryScope<'_>,
) -> Result<ResultSet, ChildesDbError> {
    let conn = scope.resolve().await?;
    let result = transcripts_on(&conn, filter).await;
    conn.finish().await;
    result
}

async fn transcripts_on(
    conn: &ChildesConnection,
    filter: &TranscriptFilter,
) -> Result<ResultSet, ChildesDbError> {
    let qp = SelectBuilder::new("transcript")?
        .is_in("collection_name", text(filter.collection.as_ref(), "collection")?)?
        .is_in("corpus_name", text(filter.corpus.as_ref(), "corpus")?)?
        .is_in(
            "target_child_name",
            text(filter.target_child.as_ref(), "target_child")?,
        )?
        .build();
    conn.execute_select(&qp).await
}
