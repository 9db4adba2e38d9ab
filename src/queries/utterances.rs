use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use super::speakers::SpeakerFilter;
use super::tokens::{tokens_on, TokenFilter};
use crate::connection::{ChildesConnection, QueryScope};
use crate::error::ChildesDbError;
use crate::filter::{ContextWindow, FilterValue};
use crate::query_builder::SelectBuilder;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::RowValues;

/// Utterances filter on the same speaker-level columns as tokens.
pub type UtteranceFilter = SpeakerFilter;

/// Column holding the id of the utterance a context row was fetched for.
pub const TARGET_UTTERANCE_ID: &str = "target_utterance_id";
/// Column holding the matched token's gloss.
pub const TARGET_TOKEN: &str = "target_token";

// Targets per statement; each costs three bound parameters in the window query.
const CHUNK_SIZE: usize = 500;

/// Utterances.
///
/// # Errors
/// Returns `ChildesDbError::ParameterError` for malformed filters, or a
/// connection or execution error.
pub async fn get_utterances(
    filter: &UtteranceFilter,
    scope: &QueryScope<'_>,
) -> Result<ResultSet, ChildesDbError> {
    let conn = scope.resolve().await?;
    let result = utterances_on(&conn, filter).await;
    conn.finish().await;
    result
}

async fn utterances_on(
    conn: &ChildesConnection,
    filter: &UtteranceFilter,
) -> Result<ResultSet, ChildesDbError> {
    let mut builder = SelectBuilder::new("utterance")?;
    filter.apply(&mut builder)?;
    conn.execute_select(&builder.build()).await
}

/// Filters for [`get_contexts`].
#[derive(Debug, Clone, PartialEq)]
pub struct ContextFilter {
    /// `LIKE` patterns selecting the target tokens.
    pub token: FilterValue,
    pub speakers: SpeakerFilter,
    pub window: ContextWindow,
    /// Return each utterance once, under the first target that reached it.
    pub remove_duplicates: bool,
}

impl ContextFilter {
    #[must_use]
    pub fn new(token: impl Into<FilterValue>) -> Self {
        Self {
            token: token.into(),
            speakers: SpeakerFilter::default(),
            window: ContextWindow::default(),
            remove_duplicates: true,
        }
    }

    #[must_use]
    pub fn speakers(mut self, speakers: SpeakerFilter) -> Self {
        self.speakers = speakers;
        self
    }

    #[must_use]
    pub fn window(mut self, window: ContextWindow) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn remove_duplicates(mut self, remove_duplicates: bool) -> Self {
        self.remove_duplicates = remove_duplicates;
        self
    }
}

/// Utterances surrounding every utterance that contains a matching token.
///
/// For each target utterance the rows returned are the utterances of the same
/// transcript whose `utterance_order` lies in
/// `[order - window.before, order + window.after]`. Rows are grouped by target
/// utterance id, sorted by `utterance_order` within a group, and carry two
/// extra columns: [`TARGET_UTTERANCE_ID`] and [`TARGET_TOKEN`].
///
/// # Errors
/// Returns `ChildesDbError::ParameterError` for malformed filters,
/// `ChildesDbError::ExecutionError` when an utterance lacks its transcript or
/// order, or a connection or execution error.
pub async fn get_contexts(
    filter: &ContextFilter,
    scope: &QueryScope<'_>,
) -> Result<ResultSet, ChildesDbError> {
    let conn = scope.resolve().await?;
    let result = contexts_on(&conn, filter).await;
    conn.finish().await;
    result
}

struct Target {
    utterance_id: i64,
    token: RowValues,
}

struct Placement {
    transcript: RowValues,
    order: i64,
}

async fn contexts_on(
    conn: &ChildesConnection,
    filter: &ContextFilter,
) -> Result<ResultSet, ChildesDbError> {
    let token_filter = TokenFilter::new(filter.token.clone())
        .speakers(filter.speakers.clone())
        .replace(false);
    let tokens = tokens_on(conn, &token_filter).await?;

    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    for row in &tokens {
        let utterance_id = required_int(row, "utterance_id")?;
        if seen.insert(utterance_id) {
            targets.push(Target {
                utterance_id,
                token: row.get("gloss").cloned().unwrap_or(RowValues::Null),
            });
        }
    }
    targets.sort_by_key(|t| t.utterance_id);
    debug!(tokens = tokens.len(), targets = targets.len(), "context targets");
    if targets.is_empty() {
        return Ok(ResultSet::with_capacity(Vec::new(), 0));
    }

    let placements = place_targets(conn, &targets).await?;
    let (columns, by_transcript) = fetch_windows(conn, &placements, filter.window).await?;

    let mut out_columns = columns;
    out_columns.push(TARGET_UTTERANCE_ID.to_string());
    out_columns.push(TARGET_TOKEN.to_string());
    let mut contexts = ResultSet::with_capacity(out_columns, targets.len());
    for target in &targets {
        let Some(place) = placements.get(&target.utterance_id) else {
            continue;
        };
        let (lo, hi) = window_bounds(place.order, filter.window);
        let Some(rows) = by_transcript.get(&place.transcript.to_cell()) else {
            continue;
        };
        for row in rows.range(lo..=hi).map(|(_, row)| row) {
            let mut values = row.values.clone();
            values.push(RowValues::Int(target.utterance_id));
            values.push(target.token.clone());
            contexts.add_row_values(values)?;
        }
    }

    if filter.remove_duplicates {
        contexts.dedup_by("id");
    }
    debug!(rows = contexts.len(), "contexts assembled");
    Ok(contexts)
}

/// Look up the transcript and position of every target utterance.
async fn place_targets(
    conn: &ChildesConnection,
    targets: &[Target],
) -> Result<HashMap<i64, Placement>, ChildesDbError> {
    let mut placements = HashMap::with_capacity(targets.len());
    for chunk in targets.chunks(CHUNK_SIZE) {
        let ids = chunk
            .iter()
            .map(|t| RowValues::Int(t.utterance_id))
            .collect();
        let qp = SelectBuilder::new("utterance")?
            .is_in_values("id", ids)?
            .build();
        for row in &conn.execute_select(&qp).await? {
            let id = required_int(row, "id")?;
            let transcript = row
                .get("transcript_id")
                .filter(|v| !v.is_null())
                .cloned()
                .ok_or_else(|| missing("transcript_id"))?;
            let order = required_int(row, "utterance_order")?;
            placements.insert(id, Placement { transcript, order });
        }
    }
    Ok(placements)
}

type WindowRows = HashMap<String, BTreeMap<i64, CustomDbRow>>;

/// Fetch every utterance inside any target's window, indexed by transcript then order.
async fn fetch_windows(
    conn: &ChildesConnection,
    placements: &HashMap<i64, Placement>,
    window: ContextWindow,
) -> Result<(Vec<String>, WindowRows), ChildesDbError> {
    let ranges: Vec<(RowValues, i64, i64)> = placements
        .values()
        .map(|place| {
            let (lo, hi) = window_bounds(place.order, window);
            (place.transcript.clone(), lo, hi)
        })
        .collect();

    let mut columns = Vec::new();
    let mut by_transcript: WindowRows = HashMap::new();
    for chunk in ranges.chunks(CHUNK_SIZE) {
        let qp = SelectBuilder::new("utterance")?
            .within_any_range("transcript_id", "utterance_order", chunk)?
            .build();
        let fetched = conn.execute_select(&qp).await?;
        if columns.is_empty() {
            columns = fetched.column_names().to_vec();
        }
        for row in fetched.results {
            let transcript = row
                .get("transcript_id")
                .map(RowValues::to_cell)
                .ok_or_else(|| missing("transcript_id"))?;
            let order = required_int(&row, "utterance_order")?;
            by_transcript
                .entry(transcript)
                .or_default()
                .insert(order, row);
        }
    }
    Ok((columns, by_transcript))
}

fn window_bounds(order: i64, window: ContextWindow) -> (i64, i64) {
    (
        order.saturating_sub(i64::from(window.before)),
        order.saturating_add(i64::from(window.after)),
    )
}

fn required_int(row: &CustomDbRow, column: &str) -> Result<i64, ChildesDbError> {
    match row.get(column) {
        Some(RowValues::Int(v)) => Ok(*v),
        #[allow(clippy::cast_possible_truncation)]
        Some(RowValues::Float(v)) if v.fract() == 0.0 => Ok(*v as i64),
        Some(RowValues::Text(s)) => s.trim().parse().map_err(|_| missing(column)),
        _ => Err(missing(column)),
    }
}

fn missing(column: &str) -> ChildesDbError {
    ChildesDbError::ExecutionError(format!("utterance row has no usable `{column}`"))
}
