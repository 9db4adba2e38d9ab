//! One query function per corpus entity.
//!
//! Each function takes a filter struct and a [`QueryScope`]. Every filter
//! field is optional and `None` means "no filter"; an all-`None` filter
//! returns the whole table.
//!
//! [`QueryScope`]: crate::connection::QueryScope

use crate::error::ChildesDbError;
use crate::filter::FilterValue;

macro_rules! filter_setters {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $ty {
            $(
                #[must_use]
                pub fn $field(mut self, value: impl Into<FilterValue>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*
        }
    };
}

mod corpus;
mod speakers;
mod tokens;
mod utterances;
mod version;

pub use corpus::{get_collections, get_corpora, get_transcripts, TranscriptFilter};
pub use speakers::{get_participants, get_speaker_statistics, ParticipantFilter, SpeakerFilter};
pub use tokens::{get_tokens, get_types, TokenFilter, TypeFilter};
pub use utterances::{
    get_contexts, get_utterances, ContextFilter, UtteranceFilter, TARGET_TOKEN, TARGET_UTTERANCE_ID,
};
pub use version::{get_database_version, get_sql_query};

/// Check that a filter on a text column holds strings.
fn text<'f>(
    value: Option<&'f FilterValue>,
    arg: &str,
) -> Result<Option<&'f FilterValue>, ChildesDbError> {
    if let Some(v) = value {
        v.expect_text(arg)?;
    }
    Ok(value)
}
