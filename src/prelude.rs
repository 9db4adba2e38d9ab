//! Convenient imports for common functionality.

pub use crate::config::{ConnectOptions, DbArgs, SqliteOptions};
pub use crate::connection::{
    ChildesConnection, QueryScope, ResolvedConnection, clear_connections, resolve_connection,
};
pub use crate::error::ChildesDbError;
pub use crate::filter::{AgeFilter, ContextWindow, FilterValue};
pub use crate::manifest::{DbInfo, ManifestSource, StaticManifest, translate_version};
pub use crate::queries::{
    ContextFilter, ParticipantFilter, SpeakerFilter, TokenFilter, TranscriptFilter, TypeFilter,
    UtteranceFilter, get_collections, get_contexts, get_corpora, get_database_version,
    get_participants, get_speaker_statistics, get_sql_query, get_tokens, get_transcripts,
    get_types, get_utterances,
};
pub use crate::query_builder::SelectBuilder;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::types::{DatabaseType, QueryAndParams, RowValues};

pub use crate::manifest::{HttpManifest, get_db_info};

#[cfg(feature = "mysql")]
pub use crate::connection::{
    check_connection, check_connection_with, connect_to_childes, connect_with_manifest,
};
#[cfg(feature = "sqlite")]
pub use crate::connection::check_sqlite_connection;
