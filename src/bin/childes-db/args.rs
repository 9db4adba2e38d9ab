use std::path::PathBuf;
use std::time::Duration;

use childes_db::config::DEFAULT_PORT;
use childes_db::manifest::DEFAULT_MANIFEST_URL;
use childes_db::prelude::*;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about = "Query the CHILDES child-language database")]
pub(crate) struct Args {
    #[command(flatten)]
    pub(crate) connection: ConnectionArgs,
    #[arg(long, value_enum, default_value = "csv")]
    pub(crate) format: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Csv,
    Json,
}

#[derive(clap::Args, Debug)]
pub(crate) struct ConnectionArgs {
    /// "current" or a version named in the manifest
    #[arg(long, env = "CHILDES_DB_VERSION", default_value = "current")]
    pub(crate) db_version: String,
    /// MySQL host; the manifest's host is used when omitted
    #[arg(long, env = "CHILDES_DB_HOST")]
    pub(crate) host: Option<String>,
    #[arg(long, env = "CHILDES_DB_PORT", default_value_t = DEFAULT_PORT)]
    pub(crate) port: u16,
    #[arg(long, env = "CHILDES_DB_USER")]
    pub(crate) user: Option<String>,
    #[arg(long, env = "CHILDES_DB_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
    /// Database to use on `--host` when it is not the hosted server
    #[arg(long, env = "CHILDES_DB_NAME", requires = "host")]
    pub(crate) db_name: Option<String>,
    /// Local SQLite mirror to query instead of a MySQL server
    #[arg(long, env = "CHILDES_DB_SQLITE", conflicts_with = "host")]
    pub(crate) sqlite: Option<PathBuf>,
    #[arg(long, env = "CHILDES_DB_MANIFEST_URL", default_value = DEFAULT_MANIFEST_URL)]
    pub(crate) manifest_url: String,
    #[arg(long, default_value_t = 10)]
    pub(crate) timeout_secs: u64,
    /// Cell value that stands for a missing value (repeatable)
    #[arg(long = "missing-marker", default_value = "NA")]
    pub(crate) missing_markers: Vec<String>,
}

impl ConnectionArgs {
    pub(crate) fn connect_options(&self) -> ConnectOptions {
        let mut builder = ConnectOptions::builder()
            .db_version(self.db_version.clone())
            .manifest_url(self.manifest_url.clone())
            .connect_timeout(Duration::from_secs(self.timeout_secs))
            .missing_markers(self.missing_markers.iter().cloned());
        if let Some(host) = &self.host {
            let mut args = DbArgs::builder(host.clone()).port(self.port);
            if let Some(user) = &self.user {
                args = args.user(user.clone());
            }
            if let Some(password) = &self.password {
                args = args.password(password.clone());
            }
            if let Some(db_name) = &self.db_name {
                args = args.db_name(db_name.clone());
            }
            builder = builder.db_args(args.finish());
        }
        builder.finish()
    }

    pub(crate) fn sqlite_options(&self) -> Option<SqliteOptions> {
        self.sqlite.as_ref().map(|path| {
            SqliteOptions::builder(path.to_string_lossy())
                .missing_markers(self.missing_markers.iter().cloned())
                .finish()
        })
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Print the hosted manifest and the version it resolves to
    Info,
    /// Exit successfully if the database answers
    Check,
    /// Print the version recorded in the database
    Version,
    Collections,
    Corpora,
    Transcripts(TranscriptArgs),
    Participants(ParticipantArgs),
    /// Per-transcript statistics for each speaker
    SpeakerStats(ParticipantArgs),
    Tokens(TokenArgs),
    Types(TypeArgs),
    Utterances(SpeakerArgs),
    /// Utterances surrounding each utterance containing a token
    Contexts(ContextArgs),
    /// Run a single read-only SQL statement
    Sql { query: String },
}

fn text(values: Vec<String>) -> Option<FilterValue> {
    (!values.is_empty()).then(|| FilterValue::from(values))
}

fn numbers(values: Vec<f64>) -> Option<FilterValue> {
    (!values.is_empty()).then(|| FilterValue::from(values))
}

#[derive(clap::Args, Debug)]
pub(crate) struct TranscriptArgs {
    #[arg(long, value_delimiter = ',')]
    collection: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    corpus: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    target_child: Vec<String>,
}

impl From<TranscriptArgs> for TranscriptFilter {
    fn from(args: TranscriptArgs) -> Self {
        TranscriptFilter {
            collection: text(args.collection),
            corpus: text(args.corpus),
            target_child: text(args.target_child),
        }
    }
}

#[derive(clap::Args, Debug)]
pub(crate) struct ParticipantArgs {
    #[arg(long, value_delimiter = ',')]
    collection: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    corpus: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    target_child: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    role: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    role_exclude: Vec<String>,
    /// Months: one age, or MIN,MAX
    #[arg(long, value_delimiter = ',')]
    age: Vec<f64>,
    #[arg(long, value_delimiter = ',')]
    sex: Vec<String>,
}

impl From<ParticipantArgs> for ParticipantFilter {
    fn from(args: ParticipantArgs) -> Self {
        ParticipantFilter {
            collection: text(args.collection),
            corpus: text(args.corpus),
            target_child: text(args.target_child),
            role: text(args.role),
            role_exclude: text(args.role_exclude),
            age: numbers(args.age),
            sex: text(args.sex),
        }
    }
}

#[derive(clap::Args, Debug)]
pub(crate) struct SpeakerArgs {
    #[arg(long, value_delimiter = ',')]
    collection: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    language: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    corpus: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    target_child: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    role: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    role_exclude: Vec<String>,
    /// Months: one age, or MIN,MAX
    #[arg(long, value_delimiter = ',')]
    age: Vec<f64>,
    #[arg(long, value_delimiter = ',')]
    sex: Vec<String>,
}

impl From<SpeakerArgs> for SpeakerFilter {
    fn from(args: SpeakerArgs) -> Self {
        SpeakerFilter {
            collection: text(args.collection),
            language: text(args.language),
            corpus: text(args.corpus),
            target_child: text(args.target_child),
            role: text(args.role),
            role_exclude: text(args.role_exclude),
            age: numbers(args.age),
            sex: text(args.sex),
        }
    }
}

#[derive(clap::Args, Debug)]
pub(crate) struct TokenArgs {
    /// LIKE patterns for the gloss (`%` any run, `_` one character)
    #[arg(long, required = true, value_delimiter = ',')]
    token: Vec<String>,
    #[command(flatten)]
    speakers: SpeakerArgs,
    #[arg(long, value_delimiter = ',')]
    stem: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    part_of_speech: Vec<String>,
    /// Report the transcribed gloss even where a replacement exists
    #[arg(long)]
    no_replace: bool,
}

impl From<TokenArgs> for TokenFilter {
    fn from(args: TokenArgs) -> Self {
        TokenFilter {
            token: FilterValue::from(args.token),
            speakers: args.speakers.into(),
            stem: text(args.stem),
            part_of_speech: text(args.part_of_speech),
            replace: !args.no_replace,
        }
    }
}

#[derive(clap::Args, Debug)]
pub(crate) struct TypeArgs {
    /// LIKE patterns for the type's gloss
    #[arg(long = "type", value_delimiter = ',')]
    type_pattern: Vec<String>,
    #[command(flatten)]
    speakers: SpeakerArgs,
}

impl From<TypeArgs> for TypeFilter {
    fn from(args: TypeArgs) -> Self {
        TypeFilter {
            type_pattern: text(args.type_pattern),
            speakers: args.speakers.into(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub(crate) struct ContextArgs {
    #[arg(long, required = true, value_delimiter = ',')]
    token: Vec<String>,
    #[command(flatten)]
    speakers: SpeakerArgs,
    /// Utterances to include BEFORE,AFTER each target
    #[arg(long, value_delimiter = ',', default_value = "0,0")]
    window: Vec<u32>,
    #[arg(long)]
    keep_duplicates: bool,
}

impl TryFrom<ContextArgs> for ContextFilter {
    type Error = ChildesDbError;

    fn try_from(args: ContextArgs) -> Result<Self, Self::Error> {
        let window = ContextWindow::try_from(&FilterValue::from(args.window))?;
        Ok(ContextFilter::new(args.token)
            .speakers(args.speakers.into())
            .window(window)
            .remove_duplicates(!args.keep_duplicates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connection_and_filters() {
        let args = Args::try_parse_from([
            "childes-db",
            "--sqlite",
            "mirror.sqlite3",
            "--format",
            "json",
            "participants",
            "--corpus",
            "Brown,Sachs",
            "--age",
            "24,36",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.connection.sqlite_options().is_some());
        let Command::Participants(filter) = args.command else {
            panic!("expected participants");
        };
        let filter = ParticipantFilter::from(filter);
        assert_eq!(filter.corpus, Some(FilterValue::from(["Brown", "Sachs"])));
        assert_eq!(filter.age, Some(FilterValue::Number(vec![24.0, 36.0])));
        assert_eq!(filter.role, None);
    }

    #[test]
    fn db_name_needs_a_host() {
        let args = Args::try_parse_from([
            "childes-db",
            "--host",
            "db.example.org",
            "--db-name",
            "childes_2020",
            "version",
        ])
        .unwrap();
        let opts = args.connection.connect_options();
        let db_args = opts.db_args.unwrap();
        assert_eq!(db_args.port, DEFAULT_PORT);
        assert_eq!(db_args.db_name.as_deref(), Some("childes_2020"));

        assert!(Args::try_parse_from(["childes-db", "--db-name", "x", "version"]).is_err());
    }

    #[test]
    fn context_window_is_validated() {
        let args = Args::try_parse_from([
            "childes-db",
            "contexts",
            "--token",
            "ball",
            "--window",
            "2",
        ])
        .unwrap();
        let Command::Contexts(ctx) = args.command else {
            panic!("expected contexts");
        };
        assert!(ContextFilter::try_from(ctx).is_err());
    }
}
