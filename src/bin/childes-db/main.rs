mod args;
mod output;

use std::process::ExitCode;

use childes_db::prelude::*;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Command, ConnectionArgs};
use crate::output::{Output, emit};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("childes_db=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, ChildesDbError> {
    let Args {
        connection,
        format,
        command,
    } = args;

    let output = match command {
        Command::Info => info_output(&connection).await?,
        Command::Check => {
            let ok = check(&connection).await;
            info!(reachable = ok, "connection check");
            return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
        command => {
            let conn = open(&connection).await?;
            let result = query(command, &conn).await;
            conn.close().await;
            result?
        }
    };

    emit(&output, format, std::io::stdout().lock())?;
    Ok(ExitCode::SUCCESS)
}

async fn open(args: &ConnectionArgs) -> Result<ChildesConnection, ChildesDbError> {
    match args.sqlite_options() {
        Some(opts) => ChildesConnection::open_sqlite(&opts).await,
        None => connect_to_childes(&args.connect_options()).await,
    }
}

async fn check(args: &ConnectionArgs) -> bool {
    match args.sqlite_options() {
        Some(opts) => check_sqlite_connection(&opts).await,
        None => check_connection(&args.connect_options()).await,
    }
}

async fn info_output(args: &ConnectionArgs) -> Result<Output, ChildesDbError> {
    let opts = args.connect_options();
    let manifest = HttpManifest::new(&opts.manifest_url, opts.connect_timeout)?;
    let db_info = manifest.fetch().await?;
    let resolved = translate_version(&opts.db_version, opts.db_args.as_ref(), &db_info);
    Ok(Output::Json(serde_json::json!({
        "manifest_url": manifest.url(),
        "host": db_info.host,
        "current": db_info.current,
        "supported": db_info.supported,
        "historical": db_info.historical,
        "requested": opts.db_version,
        "resolved": resolved,
    })))
}

async fn query(command: Command, conn: &ChildesConnection) -> Result<Output, ChildesDbError> {
    let scope = QueryScope::with_connection(conn);
    let table = match command {
        Command::Version => return get_database_version(&scope).await.map(Output::Text),
        Command::Collections => get_collections(&scope).await?,
        Command::Corpora => get_corpora(&scope).await?,
        Command::Transcripts(args) => get_transcripts(&args.into(), &scope).await?,
        Command::Participants(args) => get_participants(&args.into(), &scope).await?,
        Command::SpeakerStats(args) => get_speaker_statistics(&args.into(), &scope).await?,
        Command::Tokens(args) => get_tokens(&args.into(), &scope).await?,
        Command::Types(args) => get_types(&args.into(), &scope).await?,
        Command::Utterances(args) => get_utterances(&args.into(), &scope).await?,
        Command::Contexts(args) => get_contexts(&ContextFilter::try_from(args)?, &scope).await?,
        Command::Sql { query } => get_sql_query(&query, &scope).await?,
        Command::Info | Command::Check => {
            return Err(ChildesDbError::Other(
                "info and check do not query the database".into(),
            ));
        }
    };
    Ok(Output::Table(table))
}
