//! `tablesync` - push JSON records into remote document tables.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tablesync_client::commands::{self, Context, SyncRequest};
use tablesync_client::{ClientError, Config};
use tablesync_engine::{FilterSpec, RowId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tablesync", version, about = "Sync JSON records into remote document tables")]
struct Args {
    /// Document id (overrides TABLESYNC_DOC)
    #[arg(long, global = true)]
    doc: Option<String>,

    /// Server base URL (overrides TABLESYNC_SERVER)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Rows per request (overrides TABLESYNC_BATCH_SIZE)
    #[arg(long, global = true)]
    batch_size: Option<NonZeroUsize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert or update records so the table matches the input
    Sync {
        table: String,
        /// Column identifying a record; repeat for compound keys
        #[arg(long = "key", short = 'k', required = true)]
        keys: Vec<String>,
        /// JSON object of column to allowed values
        #[arg(long, value_parser = parse_filter)]
        filter: Option<FilterSpec>,
        /// Plan and log the changes without writing
        #[arg(long)]
        dry_run: bool,
        /// JSON array of records; stdin when omitted
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Print the rows of a table
    Fetch {
        table: String,
        #[arg(long, value_parser = parse_filter)]
        filter: Option<FilterSpec>,
    },
    /// Insert records and print their new ids
    Add {
        table: String,
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Update records by their `id` column
    Update {
        table: String,
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Delete rows by id
    Delete {
        table: String,
        #[arg(required = true)]
        ids: Vec<RowId>,
    },
    /// List organisations
    Orgs,
    /// List the workspaces of an organisation
    Workspaces { org: String },
    /// List the document's tables, or the columns of one table
    Tables { table: Option<String> },
}

fn parse_filter(raw: &str) -> Result<FilterSpec, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid filter: {e}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tablesync=info,tablesync_client=info,tablesync_engine=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    match run(args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<String, ClientError> {
    let mut config = Config::from_env()?;
    if let Some(doc) = args.doc {
        config.doc_id = Some(doc);
    }
    if let Some(server) = args.server {
        config.server = server;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    tracing::debug!(?config, "loaded configuration");

    let ctx = Context::from_config(&config)?;
    let output = match args.command {
        Command::Sync {
            table,
            keys,
            filter,
            dry_run,
            input,
        } => {
            let request = SyncRequest {
                table,
                key_columns: keys,
                filter,
                dry_run,
                input,
            };
            commands::sync(&ctx, request).await?
        }
        Command::Fetch { table, filter } => commands::fetch(&ctx, &table, filter.as_ref()).await?,
        Command::Add { table, input } => commands::add(&ctx, &table, input.as_deref()).await?,
        Command::Update { table, input } => {
            commands::update(&ctx, &table, input.as_deref()).await?
        }
        Command::Delete { table, ids } => commands::delete(&ctx, &table, &ids).await?,
        Command::Orgs => commands::orgs(&ctx).await?,
        Command::Workspaces { org } => commands::workspaces(&ctx, &org).await?,
        Command::Tables { table } => commands::tables(&ctx, table.as_deref()).await?,
    };

    Ok(serde_json::to_string_pretty(&output)?)
}
