//! Command line front end for the investor board
//!
//! Each invocation opens the configured project, applies one action and, for
//! mutating actions, saves explicitly before exiting.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::task::JoinHandle;

use board::{
    core::{actions, layout::visible_statuses, InsertSide},
    services::{ChannelNotifier, LogNotifier, RealRemoteStore, SyncClient},
    Board, BoardConfig, CoordinatorSettings, DropTarget, RemoteSync, SharedNotifier, TransitionOutcome,
};
use shared::{component_debug, logging, logging::Component, InvestorStatus, ProjectId, RecordId};

/// Investor outreach board backed by a remote JSON store
#[derive(Parser)]
#[command(name = "board")]
#[command(about = "Track investor opportunities through a six-stage pipeline")]
pub struct Args {
    /// Project id (overrides BOARD_PROJECT_ID)
    #[arg(long, short)]
    pub project: Option<String>,

    /// Remote store URL (overrides BOARD_STORE_URL)
    #[arg(long)]
    pub store_url: Option<String>,

    /// Metadata update URL (overrides BOARD_METADATA_URL)
    #[arg(long)]
    pub metadata_url: Option<String>,

    /// Read directly from the store instead of through the read proxy
    #[arg(long)]
    pub no_proxy: bool,

    /// Auto-save debounce in milliseconds (overrides BOARD_DEBOUNCE_MS)
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Route notices to the log instead of stdout
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the board column by column
    Show {
        #[arg(long, short)]
        query: Option<String>,
        #[arg(long)]
        hide_dropped: bool,
    },
    /// Move a record to another column
    Move {
        id: String,
        #[arg(value_parser = parse_status)]
        status: InvestorStatus,
    },
    /// Reorder a record relative to another record of the same column
    Reorder {
        id: String,
        /// Record to place it next to
        target: String,
        /// Insert after the target instead of before it
        #[arg(long)]
        after: bool,
    },
    /// Send a record to the "Drop definitivo" column
    Drop { id: String },
    /// Delete a record permanently
    Delete { id: String },
    /// Add a record at the top of a column
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_status, default_value = "Da contattare")]
        status: InvestorStatus,
        #[arg(long = "type", default_value = "")]
        kind: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Replace the board with rows from a JSON sheet export
    Import { file: PathBuf },
    /// Write the board to <project>.json
    Export {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Save the loaded board back to the store
    Save,
    /// Print pipeline statistics
    Summary,
}

fn parse_status(input: &str) -> Result<InvestorStatus, String> {
    input.parse().map_err(|e: shared::SharedError| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_tracing_with_level(Some(&args.log_level));

    let mut config = BoardConfig::from_env().context("Invalid board configuration")?;
    if let Some(project) = &args.project {
        config.project = Some(ProjectId::parse(project)?);
    }
    if let Some(url) = &args.store_url {
        config.store_url = url.clone();
    }
    if let Some(url) = &args.metadata_url {
        config.metadata_url = url.clone();
    }
    if args.no_proxy {
        config.read_proxy = None;
    }
    if let Some(ms) = args.debounce_ms {
        config.debounce = Duration::from_millis(ms);
    }
    component_debug!(Component::Cli, "Configuration: {:?}", config);
    logging::log_startup(
        Component::Cli,
        &format!("board for project {}", config.project.as_ref().map_or("<none>", ProjectId::as_str)),
    );

    let (notifier, printer): (SharedNotifier, Option<JoinHandle<()>>) = if args.quiet {
        (Arc::new(LogNotifier) as SharedNotifier, None)
    } else {
        let (notifier, mut notices) = ChannelNotifier::new();
        let printer = tokio::spawn(async move {
            while let Some(notice) = notices.recv().await {
                println!("{notice}");
            }
        });
        (Arc::new(notifier) as SharedNotifier, Some(printer))
    };

    let store = RealRemoteStore::new(&config)?;
    let sync = Arc::new(SyncClient::new(store, Arc::clone(&notifier), config.retry));
    let mut board = Board::new(sync, Arc::clone(&notifier), CoordinatorSettings { debounce: config.debounce });
    drop(notifier);

    board.open_project(config.project.clone()).await?;
    let result = run_command(&mut board, args.command).await;

    board.close().await;
    match &result {
        Ok(()) => logging::log_success(Component::Cli, "command completed"),
        Err(error) => logging::log_error(Component::Cli, "command", error),
    }
    logging::log_shutdown(Component::Cli, "session closed");
    if let Some(printer) = printer {
        let _ = tokio::time::timeout(Duration::from_secs(5), printer).await;
    }
    result
}

async fn run_command<R: RemoteSync + 'static>(board: &mut Board<R>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Show { query, hide_dropped } => {
            board.set_query(query.unwrap_or_default());
            board.set_show_dropped(!hide_dropped);
            print_board(board, !hide_dropped);
            return Ok(());
        }
        Command::Summary => {
            for count in board.status_counts() {
                println!("{:<16} {}", count.status.label(), count.count);
            }
            let summary = board.summary();
            println!("In pipeline: {}  Onboarded: {}  Dropped: {}", summary.in_progress, summary.onboarded, summary.dropped);
            println!("Committed: {:.0} - {:.0}", summary.committed_min, summary.committed_max);
            return Ok(());
        }
        Command::Export { dir } => {
            let path = board.export_to(&dir).await?;
            println!("{}", path.display());
            return Ok(());
        }
        Command::Save => {}
        Command::Move { id, status } => {
            expect_applied(board.drop_on(&RecordId::from(id), DropTarget::Column { status })?)?;
        }
        Command::Reorder { id, target, after } => {
            let target_id = RecordId::from(target);
            let Some(status) = board.record(&target_id).map(|record| record.status) else {
                bail!("record {target_id} not found");
            };
            let side = if after { InsertSide::After } else { InsertSide::Before };
            let target = DropTarget::Card { id: target_id, status, side };
            expect_applied(board.drop_on(&RecordId::from(id), target)?)?;
        }
        Command::Drop { id } => {
            expect_applied(board.drop_on(&RecordId::from(id), DropTarget::DeleteZone)?)?;
        }
        Command::Delete { id } => {
            board.delete_record(&RecordId::from(id))?;
        }
        Command::Add { name, status, kind, email } => {
            let mut record = actions::new_draft(status);
            record.name = name;
            record.kind = kind;
            record.email = email;
            board.save_record(record)?;
        }
        Command::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Unable to read {}", file.display()))?;
            let rows = actions::parse_rows(&text)?;
            board.import_rows(&rows).await?;
            // Import already saved
            return Ok(());
        }
    }

    if board.project().is_some() && !board.records().is_empty() {
        board.save_now().await?;
    }
    Ok(())
}

fn expect_applied(outcome: TransitionOutcome) -> anyhow::Result<()> {
    match outcome {
        TransitionOutcome::Applied(_) => Ok(()),
        TransitionOutcome::NoOp(reason) => bail!("nothing changed: {reason:?}"),
    }
}

fn print_board<R: RemoteSync + 'static>(board: &Board<R>, show_dropped: bool) {
    let layout = board.layout();
    for status in visible_statuses(show_dropped) {
        let Some(column) = layout.column(status) else {
            continue;
        };
        println!("== {} ({})", status.label(), column.cards.len());
        for card in &column.cards {
            if let Some(record) = board.record(&card.id) {
                println!("   {:<40} {}", record.name, record.id);
            }
        }
    }
}
