//! Todoist Sorter - learns which section each task belongs to and files new tasks there.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use todoist_sorter::config::{SorterConfig, ENV_LOG_LEVEL};
use todoist_sorter::service::{spawn_webhook_worker, AppState, WebhookServer, DEFAULT_QUEUE_CAPACITY};
use todoist_sorter::sorter::{run_periodic, Sorter};
use todoist_sorter::{build_sorter, Error};

#[derive(Parser)]
#[command(
    name = "todoist-sorter",
    about = "Files new Todoist tasks into the section they were last seen in",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv) when LOG_LEVEL is not set
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve webhooks and reconcile in the background (default).
    Serve,
    /// Run a single reconciliation pass.
    Reconcile,
    /// Print the remembered section for a task title.
    Lookup {
        /// Task title; case does not matter.
        title: String,
    },
    /// Fetch one task and sort it.
    Sort {
        /// Todoist task id.
        task_id: String,
    },
    /// List every remembered placement.
    Memory,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match SorterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration, exiting");
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command.unwrap_or(Commands::Serve), config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: SorterConfig) -> Result<(), Error> {
    let sorter = build_sorter(&config).await?;

    match command {
        Commands::Serve => serve(sorter, &config).await,
        Commands::Reconcile => {
            let report = sorter.reconcile().await?;
            println!(
                "seen {} | renamed {} | inserted {} | updated {} | moved {} | failed {}",
                report.seen,
                report.renamed,
                report.inserted,
                report.updated,
                report.moved,
                report.failed
            );
            Ok(())
        }
        Commands::Lookup { title } => {
            match sorter.store().lookup(&title).await? {
                Some(section) => println!("{section}"),
                None => println!("No section remembered for {title:?}"),
            }
            Ok(())
        }
        Commands::Sort { task_id } => {
            let outcome = sorter.sort_task(&task_id).await?;
            println!(
                "renamed to: {:?} | learned: {:?} | moved to: {:?}",
                outcome.renamed_to, outcome.learned, outcome.moved_to
            );
            Ok(())
        }
        Commands::Memory => {
            for record in sorter.store().records().await? {
                println!(
                    "{}\t{}\t{}",
                    record.section_id, record.last_updated, record.normalized_content
                );
            }
            Ok(())
        }
    }
}

async fn serve(sorter: Sorter, config: &SorterConfig) -> Result<(), Error> {
    let cancel = CancellationToken::new();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
        }
        shutdown.cancel();
    });

    let (events, worker) =
        spawn_webhook_worker(sorter.clone(), DEFAULT_QUEUE_CAPACITY, cancel.clone());

    let reconciler = {
        let sorter = sorter.clone();
        let cancel = cancel.clone();
        match config.reconcile_interval {
            Some(interval) => tokio::spawn(run_periodic(sorter, interval, cancel)),
            None => tokio::spawn(async move {
                tokio::select! {
                    () = cancel.cancelled() => {}
                    result = sorter.reconcile() => {
                        if let Err(e) = result {
                            tracing::error!(error = %e, "Startup reconciliation failed");
                        }
                    }
                }
            }),
        }
    };

    tracing::info!(project_id = sorter.project_id(), "Serving Todoist webhooks");
    let result = WebhookServer::new(AppState::new(sorter, events))
        .with_config(config.server.clone())
        .run(cancel.clone())
        .await;

    cancel.cancel();
    if let Err(e) = worker.await {
        tracing::warn!(error = %e, "Webhook worker ended abnormally");
    }
    if let Err(e) = reconciler.await {
        tracing::warn!(error = %e, "Reconciler ended abnormally");
    }

    Ok(result?)
}
