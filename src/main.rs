//! Phasegate - phase-gated TDD workflow hooks for autonomous coding agents.
//!
//! The binary is the host-facing surface: `phasegate hook <kind>` reads one
//! JSON payload from stdin and writes the JSON response to stdout, and
//! `phasegate status` prints a human-readable snapshot of the workflow.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use phasegate::hooks::{dispatch, DispatchOptions, HookEvent, HookKind, HookResponse};
use phasegate::paths::{self, AgentsLayout};
use phasegate::store::StateStore;
use phasegate::todo::{self, TodoStatus};

#[derive(Parser)]
#[command(name = "phasegate")]
#[command(version)]
#[command(about = "Phase-gated TDD workflow hooks for autonomous coding agents", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory (defaults to transcript/cwd resolution)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one hook event: JSON payload on stdin, JSON response on stdout
    Hook {
        /// Event kind to handle
        #[arg(value_enum)]
        kind: HookKind,

        /// Synchronize state only; never block stop-class events
        #[arg(long)]
        sync_only: bool,
    },

    /// Print a snapshot of the workflow state and todo queue
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is reserved for hook responses.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Hook { kind, sync_only } => run_hook(kind, cli.project, sync_only),
        Commands::Status => run_status(cli.project),
    }
}

/// Reads the payload, dispatches, and prints the response.
///
/// A hook host must never be failed by an internal fault, so every error
/// path degrades to the neutral `{}` response and exit code 0.
fn run_hook(kind: HookKind, project: Option<PathBuf>, sync_only: bool) -> anyhow::Result<()> {
    let mut raw = String::new();
    if std::io::stdin().read_to_string(&mut raw).is_err() {
        raw.clear();
    }
    if raw.trim().is_empty() {
        raw = "{}".to_string();
    }

    let response = match HookEvent::from_json(kind, &raw) {
        Ok(event) => dispatch(
            event,
            &DispatchOptions {
                project,
                sync_only,
            },
        ),
        Err(e) => {
            warn!("Undecodable payload: {}. Responding neutrally.", e);
            HookResponse::allow()
        }
    };

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

/// Prints the workflow snapshot for a project.
fn run_status(project: Option<PathBuf>) -> anyhow::Result<()> {
    let root = project
        .or_else(|| paths::resolve_project_root(None, None))
        .unwrap_or_else(|| PathBuf::from("."));
    let layout = AgentsLayout::new(&root);

    println!("{} {}", "Workflow:".bold(), root.display());

    let state = StateStore::new(layout.clone()).load()?;
    match &state {
        Some(state) => {
            let phase = state
                .current_phase
                .map_or_else(|| "idle".to_string(), |p| p.to_string());
            println!("  {} {}", "Phase:".bold(), phase.cyan());
            match &state.current_work_item {
                Some(item) => println!("  {} {}", "Work item:".bold(), item.green()),
                None => println!("  {} {}", "Work item:".bold(), "none".dimmed()),
            }
            if let Some(target) = &state.work_until {
                println!("  {} {}", "Work until:".bold(), target.yellow());
            }
            println!(
                "  {} {} done / {} total",
                "Items:".bold(),
                state.stats.completed_items,
                state.stats.total_items
            );
        }
        None => println!("  {}", "No workflow state.".dimmed()),
    }

    let items = todo::read_todo_file(&layout.todo_file());
    if !items.is_empty() {
        println!("  {}", "Queue:".bold());
        for item in &items {
            let marker = match item.status {
                TodoStatus::InProgress => ">".green(),
                TodoStatus::UpNext => "-".normal(),
                TodoStatus::Completed => "x".dimmed(),
            };
            println!("    {} {} {}", marker, item.slug.bold(), item.description);
        }
    }

    Ok(())
}
