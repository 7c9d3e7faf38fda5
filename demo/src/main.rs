//! signoff Purchasing Reference Runtime: Demo CLI
//!
//! Runs one or all of the purchasing scenarios. Each scenario seeds an
//! in-memory store from the purchasing catalog and drives purchase orders
//! through the approval engine.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- single-level
//!   cargo run -p demo -- multi-level
//!   cargo run -p demo -- rejection
//!   cargo run -p demo -- rollback
//!   cargo run -p demo -- branch-selection
//!   cargo run -p demo -- check-config path/to/engine.toml

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use signoff_contracts::{config::EngineConfig, error::SignoffResult};
use signoff_ref_purchasing::scenarios::{
    branch_selection, multi_level, rejection, rollback, single_level,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// signoff: multi-level approval engine purchasing demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "signoff purchasing reference runtime demo",
    long_about = "Runs signoff purchasing scenarios showing AND/OR steps, sequential\n\
                  levels, group approvers, rejection, rollback and branch selection."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all five purchasing scenarios in sequence.
    RunAll,
    /// Scenario 1: AND and OR steps on a single level.
    SingleLevel,
    /// Scenario 2: Sequential levels with a finance group.
    MultiLevel,
    /// Scenario 3: One rejection terminates the run.
    Rejection,
    /// Scenario 4: Rollback restarts the run from level 0.
    Rollback,
    /// Scenario 5: Statement conditions route each order.
    BranchSelection,
    /// Load an engine configuration file and print it.
    CheckConfig {
        /// Path to an engine configuration TOML file.
        path: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug to see statement evaluation and state transitions.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::SingleLevel => single_level::run_scenario(),
        Command::MultiLevel => multi_level::run_scenario(),
        Command::Rejection => rejection::run_scenario(),
        Command::Rollback => rollback::run_scenario(),
        Command::BranchSelection => branch_selection::run_scenario(),
        Command::CheckConfig { path } => check_config(path),
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_all() -> SignoffResult<()> {
    single_level::run_scenario()?;
    multi_level::run_scenario()?;
    rejection::run_scenario()?;
    rollback::run_scenario()?;
    branch_selection::run_scenario()?;
    Ok(())
}

fn check_config(path: PathBuf) -> SignoffResult<()> {
    let config = EngineConfig::from_file(&path)?;
    info!(path = %path.display(), "engine config loaded");

    println!("  principal kind:          {}", config.principal_kind);
    if config.excluded_subject_types.is_empty() {
        println!("  excluded subject types:  (none)");
    } else {
        println!("  excluded subject types:  {}", config.excluded_subject_types.join(", "));
    }
    println!();
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("signoff — Multi-level Approval Engine");
    println!("Purchasing Reference Demo");
    println!("=====================================");
    println!();
    println!("Per subject:");
    println!("  [1] The first matching statement of the bound approval is selected");
    println!("  [2] Its steps and approvers are copied into a run at level 0");
    println!("  [3] submit / reject / rollback drive the run, one transaction each");
    println!("  [4] AND steps wait for every approver, OR steps for any one");
    println!("  [5] A run ends APPROVED, REJECTED or ROLLBACK at its highest level");
    println!();
}
