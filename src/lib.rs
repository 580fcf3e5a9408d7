//! SRE checkpoint: audit app metadata, ticket what is wrong.
//!
//! Every app in the inventory declares metadata the SRE team relies on: SOPs,
//! architecture documents, dashboards and owners. A checkpoint walks those
//! fields, checks each one, and for every field that is missing or invalid
//! either files a ticket on the app's board or, in a dry run, logs the ticket
//! it would have filed.
//!
//! # Architecture
//!
//! - [`core::validate`]: field validators and the ordered registry
//! - [`core::board`]: destination board resolution with operator overrides
//! - [`core::render`]: ticket body templates
//! - [`core::reconcile`]: the per-app loop tying it all together
//! - [`plugins`]: HTTP probe, Jira client and file inventory
//!
//! # Examples
//!
//! ```bash
//! # See what would be filed for one app
//! sre-checkpoint run --inventory inventory.json --parent SRE-1 --app foo --dry-run
//!
//! # File tickets for every app, redirecting them to another board
//! sre-checkpoint run --inventory inventory.json --parent SRE-1 \
//!     --board-path /teams/sre/jira/SRE.yml --board-name SREP
//! ```

pub mod cli;
pub mod core;
pub mod plugins;

use crate::cli::{Cli, Command, FieldsCli, RunCli};
use crate::core::board::BoardOverride;
use crate::core::config;
use crate::core::error::CheckpointError;
use crate::core::model::AppRecord;
use crate::core::output;
use crate::core::reconcile::{FieldOutcome, Mode, ReconcileReport, Reconciler};
use crate::core::render::TicketRenderer;
use crate::core::validate::{HttpProbe, ValidatorRegistry};
use crate::plugins::inventory::FileInventory;
use crate::plugins::jira::JiraConnector;
use crate::plugins::probe::UreqProbe;

use clap::Parser;
use colored::Colorize;
use serde_json::Value;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parses the command line and runs it. Returns `Ok(false)` when the run
/// completed but at least one app could not be fully reported.
pub fn run() -> Result<bool, CheckpointError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => run_checkpoint(args),
        Command::Fields(args) => {
            print_fields(&args)?;
            Ok(true)
        }
    }
}

fn print_fields(args: &FieldsCli) -> Result<(), CheckpointError> {
    let probe: Arc<dyn HttpProbe> = Arc::new(UreqProbe::default());
    let registry = ValidatorRegistry::standard(probe);
    if args.format == "json" {
        let fields: Vec<&str> = registry.fields().collect();
        println!("{}", serde_json::to_string_pretty(&fields)?);
    } else {
        for field in registry.fields() {
            println!("{}", field);
        }
    }
    Ok(())
}

fn run_checkpoint(args: RunCli) -> Result<bool, CheckpointError> {
    let settings = config::load_settings(args.config.as_deref())?;
    let inventory = FileInventory::load(&args.inventory)?;

    let renderer = args
        .template
        .clone()
        .or_else(|| settings.template.clone())
        .map(TicketRenderer::new)
        .unwrap_or_default();
    let probe: Arc<dyn HttpProbe> = Arc::new(UreqProbe::new(&settings.probe));
    let registry = ValidatorRegistry::standard(probe);
    let connector = JiraConnector::new(settings.jira.clone());
    let mode = if args.dry_run {
        Mode::DryRun
    } else {
        Mode::Live(&connector)
    };
    let reconciler = Reconciler::new(&registry, &renderer, &inventory, &args.parent, mode)
        .with_overrides(BoardOverride::new(
            args.board_name.as_deref(),
            args.board_path.as_deref(),
        ));

    let mut clean = true;
    let targets: Vec<(&str, &Value)> = if args.apps.is_empty() {
        inventory.apps().collect()
    } else {
        let (found, missing) = inventory.select_apps(&args.apps);
        for e in missing {
            clean = false;
            tracing::error!(error = %e, "skipping unknown app");
            if args.format != "json" {
                println!("checkpoint: {} error={}", "ABORTED".red(), e);
            }
        }
        found
    };
    tracing::info!(
        apps = targets.len(),
        dry_run = args.dry_run,
        template = %renderer.template().display(),
        "checkpoint starting"
    );

    for (path, app) in targets {
        let name = AppRecord::new(app).name();
        match reconciler.reconcile(app, path) {
            Ok(report) => {
                print_report(&report, &args.format)?;
                if report.filing_failures() > 0 {
                    clean = false;
                }
            }
            // A broken template breaks every app alike.
            Err(e @ CheckpointError::TemplateError(_)) => return Err(e),
            Err(e) => {
                clean = false;
                if e.is_board_error() {
                    tracing::error!(app = name, path, error = %e, "skipping app, nowhere to file tickets");
                } else {
                    tracing::error!(app = name, path, error = %e, "checkpoint aborted for app");
                }
                if args.format != "json" {
                    println!("checkpoint: app={} {} error={}", name, "ABORTED".red(), e);
                }
            }
        }
    }
    Ok(clean)
}

fn print_report(report: &ReconcileReport, format: &str) -> Result<(), CheckpointError> {
    if format == "json" {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    let bad = report.bad_fields();
    let status = if bad.is_empty() {
        "PASS".green()
    } else {
        "FAIL".red()
    };
    println!(
        "checkpoint: app={} path={} mode={} board={} bad={} filed={} rendered={} {}",
        report.app,
        report.app_path,
        if report.dry_run { "dry-run" } else { "live" },
        report.board.as_ref().map_or("-", |b| b.name.as_str()),
        bad.len(),
        report.filed().len(),
        report.rendered_count(),
        status
    );
    if !bad.is_empty() {
        println!("checkpoint: bad fields: {}", output::preview_list(&bad, 4));
    }
    for outcome in &report.outcomes {
        match outcome {
            FieldOutcome::Filed { summary, issue, .. } => {
                println!("checkpoint: filed {} {}", issue, summary);
            }
            FieldOutcome::FilingFailed { summary, error, .. } => {
                println!("checkpoint: {} {} ({})", "NOT FILED".yellow(), summary, error);
            }
            FieldOutcome::Passed { .. } | FieldOutcome::Rendered { .. } => {}
        }
    }
    Ok(())
}
