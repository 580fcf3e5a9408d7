//! CLI struct definitions for the `sre-checkpoint` binary.
//!
//! All clap-derived types live here. Dispatch lives in `lib.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "sre-checkpoint",
    version = env!("CARGO_PKG_VERSION"),
    about = "Audit app metadata and file a ticket for every missing or invalid field."
)]
pub(crate) struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[clap(long, short = 'v', global = true)]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Run the checkpoint for one or more apps.
    Run(RunCli),
    /// List the metadata fields checked, in check order.
    Fields(FieldsCli),
}

#[derive(clap::Args, Debug)]
pub(crate) struct RunCli {
    /// Inventory JSON holding apps and Jira boards.
    #[clap(long)]
    pub inventory: PathBuf,
    /// Parent ticket every new ticket is linked to (e.g. SRE-123).
    #[clap(long)]
    pub parent: String,
    /// App name to check; repeat for several. All apps when omitted.
    #[clap(long = "app")]
    pub apps: Vec<String>,
    /// Render tickets into the log instead of filing them.
    #[clap(long)]
    pub dry_run: bool,
    /// Project name to file under. Only used together with --board-path.
    #[clap(long)]
    pub board_name: Option<String>,
    /// Inventory path of the board to file against. Only used together with --board-name.
    #[clap(long)]
    pub board_path: Option<String>,
    /// Settings file (defaults to ./checkpoint.toml when present).
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Ticket template; overrides the one in the settings.
    #[clap(long)]
    pub template: Option<PathBuf>,
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}

#[derive(clap::Args, Debug)]
pub(crate) struct FieldsCli {
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}
