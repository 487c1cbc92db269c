//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Ephemeral per-pull-request review environments
#[derive(Parser, Debug)]
#[command(
    name = "spinwick",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Configuration file (default: $SPINWICK_CONFIG or ~/.spinwick/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output (any non-empty `NO_COLOR` except "0"/"false")
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a pull request snapshot
    Track(commands::track::TrackArgs),

    /// Create the review environment of a pull request
    Create(commands::create::CreateArgs),

    /// Upgrade the environment to the tracked head commit
    Update(commands::PrArgs),

    /// Delete the environment of a pull request
    Destroy(commands::destroy::DestroyArgs),

    /// Show the recorded environment of a pull request
    Status(commands::status::StatusArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot run at all. Workflow failures
    /// are reported through the exit code instead.
    pub async fn run(self) -> Result<ExitCode> {
        let app = AppContext::new(AppFlags {
            no_color: self.no_color,
            config: self.config,
        });
        match self.command {
            Command::Track(args) => commands::track::run(&app, args).await,
            Command::Create(args) => commands::create::run(&app, args).await,
            Command::Update(args) => commands::update::run(&app, args).await,
            Command::Destroy(args) => commands::destroy::run(&app, args).await,
            Command::Status(args) => commands::status::run(&app, args).await,
            Command::Config(cmd) => commands::config::run(&app, &cmd),
        }
    }
}
