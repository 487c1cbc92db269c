//! `spinwick config`: show and check the configuration.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::app::AppContext;

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration file
    Check,
}

pub fn run(app: &AppContext, cmd: &ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => show(app),
        ConfigCommand::Check => Ok(check(app)),
    }
}

fn show(app: &AppContext) -> Result<ExitCode> {
    let config = app.config_store.load_unvalidated()?;
    let path = app.config_store.path()?;
    let yaml = serde_yaml::to_string(&config).context("serializing configuration")?;
    println!("# {}", path.display());
    print!("{yaml}");
    Ok(ExitCode::SUCCESS)
}

fn check(app: &AppContext) -> ExitCode {
    match app.config_store.load() {
        Ok(config) => {
            app.output.success(&format!(
                "Configuration is valid ({} repositories)",
                config.repositories.len()
            ));
            ExitCode::SUCCESS
        }
        Err(e) => {
            app.output.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
