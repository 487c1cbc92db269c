//! Command implementations

pub mod config;
pub mod create;
pub mod destroy;
pub mod status;
pub mod track;
pub mod update;

use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Args;
use spinwick_common::PullRequestRef;

use crate::application::ports::PullRequestStore;
use crate::domain::WorkflowOutcome;

/// Identifies a tracked pull request.
#[derive(Args, Debug, Clone)]
pub struct PrArgs {
    /// Repository owner
    #[arg(long)]
    pub owner: String,
    /// Repository name
    #[arg(long)]
    pub repo: String,
    /// Pull request number
    #[arg(long)]
    pub number: u64,
}

/// The stored snapshot of a pull request recorded with `spinwick track`.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the pull request was never
/// tracked.
pub async fn load_tracked(store: &impl PullRequestStore, args: &PrArgs) -> Result<PullRequestRef> {
    match store
        .get_pull_request(&args.owner, &args.repo, args.number)
        .await?
    {
        Some(pr) => Ok(pr),
        None => bail!(
            "{}/{}#{} is not tracked; run `spinwick track` first",
            args.owner,
            args.repo,
            args.number
        ),
    }
}

/// Exit code 1 for failed and timed-out runs.
#[must_use]
pub fn exit_code(outcome: &WorkflowOutcome) -> ExitCode {
    if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
