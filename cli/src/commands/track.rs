//! `spinwick track` records a pull request snapshot.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use spinwick_common::PullRequestRef;

use crate::app::AppContext;
use crate::application::ports::PullRequestStore;
use crate::infra::store::JsonFileStore;

#[derive(Args, Debug)]
pub struct TrackArgs {
    /// Repository owner
    #[arg(long)]
    pub owner: String,
    /// Repository name
    #[arg(long)]
    pub repo: String,
    /// Pull request number
    #[arg(long)]
    pub number: u64,
    /// Head commit hash
    #[arg(long)]
    pub sha: String,
    /// Head branch
    #[arg(long)]
    pub branch: String,
    /// Label on the pull request (repeatable)
    #[arg(long = "label")]
    pub labels: Vec<String>,
    /// Link to the CI build of the head commit
    #[arg(long)]
    pub build_link: Option<String>,
}

impl TrackArgs {
    fn into_pull_request(self) -> PullRequestRef {
        PullRequestRef {
            repo_owner: self.owner,
            repo_name: self.repo,
            number: self.number,
            sha: self.sha,
            branch: self.branch,
            labels: self.labels,
            build_link: self.build_link,
        }
    }
}

/// Save the snapshot, replacing any earlier one for the same pull request.
pub async fn run(app: &AppContext, args: TrackArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let store = JsonFileStore::from_config(&config)?;
    let pr = args.into_pull_request();

    if let Err(e) = pr.installation_version() {
        app.output.warn(&format!("{e}; workflows will fail for this commit"));
    }
    store.save_pull_request(&pr).await?;
    app.output
        .success(&format!("Tracking {} at {}", pr.display_name(), pr.sha));
    Ok(ExitCode::SUCCESS)
}
