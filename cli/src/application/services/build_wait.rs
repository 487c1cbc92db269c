//! Build waiter: blocks a workflow until the head commit's CI build succeeds.
//!
//! The repository's row in the strategy table decides where the result is
//! read from (status context, check run, or the Jenkins job linked from a
//! status). The pull request is re-read from the store on every tick so a
//! push during the wait moves the waiter to the new head commit.

use anyhow::Result;
use spinwick_common::PullRequestRef;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::application::ports::{BuildStatusSource, JenkinsApi, PullRequestStore};
use crate::application::services::poll::{is_retryable, with_deadline};
use crate::application::services::{refresh_pull_request, repository_for};
use crate::domain::build::{self, BuildSignal, BuildVerdict};
use crate::domain::{CiMechanism, RepositoryConfig, SpinwickConfig};

/// Wait until the build of the pull request's head commit succeeds.
///
/// Waits one interval before each check. Returns the refreshed pull request.
///
/// # Errors
///
/// Fails with `BuildFailed` or `UnknownBuildStatus` on a terminal verdict and
/// with `Timeout` when the build stage deadline elapses.
pub async fn wait_for_build<B>(
    backend: &B,
    config: &SpinwickConfig,
    pr: &PullRequestRef,
) -> Result<PullRequestRef>
where
    B: BuildStatusSource + JenkinsApi + PullRequestStore,
{
    let repo = repository_for(config, pr)?;
    let timing = config.timing.build;
    info!(
        pr = %pr.display_name(),
        context = %repo.build_status_context,
        "waiting for build"
    );

    with_deadline("the build to finish", timing, async {
        let mut current = pr.clone();
        loop {
            sleep(timing.interval()).await;
            current = refresh_pull_request(backend, current).await?;

            let signal = match read_signal(backend, repo, &current).await {
                Ok(Some(signal)) => signal,
                Ok(None) => {
                    debug!(sha = %current.sha, "no build reported yet");
                    continue;
                }
                Err(e) if is_retryable(&e) => {
                    warn!(error = %format!("{e:#}"), "build status unavailable, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            };

            match build::verdict(&signal) {
                BuildVerdict::InProgress => {
                    debug!(status = %signal.status, "build in progress");
                }
                BuildVerdict::Succeeded => {
                    info!(sha = %current.sha, "build succeeded");
                    return Ok(current);
                }
                terminal => {
                    if let Some(err) = terminal.into_error() {
                        warn!(sha = %current.sha, error = %err, "build did not succeed");
                        return Err(err.into());
                    }
                }
            }
        }
    })
    .await
}

/// Wait until CI has registered a build for the head commit and return its
/// link. Checks immediately, then once per interval.
///
/// # Errors
///
/// Fails with `Timeout` when no link shows up within the build-link deadline.
pub async fn resolve_build_link<B>(
    backend: &B,
    config: &SpinwickConfig,
    pr: &PullRequestRef,
) -> Result<String>
where
    B: BuildStatusSource,
{
    let repo = repository_for(config, pr)?;
    let timing = config.timing.build_link;

    with_deadline("the build to be registered", timing, async {
        loop {
            match fetch_link(backend, repo, pr).await {
                Ok(Some(link)) => {
                    info!(%link, "build link resolved");
                    return Ok(link);
                }
                Ok(None) => debug!(sha = %pr.sha, "build not registered yet"),
                Err(e) if is_retryable(&e) => {
                    warn!(error = %format!("{e:#}"), "build status unavailable, retrying");
                }
                Err(e) => return Err(e),
            }
            sleep(timing.interval()).await;
        }
    })
    .await
}

async fn fetch_link(
    backend: &impl BuildStatusSource,
    repo: &RepositoryConfig,
    pr: &PullRequestRef,
) -> Result<Option<String>> {
    let (statuses, runs) = match repo.ci {
        CiMechanism::CheckRun => (
            Vec::new(),
            backend
                .check_runs(&pr.repo_owner, &pr.repo_name, &pr.sha)
                .await?,
        ),
        CiMechanism::StatusApi | CiMechanism::Jenkins { .. } => (
            backend
                .commit_statuses(&pr.repo_owner, &pr.repo_name, &pr.sha)
                .await?,
            Vec::new(),
        ),
    };
    Ok(build::build_link(
        &repo.ci,
        &repo.build_status_context,
        &statuses,
        &runs,
    ))
}

async fn read_signal<B>(
    backend: &B,
    repo: &RepositoryConfig,
    pr: &PullRequestRef,
) -> Result<Option<BuildSignal>>
where
    B: BuildStatusSource + JenkinsApi,
{
    let context = repo.build_status_context.as_str();
    match &repo.ci {
        CiMechanism::StatusApi => {
            let statuses = backend
                .commit_statuses(&pr.repo_owner, &pr.repo_name, &pr.sha)
                .await?;
            Ok(build::signal_from_statuses(&statuses, context))
        }
        CiMechanism::CheckRun => {
            let runs = backend
                .check_runs(&pr.repo_owner, &pr.repo_name, &pr.sha)
                .await?;
            Ok(build::signal_from_check_runs(&runs, context))
        }
        CiMechanism::Jenkins { server, folder } => {
            let statuses = backend
                .commit_statuses(&pr.repo_owner, &pr.repo_name, &pr.sha)
                .await?;
            // The status for the current head wins over a link stored for an
            // older commit.
            let link = build::signal_from_statuses(&statuses, context)
                .and_then(|s| s.link)
                .or_else(|| pr.build_link.clone());
            let Some(link) = link else {
                return Ok(None);
            };
            let job = build::parse_job_link(&link, folder)?;
            let run = backend.jenkins_build(server, &job).await?;
            Ok(Some(build::signal_from_jenkins(&run, Some(link))))
        }
    }
}
