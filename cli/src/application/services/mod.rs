//! Application services: use-case orchestration.
//!
//! Each service module implements one stage of the review-environment
//! lifecycle by composing domain logic with port trait calls. Services import
//! only from `crate::domain` and `crate::application::ports`, never from
//! `crate::infra`, `crate::commands`, or `crate::output`.

pub mod bootstrap;
pub mod build_wait;
pub mod cluster;
pub mod image_wait;
pub mod installation;
pub mod lifecycle;
pub mod poll;

#[cfg(test)]
pub(crate) mod test_support;

use anyhow::{Context, Result};
use spinwick_common::PullRequestRef;
use tracing::warn;

use crate::application::ports::{Notifier, PullRequestStore};
use crate::domain::{RepositoryConfig, SpinwickConfig, SpinwickError};

/// Strategy table row for the pull request's repository.
pub(crate) fn repository_for<'a>(
    config: &'a SpinwickConfig,
    pr: &PullRequestRef,
) -> Result<&'a RepositoryConfig> {
    config
        .repository(&pr.repo_owner, &pr.repo_name)
        .ok_or_else(|| {
            SpinwickError::RepositoryNotConfigured {
                owner: pr.repo_owner.clone(),
                repo: pr.repo_name.clone(),
            }
            .into()
        })
}

/// Latest stored state of `current`, or `current` itself when nothing newer
/// is stored.
pub(crate) async fn refresh_pull_request(
    store: &impl PullRequestStore,
    current: PullRequestRef,
) -> Result<PullRequestRef> {
    let latest = store
        .get_pull_request(&current.repo_owner, &current.repo_name, current.number)
        .await
        .context("refreshing pull request")?;
    Ok(latest.unwrap_or(current))
}

/// Post a comment. Failures are logged and swallowed: a lost comment never
/// changes the workflow outcome.
pub(crate) async fn comment(notifier: &impl Notifier, pr: &PullRequestRef, body: &str) {
    if let Err(e) = notifier.post_comment(pr, body).await {
        warn!(pr = %pr.display_name(), error = %format!("{e:#}"), "failed to post comment");
    }
}
