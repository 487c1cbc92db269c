//! Lifecycle controller: the per-pull-request create / update / destroy
//! workflows.
//!
//! Handlers never return errors. Every failure is logged, explained in one
//! pull request comment and folded into a [`WorkflowOutcome`]. At most one
//! workflow per pull request is expected to run at a time; the caller
//! serialises trigger events.

use std::time::Duration;

use anyhow::{Context, Result};
use spinwick_common::{InstallationRecord, PullRequestRef};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::application::ports::SpinwickBackend;
use crate::application::services::build_wait::{resolve_build_link, wait_for_build};
use crate::application::services::comment;
use crate::application::services::image_wait::wait_for_image;
use crate::application::services::installation::{create_installation, upgrade_installation};
use crate::domain::bootstrap::{EmailRelay, accounts_table};
use crate::domain::{SpinwickConfig, SpinwickError, WorkflowOutcome};

/// Sequences the provisioning services for pull request events.
pub struct LifecycleController<B> {
    config: SpinwickConfig,
    relay: EmailRelay,
    backend: B,
}

impl<B: SpinwickBackend> LifecycleController<B> {
    pub fn new(config: SpinwickConfig, relay: EmailRelay, backend: B) -> Self {
        Self {
            config,
            relay,
            backend,
        }
    }

    pub fn config(&self) -> &SpinwickConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Create the environment for a labelled pull request.
    ///
    /// Waits for a green build and the published image, creates the
    /// installation (HA size when the HA label is present) and records it.
    pub async fn handle_create(&self, pr: &PullRequestRef) -> WorkflowOutcome {
        info!(pr = %pr.display_name(), sha = %pr.sha, "create requested");
        match self.create(pr).await {
            Ok(outcome) => outcome,
            Err(e) => self.fail(pr, &e).await,
        }
    }

    /// Upgrade the environment of a pull request to its new head commit.
    ///
    /// A pull request without a recorded environment is skipped with an
    /// error log only; no comment is posted.
    pub async fn handle_update(&self, pr: &PullRequestRef) -> WorkflowOutcome {
        if !pr
            .labels
            .iter()
            .any(|l| self.config.labels.is_environment_label(l))
        {
            info!(pr = %pr.display_name(), "no environment label, ignoring push");
            return WorkflowOutcome::Skipped {
                reason: "pull request has no environment label".to_string(),
            };
        }
        info!(pr = %pr.display_name(), sha = %pr.sha, "update requested");
        match self.update(pr).await {
            Ok(outcome) => outcome,
            Err(e) => self.fail(pr, &e).await,
        }
    }

    /// Delete the remote installation, then the record.
    ///
    /// Both deletions are best effort, so calling this again for an already
    /// destroyed environment ends in the same state.
    pub async fn handle_destroy(
        &self,
        pr: &PullRequestRef,
        installation_id: &str,
    ) -> WorkflowOutcome {
        info!(pr = %pr.display_name(), %installation_id, "destroy requested");
        if let Err(e) = self.backend.delete_installation(installation_id).await {
            warn!(%installation_id, error = %format!("{e:#}"), "deleting installation failed");
        }
        if let Err(e) = self.backend.delete_record(pr.number).await {
            warn!(pr = %pr.display_name(), error = %format!("{e:#}"), "deleting record failed");
        }
        info!(pr = %pr.display_name(), %installation_id, "environment destroyed");
        WorkflowOutcome::CompletedSuccess {
            installation_id: installation_id.to_string(),
        }
    }

    async fn create(&self, pr: &PullRequestRef) -> Result<WorkflowOutcome> {
        let pr = wait_for_build(&self.backend, &self.config, pr).await?;
        let pr = wait_for_image(&self.backend, &self.config, &pr).await?;

        if let Some(existing) = self
            .backend
            .get_record(pr.number)
            .await
            .context("looking up installation record")?
        {
            info!(
                pr = %pr.display_name(),
                installation_id = %existing.installation_id,
                "environment already exists"
            );
            return Ok(WorkflowOutcome::Skipped {
                reason: format!("installation {} already exists", existing.installation_id),
            });
        }

        let sizes = &self.config.sizes;
        let size = if pr.has_label(&self.config.labels.setup_ha) {
            &sizes.installation_ha
        } else {
            &sizes.installation
        };
        let installation_id =
            create_installation(&self.backend, &self.config, &self.relay, &pr, size).await?;

        let record = InstallationRecord::new(&pr, installation_id.as_str());
        if let Err(e) = self.backend.save_record(&record).await {
            if let Err(delete_err) = self.backend.delete_installation(&installation_id).await {
                warn!(
                    %installation_id,
                    error = %format!("{delete_err:#}"),
                    "could not delete untracked installation"
                );
            }
            return Err(e.context("saving installation record"));
        }

        let url = format!("https://{}", pr.dns_name(&self.config.dns_base_domain));
        info!(pr = %pr.display_name(), %installation_id, %url, "environment ready");
        comment(
            &self.backend,
            &pr,
            &format!(
                "Test server created! :tada:\n\nAccess here: {url}\n\n{}",
                accounts_table()
            ),
        )
        .await;
        Ok(WorkflowOutcome::CompletedSuccess { installation_id })
    }

    async fn update(&self, pr: &PullRequestRef) -> Result<WorkflowOutcome> {
        sleep(Duration::from_secs(
            self.config.timing.build_registration_secs,
        ))
        .await;

        let link = resolve_build_link(&self.backend, &self.config, pr).await?;
        let mut pr = pr.clone();
        pr.build_link = Some(link);
        if let Err(e) = self.backend.save_pull_request(&pr).await {
            warn!(pr = %pr.display_name(), error = %format!("{e:#}"), "could not store build link");
        }

        if self.record(&pr).await?.is_none() {
            return Ok(missing_record(&pr));
        }
        comment(&self.backend, &pr, &self.config.messages.new_commit).await;

        let pr = wait_for_build(&self.backend, &self.config, &pr).await?;
        let pr = wait_for_image(&self.backend, &self.config, &pr).await?;

        // Re-read: the environment may have been destroyed during the waits.
        let Some(record) = self.record(&pr).await? else {
            return Ok(missing_record(&pr));
        };
        upgrade_installation(&self.backend, &self.config, &record.installation_id, &pr).await?;

        let url = format!("https://{}", pr.dns_name(&self.config.dns_base_domain));
        info!(
            pr = %pr.display_name(),
            installation_id = %record.installation_id,
            "environment upgraded"
        );
        comment(
            &self.backend,
            &pr,
            &format!("Test server updated with the latest commit! :rocket:\n\nAccess here: {url}"),
        )
        .await;
        Ok(WorkflowOutcome::CompletedSuccess {
            installation_id: record.installation_id,
        })
    }

    async fn record(&self, pr: &PullRequestRef) -> Result<Option<InstallationRecord>> {
        self.backend
            .get_record(pr.number)
            .await
            .context("looking up installation record")
    }

    async fn fail(&self, pr: &PullRequestRef, err: &anyhow::Error) -> WorkflowOutcome {
        error!(pr = %pr.display_name(), error = %format!("{err:#}"), "workflow failed");
        let typed = err.downcast_ref::<SpinwickError>();
        let body = typed.map_or_else(
            || self.config.messages.setup_failed.clone(),
            |e| e.user_message(&self.config.messages),
        );
        comment(&self.backend, pr, &body).await;
        match typed {
            Some(SpinwickError::Timeout { stage, .. }) => WorkflowOutcome::TimedOut {
                stage: (*stage).to_string(),
            },
            _ => WorkflowOutcome::CompletedFailure {
                reason: format!("{err:#}"),
            },
        }
    }
}

fn missing_record(pr: &PullRequestRef) -> WorkflowOutcome {
    error!(pr = %pr.display_name(), "no environment recorded for this pull request");
    WorkflowOutcome::Skipped {
        reason: "no environment recorded for this pull request".to_string(),
    }
}
