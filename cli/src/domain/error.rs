//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::time::Duration;

use thiserror::Error;

use crate::domain::config::Messages;

// ── Workflow errors ───────────────────────────────────────────────────────────

/// How a failure is handled by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Retried by the enclosing poll loop; never surfaced on its own.
    Transient,
    /// Remote system reached a failed end state. Not retried.
    Terminal,
    /// A stage deadline elapsed while polling.
    Timeout,
    /// A response could not be decoded. Aborts the current operation.
    Decode,
}

/// Errors raised by the provisioning workflows.
#[derive(Debug, Error)]
pub enum SpinwickError {
    #[error("timed out after {}s waiting for {stage}", .waited.as_secs())]
    Timeout { stage: &'static str, waited: Duration },

    #[error("build finished with conclusion {conclusion:?}")]
    BuildFailed { conclusion: String },

    #[error("unknown build status {0:?}")]
    UnknownBuildStatus(String),

    #[error("cannot parse build link {0:?}")]
    UnparseableBuildLink(String),

    #[error("jenkins server {0:?} is not configured")]
    UnknownJenkinsServer(String),

    #[error("registry lookup for {image}:{tag} failed: {message}")]
    RegistryLookup {
        image: String,
        tag: String,
        message: String,
    },

    #[error("cluster {cluster_id} failed to create")]
    ClusterCreationFailed { cluster_id: String },

    #[error("installation {installation_id} reached state {state}")]
    InstallationFailed {
        installation_id: String,
        state: String,
    },

    #[error("upgrade request for installation {installation_id} failed: {message}")]
    UpgradeRequestFailed {
        installation_id: String,
        message: String,
    },

    #[error("upgrade request for installation {installation_id} was rejected with HTTP {status}")]
    UpgradeRejected { installation_id: String, status: u16 },

    #[error("bootstrap step {step} failed: {message}")]
    BootstrapFailed { step: &'static str, message: String },

    #[error("repository {owner}/{repo} is not configured for review environments")]
    RepositoryNotConfigured { owner: String, repo: String },

    #[error("decoding {what}: {message}")]
    Decode { what: &'static str, message: String },

    #[error("transient failure: {0}")]
    Transient(String),
}

impl SpinwickError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Transient(_) => ErrorKind::Transient,
            Self::BuildFailed { .. }
            | Self::UnknownBuildStatus(_)
            | Self::UnparseableBuildLink(_)
            | Self::UnknownJenkinsServer(_)
            | Self::RegistryLookup { .. }
            | Self::ClusterCreationFailed { .. }
            | Self::InstallationFailed { .. }
            | Self::UpgradeRequestFailed { .. }
            | Self::UpgradeRejected { .. }
            | Self::BootstrapFailed { .. }
            | Self::RepositoryNotConfigured { .. } => ErrorKind::Terminal,
        }
    }

    /// Text of the pull request comment explaining this failure.
    #[must_use]
    pub fn user_message(&self, messages: &Messages) -> String {
        match self {
            Self::Timeout { stage, .. } => {
                format!("Timed out waiting for {stage}. Please check the logs.")
            }
            Self::BuildFailed { .. } | Self::UnknownBuildStatus(_) => {
                format!("{}\n\nThe build did not succeed: {self}.", messages.setup_failed)
            }
            Self::ClusterCreationFailed { .. } => messages.cluster_failed.clone(),
            Self::InstallationFailed { state, .. } if state.starts_with("upgrade") => {
                messages.upgrade_rejected.clone()
            }
            Self::InstallationFailed { .. } | Self::BootstrapFailed { .. } => {
                messages.installation_failed.clone()
            }
            Self::UpgradeRequestFailed { .. } => messages.upgrade_request_error.clone(),
            Self::UpgradeRejected { .. } => messages.upgrade_rejected.clone(),
            _ => messages.setup_failed.clone(),
        }
    }
}

/// Classify an arbitrary workflow error.
///
/// Errors that carry no [`SpinwickError`] are plain request failures
/// (connection errors, unexpected HTTP statuses) and count as transient.
#[must_use]
pub fn classify(err: &anyhow::Error) -> ErrorKind {
    err.downcast_ref::<SpinwickError>()
        .map_or(ErrorKind::Transient, SpinwickError::kind)
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing setting: {0}")]
    Missing(&'static str),

    #[error("Repository {0} is listed more than once")]
    DuplicateRepository(String),

    #[error("Repository {repo} uses unknown Jenkins server '{server}'")]
    UnknownJenkinsServer { repo: String, server: String },

    #[error("Invalid value for {key}: must be greater than zero")]
    ZeroDuration { key: &'static str },
}
