use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of leading commit-hash characters used as the installation version
/// and as the image tag.
pub const SHORT_SHA_LEN: usize = 7;

/// Errors raised while deriving identifiers from a pull request snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefError {
    #[error("head commit hash {0:?} is shorter than {SHORT_SHA_LEN} characters")]
    ShortSha(String),

    #[error("head commit hash {0:?} is not hexadecimal")]
    NotHex(String),
}

/// Snapshot of a pull request as seen by the orchestrator.
///
/// Labels and the build link change out of band, so long-running waits
/// re-read this from the pull request store between polls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestRef {
    pub repo_owner: String,
    pub repo_name: String,
    pub number: u64,
    /// Head commit hash.
    pub sha: String,
    pub branch: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_link: Option<String>,
}

impl PullRequestRef {
    /// Owner id of the remote installation: `lower(<repo>-pr-<number>)`.
    ///
    /// Deterministic, so a second create for the same pull request addresses
    /// the same remote owner.
    #[must_use]
    pub fn owner_id(&self) -> String {
        format!("{}-pr-{}", self.repo_name, self.number).to_lowercase()
    }

    /// Installation version and image tag: the short head commit hash.
    pub fn installation_version(&self) -> Result<&str, RefError> {
        let short = self
            .sha
            .get(..SHORT_SHA_LEN)
            .ok_or_else(|| RefError::ShortSha(self.sha.clone()))?;
        if !short.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RefError::NotHex(self.sha.clone()));
        }
        Ok(short)
    }

    /// DNS name of the environment under `base_domain`.
    #[must_use]
    pub fn dns_name(&self, base_domain: &str) -> String {
        format!("{}.{}", self.owner_id(), base_domain.trim_start_matches('.'))
    }

    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// `owner/repo#number`, used in log lines.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}/{}#{}", self.repo_owner, self.repo_name, self.number)
    }
}

/// Persisted mapping from a pull request to its remote installation.
///
/// Exactly one exists per pull request while its environment is alive. The
/// installation id never changes for the lifetime of the record; upgrades
/// happen in place on the remote side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallationRecord {
    pub number: u64,
    pub repo_owner: String,
    pub repo_name: String,
    pub installation_id: String,
    pub created_at: DateTime<Utc>,
}

impl InstallationRecord {
    #[must_use]
    pub fn new(pr: &PullRequestRef, installation_id: impl Into<String>) -> Self {
        Self {
            number: pr.number,
            repo_owner: pr.repo_owner.clone(),
            repo_name: pr.repo_name.clone(),
            installation_id: installation_id.into(),
            created_at: Utc::now(),
        }
    }
}
