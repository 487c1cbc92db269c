//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `spinwick_common`, never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use anyhow::Result;
use serde_json::Value;
use spinwick_common::{
    Cluster, CreateClusterRequest, CreateInstallationRequest, Installation, InstallationRecord,
    PullRequestRef,
};

use crate::domain::bootstrap::SeedAccount;
use crate::domain::build::{CheckRun, CommitStatus, JenkinsBuild, JenkinsJob};

// ── Value Types ───────────────────────────────────────────────────────────────

/// How the provisioning server answered an upgrade request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeResponse {
    /// HTTP 202: the upgrade was queued.
    Accepted,
    /// Any other status.
    Rejected { status: u16 },
}

/// A user account in the target application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppUser {
    pub id: String,
    pub username: String,
}

/// A team in the target application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTeam {
    pub id: String,
    pub name: String,
}

// ── Store Ports ───────────────────────────────────────────────────────────────

/// Persistence of the PR number to installation id mapping.
#[allow(async_fn_in_trait)]
pub trait InstallationRecordStore {
    /// Load the record for a pull request, `None` if none exists.
    async fn get_record(&self, number: u64) -> Result<Option<InstallationRecord>>;
    /// Insert or replace the record for `record.number`.
    async fn save_record(&self, record: &InstallationRecord) -> Result<()>;
    /// Remove the record. Removing a missing record is not an error.
    async fn delete_record(&self, number: u64) -> Result<()>;
}

/// Latest known state of tracked pull requests.
#[allow(async_fn_in_trait)]
pub trait PullRequestStore {
    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Option<PullRequestRef>>;
    async fn save_pull_request(&self, pr: &PullRequestRef) -> Result<()>;
}

// ── CI Ports ──────────────────────────────────────────────────────────────────

/// Build results reported on the code host for a commit.
#[allow(async_fn_in_trait)]
pub trait BuildStatusSource {
    async fn commit_statuses(&self, owner: &str, repo: &str, sha: &str)
    -> Result<Vec<CommitStatus>>;
    async fn check_runs(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<CheckRun>>;
}

/// Read access to Jenkins builds.
#[allow(async_fn_in_trait)]
pub trait JenkinsApi {
    /// Fetch one build of `job` on the named server.
    async fn jenkins_build(&self, server: &str, job: &JenkinsJob) -> Result<JenkinsBuild>;
}

/// Published container images.
#[allow(async_fn_in_trait)]
pub trait ImageRegistry {
    /// Digest of `image:tag`, `None` when the tag is not published (yet).
    async fn manifest_digest(&self, image: &str, tag: &str) -> Result<Option<String>>;
}

// ── Provisioner Ports ─────────────────────────────────────────────────────────

#[allow(async_fn_in_trait)]
pub trait ClusterApi {
    async fn create_cluster(&self, request: &CreateClusterRequest) -> Result<Cluster>;
    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster>;
}

#[allow(async_fn_in_trait)]
pub trait InstallationApi {
    async fn create_installation(&self, request: &CreateInstallationRequest)
    -> Result<Installation>;
    async fn get_installation(&self, installation_id: &str) -> Result<Installation>;
    /// Request an in-place version change.
    ///
    /// # Errors
    ///
    /// Returns an error only when the request could not be made. A response
    /// with an unexpected status is [`UpgradeResponse::Rejected`].
    async fn upgrade_installation(
        &self,
        installation_id: &str,
        version: &str,
    ) -> Result<UpgradeResponse>;
    /// Delete an installation. Deleting an unknown installation succeeds.
    async fn delete_installation(&self, installation_id: &str) -> Result<()>;
}

// ── Target Application Ports ──────────────────────────────────────────────────

/// Session with one deployed environment.
#[allow(async_fn_in_trait)]
pub trait TargetApp {
    /// `true` once the application reports itself healthy.
    async fn ping(&self) -> Result<bool>;
    async fn create_user(&self, account: &SeedAccount) -> Result<AppUser>;
    /// Authenticate; later calls on this session carry the token.
    async fn login(&mut self, username: &str, password: &str) -> Result<AppUser>;
    async fn create_team(&self, name: &str, display_name: &str) -> Result<AppTeam>;
    async fn add_team_member(&self, team_id: &str, user_id: &str) -> Result<()>;
    async fn get_config(&self) -> Result<Value>;
    async fn update_config(&self, config: &Value) -> Result<()>;
}

/// Opens sessions against deployed environments.
pub trait AppConnector {
    type App: TargetApp;

    /// Build an unauthenticated session for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be used.
    fn connect(&self, base_url: &str) -> Result<Self::App>;
}

// ── Network Probe Port ────────────────────────────────────────────────────────

/// Abstracts network connectivity checks so application services can be tested
/// without real network access.
#[allow(async_fn_in_trait)]
pub trait ReachabilityProbe {
    /// Check TCP connectivity to the given host and port.
    async fn check_tcp_connectivity(&self, host: &str, port: u16) -> Result<bool>;
}

// ── Notification Port ─────────────────────────────────────────────────────────

/// Comments on the pull request. The only user-visible progress channel.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn post_comment(&self, pr: &PullRequestRef, body: &str) -> Result<()>;
}

// ── Composite ─────────────────────────────────────────────────────────────────

/// Composite trait: everything the lifecycle workflows talk to.
pub trait SpinwickBackend:
    InstallationRecordStore
    + PullRequestStore
    + BuildStatusSource
    + JenkinsApi
    + ImageRegistry
    + ClusterApi
    + InstallationApi
    + AppConnector
    + ReachabilityProbe
    + Notifier
{
}

/// Blanket implementation: any type implementing every port is a `SpinwickBackend`.
impl<T> SpinwickBackend for T where
    T: InstallationRecordStore
        + PullRequestStore
        + BuildStatusSource
        + JenkinsApi
        + ImageRegistry
        + ClusterApi
        + InstallationApi
        + AppConnector
        + ReachabilityProbe
        + Notifier
{
}
