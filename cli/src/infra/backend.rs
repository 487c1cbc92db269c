//! Production wiring: one value implementing every application port.

use anyhow::Result;
use spinwick_common::{
    Cluster, CreateClusterRequest, CreateInstallationRequest, Installation, InstallationRecord,
    PullRequestRef,
};

use crate::application::ports::{
    AppConnector, BuildStatusSource, ClusterApi, ImageRegistry, InstallationApi,
    InstallationRecordStore, JenkinsApi, Notifier, PullRequestStore, ReachabilityProbe,
    UpgradeResponse,
};
use crate::domain::bootstrap::EmailRelay;
use crate::domain::build::{CheckRun, CommitStatus, JenkinsBuild, JenkinsJob};
use crate::domain::{Secrets, SpinwickConfig};
use crate::infra::app_client::{AppClient, AppHttpConnector};
use crate::infra::github::GitHubClient;
use crate::infra::http::build_client;
use crate::infra::jenkins::{JenkinsClient, JenkinsCredentials};
use crate::infra::network::TokioNetworkProbe;
use crate::infra::provisioner::ProvisionerClient;
use crate::infra::registry::{RegistryClient, RegistryCredentials};
use crate::infra::store::JsonFileStore;

pub struct HttpBackend {
    store: JsonFileStore,
    github: GitHubClient,
    jenkins: JenkinsClient,
    registry: RegistryClient,
    provisioner: ProvisionerClient,
    apps: AppHttpConnector,
    probe: TokioNetworkProbe,
}

impl HttpBackend {
    /// Build every adapter from the loaded configuration and secrets.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the store
    /// location cannot be determined.
    pub fn new(config: &SpinwickConfig, secrets: &Secrets) -> Result<Self> {
        let http = build_client()?;
        let store = JsonFileStore::from_config(config)?;
        let jenkins_credentials = secrets
            .jenkins_username
            .clone()
            .zip(secrets.jenkins_api_token.clone())
            .map(|(username, api_token)| JenkinsCredentials {
                username,
                api_token,
            });
        let registry_credentials = secrets
            .registry_username
            .clone()
            .zip(secrets.registry_password.clone())
            .map(|(username, password)| RegistryCredentials { username, password });

        Ok(Self {
            store,
            github: GitHubClient::new(
                http.clone(),
                config.github_api_url.clone(),
                secrets.github_token.clone(),
            ),
            jenkins: JenkinsClient::new(
                http.clone(),
                config.jenkins_servers.clone(),
                jenkins_credentials,
            ),
            registry: RegistryClient::new(
                http.clone(),
                config.registry_url.clone(),
                registry_credentials,
            ),
            provisioner: ProvisionerClient::new(http.clone(), config.provisioner_url.clone()),
            apps: AppHttpConnector::new(http),
            probe: TokioNetworkProbe,
        })
    }

    #[must_use]
    pub fn store(&self) -> &JsonFileStore {
        &self.store
    }
}

impl InstallationRecordStore for HttpBackend {
    async fn get_record(&self, number: u64) -> Result<Option<InstallationRecord>> {
        self.store.get_record(number).await
    }

    async fn save_record(&self, record: &InstallationRecord) -> Result<()> {
        self.store.save_record(record).await
    }

    async fn delete_record(&self, number: u64) -> Result<()> {
        self.store.delete_record(number).await
    }
}

impl PullRequestStore for HttpBackend {
    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Option<PullRequestRef>> {
        self.store.get_pull_request(owner, repo, number).await
    }

    async fn save_pull_request(&self, pr: &PullRequestRef) -> Result<()> {
        self.store.save_pull_request(pr).await
    }
}

impl BuildStatusSource for HttpBackend {
    async fn commit_statuses(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<CommitStatus>> {
        self.github.commit_statuses(owner, repo, sha).await
    }

    async fn check_runs(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<CheckRun>> {
        self.github.check_runs(owner, repo, sha).await
    }
}

impl JenkinsApi for HttpBackend {
    async fn jenkins_build(&self, server: &str, job: &JenkinsJob) -> Result<JenkinsBuild> {
        self.jenkins.jenkins_build(server, job).await
    }
}

impl ImageRegistry for HttpBackend {
    async fn manifest_digest(&self, image: &str, tag: &str) -> Result<Option<String>> {
        self.registry.manifest_digest(image, tag).await
    }
}

impl ClusterApi for HttpBackend {
    async fn create_cluster(&self, request: &CreateClusterRequest) -> Result<Cluster> {
        self.provisioner.create_cluster(request).await
    }

    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster> {
        self.provisioner.get_cluster(cluster_id).await
    }
}

impl InstallationApi for HttpBackend {
    async fn create_installation(
        &self,
        request: &CreateInstallationRequest,
    ) -> Result<Installation> {
        self.provisioner.create_installation(request).await
    }

    async fn get_installation(&self, installation_id: &str) -> Result<Installation> {
        self.provisioner.get_installation(installation_id).await
    }

    async fn upgrade_installation(
        &self,
        installation_id: &str,
        version: &str,
    ) -> Result<UpgradeResponse> {
        self.provisioner
            .upgrade_installation(installation_id, version)
            .await
    }

    async fn delete_installation(&self, installation_id: &str) -> Result<()> {
        self.provisioner.delete_installation(installation_id).await
    }
}

impl AppConnector for HttpBackend {
    type App = AppClient;

    fn connect(&self, base_url: &str) -> Result<AppClient> {
        self.apps.connect(base_url)
    }
}

impl ReachabilityProbe for HttpBackend {
    async fn check_tcp_connectivity(&self, host: &str, port: u16) -> Result<bool> {
        self.probe.check_tcp_connectivity(host, port).await
    }
}

impl Notifier for HttpBackend {
    async fn post_comment(&self, pr: &PullRequestRef, body: &str) -> Result<()> {
        self.github.post_comment(pr, body).await
    }
}

/// Email relay settings from the secrets, empty where unset.
#[must_use]
pub fn email_relay(secrets: &Secrets) -> EmailRelay {
    EmailRelay {
        username: secrets.smtp_username.clone().unwrap_or_default(),
        password: secrets.smtp_password.clone().unwrap_or_default(),
        server: secrets.smtp_server.clone().unwrap_or_default(),
    }
}
