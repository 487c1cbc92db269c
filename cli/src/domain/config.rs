//! Domain types and validators for SpinWick configuration.
//!
//! Pure functions only. No I/O and no filesystem access.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.spinwick/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinwickConfig {
    /// Base URL of the provisioning server.
    pub provisioner_url: String,
    /// Installations get `<owner-id>.<dns_base_domain>`.
    pub dns_base_domain: String,
    pub github_api_url: String,
    /// Container registry queried for published image tags.
    pub registry_url: String,
    /// Directory of the JSON record store. Defaults to `~/.spinwick/store`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    pub labels: LabelConfig,
    pub sizes: SizeConfig,
    /// Per-repository CI strategy table.
    pub repositories: Vec<RepositoryConfig>,
    /// Jenkins servers by name, referenced from the strategy table.
    pub jenkins_servers: BTreeMap<String, JenkinsServer>,
    pub messages: Messages,
    pub timing: Timing,
}

impl Default for SpinwickConfig {
    fn default() -> Self {
        Self {
            provisioner_url: "http://localhost:8075".to_string(),
            dns_base_domain: "test.mattermost.cloud".to_string(),
            github_api_url: "https://api.github.com".to_string(),
            registry_url: "https://registry-1.docker.io".to_string(),
            store_dir: None,
            labels: LabelConfig::default(),
            sizes: SizeConfig::default(),
            repositories: Vec::new(),
            jenkins_servers: BTreeMap::new(),
            messages: Messages::default(),
            timing: Timing::default(),
        }
    }
}

impl SpinwickConfig {
    /// Strategy lookup by repository identity.
    #[must_use]
    pub fn repository(&self, owner: &str, name: &str) -> Option<&RepositoryConfig> {
        self.repositories
            .iter()
            .find(|r| r.owner == owner && r.name == name)
    }

    /// Validate cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.provisioner_url.trim().is_empty() {
            return Err(ConfigError::Missing("provisioner_url").into());
        }
        if self.dns_base_domain.trim().is_empty() {
            return Err(ConfigError::Missing("dns_base_domain").into());
        }

        let mut seen = HashSet::new();
        for repo in &self.repositories {
            let full = format!("{}/{}", repo.owner, repo.name);
            if !seen.insert(full.clone()) {
                return Err(ConfigError::DuplicateRepository(full).into());
            }
            if repo.build_status_context.trim().is_empty() {
                return Err(ConfigError::Missing("repositories[].build_status_context").into());
            }
            if let CiMechanism::Jenkins { server, .. } = &repo.ci
                && !self.jenkins_servers.contains_key(server)
            {
                return Err(ConfigError::UnknownJenkinsServer {
                    repo: full,
                    server: server.clone(),
                }
                .into());
            }
        }

        self.timing.validate()
    }
}

/// Labels that request an environment on a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub setup: String,
    pub setup_ha: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            setup: "Setup Cloud Test Server".to_string(),
            setup_ha: "Setup HA Cloud Test Server".to_string(),
        }
    }
}

impl LabelConfig {
    /// Whether `label` is one of the recognised environment labels.
    #[must_use]
    pub fn is_environment_label(&self, label: &str) -> bool {
        label == self.setup || label == self.setup_ha
    }
}

/// Size tiers sent to the provisioning server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    pub installation: String,
    pub installation_ha: String,
    pub cluster: String,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            installation: "miniSingleton".to_string(),
            installation_ha: "miniHA".to_string(),
            cluster: "SizeAlef1000".to_string(),
        }
    }
}

/// One row of the repository strategy table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub owner: String,
    pub name: String,
    /// Status context (status API) or check run name (check runs).
    pub build_status_context: String,
    pub ci: CiMechanism,
    /// Image whose tag must be published before installing.
    #[serde(default = "default_image")]
    pub image: String,
}

fn default_image() -> String {
    "mattermost/mattermost-enterprise-edition".to_string()
}

/// How a repository surfaces its build result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CiMechanism {
    /// Commit combined-status entry matched by context.
    StatusApi,
    /// Check run matched by name.
    CheckRun,
    /// Status entry links to a Jenkins multibranch job that is queried.
    Jenkins {
        server: String,
        #[serde(default = "default_jenkins_folder")]
        folder: String,
    },
}

fn default_jenkins_folder() -> String {
    "mp".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JenkinsServer {
    pub url: String,
}

/// Pull request comments posted by the workflows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub setup_failed: String,
    pub new_commit: String,
    pub cluster_requested: String,
    pub cluster_ready: String,
    pub cluster_failed: String,
    pub installation_failed: String,
    pub upgrade_request_error: String,
    pub upgrade_rejected: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            setup_failed: "Failed to set up the test server. Please check the logs.".to_string(),
            new_commit: "New commit detected. SpinWick upgrade will occur after the build is successful.".to_string(),
            cluster_requested: "Please wait while a new kubernetes cluster is created for your SpinWick".to_string(),
            cluster_ready: "Kubernetes cluster created. Now will deploy the test server... Hang on!".to_string(),
            cluster_failed: "Failed to create the k8s cluster.".to_string(),
            installation_failed: "Failed to create the test server installation.".to_string(),
            upgrade_request_error: "Error during the request to upgrade. Please remove the label and try again.".to_string(),
            upgrade_rejected: "Error doing the upgrade process. Please remove the label and try again.".to_string(),
        }
    }
}

/// Deadline and poll interval of one polling stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageTiming {
    pub timeout_secs: u64,
    pub interval_secs: u64,
}

impl StageTiming {
    #[must_use]
    pub const fn new(timeout_secs: u64, interval_secs: u64) -> Self {
        Self {
            timeout_secs,
            interval_secs,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Per-stage deadlines. Each stage gets a fresh bound; they do not add up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub build: StageTiming,
    pub build_link: StageTiming,
    pub image: StageTiming,
    pub cluster: StageTiming,
    pub installation: StageTiming,
    pub reachability: StageTiming,
    pub ping: StageTiming,
    /// Pause between creating an installation and its first fetch.
    pub installation_settle_secs: u64,
    /// Pause before looking for the build of a freshly pushed commit.
    pub build_registration_secs: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            build: StageTiming::new(3600, 30),
            build_link: StageTiming::new(480, 10),
            image: StageTiming::new(1800, 10),
            cluster: StageTiming::new(900, 30),
            installation: StageTiming::new(480, 10),
            reachability: StageTiming::new(300, 10),
            ping: StageTiming::new(300, 10),
            installation_settle_secs: 3,
            build_registration_secs: 60,
        }
    }
}

impl Timing {
    fn validate(&self) -> Result<()> {
        let stages = [
            ("timing.build", self.build),
            ("timing.build_link", self.build_link),
            ("timing.image", self.image),
            ("timing.cluster", self.cluster),
            ("timing.installation", self.installation),
            ("timing.reachability", self.reachability),
            ("timing.ping", self.ping),
        ];
        for (key, stage) in stages {
            if stage.timeout_secs == 0 || stage.interval_secs == 0 {
                return Err(ConfigError::ZeroDuration { key }.into());
            }
        }
        Ok(())
    }
}

// ── Secrets ──────────────────────────────────────────────────────────────────

/// Credentials read from `SPINWICK_*` environment variables. Never written to
/// the YAML file.
#[derive(Clone, Default, Deserialize)]
pub struct Secrets {
    pub github_token: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_server: Option<String>,
    pub jenkins_username: Option<String>,
    pub jenkins_api_token: Option<String>,
    pub registry_username: Option<String>,
    pub registry_password: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("github_token", &mark(&self.github_token))
            .field("smtp_username", &mark(&self.smtp_username))
            .field("smtp_password", &mark(&self.smtp_password))
            .field("smtp_server", &mark(&self.smtp_server))
            .field("jenkins_username", &mark(&self.jenkins_username))
            .field("jenkins_api_token", &mark(&self.jenkins_api_token))
            .field("registry_username", &mark(&self.registry_username))
            .field("registry_password", &mark(&self.registry_password))
            .finish()
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
