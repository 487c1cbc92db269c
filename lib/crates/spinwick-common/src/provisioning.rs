//! Provisioning API wire types.
//!
//! Field names follow the provisioning server's JSON (`ID`, `OwnerID`, `DNS`,
//! ...). Remote resources are never persisted locally; they are re-fetched on
//! every poll.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Affinity hint sent with every installation request.
pub const AFFINITY_MULTITENANT: &str = "multitenant";

/// Lifecycle state of a remote cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum ClusterState {
    CreationRequested,
    Creating,
    Stable,
    CreationFailed,
    /// Any state the orchestrator has no rule for; polling continues.
    Other(String),
    #[default]
    Unknown,
}

impl ClusterState {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CreationRequested => "creation-requested",
            Self::Creating => "creating",
            Self::Stable => "stable",
            Self::CreationFailed => "creation-failed",
            Self::Other(s) => s,
            Self::Unknown => "",
        }
    }
}

impl From<String> for ClusterState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "creation-requested" => Self::CreationRequested,
            "creating" => Self::Creating,
            "stable" => Self::Stable,
            "creation-failed" => Self::CreationFailed,
            "" => Self::Unknown,
            _ => Self::Other(s),
        }
    }
}

impl From<ClusterState> for String {
    fn from(s: ClusterState) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a remote installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum InstallationState {
    CreationRequested,
    Creating,
    /// No cluster has room for the installation; a new cluster is needed.
    CreationNoCompatibleClusters,
    Stable,
    CreationFailed,
    UpgradeRequested,
    UpgradeFailed,
    Other(String),
    #[default]
    Unknown,
}

impl InstallationState {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CreationRequested => "creation-requested",
            Self::Creating => "creating",
            Self::CreationNoCompatibleClusters => "creation-no-compatible-clusters",
            Self::Stable => "stable",
            Self::CreationFailed => "creation-failed",
            Self::UpgradeRequested => "upgrade-requested",
            Self::UpgradeFailed => "upgrade-failed",
            Self::Other(s) => s,
            Self::Unknown => "",
        }
    }

    /// Terminal failure for both creation and upgrade.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::CreationFailed | Self::UpgradeFailed)
    }
}

impl From<String> for InstallationState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "creation-requested" => Self::CreationRequested,
            "creating" => Self::Creating,
            "creation-no-compatible-clusters" => Self::CreationNoCompatibleClusters,
            "stable" => Self::Stable,
            "creation-failed" => Self::CreationFailed,
            "upgrade-requested" => Self::UpgradeRequested,
            "upgrade-failed" => Self::UpgradeFailed,
            "" => Self::Unknown,
            _ => Self::Other(s),
        }
    }
}

impl From<InstallationState> for String {
    fn from(s: InstallationState) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for InstallationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for a new cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateClusterRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider: String,
    pub size: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,
}

/// A compute cluster as reported by the provisioning server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct Cluster {
    #[serde(rename = "ID")]
    pub id: String,
    pub provider: String,
    pub size: String,
    pub state: ClusterState,
    pub create_at: i64,
}

/// Parameters for a new installation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateInstallationRequest {
    #[serde(rename = "OwnerID")]
    pub owner_id: String,
    pub version: String,
    #[serde(rename = "DNS")]
    pub dns: String,
    pub size: String,
    pub affinity: String,
}

/// An application installation as reported by the provisioning server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct Installation {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "OwnerID")]
    pub owner_id: String,
    pub version: String,
    #[serde(rename = "DNS")]
    pub dns: String,
    pub size: String,
    pub affinity: String,
    pub state: InstallationState,
    pub create_at: i64,
}

/// Body of the in-place version upgrade request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpgradeInstallationRequest {
    pub version: String,
}
