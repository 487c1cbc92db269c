pub mod provisioning;
pub mod pull_request;

pub use provisioning::{
    AFFINITY_MULTITENANT, Cluster, ClusterState, CreateClusterRequest, CreateInstallationRequest,
    Installation, InstallationState, UpgradeInstallationRequest,
};
pub use pull_request::{InstallationRecord, PullRequestRef, RefError, SHORT_SHA_LEN};
