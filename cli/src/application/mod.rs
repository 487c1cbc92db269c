//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` and `spinwick_common`, never
//! on `crate::infra`, `crate::commands`, or `crate::output`.

pub mod ports;
pub mod services;

pub use ports::{
    AppConnector, AppTeam, AppUser, BuildStatusSource, ClusterApi, ImageRegistry,
    InstallationApi, InstallationRecordStore, JenkinsApi, Notifier, PullRequestStore,
    ReachabilityProbe, SpinwickBackend, TargetApp, UpgradeResponse,
};
pub use services::lifecycle::LifecycleController;
