//! Installation provisioner: creates or upgrades the remote installation of a
//! pull request and waits for it to settle.
//!
//! Creation owns the installation it made: any failure after the create
//! request (cluster, installation state, timeout, fatal bootstrap) deletes it
//! again. Upgrades never delete; the existing environment stays for manual
//! recovery.

use anyhow::{Context, Result};
use spinwick_common::{
    AFFINITY_MULTITENANT, CreateInstallationRequest, Installation, InstallationState,
    PullRequestRef,
};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::application::ports::{
    AppConnector, ClusterApi, InstallationApi, Notifier, ReachabilityProbe, UpgradeResponse,
};
use crate::application::services::bootstrap::bootstrap_environment;
use crate::application::services::cluster::provision_cluster;
use crate::application::services::poll::{is_retryable, with_deadline};
use crate::domain::bootstrap::EmailRelay;
use crate::domain::{SpinwickConfig, SpinwickError, StageTiming};

/// Create the installation for `pr` and wait until it is usable.
///
/// Sequence: create request, settle pause, one re-fetch (requesting a new
/// cluster when no existing one fits), wait for `stable`, bootstrap. A
/// re-fetch that already shows `stable` or a failed state ends the wait
/// there. Returns the installation id.
///
/// # Errors
///
/// Fails when the create request fails, when the installation, its cluster or
/// the bootstrap end badly, or when a stage deadline elapses. In every case
/// after the create request the installation has been deleted.
pub async fn create_installation<B>(
    backend: &B,
    config: &SpinwickConfig,
    relay: &EmailRelay,
    pr: &PullRequestRef,
    size: &str,
) -> Result<String>
where
    B: InstallationApi + ClusterApi + Notifier + ReachabilityProbe + AppConnector,
{
    let dns = pr.dns_name(&config.dns_base_domain);
    let request = CreateInstallationRequest {
        owner_id: pr.owner_id(),
        version: pr.installation_version()?.to_string(),
        dns: dns.clone(),
        size: size.to_string(),
        affinity: AFFINITY_MULTITENANT.to_string(),
    };
    let created = backend
        .create_installation(&request)
        .await
        .context("requesting a new installation")?;
    let installation_id = created.id;
    info!(%installation_id, %dns, version = %request.version, %size, "installation requested");

    match settle(backend, config, relay, pr, &installation_id, &dns).await {
        Ok(()) => Ok(installation_id),
        Err(e) => {
            error!(%installation_id, error = %format!("{e:#}"), "installation failed, deleting it");
            if let Err(delete_err) = backend.delete_installation(&installation_id).await {
                warn!(
                    %installation_id,
                    error = %format!("{delete_err:#}"),
                    "could not delete failed installation"
                );
            }
            Err(e)
        }
    }
}

async fn settle<B>(
    backend: &B,
    config: &SpinwickConfig,
    relay: &EmailRelay,
    pr: &PullRequestRef,
    installation_id: &str,
    dns: &str,
) -> Result<()>
where
    B: InstallationApi + ClusterApi + Notifier + ReachabilityProbe + AppConnector,
{
    sleep(std::time::Duration::from_secs(
        config.timing.installation_settle_secs,
    ))
    .await;

    let first = match backend.get_installation(installation_id).await {
        Ok(installation) => Some(installation.state),
        Err(e) if is_retryable(&e) => {
            warn!(
                %installation_id,
                error = %format!("{e:#}"),
                "re-reading new installation failed, polling"
            );
            None
        }
        Err(e) => return Err(e.context("re-reading new installation")),
    };
    match first {
        Some(InstallationState::Stable) => {}
        Some(state) if state.is_failed() => {
            return Err(SpinwickError::InstallationFailed {
                installation_id: installation_id.to_string(),
                state: state.to_string(),
            }
            .into());
        }
        Some(InstallationState::CreationNoCompatibleClusters) => {
            info!(%installation_id, "no compatible cluster, requesting one");
            provision_cluster(backend, config, pr).await?;
            wait_until_stable(backend, installation_id, config.timing.installation).await?;
        }
        _ => {
            wait_until_stable(backend, installation_id, config.timing.installation).await?;
        }
    }

    let report =
        bootstrap_environment(backend, &config.timing, relay, dns, pr.number).await?;
    if let Some((step, message)) = report.fatal_failure() {
        return Err(SpinwickError::BootstrapFailed {
            step: step.name(),
            message: message.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Move an existing installation to the pull request's head commit and wait
/// until it is stable again. Never deletes.
///
/// # Errors
///
/// Fails with `UpgradeRequestFailed` when the request cannot be made, with
/// `UpgradeRejected` on any status other than accepted, and with
/// `InstallationFailed` or `Timeout` while waiting.
pub async fn upgrade_installation<B>(
    backend: &B,
    config: &SpinwickConfig,
    installation_id: &str,
    pr: &PullRequestRef,
) -> Result<()>
where
    B: InstallationApi,
{
    let version = pr.installation_version()?;
    let response = backend
        .upgrade_installation(installation_id, version)
        .await
        .map_err(|e| SpinwickError::UpgradeRequestFailed {
            installation_id: installation_id.to_string(),
            message: format!("{e:#}"),
        })?;
    if let UpgradeResponse::Rejected { status } = response {
        return Err(SpinwickError::UpgradeRejected {
            installation_id: installation_id.to_string(),
            status,
        }
        .into());
    }
    info!(%installation_id, %version, "upgrade accepted");

    wait_until_stable(backend, installation_id, config.timing.installation).await?;
    info!(%installation_id, %version, "upgrade complete");
    Ok(())
}

/// Poll until the installation reports `stable`, checking first.
async fn wait_until_stable(
    backend: &impl InstallationApi,
    installation_id: &str,
    timing: StageTiming,
) -> Result<Installation> {
    with_deadline("the installation", timing, async {
        loop {
            match backend.get_installation(installation_id).await {
                Ok(installation) if installation.state == InstallationState::Stable => {
                    return Ok(installation);
                }
                Ok(installation) if installation.state.is_failed() => {
                    return Err(SpinwickError::InstallationFailed {
                        installation_id: installation_id.to_string(),
                        state: installation.state.to_string(),
                    }
                    .into());
                }
                Ok(installation) => {
                    debug!(%installation_id, state = %installation.state, "installation not ready");
                }
                Err(e) if is_retryable(&e) => {
                    warn!(
                        %installation_id,
                        error = %format!("{e:#}"),
                        "installation lookup failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
            sleep(timing.interval()).await;
        }
    })
    .await
}
