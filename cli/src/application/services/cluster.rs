//! Cluster provisioner: requests a new cluster when an installation cannot be
//! placed on any existing one, then waits for it to become stable.

use anyhow::{Context, Result};
use spinwick_common::{ClusterState, CreateClusterRequest, PullRequestRef};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::application::ports::{ClusterApi, Notifier};
use crate::application::services::comment;
use crate::application::services::poll::{is_retryable, with_deadline};
use crate::domain::{SpinwickConfig, SpinwickError};

/// Create a cluster of the configured size and wait until it is stable.
///
/// Posts a progress comment before the request and another once the cluster
/// is ready. A cluster that never stabilises is left in place. Returns the
/// cluster id.
///
/// # Errors
///
/// Fails with `ClusterCreationFailed` when the cluster reaches the failed
/// state and with `Timeout` when the cluster deadline elapses.
pub async fn provision_cluster<B>(
    backend: &B,
    config: &SpinwickConfig,
    pr: &PullRequestRef,
) -> Result<String>
where
    B: ClusterApi + Notifier,
{
    comment(backend, pr, &config.messages.cluster_requested).await;

    let request = CreateClusterRequest {
        provider: String::new(),
        size: config.sizes.cluster.clone(),
        zones: Vec::new(),
    };
    let cluster = backend
        .create_cluster(&request)
        .await
        .context("requesting a new cluster")?;
    let cluster_id = cluster.id;
    info!(%cluster_id, size = %request.size, "cluster requested");

    let timing = config.timing.cluster;
    with_deadline("the kubernetes cluster", timing, async {
        loop {
            match backend.get_cluster(&cluster_id).await {
                Ok(cluster) => match cluster.state {
                    ClusterState::Stable => return Ok(()),
                    ClusterState::CreationFailed => {
                        return Err(SpinwickError::ClusterCreationFailed {
                            cluster_id: cluster_id.clone(),
                        }
                        .into());
                    }
                    state => debug!(%cluster_id, %state, "cluster not ready"),
                },
                Err(e) if is_retryable(&e) => {
                    warn!(%cluster_id, error = %format!("{e:#}"), "cluster lookup failed, retrying");
                }
                Err(e) => return Err(e),
            }
            sleep(timing.interval()).await;
        }
    })
    .await?;

    info!(%cluster_id, "cluster stable");
    comment(backend, pr, &config.messages.cluster_ready).await;
    Ok(cluster_id)
}
