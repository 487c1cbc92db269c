//! Image waiter: blocks until the container image for the head commit is
//! published under its short-sha tag.

use anyhow::Result;
use spinwick_common::PullRequestRef;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::application::ports::{ImageRegistry, PullRequestStore};
use crate::application::services::poll::with_deadline;
use crate::application::services::{refresh_pull_request, repository_for};
use crate::domain::{SpinwickConfig, SpinwickError};

/// Wait for `image:<short sha>` to appear in the registry.
///
/// Waits one interval before each lookup and re-reads the pull request so the
/// tag follows the current head commit. A missing tag is retried.
///
/// # Errors
///
/// Any registry error other than "not found" fails immediately with
/// `RegistryLookup`. Elapsing the image deadline fails with `Timeout`.
pub async fn wait_for_image<B>(
    backend: &B,
    config: &SpinwickConfig,
    pr: &PullRequestRef,
) -> Result<PullRequestRef>
where
    B: ImageRegistry + PullRequestStore,
{
    let repo = repository_for(config, pr)?;
    let timing = config.timing.image;
    info!(pr = %pr.display_name(), image = %repo.image, "waiting for image");

    with_deadline("the docker image to be published", timing, async {
        let mut current = pr.clone();
        loop {
            sleep(timing.interval()).await;
            current = refresh_pull_request(backend, current).await?;
            let tag = current.installation_version()?.to_string();

            match backend.manifest_digest(&repo.image, &tag).await {
                Ok(Some(digest)) => {
                    info!(image = %repo.image, %tag, %digest, "image published");
                    return Ok(current);
                }
                Ok(None) => debug!(image = %repo.image, %tag, "image not published yet"),
                Err(e) => {
                    return Err(SpinwickError::RegistryLookup {
                        image: repo.image.clone(),
                        tag,
                        message: format!("{e:#}"),
                    }
                    .into());
                }
            }
        }
    })
    .await
}
