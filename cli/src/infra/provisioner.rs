//! Provisioning-server REST adapter: clusters and installations.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use spinwick_common::{
    Cluster, CreateClusterRequest, CreateInstallationRequest, Installation,
    UpgradeInstallationRequest,
};
use tracing::debug;

use crate::application::ports::{ClusterApi, InstallationApi, UpgradeResponse};
use crate::infra::http::{decode, ensure_success, join};

pub struct ProvisionerClient {
    http: Client,
    base: String,
}

impl ProvisionerClient {
    #[must_use]
    pub fn new(http: Client, base: impl Into<String>) -> Self {
        Self {
            http,
            base: base.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        join(&self.base, path)
    }
}

impl ClusterApi for ProvisionerClient {
    async fn create_cluster(&self, request: &CreateClusterRequest) -> Result<Cluster> {
        let resp = self
            .http
            .post(self.url("/api/clusters"))
            .json(request)
            .send()
            .await
            .context("sending create-cluster request")?;
        decode(resp, "cluster").await
    }

    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster> {
        let resp = self
            .http
            .get(self.url(&format!("/api/cluster/{cluster_id}")))
            .send()
            .await
            .with_context(|| format!("fetching cluster {cluster_id}"))?;
        decode(resp, "cluster").await
    }
}

impl InstallationApi for ProvisionerClient {
    async fn create_installation(
        &self,
        request: &CreateInstallationRequest,
    ) -> Result<Installation> {
        let resp = self
            .http
            .post(self.url("/api/installations"))
            .json(request)
            .send()
            .await
            .context("sending create-installation request")?;
        decode(resp, "installation").await
    }

    async fn get_installation(&self, installation_id: &str) -> Result<Installation> {
        let resp = self
            .http
            .get(self.url(&format!("/api/installation/{installation_id}")))
            .send()
            .await
            .with_context(|| format!("fetching installation {installation_id}"))?;
        decode(resp, "installation").await
    }

    async fn upgrade_installation(
        &self,
        installation_id: &str,
        version: &str,
    ) -> Result<UpgradeResponse> {
        let body = UpgradeInstallationRequest {
            version: version.to_string(),
        };
        let resp = self
            .http
            .put(self.url(&format!("/api/installation/{installation_id}/mattermost")))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("sending upgrade request for {installation_id}"))?;
        let status = resp.status();
        debug!(%installation_id, %status, "upgrade response");
        if status == StatusCode::ACCEPTED {
            Ok(UpgradeResponse::Accepted)
        } else {
            Ok(UpgradeResponse::Rejected {
                status: status.as_u16(),
            })
        }
    }

    async fn delete_installation(&self, installation_id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/installation/{installation_id}")))
            .send()
            .await
            .with_context(|| format!("sending delete request for {installation_id}"))?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(%installation_id, "installation already gone");
            return Ok(());
        }
        ensure_success(resp, "delete installation").await?;
        Ok(())
    }
}
