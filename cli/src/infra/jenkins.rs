//! Jenkins JSON API adapter.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::JenkinsApi;
use crate::domain::SpinwickError;
use crate::domain::build::{JenkinsBuild, JenkinsJob};
use crate::domain::config::JenkinsServer;
use crate::infra::http::{decode, join};

/// Basic-auth credentials shared by every configured server.
#[derive(Clone)]
pub struct JenkinsCredentials {
    pub username: String,
    pub api_token: String,
}

pub struct JenkinsClient {
    http: Client,
    servers: BTreeMap<String, JenkinsServer>,
    credentials: Option<JenkinsCredentials>,
}

#[derive(Debug, Deserialize)]
struct BuildJson {
    #[serde(default)]
    number: u64,
    #[serde(default)]
    building: bool,
    result: Option<String>,
}

impl JenkinsClient {
    #[must_use]
    pub fn new(
        http: Client,
        servers: BTreeMap<String, JenkinsServer>,
        credentials: Option<JenkinsCredentials>,
    ) -> Self {
        Self {
            http,
            servers,
            credentials,
        }
    }
}

/// `job/<path>/<number>/api/json` relative to the server root.
#[must_use]
pub fn build_api_path(job: &JenkinsJob) -> String {
    format!("/job/{}/{}/api/json", job.path, job.build_number)
}

impl JenkinsApi for JenkinsClient {
    async fn jenkins_build(&self, server: &str, job: &JenkinsJob) -> Result<JenkinsBuild> {
        let config = self
            .servers
            .get(server)
            .ok_or_else(|| SpinwickError::UnknownJenkinsServer(server.to_string()))?;
        let mut request = self.http.get(join(&config.url, &build_api_path(job)));
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.api_token));
        }
        let resp = request
            .send()
            .await
            .with_context(|| format!("fetching Jenkins build {} #{}", job.path, job.build_number))?;
        let build: BuildJson = decode(resp, "jenkins build").await?;
        Ok(JenkinsBuild {
            number: build.number,
            building: build.building,
            result: build.result,
        })
    }
}
