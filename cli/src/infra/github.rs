//! GitHub REST adapter: commit statuses, check runs and PR comments.

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use spinwick_common::PullRequestRef;
use tracing::debug;

use crate::application::ports::{BuildStatusSource, Notifier};
use crate::domain::build::{CheckRun, CommitStatus};
use crate::infra::http::{decode, ensure_success, join};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

pub struct GitHubClient {
    http: Client,
    base: String,
    token: Option<String>,
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CombinedStatus {
    #[serde(default)]
    statuses: Vec<StatusEntry>,
}

#[derive(Debug, Deserialize)]
struct StatusEntry {
    context: String,
    state: String,
    target_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckRunList {
    #[serde(default)]
    check_runs: Vec<CheckRunEntry>,
}

#[derive(Debug, Deserialize)]
struct CheckRunEntry {
    name: String,
    status: String,
    conclusion: Option<String>,
    html_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

// ── Client ──────────────────────────────────────────────────────────────────

impl GitHubClient {
    #[must_use]
    pub fn new(http: Client, base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http,
            base: base.into(),
            token,
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn repo_url(&self, owner: &str, repo: &str, path: &str) -> String {
        join(&self.base, &format!("/repos/{owner}/{repo}/{path}"))
    }
}

impl BuildStatusSource for GitHubClient {
    async fn commit_statuses(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<CommitStatus>> {
        let url = self.repo_url(owner, repo, &format!("commits/{sha}/status"));
        let resp = self
            .request(self.http.get(url))
            .send()
            .await
            .with_context(|| format!("fetching combined status of {sha}"))?;
        let combined: CombinedStatus = decode(resp, "combined status").await?;
        Ok(combined
            .statuses
            .into_iter()
            .map(|s| CommitStatus {
                context: s.context,
                state: s.state,
                target_url: s.target_url,
            })
            .collect())
    }

    async fn check_runs(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<CheckRun>> {
        let url = self.repo_url(owner, repo, &format!("commits/{sha}/check-runs"));
        let resp = self
            .request(self.http.get(url))
            .send()
            .await
            .with_context(|| format!("fetching check runs of {sha}"))?;
        let list: CheckRunList = decode(resp, "check runs").await?;
        Ok(list
            .check_runs
            .into_iter()
            .map(|r| CheckRun {
                name: r.name,
                status: r.status,
                conclusion: r.conclusion,
                html_url: r.html_url,
            })
            .collect())
    }
}

impl Notifier for GitHubClient {
    async fn post_comment(&self, pr: &PullRequestRef, body: &str) -> Result<()> {
        let url = self.repo_url(
            &pr.repo_owner,
            &pr.repo_name,
            &format!("issues/{}/comments", pr.number),
        );
        let resp = self
            .request(self.http.post(url))
            .json(&NewComment { body })
            .send()
            .await
            .with_context(|| format!("posting comment on {}", pr.display_name()))?;
        ensure_success(resp, "post comment").await?;
        debug!(pr = %pr.display_name(), "comment posted");
        Ok(())
    }
}
