//! Container registry adapter (Docker Registry HTTP API v2).
//!
//! A tag lookup is a `HEAD` on the manifest. Registries that demand a token
//! answer `401` with a `WWW-Authenticate: Bearer ...` challenge; the token is
//! fetched from the advertised realm and the lookup retried once.

use anyhow::{Context, Result, bail};
use reqwest::header::{ACCEPT, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::application::ports::ImageRegistry;
use crate::infra::http::{decode, join};

const MANIFEST_TYPES: &str = "application/vnd.docker.distribution.manifest.v2+json, \
application/vnd.docker.distribution.manifest.list.v2+json, \
application/vnd.oci.image.manifest.v1+json, \
application/vnd.oci.image.index.v1+json";

const DIGEST_HEADER: &str = "Docker-Content-Digest";

#[derive(Clone)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
}

pub struct RegistryClient {
    http: Client,
    base: String,
    credentials: Option<RegistryCredentials>,
}

/// Parameters of a `WWW-Authenticate: Bearer` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerChallenge {
    pub realm: String,
    pub service: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

/// Parse `Bearer realm="...",service="...",scope="..."`.
#[must_use]
pub fn parse_bearer_challenge(header: &str) -> Option<BearerChallenge> {
    let (scheme, params) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let mut realm = None;
    let mut service = None;
    let mut scope = None;
    let mut rest = params.trim();
    while !rest.is_empty() {
        let (key, after) = rest.split_once('=')?;
        let after = after.trim_start();
        let (value, remainder) = if let Some(quoted) = after.strip_prefix('"') {
            let end = quoted.find('"')?;
            (&quoted[..end], &quoted[end + 1..])
        } else {
            let end = after.find(',').unwrap_or(after.len());
            (&after[..end], &after[end..])
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "realm" => realm = Some(value.to_string()),
            "service" => service = Some(value.to_string()),
            "scope" => scope = Some(value.to_string()),
            _ => {}
        }
        rest = remainder.trim_start().trim_start_matches(',').trim_start();
    }

    Some(BearerChallenge {
        realm: realm?,
        service,
        scope,
    })
}

/// Single-component names live under `library/` on Docker Hub.
fn repository_path(image: &str) -> String {
    if image.contains('/') {
        image.to_string()
    } else {
        format!("library/{image}")
    }
}

impl RegistryClient {
    #[must_use]
    pub fn new(
        http: Client,
        base: impl Into<String>,
        credentials: Option<RegistryCredentials>,
    ) -> Self {
        Self {
            http,
            base: base.into(),
            credentials,
        }
    }

    async fn head_manifest(&self, url: &str, token: Option<&str>) -> Result<reqwest::Response> {
        let mut request = self.http.head(url).header(ACCEPT, MANIFEST_TYPES);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request
            .send()
            .await
            .with_context(|| format!("requesting manifest {url}"))
    }

    async fn fetch_token(&self, challenge: &BearerChallenge) -> Result<String> {
        let mut query = Vec::new();
        if let Some(service) = &challenge.service {
            query.push(("service", service.as_str()));
        }
        if let Some(scope) = &challenge.scope {
            query.push(("scope", scope.as_str()));
        }
        let mut request = self.http.get(&challenge.realm).query(&query);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }
        let resp = request
            .send()
            .await
            .with_context(|| format!("requesting registry token from {}", challenge.realm))?;
        let body: TokenResponse = decode(resp, "registry token").await?;
        body.token
            .or(body.access_token)
            .context("registry token response carried no token")
    }
}

impl ImageRegistry for RegistryClient {
    async fn manifest_digest(&self, image: &str, tag: &str) -> Result<Option<String>> {
        let url = join(
            &self.base,
            &format!("/v2/{}/manifests/{tag}", repository_path(image)),
        );

        let mut resp = self.head_manifest(&url, None).await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            let challenge = resp
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_bearer_challenge)
                .context("registry answered 401 without a bearer challenge")?;
            debug!(realm = %challenge.realm, "fetching registry token");
            let token = self.fetch_token(&challenge).await?;
            resp = self.head_manifest(&url, Some(&token)).await?;
        }

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(
                resp.headers()
                    .get(DIGEST_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string(),
            )),
            status => bail!("manifest lookup for {image}:{tag}: HTTP {status}"),
        }
    }
}
