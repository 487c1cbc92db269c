//! Shared HTTP plumbing for the REST adapters.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::domain::SpinwickError;

/// Per-request timeout of every outbound call. Poll loops own the overall
/// stage deadline.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The one client shared by all adapters.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("spinwick/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("building HTTP client")
}

/// `base` + `path` with exactly one slash between them.
#[must_use]
pub fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pass a success response through; anything else becomes an (untyped,
/// retryable) error carrying the status and body.
///
/// # Errors
///
/// Returns an error for any non-2xx status.
pub async fn ensure_success(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    bail!("{what}: HTTP {status}: {}", body.trim())
}

/// Decode a JSON success body. Undecodable bodies are `SpinwickError::Decode`.
///
/// # Errors
///
/// Returns an error for a non-2xx status, a broken connection, or a body that
/// does not match `T`.
pub async fn decode<T: DeserializeOwned>(resp: Response, what: &'static str) -> Result<T> {
    let resp = ensure_success(resp, what).await?;
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading {what} response"))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        SpinwickError::Decode {
            what,
            message: e.to_string(),
        }
        .into()
    })
}
