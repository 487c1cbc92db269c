//! Infrastructure implementation of the record and pull-request store ports.
//!
//! `JsonFileStore` keeps one JSON file per key and performs all filesystem
//! work in `tokio::task::spawn_blocking`, with atomic writes (temp file +
//! rename) so a crash never leaves a half-written record.
//!
//! ```text
//! <root>/records/<number>.json
//! <root>/pulls/<owner>/<repo>/<number>.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use spinwick_common::{InstallationRecord, PullRequestRef};

use crate::application::ports::{InstallationRecordStore, PullRequestStore};
use crate::domain::SpinwickConfig;

/// File-backed store, keyed by pull request number.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at `~/.spinwick/store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_root(home.join(".spinwick").join("store")))
    }

    /// Store at the configured `store_dir`, else the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if no directory is configured and the home directory
    /// cannot be determined.
    pub fn from_config(config: &SpinwickConfig) -> Result<Self> {
        match &config.store_dir {
            Some(dir) => Ok(Self::with_root(dir.clone())),
            None => Self::new(),
        }
    }

    /// Store rooted at an explicit directory (config override and tests).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, number: u64) -> PathBuf {
        self.root.join("records").join(format!("{number}.json"))
    }

    fn pull_request_path(&self, owner: &str, repo: &str, number: u64) -> PathBuf {
        self.root
            .join("pulls")
            .join(sanitize(owner))
            .join(sanitize(repo))
            .join(format!("{number}.json"))
    }
}

/// Keep path components inside the store.
fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

fn load_sync<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(value))
}

fn save_sync<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value).context("serializing record")?;

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, &content)
        .with_context(|| format!("writing temp file {}", temp_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
    }

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("finalizing {}", path.display()))?;
    Ok(())
}

fn remove_sync(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
}

async fn load<T: DeserializeOwned + Send + 'static>(path: PathBuf) -> Result<Option<T>> {
    tokio::task::spawn_blocking(move || load_sync(&path))
        .await
        .context("store load task panicked")?
}

async fn save<T: Serialize + Send + 'static>(path: PathBuf, value: T) -> Result<()> {
    tokio::task::spawn_blocking(move || save_sync(&path, &value))
        .await
        .context("store save task panicked")?
}

impl InstallationRecordStore for JsonFileStore {
    async fn get_record(&self, number: u64) -> Result<Option<InstallationRecord>> {
        load(self.record_path(number)).await
    }

    async fn save_record(&self, record: &InstallationRecord) -> Result<()> {
        save(self.record_path(record.number), record.clone()).await
    }

    async fn delete_record(&self, number: u64) -> Result<()> {
        let path = self.record_path(number);
        tokio::task::spawn_blocking(move || remove_sync(&path))
            .await
            .context("store delete task panicked")?
    }
}

impl PullRequestStore for JsonFileStore {
    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Option<PullRequestRef>> {
        load(self.pull_request_path(owner, repo, number)).await
    }

    async fn save_pull_request(&self, pr: &PullRequestRef) -> Result<()> {
        let path = self.pull_request_path(&pr.repo_owner, &pr.repo_name, pr.number);
        save(path, pr.clone()).await
    }
}
