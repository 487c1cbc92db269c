use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// The binary with a clean environment: no colors, no ambient secrets.
pub fn spinwick() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("spinwick"));
    cmd.env("NO_COLOR", "1")
        .env_remove("SPINWICK_CONFIG")
        .env_remove("SPINWICK_GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// A config file whose store lives inside the temp dir.
pub struct Workspace {
    pub dir: TempDir,
    pub config: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_extra("")
    }

    pub fn with_extra(extra: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("config.yaml");
        let store = dir.path().join("store");
        std::fs::write(
            &config,
            format!(
                "provisioner_url: http://127.0.0.1:9\nstore_dir: {}\n{extra}",
                store.display()
            ),
        )
        .expect("write config");
        Self { dir, config }
    }

    pub fn store(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = spinwick();
        cmd.arg("--config").arg(&self.config);
        cmd
    }
}

pub fn write_record(store: &Path, number: u64, installation_id: &str) {
    let records = store.join("records");
    std::fs::create_dir_all(&records).expect("create records dir");
    std::fs::write(
        records.join(format!("{number}.json")),
        format!(
            r#"{{"number":{number},"repo_owner":"mattermost","repo_name":"mattermost-server","installation_id":"{installation_id}","created_at":"2026-01-01T00:00:00Z"}}"#
        ),
    )
    .expect("write record");
}
