//! `spinwick config show|check`.

use predicates::prelude::*;

use crate::helpers::{Workspace, spinwick};

#[test]
fn test_config_check_accepts_valid_file() {
    let ws = Workspace::with_extra(
        "repositories:\n  - owner: mattermost\n    name: mattermost-server\n    build_status_context: ci/build\n    ci: { kind: status-api }\n",
    );
    ws.cmd()
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 repositories"));
}

#[test]
fn test_config_check_rejects_unknown_jenkins_server() {
    let ws = Workspace::with_extra(
        "repositories:\n  - owner: mattermost\n    name: mattermost-server\n    build_status_context: ci/build\n    ci: { kind: jenkins, server: missing }\n",
    );
    ws.cmd()
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_config_show_prints_effective_settings() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("provisioner_url: http://127.0.0.1:9"))
        .stdout(predicate::str::contains("miniSingleton"));
}

#[test]
fn test_config_show_with_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    spinwick()
        .arg("--config")
        .arg(dir.path().join("absent.yaml"))
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_config_env_var_selects_file() {
    let ws = Workspace::with_extra("dns_base_domain: env.example.com\n");
    spinwick()
        .env("SPINWICK_CONFIG", &ws.config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("env.example.com"));
}
