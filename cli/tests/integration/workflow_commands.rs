//! `track`, `status` and the workflow commands' offline paths.

use predicates::prelude::*;

use crate::helpers::{Workspace, write_record};

const PR: [&str; 6] = ["--owner", "mattermost", "--repo", "mattermost-server", "--number", "42"];

#[test]
fn test_track_stores_snapshot() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("track")
        .args(PR)
        .args(["--sha", "abc1234def", "--branch", "feature", "--label", "Setup Cloud Test Server"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tracking mattermost/mattermost-server#42"));

    let saved = std::fs::read_to_string(
        ws.store()
            .join("pulls")
            .join("mattermost")
            .join("mattermost-server")
            .join("42.json"),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(value["sha"], "abc1234def");
    assert_eq!(value["labels"][0], "Setup Cloud Test Server");
}

#[test]
fn test_track_warns_on_short_sha() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("track")
        .args(PR)
        .args(["--sha", "abc", "--branch", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shorter than 7"));
}

#[test]
fn test_status_without_record_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["status", "--number", "42"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("no environment recorded"));
}

#[test]
fn test_status_json_without_record_is_error_object() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args(["status", "--number", "42", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "NOT_FOUND");
}

#[test]
fn test_status_shows_record() {
    let ws = Workspace::new();
    write_record(&ws.store(), 42, "inst-123");

    ws.cmd()
        .args(["status", "--number", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("inst-123"));

    let output = ws
        .cmd()
        .args(["status", "--number", "42", "--json"])
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["installation_id"], "inst-123");
}

#[test]
fn test_update_untracked_pull_request_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("update")
        .args(PR)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not tracked"));
}

#[test]
fn test_update_without_label_is_skipped() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("track")
        .args(PR)
        .args(["--sha", "abc1234def", "--branch", "feature"])
        .assert()
        .success();

    ws.cmd()
        .arg("update")
        .args(PR)
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));
}

#[test]
fn test_destroy_without_record_is_a_noop() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("track")
        .args(PR)
        .args(["--sha", "abc1234def", "--branch", "feature"])
        .assert()
        .success();

    ws.cmd()
        .arg("destroy")
        .args(PR)
        .assert()
        .success()
        .stdout(predicate::str::contains("has no environment"));
}

#[test]
fn test_destroy_removes_record_even_when_provisioner_is_down() {
    let ws = Workspace::new();
    write_record(&ws.store(), 42, "inst-123");
    ws.cmd()
        .arg("track")
        .args(PR)
        .args(["--sha", "abc1234def", "--branch", "feature"])
        .assert()
        .success();

    ws.cmd()
        .arg("destroy")
        .args(PR)
        .assert()
        .success()
        .stdout(predicate::str::contains("inst-123"));

    assert!(!ws.store().join("records").join("42.json").exists());
}
