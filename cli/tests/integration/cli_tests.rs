//! Help, version and argument parsing of the binary.

use predicates::prelude::*;

use crate::helpers::spinwick;

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // An env-sourced flag counts as an argument, which would suppress the help.
    spinwick()
        .env_remove("NO_COLOR")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Ephemeral per-pull-request review environments",
        ));
}

#[test]
fn test_no_color_accepts_conventional_values() {
    for value in ["1", "true", "yes", "0", ""] {
        spinwick()
            .env("NO_COLOR", value)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn test_cli_help_lists_commands() {
    spinwick()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("track"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("destroy"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    spinwick()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("spinwick"));
}

#[test]
fn test_unknown_command_fails() {
    spinwick().arg("frobnicate").assert().code(2);
}

#[test]
fn test_track_requires_sha() {
    spinwick()
        .args(["track", "--owner", "o", "--repo", "r", "--number", "1", "--branch", "b"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--sha"));
}
