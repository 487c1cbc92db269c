//! Integration tests for the spinwick CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod cli_tests;
mod config_command;
mod helpers;
mod workflow_commands;
