//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod bootstrap;
pub mod build;
pub mod config;
pub mod error;
pub mod workflow;

pub use config::{CiMechanism, Messages, RepositoryConfig, Secrets, SpinwickConfig, StageTiming};
pub use error::{ConfigError, ErrorKind, SpinwickError, classify};
pub use workflow::WorkflowOutcome;
