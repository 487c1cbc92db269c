//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: REST clients for the code
//! host, CI, registry, provisioning server and deployed environments, the
//! JSON record store, and configuration loading.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod app_client;
pub mod backend;
pub mod config;
pub mod github;
pub mod http;
pub mod jenkins;
pub mod network;
pub mod provisioner;
pub mod registry;
pub mod store;
