//! Application context: unified state passed to every command handler.
//!
//! Configuration is loaded on demand so `config show` and `config check` work
//! with a broken file, and only the workflow commands build the HTTP backend.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::LifecycleController;
use crate::domain::SpinwickConfig;
use crate::infra::backend::{HttpBackend, email_relay};
use crate::infra::config::{YamlConfigStore, load_secrets};
use crate::output::OutputContext;

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// `--config` override.
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context.
    pub output: OutputContext,
    /// Where the YAML configuration lives.
    pub config_store: YamlConfigStore,
}

impl AppContext {
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        Self {
            output: OutputContext::new(flags.no_color),
            config_store: YamlConfigStore::new(flags.config),
        }
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or invalid.
    pub fn config(&self) -> Result<SpinwickConfig> {
        self.config_store.load()
    }

    /// Workflow controller over the production backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or secrets cannot be loaded or the
    /// backend cannot be built.
    pub fn controller(&self) -> Result<LifecycleController<HttpBackend>> {
        let config = self.config()?;
        let secrets = load_secrets()?;
        let backend = HttpBackend::new(&config, &secrets)?;
        Ok(LifecycleController::new(
            config,
            email_relay(&secrets),
            backend,
        ))
    }
}
