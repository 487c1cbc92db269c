//! Configuration loading: the YAML file plus `SPINWICK_*` secrets.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::config::{Secrets, SpinwickConfig};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SPINWICK_CONFIG";
/// Prefix of the secret environment variables.
pub const SECRETS_PREFIX: &str = "SPINWICK_";

/// YAML config file on disk. A missing file yields the defaults.
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    /// `explicit` (the `--config` flag) wins over `SPINWICK_CONFIG`, which
    /// wins over `~/.spinwick/config.yaml`.
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// validation.
    pub fn load(&self) -> Result<SpinwickConfig> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Load without cross-field validation (used by `config check` to report
    /// every problem itself).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_unvalidated(&self) -> Result<SpinwickConfig> {
        let path = self.path()?;
        if !path.exists() {
            if self.explicit.is_some() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            return Ok(SpinwickConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Resolved config file path.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the home directory cannot be
    /// determined.
    pub fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            return Ok(path.clone());
        }
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".spinwick").join("config.yaml"))
    }
}

/// Read credentials from `SPINWICK_*` environment variables.
///
/// # Errors
///
/// Returns an error if a variable is present but cannot be decoded.
pub fn load_secrets() -> Result<Secrets> {
    envy::prefixed(SECRETS_PREFIX)
        .from_env::<Secrets>()
        .context("cannot read SPINWICK_* environment variables")
}
