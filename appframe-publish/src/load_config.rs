//! `load_config` module: reads a publish config file, applies command-line overrides and
//! fills in credentials from the environment.
//!
//! # Responsibilities
//! - Parse JSON or YAML config files into [`PublishConfig`] (`serde_yaml` reads both)
//! - Let flags win over file values
//! - Reject an invalid `--type` before anything is published
//! - Inject `APPFRAME_USER` / `APPFRAME_PASSWORD` when neither file nor flags set them
//!
//! # Errors
//! All errors use `anyhow::Error` and abort the run at the CLI boundary.

use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use appframe_publish_core::config::PublishConfig;
use appframe_publish_core::item::PublishType;
use tracing::{error, info};

pub const USER_ENV: &str = "APPFRAME_USER";
pub const PASSWORD_ENV: &str = "APPFRAME_PASSWORD";

/// Values given on the command line. Each set field replaces the file's value.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub domain: Option<String>,
    pub hostname: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub kind: Option<String>,
    /// Owning article for an article-script primary target.
    pub article: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConfigOverrides {
    fn apply(self, config: &mut PublishConfig) -> Result<()> {
        if let Some(kind) = self.kind {
            let kind = kind.to_lowercase();
            if let Err(e) = kind.parse::<PublishType>() {
                error!(kind = %kind, "Invalid --type");
                bail!(e);
            }
            config.kind = Some(kind);
        }

        fn set(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }
        set(&mut config.domain, self.domain);
        set(&mut config.hostname, self.hostname);
        set(&mut config.source, self.source);
        set(&mut config.target, self.target);
        set(&mut config.target_article_id, self.article);
        set(&mut config.user, self.user);
        set(&mut config.password, self.password);
        Ok(())
    }
}

/// Reads the config file at `path` (if any) and merges flags and environment into it.
pub fn load_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<PublishConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => {
            info!("No config file given, using command-line values only");
            PublishConfig::default()
        }
    };

    overrides.apply(&mut config)?;

    if config.user.is_none() {
        config.user = std::env::var(USER_ENV).ok();
    }
    if config.password.is_none() {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            info!("{} found in env", PASSWORD_ENV);
            config.password = Some(password);
        }
    }

    config.trace_loaded();
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<PublishConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => {
            info!(config_path = ?path, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path,
                e
            ));
        }
    };

    match serde_yaml::from_str(&content) {
        Ok(config) => {
            info!(config_path = ?path, "Parsed config successfully");
            Ok(config)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config");
            Err(anyhow::anyhow!("Failed to parse config {:?}: {e}", path))
        }
    }
}
