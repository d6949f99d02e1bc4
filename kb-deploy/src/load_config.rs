//! `load_config` module: Loads the optional YAML settings file for `ingest-files` and merges
//! it into the core [`DeployConfig`].
//!
//! Every key is optional; anything left out keeps the default layout (`environments/<env>`,
//! `./data`, 30 second polling, 2 second settle delay, "First Ingestion" description).
//!
//! ```yaml
//! environments_dir: infra/environments
//! data_dir: ./documents
//! poll_interval_secs: 10
//! settle_delay_secs: 5
//! description: Nightly ingestion
//! ```
//!
//! # Errors
//! All errors in this module use `anyhow::Error` for context-rich diagnostics, and are surfaced at the CLI boundary.

use anyhow::Result;
use kb_deploy_core::config::DeployConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub environments_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub poll_interval_secs: Option<u64>,
    pub settle_delay_secs: Option<u64>,
    pub description: Option<String>,
}

impl SettingsFile {
    /// Overrides the fields of `config` that are set in the file.
    pub fn apply(self, config: &mut DeployConfig) {
        if let Some(dir) = self.environments_dir {
            config.environments_dir = dir;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(secs) = self.poll_interval_secs {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.settle_delay_secs {
            config.settle_delay = Duration::from_secs(secs);
        }
        if let Some(description) = self.description {
            config.job_description = description;
        }
    }
}

/// Loads a YAML settings file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SettingsFile> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading settings from file");

    let content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read settings file");
            return Err(anyhow::anyhow!(
                "Failed to read settings file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let settings: SettingsFile = match serde_yaml::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse settings YAML");
            return Err(anyhow::anyhow!("Failed to parse settings YAML: {e}"));
        }
    };

    info!(config_path = ?path_ref, ?settings, "Parsed settings YAML successfully");
    Ok(settings)
}
