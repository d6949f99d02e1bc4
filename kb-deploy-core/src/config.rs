// kb-deploy-core/src/config.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_ENVIRONMENT: &str = "dev";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";
pub const DEFAULT_JOB_DESCRIPTION: &str = "First Ingestion";

/// Resolved settings for one run of either script.
///
/// Defaults reproduce the fixed layout the scripts were written against: state lives in
/// `environments/<env>`, documents in `./data`, status is polled every 30 seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    pub environment: String,
    pub region: String,
    pub terraform_bin: String,
    pub environments_dir: PathBuf,
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    /// Pause between the last upload and starting the ingestion job.
    pub settle_delay: Duration,
    pub job_description: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            region: DEFAULT_REGION.to_string(),
            terraform_bin: DEFAULT_TERRAFORM_BIN.to_string(),
            environments_dir: PathBuf::from("environments"),
            data_dir: PathBuf::from("./data"),
            poll_interval: Duration::from_secs(30),
            settle_delay: Duration::from_secs(2),
            job_description: DEFAULT_JOB_DESCRIPTION.to_string(),
        }
    }
}

impl DeployConfig {
    /// Directory whose Terraform state backs `self.environment`.
    pub fn environment_dir(&self) -> PathBuf {
        environment_dir(&self.environments_dir, &self.environment)
    }

    pub fn trace_loaded(&self) {
        info!(
            environment = %self.environment,
            region = %self.region,
            data_dir = %self.data_dir.display(),
            poll_interval_secs = self.poll_interval.as_secs(),
            "Loaded DeployConfig"
        );
        debug!(?self, "DeployConfig loaded (full debug)");
    }
}

pub fn environment_dir(environments_dir: &Path, environment: &str) -> PathBuf {
    environments_dir.join(environment)
}
