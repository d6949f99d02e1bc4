//! This module implements the CLI surface of kb-deploy: argument parsing, settings
//! resolution, tracing setup and the two script entrypoints.
//!
//! All behaviour (output reading, rendering, uploads, ingestion polling) lives in the
//! [`kb-deploy-core`] crate. This module is strictly glue.
//!
//! ## Binaries
//! - `frontend-env`: prints the `VITE_*` block for the front-end build, see [`run_frontend_env`].
//! - `ingest-files`: uploads `./data` and drives an ingestion job, see [`run_ingest`].
//!
//! Both accept `--env` (default `dev`) and `--region` (default `us-east-1`).
//!
//! [`kb-deploy-core`]: ../../kb-deploy-core/

use crate::aws::{load_sdk_config, BedrockAgentService, S3Store};
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Args, Parser};
use kb_deploy_core::config::{
    DeployConfig, DEFAULT_ENVIRONMENT, DEFAULT_REGION, DEFAULT_TERRAFORM_BIN,
};
use kb_deploy_core::contract::TokioClock;
use kb_deploy_core::frontend_env::FrontendEnv;
use kb_deploy_core::outputs::{OutputReader, OutputSet};
use kb_deploy_core::pipeline::{ingest_files, IngestReport};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Arguments shared by both scripts.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Environment to use (dev, prod, etc).
    #[clap(long, default_value = DEFAULT_ENVIRONMENT)]
    pub env: String,

    /// AWS Region name (us-east-1, us-west-2, etc).
    #[clap(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Terraform executable used to read outputs.
    #[clap(long, env = "TERRAFORM_BIN", default_value = DEFAULT_TERRAFORM_BIN)]
    pub terraform_bin: String,
}

impl TargetArgs {
    pub fn apply(&self, config: &mut DeployConfig) {
        config.environment = self.env.clone();
        config.region = self.region.clone();
        config.terraform_bin = self.terraform_bin.clone();
    }
}

/// Print front-end environment settings from Terraform outputs.
#[derive(Parser, Debug)]
#[clap(
    name = "frontend-env",
    version,
    about = "Generate front-end VITE_* settings from Terraform outputs"
)]
pub struct FrontendEnvCli {
    #[clap(flatten)]
    pub target: TargetArgs,
}

/// Upload documents and run a knowledge-base ingestion job.
#[derive(Parser, Debug)]
#[clap(
    name = "ingest-files",
    version,
    about = "Run ingestion process using Terraform outputs"
)]
pub struct IngestCli {
    #[clap(flatten)]
    pub target: TargetArgs,

    /// Optional YAML settings file (data_dir, poll_interval_secs, ...)
    #[clap(long)]
    pub config: Option<PathBuf>,
}

/// Logs go to stderr; stdout is reserved for the scripts' own output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_outputs(config: &DeployConfig) -> Result<OutputSet> {
    let outputs = OutputReader::from_config(config).read(&config.environment)?;
    Ok(outputs)
}

/// Entrypoint of `frontend-env`. Nothing is printed unless every required output resolves.
pub fn run_frontend_env(cli: FrontendEnvCli) -> Result<()> {
    tracing::info!("trace_initialised");

    let mut config = DeployConfig::default();
    cli.target.apply(&mut config);
    config.trace_loaded();

    let outputs = read_outputs(&config)?;
    let env = FrontendEnv::from_outputs(&outputs, &config.region)?;
    tracing::info!(command = "frontend-env", environment = %config.environment, "Rendering front-end settings");
    println!("{env}");
    Ok(())
}

/// Builds the run settings from defaults, the optional settings file and the flags.
pub fn resolve_ingest_config(cli: &IngestCli) -> Result<DeployConfig> {
    let mut config = DeployConfig::default();
    if let Some(path) = &cli.config {
        load_config(path)?.apply(&mut config);
    }
    cli.target.apply(&mut config);
    Ok(config)
}

/// Entrypoint of `ingest-files`.
pub async fn run_ingest(cli: IngestCli) -> Result<IngestReport> {
    tracing::info!("trace_initialised");

    let config = resolve_ingest_config(&cli)?;
    config.trace_loaded();

    let outputs = read_outputs(&config)?;

    let sdk_config = load_sdk_config(&config.region).await;
    let store = S3Store::new(&sdk_config);
    let service = BedrockAgentService::new(&sdk_config);

    match ingest_files(&config, &outputs, &store, &service, &TokioClock).await {
        Ok(report) => {
            tracing::info!(
                command = "ingest-files",
                uploaded = report.upload.uploaded.len(),
                failed_uploads = report.upload.failed.len(),
                success = report.poll.outcome.is_success(),
                "Ingestion run complete"
            );
            Ok(report)
        }
        Err(e) => {
            tracing::error!(command = "ingest-files", error = %e, "Ingestion run failed");
            Err(e.into())
        }
    }
}
