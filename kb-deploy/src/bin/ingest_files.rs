use anyhow::Result;
use clap::Parser;
use kb_deploy::cli::{init_tracing, run_ingest, IngestCli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment (AWS credentials, TERRAFORM_BIN)
    dotenvy::dotenv().ok();

    init_tracing();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = IngestCli::parse();
    let result = run_ingest(cli).await;
    match &result {
        Ok(_) => tracing::info!("CLI completed successfully"),
        Err(e) => tracing::error!(error = %e, "CLI exited with error"),
    }
    result.map(|_| ())
}
