use anyhow::Result;
use clap::Parser;
use kb_deploy::cli::{init_tracing, run_frontend_env, FrontendEnvCli};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = FrontendEnvCli::parse();
    let result = run_frontend_env(cli);
    if let Err(e) = &result {
        tracing::error!(error = %e, "frontend-env exited with error");
    }
    result
}
