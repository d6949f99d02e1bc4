pub mod aws;
pub mod cli;
pub mod load_config;

pub use cli::{init_tracing, run_frontend_env, run_ingest, FrontendEnvCli, IngestCli, TargetArgs};
