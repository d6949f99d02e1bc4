use std::path::PathBuf;

use thiserror::Error;

use crate::contract::BoxError;

pub type Result<T, E = DeployError> = std::result::Result<T, E>;

/// Every failure the deployment glue can report.
///
/// `Upload` is the only non-fatal kind: the uploader records it per file and moves on.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("`{command}` failed in {} (exit status {}): {stderr}", .working_dir.display(), .status.map_or_else(|| "none".to_string(), |s| s.to_string()))]
    ToolInvocation {
        command: String,
        working_dir: PathBuf,
        status: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse output of `{command}` as JSON: {source}")]
    OutputParse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("infrastructure output `{key}` is missing")]
    MissingOutputKey { key: String },

    #[error("failed to upload {file} to {bucket}/{key}: {message}")]
    Upload {
        file: String,
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to list data directory {}: {source}", .path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} failed: {source}")]
    ServiceCall {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("{operation} returned a malformed response: {detail}")]
    MalformedResponse {
        operation: &'static str,
        detail: String,
    },
}
