//! # contract: seams between the deployment glue and the outside world
//!
//! Every collaborator the scripts touch is reached through one of the traits below:
//! - [`CommandRunner`]: runs the infrastructure tool as a child process.
//! - [`ObjectStore`]: puts local files into a bucket.
//! - [`IngestionService`]: starts and inspects knowledge-base ingestion jobs.
//! - [`Clock`]: reads time and sleeps between status polls.
//!
//! Real implementations live next to their dependency ([`ProcessRunner`] and [`TokioClock`]
//! here, the AWS clients in the CLI crate). The traits are annotated for `mockall` so tests
//! can script each collaborator deterministically.
//!
//! Trait methods return [`BoxError`]; the core maps those into [`crate::DeployError`].

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::ingestion::IngestionJobStatus;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single external command together with the directory it must run in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory of the child process. The caller's own directory is never changed.
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Command line as a human would type it, for logs and error messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs external commands. Spawn failures (missing binary or directory) are `Err`,
/// a non-zero exit is an `Ok` output whose [`CommandOutput::success`] is false.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        tracing::debug!(
            command = %invocation.command_line(),
            working_dir = %invocation.working_dir.display(),
            "Spawning command"
        );
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .output()?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Destination bucket for uploaded documents.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `path` to `bucket` under `key`.
    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<(), BoxError>;
}

/// Request to start a new ingestion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartIngestionJob {
    pub knowledge_base_id: String,
    pub data_source_id: String,
    /// Free-text description attached to the job.
    pub description: String,
}

/// Identifies an existing ingestion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionJobRef {
    pub knowledge_base_id: String,
    pub data_source_id: String,
    pub ingestion_job_id: String,
}

/// Job record as reported by the indexing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionJob {
    pub ingestion_job_id: String,
    pub status: IngestionJobStatus,
    /// Only populated by the service when the job failed.
    pub failure_reasons: Vec<String>,
}

/// Remote indexing backend that owns ingestion jobs.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait IngestionService: Send + Sync {
    async fn start_ingestion_job(
        &self,
        request: &StartIngestionJob,
    ) -> Result<IngestionJob, BoxError>;

    async fn get_ingestion_job(&self, job: &IngestionJobRef) -> Result<IngestionJob, BoxError>;
}

/// Time source for the status poller.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall-clock [`Clock`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_joins_program_and_args() {
        let invocation = Invocation {
            program: "terraform".into(),
            args: vec!["output".into(), "-json".into()],
            working_dir: PathBuf::from("environments/dev"),
        };
        assert_eq!(invocation.command_line(), "terraform output -json");
    }

    #[test]
    fn signal_termination_is_not_success() {
        let output = CommandOutput {
            status: None,
            ..Default::default()
        };
        assert!(!output.success());
    }
}
