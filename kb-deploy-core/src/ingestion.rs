//! Ingestion Trigger and Status Poller.
//!
//! [`start_ingestion`] asks the indexing service for a new job; [`StatusPoller`] then
//! queries the job at a fixed interval until it reaches a terminal status. There is no
//! backoff, no iteration cap and no timeout: the loop ends only when the service reports
//! `COMPLETE`, `FAILED` or `STOPPED`. Service errors end the run immediately, without retry.
//!
//! Time is taken from a [`Clock`], so tests drive the poller without real sleeps.

use std::fmt;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::contract::{Clock, IngestionJob, IngestionJobRef, IngestionService, StartIngestionJob};
use crate::error::{DeployError, Result};

/// Status string of an ingestion job as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IngestionJobStatus {
    Starting,
    InProgress,
    Complete,
    Failed,
    Stopping,
    Stopped,
    /// Any status this crate does not know about. Treated as still running.
    Other(String),
}

impl IngestionJobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "STARTING",
            Self::InProgress => "IN_PROGRESS",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
            Self::Other(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Stopped)
    }
}

impl From<&str> for IngestionJobStatus {
    fn from(s: &str) -> Self {
        match s {
            "STARTING" => Self::Starting,
            "IN_PROGRESS" => Self::InProgress,
            "COMPLETE" => Self::Complete,
            "FAILED" => Self::Failed,
            "STOPPING" => Self::Stopping,
            "STOPPED" => Self::Stopped,
            other => {
                warn!(status = other, "Unknown ingestion job status, treating as in progress");
                Self::Other(other.to_string())
            }
        }
    }
}

impl fmt::Display for IngestionJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionOutcome {
    Complete,
    Failed { reasons: Vec<String> },
    Stopped,
}

impl IngestionOutcome {
    /// `None` while the job is still running.
    pub fn from_job(job: &IngestionJob) -> Option<Self> {
        match job.status {
            IngestionJobStatus::Complete => Some(Self::Complete),
            IngestionJobStatus::Failed => Some(Self::Failed {
                reasons: job.failure_reasons.clone(),
            }),
            IngestionJobStatus::Stopped => Some(Self::Stopped),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Complete)
    }

    pub fn status(&self) -> IngestionJobStatus {
        match self {
            Self::Complete => IngestionJobStatus::Complete,
            Self::Failed { .. } => IngestionJobStatus::Failed,
            Self::Stopped => IngestionJobStatus::Stopped,
        }
    }

    /// User-facing report printed once the job has finished.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Final ingestion job status: {}", self.status())];
        match self {
            Self::Complete => lines.push("Ingestion job completed successfully.".to_string()),
            Self::Failed { reasons } => {
                lines.push("Ingestion job failed.".to_string());
                lines.push("Failure reasons:".to_string());
                lines.extend(reasons.iter().map(|r| format!("- {r}")));
            }
            Self::Stopped => lines.push("Ingestion job stopped.".to_string()),
        }
        lines
    }
}

/// Poller state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// `polls` status queries have returned a non-terminal status so far.
    Polling { polls: u32 },
    Finished(IngestionOutcome),
}

impl Default for PollState {
    fn default() -> Self {
        Self::Polling { polls: 0 }
    }
}

impl PollState {
    /// Feeds one observed job record into the machine. `Finished` is absorbing.
    pub fn advance(self, job: &IngestionJob) -> Self {
        match self {
            Self::Finished(outcome) => Self::Finished(outcome),
            Self::Polling { polls } => match IngestionOutcome::from_job(job) {
                Some(outcome) => Self::Finished(outcome),
                None => Self::Polling { polls: polls + 1 },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub outcome: IngestionOutcome,
    /// Number of status queries issued.
    pub polls: u32,
    pub sleeps: u32,
    pub elapsed: Duration,
}

impl StartIngestionJob {
    pub fn new(
        knowledge_base_id: impl Into<String>,
        data_source_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            knowledge_base_id: knowledge_base_id.into(),
            data_source_id: data_source_id.into(),
            description: description.into(),
        }
    }

    /// Reference to the job created by this request.
    pub fn job_ref(&self, job: &IngestionJob) -> IngestionJobRef {
        IngestionJobRef {
            knowledge_base_id: self.knowledge_base_id.clone(),
            data_source_id: self.data_source_id.clone(),
            ingestion_job_id: job.ingestion_job_id.clone(),
        }
    }
}

/// Starts a new ingestion job and returns the record the service created.
pub async fn start_ingestion<S>(service: &S, request: &StartIngestionJob) -> Result<IngestionJob>
where
    S: IngestionService + ?Sized,
{
    info!(
        knowledge_base_id = %request.knowledge_base_id,
        data_source_id = %request.data_source_id,
        description = %request.description,
        "[INGEST] Starting ingestion job"
    );
    let job = service
        .start_ingestion_job(request)
        .await
        .map_err(|source| {
            error!(error = %source, "[INGEST][ERROR] start_ingestion_job failed");
            DeployError::ServiceCall {
                operation: "start_ingestion_job",
                source,
            }
        })?;

    if job.ingestion_job_id.is_empty() {
        return Err(DeployError::MalformedResponse {
            operation: "start_ingestion_job",
            detail: "ingestion job id is empty".to_string(),
        });
    }
    info!(
        ingestion_job_id = %job.ingestion_job_id,
        status = %job.status,
        "[INGEST] Ingestion job started"
    );
    Ok(job)
}

/// Polls an ingestion job at a fixed interval until it reaches a terminal status.
pub struct StatusPoller<'a, S: ?Sized, C: ?Sized> {
    service: &'a S,
    clock: &'a C,
    interval: Duration,
}

impl<'a, S, C> StatusPoller<'a, S, C>
where
    S: IngestionService + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(service: &'a S, clock: &'a C, interval: Duration) -> Self {
        Self {
            service,
            clock,
            interval,
        }
    }

    /// Blocks until the job is terminal, then prints and returns the outcome.
    pub async fn wait(&self, job: &IngestionJobRef) -> Result<PollReport> {
        let started = self.clock.now();
        let mut state = PollState::default();
        let mut polls = 0;
        let mut sleeps = 0;

        let outcome = loop {
            let current = self.service.get_ingestion_job(job).await.map_err(|source| {
                error!(
                    error = %source,
                    ingestion_job_id = %job.ingestion_job_id,
                    "[INGEST][ERROR] get_ingestion_job failed"
                );
                DeployError::ServiceCall {
                    operation: "get_ingestion_job",
                    source,
                }
            })?;
            polls += 1;
            debug!(?current, "[INGEST] Polled ingestion job");

            state = state.advance(&current);
            if let PollState::Finished(outcome) = state {
                break outcome;
            }

            info!(
                ingestion_job_id = %job.ingestion_job_id,
                status = %current.status,
                "[INGEST] Ingestion job still running"
            );
            println!(
                "Ingestion job status: {} (Checking again in {} seconds)",
                current.status,
                self.interval.as_secs()
            );
            self.clock.sleep(self.interval).await;
            sleeps += 1;
        };

        for line in outcome.summary_lines() {
            println!("{line}");
        }
        match &outcome {
            IngestionOutcome::Complete => {
                info!(ingestion_job_id = %job.ingestion_job_id, polls, "[INGEST] Ingestion job completed")
            }
            IngestionOutcome::Failed { reasons } => {
                error!(ingestion_job_id = %job.ingestion_job_id, ?reasons, "[INGEST] Ingestion job failed")
            }
            IngestionOutcome::Stopped => {
                warn!(ingestion_job_id = %job.ingestion_job_id, "[INGEST] Ingestion job stopped")
            }
        }

        Ok(PollReport {
            outcome,
            polls,
            sleeps,
            elapsed: self.clock.now().saturating_duration_since(started),
        })
    }
}
