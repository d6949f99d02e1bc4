//! Ingestion Runner pipeline: outputs → upload → settle → start job → poll.
//!
//! Fail-fast on every step except individual uploads. The caller supplies the outputs and
//! every collaborator, so the whole run can be exercised against mocks.
//!
//! # Navigation
//! - Main entrypoint: [`ingest_files`]
//! - Supporting types: [`IngestTargets`], [`IngestReport`].

use tracing::info;

use crate::config::DeployConfig;
use crate::contract::{Clock, IngestionService, ObjectStore, StartIngestionJob};
use crate::error::Result;
use crate::ingestion::{start_ingestion, PollReport, StatusPoller};
use crate::outputs::OutputSet;
use crate::upload::{upload_directory, UploadReport};

pub const KNOWLEDGE_BASE_ID: &str = "knowledge_base_id";
pub const DATA_SOURCE_ID: &str = "data_source_id";
pub const BUCKET_NAME: &str = "resume_bucket_name";

/// Infrastructure identifiers the runner needs, all resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestTargets {
    pub knowledge_base_id: String,
    pub data_source_id: String,
    pub bucket_name: String,
}

impl IngestTargets {
    pub fn from_outputs(outputs: &OutputSet) -> Result<Self> {
        Ok(Self {
            knowledge_base_id: outputs.require_text(KNOWLEDGE_BASE_ID)?,
            data_source_id: outputs.require_text(DATA_SOURCE_ID)?,
            bucket_name: outputs.require_text(BUCKET_NAME)?,
        })
    }
}

#[derive(Debug)]
pub struct IngestReport {
    pub upload: UploadReport,
    pub ingestion_job_id: String,
    pub poll: PollReport,
}

pub async fn ingest_files<S, I, C>(
    config: &DeployConfig,
    outputs: &OutputSet,
    store: &S,
    service: &I,
    clock: &C,
) -> Result<IngestReport>
where
    S: ObjectStore + ?Sized,
    I: IngestionService + ?Sized,
    C: Clock + ?Sized,
{
    let targets = IngestTargets::from_outputs(outputs)?;
    info!(?targets, "[PIPELINE] Resolved ingestion targets");

    let upload = upload_directory(store, &targets.bucket_name, &config.data_dir).await?;

    clock.sleep(config.settle_delay).await;

    let request = StartIngestionJob::new(
        targets.knowledge_base_id,
        targets.data_source_id,
        config.job_description.clone(),
    );
    let job = start_ingestion(service, &request).await?;
    let job_ref = request.job_ref(&job);

    let poll = StatusPoller::new(service, clock, config.poll_interval)
        .wait(&job_ref)
        .await?;
    info!(
        ingestion_job_id = %job_ref.ingestion_job_id,
        outcome = ?poll.outcome,
        polls = poll.polls,
        elapsed_secs = poll.elapsed.as_secs(),
        "[PIPELINE] Ingestion run finished"
    );

    Ok(IngestReport {
        upload,
        ingestion_job_id: job_ref.ingestion_job_id,
        poll,
    })
}
