//! # AWS clients
//!
//! Real implementations of the core seams:
//! - [`S3Store`] implements [`ObjectStore`] with `PutObject`.
//! - [`BedrockAgentService`] implements [`IngestionService`] with the Bedrock agent
//!   `StartIngestionJob` / `GetIngestionJob` operations.
//!
//! Both are built from one region-scoped [`SdkConfig`]; credentials come from the default
//! provider chain (environment, `.env`, profile, instance role). Calls are never retried
//! beyond what the SDK itself does.

use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_bedrockagent::types as agent;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use kb_deploy_core::contract::{
    BoxError, IngestionJob, IngestionJobRef, IngestionService, ObjectStore, StartIngestionJob,
};
use kb_deploy_core::ingestion::IngestionJobStatus;

pub async fn load_sdk_config(region: &str) -> SdkConfig {
    tracing::info!(region, "Loading AWS configuration");
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<(), BoxError> {
        tracing::debug!(bucket, key, path = %path.display(), "PutObject");
        let body = ByteStream::from_path(path).await?;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| -> BoxError {
                aws_sdk_s3::error::DisplayErrorContext(&e).to_string().into()
            })?;
        Ok(())
    }
}

pub struct BedrockAgentService {
    client: aws_sdk_bedrockagent::Client,
}

impl BedrockAgentService {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockagent::Client::new(sdk_config),
        }
    }
}

/// Maps the SDK job record into the core model. Whether the SDK exposes these members as
/// `Option` differs between releases, so every accessor is normalised through `Option::from`.
fn to_job(operation: &str, job: Option<&agent::IngestionJob>) -> Result<IngestionJob, BoxError> {
    let job = job.ok_or_else(|| format!("{operation} response has no ingestionJob"))?;
    let id: Option<&str> = Option::from(job.ingestion_job_id());
    let status: Option<&agent::IngestionJobStatus> = Option::from(job.status());
    let reasons: Option<&[String]> = Option::from(job.failure_reasons());

    let id = id.ok_or_else(|| format!("{operation} response has no ingestionJobId"))?;
    let status = status.ok_or_else(|| format!("{operation} response has no status"))?;
    Ok(IngestionJob {
        ingestion_job_id: id.to_string(),
        status: IngestionJobStatus::from(status.as_str()),
        failure_reasons: reasons.map(<[String]>::to_vec).unwrap_or_default(),
    })
}

#[async_trait]
impl IngestionService for BedrockAgentService {
    async fn start_ingestion_job(
        &self,
        request: &StartIngestionJob,
    ) -> Result<IngestionJob, BoxError> {
        let output = self
            .client
            .start_ingestion_job()
            .knowledge_base_id(&request.knowledge_base_id)
            .data_source_id(&request.data_source_id)
            .description(&request.description)
            .send()
            .await
            .map_err(|e| -> BoxError {
                aws_sdk_bedrockagent::error::DisplayErrorContext(&e)
                    .to_string()
                    .into()
            })?;
        to_job("StartIngestionJob", Option::from(output.ingestion_job()))
    }

    async fn get_ingestion_job(&self, job: &IngestionJobRef) -> Result<IngestionJob, BoxError> {
        let output = self
            .client
            .get_ingestion_job()
            .knowledge_base_id(&job.knowledge_base_id)
            .data_source_id(&job.data_source_id)
            .ingestion_job_id(&job.ingestion_job_id)
            .send()
            .await
            .map_err(|e| -> BoxError {
                aws_sdk_bedrockagent::error::DisplayErrorContext(&e)
                    .to_string()
                    .into()
            })?;
        to_job("GetIngestionJob", Option::from(output.ingestion_job()))
    }
}
