//! Uploader: copies every entry of the data directory into the knowledge-base bucket.
//!
//! The directory is listed once before the first upload; files added afterwards are not
//! picked up. Entries are uploaded one at a time in file-name order with the file name as
//! object key. A failed upload is logged and recorded in the [`UploadReport`], and the
//! remaining entries are still attempted.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::contract::ObjectStore;
use crate::error::{DeployError, Result};

/// Snapshot of the data directory taken before uploading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadManifest {
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub file_name: String,
    pub path: PathBuf,
}

impl ManifestEntry {
    /// Object key in the bucket: the bare file name, no prefix.
    pub fn key(&self) -> &str {
        &self.file_name
    }
}

impl UploadManifest {
    /// Lists `data_dir` without recursing. Subdirectories are kept as entries; uploading
    /// them fails per entry like any other unreadable file.
    pub fn snapshot(data_dir: &Path) -> Result<Self> {
        let read_dir = fs::read_dir(data_dir).map_err(|source| DeployError::DataDir {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| DeployError::DataDir {
                path: data_dir.to_path_buf(),
                source,
            })?;
            entries.push(ManifestEntry {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
            });
        }
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Keys that were stored successfully.
    pub uploaded: Vec<String>,
    /// Keys that failed, with the error message.
    pub failed: Vec<(String, String)>,
}

impl UploadReport {
    pub fn attempted(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }
}

/// Uploads every entry of `manifest` to `bucket`. Never fails: per-entry errors end up in
/// the report.
pub async fn upload_manifest<S>(store: &S, bucket: &str, manifest: &UploadManifest) -> UploadReport
where
    S: ObjectStore + ?Sized,
{
    let mut report = UploadReport::default();

    for entry in &manifest.entries {
        let key = entry.key();
        match store.put_object(bucket, key, &entry.path).await {
            Ok(()) => {
                info!(file = %entry.file_name, bucket, key, "[UPLOAD] put_object succeeded");
                println!("Successfully uploaded {} to {bucket}/{key}", entry.file_name);
                report.uploaded.push(key.to_string());
            }
            Err(e) => {
                let err = DeployError::Upload {
                    file: entry.file_name.clone(),
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message: e.to_string(),
                };
                error!(error = %err, "[UPLOAD][ERROR] put_object failed, continuing with next file");
                println!("Error uploading {} to {bucket}/{key}: {e}", entry.file_name);
                report.failed.push((key.to_string(), e.to_string()));
            }
        }
    }

    info!(
        bucket,
        uploaded = report.uploaded.len(),
        failed = report.failed.len(),
        "[UPLOAD] Finished uploading data directory"
    );
    report
}

/// Snapshots `data_dir` and uploads it. Only listing the directory itself can fail.
pub async fn upload_directory<S>(store: &S, bucket: &str, data_dir: &Path) -> Result<UploadReport>
where
    S: ObjectStore + ?Sized,
{
    let manifest = UploadManifest::snapshot(data_dir).map_err(|e| {
        error!(error = %e, "[UPLOAD][ERROR] Could not list data directory");
        e
    })?;
    info!(
        data_dir = %data_dir.display(),
        files = manifest.len(),
        bucket,
        "[UPLOAD] Uploading data directory"
    );
    Ok(upload_manifest(store, bucket, &manifest).await)
}
