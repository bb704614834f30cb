//! Ingestion front door: validation, upload storage, and the background
//! worker pool that drains the job queue.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use passage_core::TenantId;
use passage_core::config::{ChunkingConfig, LimitsConfig};
use passage_llm::LlmProvider;
use tokio::sync::{Semaphore, mpsc};

use crate::error::IndexError;
use crate::job::{FileInfo, JobSnapshot, JobStore};
use crate::loader::allowed_extensions;
use crate::store::VectorIndex;
use crate::worker::{QueuedJob, run_job};

/// One uploaded file: name plus raw bytes.
#[derive(Debug, Clone)]
pub struct SubmittedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

pub struct IngestService<P> {
    index: Arc<VectorIndex<P>>,
    jobs: JobStore,
    queue: mpsc::UnboundedSender<QueuedJob>,
    uploads_dir: PathBuf,
    limits: LimitsConfig,
}

impl<P: LlmProvider + 'static> IngestService<P> {
    /// Create the service and spawn its dispatcher. At most `workers` jobs
    /// run at once; each queued job is claimed by exactly one task, so jobs
    /// for different tenants run concurrently while a single job is never
    /// split.
    #[must_use]
    pub fn new(
        data_dir: &Path,
        limits: LimitsConfig,
        chunking: ChunkingConfig,
        workers: usize,
        index: Arc<VectorIndex<P>>,
    ) -> Self {
        let (queue, mut rx) = mpsc::unbounded_channel::<QueuedJob>();
        let jobs = JobStore::new();
        let max_file_size = limits.max_file_mb * 1024 * 1024;

        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let dispatcher_jobs = jobs.clone();
        let dispatcher_index = index.clone();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let jobs = dispatcher_jobs.clone();
                let index = dispatcher_index.clone();
                tokio::spawn(async move {
                    run_job(job, jobs, index, chunking, max_file_size).await;
                    drop(permit);
                });
            }
        });

        Self {
            index,
            jobs,
            queue,
            uploads_dir: data_dir.join("uploads"),
            limits,
        }
    }

    /// Validate the batch, persist the uploads, and queue an indexing job.
    /// Returns the job id to poll via [`IngestService::status`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty batch or unsupported file
    /// types, a payload error when count or size limits are exceeded, or an
    /// IO error if an upload cannot be stored.
    pub async fn submit(
        &self,
        tenant: &TenantId,
        files: Vec<SubmittedFile>,
    ) -> Result<String, IndexError> {
        if files.is_empty() {
            return Err(IndexError::Validation("no files".into()));
        }
        if files.len() > self.limits.max_files_per_request {
            return Err(IndexError::PayloadTooLarge(format!(
                "too many files: {} (limit {})",
                files.len(),
                self.limits.max_files_per_request
            )));
        }

        let max_bytes = self.limits.max_file_mb * 1024 * 1024;
        for file in &files {
            let ext = Path::new(&file.filename)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_lowercase();
            if !allowed_extensions().contains(&ext.as_str()) {
                return Err(IndexError::Validation(format!(
                    "unsupported file: {}",
                    file.filename
                )));
            }
            if file.content.len() as u64 > max_bytes {
                return Err(IndexError::PayloadTooLarge(format!(
                    "file too big: {}",
                    file.filename
                )));
            }
        }

        let upload_dir = self.uploads_dir.join(tenant.as_str());
        tokio::fs::create_dir_all(&upload_dir).await?;

        let mut paths = Vec::with_capacity(files.len());
        let mut infos = Vec::with_capacity(files.len());
        for file in &files {
            // Keep only the final path component of whatever name was sent.
            let name = Path::new(&file.filename)
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    IndexError::Validation(format!("invalid filename: {}", file.filename))
                })?;
            let dest = upload_dir.join(name);
            tokio::fs::write(&dest, &file.content).await?;
            paths.push(dest);
            infos.push(FileInfo {
                filename: name.to_owned(),
                size_bytes: file.content.len() as u64,
            });
        }

        let job_id = self.jobs.create(tenant.clone(), infos);
        tracing::info!(job_id = %job_id, tenant = %tenant, files = paths.len(), "job queued");

        let queued = QueuedJob {
            job_id: job_id.clone(),
            tenant: tenant.clone(),
            paths,
        };
        if self.queue.send(queued).is_err() {
            self.jobs.fail(&job_id, "job queue closed".into());
        }

        Ok(job_id)
    }

    /// Read-only snapshot of a job.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NotFound`] for an unknown job id.
    pub fn status(&self, job_id: &str) -> Result<JobSnapshot, IndexError> {
        self.jobs
            .snapshot(job_id)
            .ok_or_else(|| IndexError::NotFound(format!("job not found: {job_id}")))
    }

    /// Delete the tenant's collection and upload area.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory cannot be removed.
    pub async fn reset(&self, tenant: &TenantId) -> Result<(), IndexError> {
        self.index.reset(tenant).await?;

        let uploads = self.uploads_dir.join(tenant.as_str());
        if uploads.exists() {
            tokio::fs::remove_dir_all(&uploads).await?;
        }
        Ok(())
    }

    #[must_use]
    pub fn index(&self) -> &Arc<VectorIndex<P>> {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passage_llm::hash::HashProvider;

    fn service(dir: &Path) -> IngestService<HashProvider> {
        let index = Arc::new(VectorIndex::new(dir, HashProvider::default()));
        IngestService::new(
            dir,
            LimitsConfig {
                max_files_per_request: 3,
                max_file_mb: 1,
            },
            ChunkingConfig {
                max_tokens: 32,
                overlap: 4,
            },
            2,
            index,
        )
    }

    fn file(name: &str, content: &str) -> SubmittedFile {
        SubmittedFile {
            filename: name.into(),
            content: content.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn empty_batch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let tenant = TenantId::new("t1").unwrap();
        let result = svc.submit(&tenant, vec![]).await;
        assert!(matches!(result, Err(IndexError::Validation(_))));
    }

    #[tokio::test]
    async fn too_many_files_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let tenant = TenantId::new("t1").unwrap();
        let files: Vec<SubmittedFile> = (0..4).map(|i| file(&format!("f{i}.txt"), "x")).collect();
        let result = svc.submit(&tenant, files).await;
        assert!(matches!(result, Err(IndexError::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let tenant = TenantId::new("t1").unwrap();
        let result = svc.submit(&tenant, vec![file("deck.pptx", "x")]).await;
        assert!(matches!(result, Err(IndexError::Validation(_))));
    }

    #[tokio::test]
    async fn oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let tenant = TenantId::new("t1").unwrap();
        let big = SubmittedFile {
            filename: "big.txt".into(),
            content: vec![b'x'; 2 * 1024 * 1024],
        };
        let result = svc.submit(&tenant, vec![big]).await;
        assert!(matches!(result, Err(IndexError::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn filename_reduced_to_basename() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let tenant = TenantId::new("t1").unwrap();
        let job_id = svc
            .submit(&tenant, vec![file("../../etc/notes.txt", "content")])
            .await
            .unwrap();

        let snap = svc.status(&job_id).unwrap();
        assert_eq!(snap.files[0].filename, "notes.txt");
        assert!(dir.path().join("uploads/t1/notes.txt").exists());
    }

    #[tokio::test]
    async fn unknown_job_status_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let result = svc.status("missing");
        assert!(matches!(result, Err(IndexError::NotFound(_))));
    }
}
