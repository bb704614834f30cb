//! Indexing job records and the shared in-memory job store.
//!
//! A job moves `queued → working → {done, error}`. Terminal states are never
//! left; only the job runner mutates records, everyone else reads snapshots.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use passage_core::TenantId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Working,
    Done,
    Error,
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// What was submitted, recorded for status reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub size_bytes: u64,
}

/// Read-only view of one job's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: String,
    pub tenant: TenantId,
    pub files: Vec<FileInfo>,
    pub status: JobStatus,
    pub progress: u8,
    pub error: Option<String>,
}

#[derive(Debug)]
struct JobRecord {
    tenant: TenantId,
    files: Vec<FileInfo>,
    status: JobStatus,
    progress: u8,
    error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JobStore {
    inner: Arc<RwLock<HashMap<String, JobRecord>>>,
}

impl JobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new queued job and return its id.
    #[must_use]
    pub fn create(&self, tenant: TenantId, files: Vec<FileInfo>) -> String {
        let job_id = uuid::Uuid::new_v4().simple().to_string();
        let mut map = self.write();
        map.insert(
            job_id.clone(),
            JobRecord {
                tenant,
                files,
                status: JobStatus::Queued,
                progress: 0,
                error: None,
            },
        );
        job_id
    }

    #[must_use]
    pub fn snapshot(&self, job_id: &str) -> Option<JobSnapshot> {
        let map = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        map.get(job_id).map(|record| JobSnapshot {
            job_id: job_id.to_owned(),
            tenant: record.tenant.clone(),
            files: record.files.clone(),
            status: record.status,
            progress: record.progress,
            error: record.error.clone(),
        })
    }

    pub(crate) fn start(&self, job_id: &str) {
        let mut map = self.write();
        if let Some(record) = map.get_mut(job_id)
            && !record.status.is_terminal()
        {
            record.status = JobStatus::Working;
            record.progress = 0;
        }
    }

    /// Advance progress; never moves backwards and never touches a terminal
    /// job.
    pub(crate) fn set_progress(&self, job_id: &str, progress: u8) {
        let mut map = self.write();
        if let Some(record) = map.get_mut(job_id)
            && !record.status.is_terminal()
        {
            record.progress = record.progress.max(progress.min(100));
        }
    }

    pub(crate) fn complete(&self, job_id: &str) {
        let mut map = self.write();
        if let Some(record) = map.get_mut(job_id)
            && !record.status.is_terminal()
        {
            record.status = JobStatus::Done;
            record.progress = 100;
        }
    }

    pub(crate) fn fail(&self, job_id: &str, message: String) {
        let mut map = self.write();
        if let Some(record) = map.get_mut(job_id)
            && !record.status.is_terminal()
        {
            record.status = JobStatus::Error;
            record.error = Some(message);
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, JobRecord>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
