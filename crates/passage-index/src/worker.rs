//! The indexing job runner: load → chunk per file, then one all-or-nothing
//! embed-and-persist step at the end.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use passage_core::TenantId;
use passage_core::config::ChunkingConfig;
use passage_llm::LlmProvider;

use crate::chunker::chunk_document;
use crate::document::Chunk;
use crate::error::IndexError;
use crate::job::JobStore;
use crate::loader::loader_for;
use crate::store::VectorIndex;

#[derive(Debug)]
pub(crate) struct QueuedJob {
    pub job_id: String,
    pub tenant: TenantId,
    pub paths: Vec<PathBuf>,
}

/// Run one claimed job to completion, mutating only its own record.
///
/// Any per-file failure aborts the whole batch: chunks accumulated from
/// earlier files are discarded and nothing reaches the tenant's collection.
pub(crate) async fn run_job<P: LlmProvider>(
    job: QueuedJob,
    jobs: JobStore,
    index: Arc<VectorIndex<P>>,
    chunking: ChunkingConfig,
    max_file_size: u64,
) {
    jobs.start(&job.job_id);

    let total = job.paths.len();
    let mut chunks: Vec<Chunk> = Vec::new();

    for (i, path) in job.paths.iter().enumerate() {
        match load_and_chunk(path, chunking, max_file_size).await {
            Ok(file_chunks) => {
                chunks.extend(file_chunks);
                #[allow(clippy::cast_possible_truncation)]
                let progress = (80 * (i + 1) / total) as u8;
                jobs.set_progress(&job.job_id, progress);
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %job.job_id,
                    tenant = %job.tenant,
                    file = %path.display(),
                    "indexing batch aborted: {e}"
                );
                jobs.fail(&job.job_id, e.to_string());
                return;
            }
        }
    }

    if !chunks.is_empty() {
        if let Err(e) = index.add(&job.tenant, &chunks).await {
            tracing::warn!(job_id = %job.job_id, tenant = %job.tenant, "persist failed: {e}");
            jobs.fail(&job.job_id, e.to_string());
            return;
        }
    }

    jobs.complete(&job.job_id);
    tracing::info!(
        job_id = %job.job_id,
        tenant = %job.tenant,
        files = total,
        chunks = chunks.len(),
        "indexing job done"
    );
}

async fn load_and_chunk(
    path: &Path,
    chunking: ChunkingConfig,
    max_file_size: u64,
) -> Result<Vec<Chunk>, IndexError> {
    let loader = loader_for(path, max_file_size)?;
    let documents = loader.load(path).await?;

    let mut chunks = Vec::new();
    for document in &documents {
        chunks.extend(chunk_document(document, chunking));
    }
    Ok(chunks)
}
