//! Per-tenant persisted vector collections.
//!
//! One directory per tenant holds two artifacts: `index.json` (entry ids and
//! vectors) and `docstore.json` (id to text and metadata). A tenant has a
//! searchable collection only when both are present. Additions are
//! read-modify-write over the whole collection, guarded by the tenant lock.
//!
//! All vectors in one collection must come from one embedding backend
//! configuration; the dimension is not checked here and mixing backends
//! corrupts nearest-neighbor results.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use passage_core::TenantId;
use passage_llm::LlmProvider;
use serde::{Deserialize, Serialize};

use crate::document::{Chunk, DocumentMetadata};
use crate::error::IndexError;
use crate::locks::TenantLocks;

const INDEX_FILE: &str = "index.json";
const DOCSTORE_FILE: &str = "docstore.json";

#[derive(Debug, Serialize, Deserialize)]
struct VectorRecord {
    id: String,
    vector: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocRecord {
    text: String,
    metadata: DocumentMetadata,
}

/// One nearest-neighbor match with its raw distance and normalized score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub metadata: DocumentMetadata,
    pub distance: f32,
    pub score: f32,
}

/// Map a raw distance in `[0, ∞)` to a similarity in `(0, 1]`, strictly
/// decreasing in distance.
#[must_use]
pub fn similarity(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[derive(Debug)]
pub struct VectorIndex<P> {
    root: PathBuf,
    provider: P,
    locks: TenantLocks,
}

impl<P: LlmProvider> VectorIndex<P> {
    #[must_use]
    pub fn new(data_dir: &Path, provider: P) -> Self {
        Self {
            root: data_dir.join("index"),
            provider,
            locks: TenantLocks::new(),
        }
    }

    fn tenant_dir(&self, tenant: &TenantId) -> PathBuf {
        self.root.join(tenant.as_str())
    }

    /// True iff both persisted artifacts are present for the tenant.
    #[must_use]
    pub fn exists(&self, tenant: &TenantId) -> bool {
        let dir = self.tenant_dir(tenant);
        dir.join(INDEX_FILE).exists() && dir.join(DOCSTORE_FILE).exists()
    }

    /// Embed the chunks and append them to the tenant's collection, creating
    /// it if absent. The whole collection is loaded, extended, and rewritten
    /// under the tenant lock. Returns the number of entries added.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or persistence fails; on failure the
    /// previously persisted collection is left untouched.
    pub async fn add(&self, tenant: &TenantId, chunks: &[Chunk]) -> Result<usize, IndexError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.provider.embed_batch(&texts).await?;

        let lock = self.locks.for_tenant(tenant);
        let _guard = lock.lock().await;

        let (mut records, mut docs) = if self.exists(tenant) {
            self.load(tenant).await?
        } else {
            (Vec::new(), HashMap::new())
        };

        for (chunk, vector) in chunks.iter().zip(vectors) {
            records.push(VectorRecord {
                id: chunk.chunk_id.clone(),
                vector,
            });
            docs.insert(
                chunk.chunk_id.clone(),
                DocRecord {
                    text: chunk.text.clone(),
                    metadata: chunk.metadata.clone(),
                },
            );
        }

        self.persist(tenant, &records, &docs).await?;
        Ok(chunks.len())
    }

    /// Embed the query and return the `k` nearest entries by squared
    /// Euclidean distance, closest first.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NotFound`] when the tenant has no collection,
    /// or an error if embedding or loading fails.
    pub async fn search(
        &self,
        tenant: &TenantId,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>, IndexError> {
        if !self.exists(tenant) {
            return Err(IndexError::NotFound(format!(
                "no index for tenant {tenant}"
            )));
        }

        let query_vector = self.provider.embed(query).await?;
        let (records, docs) = self.load(tenant).await?;

        let mut hits: Vec<SearchHit> = records
            .into_iter()
            .filter_map(|record| {
                let doc = docs.get(&record.id)?;
                let distance = squared_l2(&query_vector, &record.vector);
                Some(SearchHit {
                    id: record.id,
                    text: doc.text.clone(),
                    metadata: doc.metadata.clone(),
                    distance,
                    score: similarity(distance),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    /// Delete the tenant's collection. No-op when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub async fn reset(&self, tenant: &TenantId) -> Result<(), IndexError> {
        let lock = self.locks.for_tenant(tenant);
        let _guard = lock.lock().await;

        let dir = self.tenant_dir(tenant);
        if dir.exists() {
            tokio::fs::remove_dir_all(&dir).await?;
        }
        Ok(())
    }

    async fn load(
        &self,
        tenant: &TenantId,
    ) -> Result<(Vec<VectorRecord>, HashMap<String, DocRecord>), IndexError> {
        let dir = self.tenant_dir(tenant);
        let index_raw = tokio::fs::read(dir.join(INDEX_FILE)).await?;
        let docstore_raw = tokio::fs::read(dir.join(DOCSTORE_FILE)).await?;
        let records: Vec<VectorRecord> = serde_json::from_slice(&index_raw)?;
        let docs: HashMap<String, DocRecord> = serde_json::from_slice(&docstore_raw)?;
        Ok((records, docs))
    }

    async fn persist(
        &self,
        tenant: &TenantId,
        records: &[VectorRecord],
        docs: &HashMap<String, DocRecord>,
    ) -> Result<(), IndexError> {
        let dir = self.tenant_dir(tenant);
        tokio::fs::create_dir_all(&dir).await?;

        write_atomic(&dir.join(INDEX_FILE), &serde_json::to_vec(records)?).await?;
        write_atomic(&dir.join(DOCSTORE_FILE), &serde_json::to_vec(docs)?).await?;

        tracing::debug!(tenant = %tenant, entries = records.len(), "collection persisted");
        Ok(())
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), IndexError> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
