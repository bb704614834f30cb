//! Ranked search results shaped for display: snippet, highlights, score.

use passage_core::TenantId;
use passage_llm::LlmProvider;
use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::highlight::extract_snippet;
use crate::store::VectorIndex;

/// One ranked source shown alongside an answer. Derived per query, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePreview {
    pub id: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub snippet: String,
    pub highlights: Vec<(usize, usize)>,
}

/// Search the tenant's collection and shape the hits into previews, ranked
/// best first.
///
/// # Errors
///
/// Returns [`IndexError::NotFound`] when the tenant has no collection, or an
/// embedding/IO error from the underlying search.
pub async fn search_previews<P: LlmProvider>(
    index: &VectorIndex<P>,
    tenant: &TenantId,
    query: &str,
    k: usize,
    window: usize,
) -> Result<Vec<SourcePreview>, IndexError> {
    let hits = index.search(tenant, query, k).await?;

    Ok(hits
        .into_iter()
        .map(|hit| {
            let snippet = extract_snippet(&hit.text, query, window);
            SourcePreview {
                id: hit.id,
                score: hit.score,
                filename: Some(hit.metadata.source),
                page: hit.metadata.page,
                snippet: snippet.text,
                highlights: snippet.highlights,
            }
        })
        .collect())
}
