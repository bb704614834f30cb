use serde::{Deserialize, Serialize};

/// Source attribution carried from loader to search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Normalized text of one loaded document (or one page of it).
#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// A bounded span of document text, the unit of embedding and retrieval.
/// Immutable once created; `chunk_id` is unique per chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub chunk_id: String,
    pub metadata: DocumentMetadata,
}
