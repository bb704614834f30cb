//! Error types for passage-index.

/// Errors that can occur during ingestion and retrieval operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Request rejected before any work happened (missing tenant, empty
    /// input, unsupported file type).
    #[error("validation error: {0}")]
    Validation(String),

    /// File count or size limits exceeded.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// No index for the tenant, or unknown job id.
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error on persisted artifacts.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// LLM provider error (embedding).
    #[error("LLM error: {0}")]
    Llm(#[from] passage_llm::LlmError),

    #[cfg(feature = "pdf")]
    /// PDF text extraction error.
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
