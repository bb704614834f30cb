use passage_index::IndexError;
use passage_llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    /// Request rejected before retrieval (e.g. empty question).
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

pub type Result<T> = std::result::Result<T, AnswerError>;
