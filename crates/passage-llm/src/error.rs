#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SSE parse error: {0}")]
    SseParse(String),

    #[error("empty response from {provider}")]
    EmptyResponse { provider: &'static str },

    #[error("missing configuration for {provider}: {what}")]
    MissingConfig {
        provider: &'static str,
        what: &'static str,
    },

    #[error("embedding not supported by {provider}")]
    EmbedUnsupported { provider: &'static str },

    #[error("chat not supported by {provider}")]
    ChatUnsupported { provider: &'static str },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;
