use passage_index::SourcePreview;
use serde::{Deserialize, Serialize};

/// One frame of the streamed answer protocol.
///
/// Ordering contract per stream: exactly one `Context` first, then zero or
/// more `Token`s whose payloads concatenate to the full answer, then exactly
/// one terminal frame (`Done` xor `Error`) and nothing after it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum StreamEvent {
    Context { sources: Vec<SourcePreview> },
    Token { text: String },
    Done { finish_reason: String },
    Error { message: String },
}

impl StreamEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}
