//! Test-only mock LLM provider with scripted responses and stream fragments.

use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::{ChatStream, LlmProvider, Message};

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    fragments: Arc<Mutex<Vec<Vec<String>>>>,
    pub default_response: String,
    pub embedding: Vec<f32>,
    pub supports_embeddings: bool,
    pub fail_chat: bool,
    /// When set, streams emit this many fragments and then an error item.
    pub fail_stream_after: Option<usize>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            fragments: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            embedding: vec![0.0; 8],
            supports_embeddings: false,
            fail_chat: false,
            fail_stream_after: None,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    /// Script exact fragment boundaries for `chat_stream`, one inner vec per
    /// call. Streams fall back to char-splitting the chat response once the
    /// script runs out.
    #[must_use]
    pub fn with_fragments(fragments: Vec<Vec<String>>) -> Self {
        Self {
            fragments: Arc::new(Mutex::new(fragments)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_stream_error_after(mut self, fragments: usize) -> Self {
        self.fail_stream_after = Some(fragments);
        self
    }
}

impl LlmProvider for MockProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    fn supports_embeddings(&self) -> bool {
        self.supports_embeddings
    }

    async fn chat(&self, _messages: &[Message]) -> Result<String, LlmError> {
        if self.fail_chat {
            return Err(LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn chat_stream(&self, messages: &[Message]) -> Result<ChatStream, LlmError> {
        let scripted = {
            let mut fragments = self.fragments.lock().unwrap();
            if fragments.is_empty() {
                None
            } else {
                Some(fragments.remove(0))
            }
        };

        let fragments = match scripted {
            Some(fragments) => fragments,
            None => {
                let response = self.chat(messages).await?;
                response.chars().map(|c| c.to_string()).collect()
            }
        };

        let mut items: Vec<Result<String, LlmError>> = fragments.into_iter().map(Ok).collect();
        if let Some(n) = self.fail_stream_after {
            items.truncate(n);
            items.push(Err(LlmError::Other("mock stream error".into())));
        }

        Ok(Box::pin(tokio_stream::iter(items)))
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        if self.supports_embeddings {
            Ok(self.embedding.clone())
        } else {
            Err(LlmError::EmbedUnsupported { provider: "mock" })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn scripted_fragments_preserved() {
        let provider =
            MockProvider::with_fragments(vec![vec!["<think>".into(), "a".into(), "b".into()]]);
        let mut stream = provider.chat_stream(&[]).await.unwrap();
        let mut got = Vec::new();
        while let Some(item) = stream.next().await {
            got.push(item.unwrap());
        }
        assert_eq!(got, vec!["<think>", "a", "b"]);
    }

    #[tokio::test]
    async fn stream_error_after_n_fragments() {
        let provider = MockProvider::with_fragments(vec![vec!["x".into(), "y".into()]])
            .with_stream_error_after(1);
        let mut stream = provider.chat_stream(&[]).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), "x");
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn falls_back_to_char_split() {
        let provider = MockProvider::with_responses(vec!["hi".into()]);
        let mut stream = provider.chat_stream(&[]).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), "h");
        assert_eq!(stream.next().await.unwrap().unwrap(), "i");
    }

    #[tokio::test]
    async fn failing_chat() {
        let provider = MockProvider::failing();
        assert!(provider.chat(&[]).await.is_err());
    }
}
