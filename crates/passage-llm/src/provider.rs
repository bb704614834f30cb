use std::future::Future;
use std::pin::Pin;

use futures_core::Stream;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ordered stream of text fragments produced by a chat backend. The backend
/// guarantees emission order; concatenating all `Ok` fragments yields the
/// full response text.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    fn supports_streaming(&self) -> bool;

    fn supports_embeddings(&self) -> bool;

    /// Send messages to the LLM and return the complete assistant response.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to communicate or the response
    /// is invalid.
    fn chat(&self, messages: &[Message]) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Send messages to the LLM and stream the response fragment by fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the streaming request cannot be started. Errors
    /// mid-stream surface as `Err` items on the returned stream.
    fn chat_stream(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<ChatStream, LlmError>> + Send;

    /// Embed a single text into a fixed-dimension vector.
    ///
    /// The dimension is fixed per provider instance; callers must not mix
    /// vectors from differently-configured providers in one collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider does not support embeddings or the
    /// request fails.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    /// Embed many texts, order-preserving, one vector per input.
    ///
    /// Backends with a batch endpoint override this to bound request sizes;
    /// the default embeds one text at a time.
    ///
    /// # Errors
    ///
    /// Returns the first embedding failure; no partial results.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send {
        async move {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.embed(text).await?);
            }
            Ok(vectors)
        }
    }
}
