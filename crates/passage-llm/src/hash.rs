//! Deterministic embedding backend with no model behind it.
//!
//! Vectors are derived from a rolling polynomial hash of the UTF-8 bytes, so
//! identical text always embeds identically at a fixed dimension. Exists for
//! tests and offline use; it carries no semantic signal and supports no chat.

use crate::error::LlmError;
use crate::provider::{ChatStream, LlmProvider, Message};

const HASH_BASE: u64 = 131;
const HASH_MODULUS: u64 = 1_000_003;
const DIM_OFFSET: u64 = 9_973;
const DIM_MODULUS: u64 = 10_007;

#[derive(Debug, Clone)]
pub struct HashProvider {
    dimensions: usize,
}

impl HashProvider {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut acc: u64 = 0;
        for byte in text.as_bytes() {
            acc = (acc * HASH_BASE + u64::from(*byte)) % HASH_MODULUS;
        }
        (0..self.dimensions as u64)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let component = ((acc + i * DIM_OFFSET) % DIM_MODULUS) as f32;
                #[allow(clippy::cast_precision_loss)]
                {
                    component / DIM_MODULUS as f32
                }
            })
            .collect()
    }
}

impl Default for HashProvider {
    fn default() -> Self {
        Self::new(8)
    }
}

impl LlmProvider for HashProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "hash"
    }

    fn supports_streaming(&self) -> bool {
        false
    }

    fn supports_embeddings(&self) -> bool {
        true
    }

    async fn chat(&self, _messages: &[Message]) -> Result<String, LlmError> {
        Err(LlmError::ChatUnsupported { provider: "hash" })
    }

    async fn chat_stream(&self, _messages: &[Message]) -> Result<ChatStream, LlmError> {
        Err(LlmError::ChatUnsupported { provider: "hash" })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}
