//! LLM provider abstraction and backend implementations.
//!
//! One capability trait covers chat, chat streaming, and embeddings; the
//! concrete backends are a closed set behind [`any::AnyProvider`]: the
//! deterministic hash embedder, an Ollama-served local model, and an
//! OpenAI-compatible remote API.

pub mod any;
pub mod error;
pub mod hash;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod provider;
mod sse;

pub use error::LlmError;
pub use provider::LlmProvider;
