//! Closed-set provider dispatch, selected by configuration at construction.

use passage_core::config::{BackendKind, Config};

use crate::error::LlmError;
use crate::hash::HashProvider;
#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;
use crate::provider::{ChatStream, LlmProvider, Message};

/// Generates a match over all `AnyProvider` variants, binding the inner
/// provider and evaluating the given closure for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Hash($p) => $expr,
            AnyProvider::Ollama($p) => $expr,
            AnyProvider::OpenAi($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyProvider {
    Hash(HashProvider),
    Ollama(OllamaProvider),
    OpenAi(OpenAiProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl AnyProvider {
    /// Build the embedding backend selected by `config.embedding.backend`.
    ///
    /// # Errors
    ///
    /// Fails fast with [`LlmError::MissingConfig`] when the selected backend
    /// lacks required credentials; never falls back to the hash backend.
    pub fn for_embeddings(config: &Config) -> Result<Self, LlmError> {
        match config.embedding.backend {
            BackendKind::Hash => Ok(Self::Hash(HashProvider::new(config.embedding.dimensions))),
            BackendKind::Ollama => Ok(Self::Ollama(OllamaProvider::new(
                &config.llm.base_url,
                config.llm.model.clone(),
                config.embedding.model.clone(),
            ))),
            BackendKind::OpenAi => {
                let provider = Self::openai_from_config(config, true)?;
                Ok(provider)
            }
        }
    }

    /// Build the chat backend selected by `config.llm.backend`.
    ///
    /// # Errors
    ///
    /// Fails fast with [`LlmError::MissingConfig`] when credentials are
    /// missing, or [`LlmError::ChatUnsupported`] for the hash backend.
    pub fn for_chat(config: &Config) -> Result<Self, LlmError> {
        match config.llm.backend {
            BackendKind::Hash => Err(LlmError::ChatUnsupported { provider: "hash" }),
            BackendKind::Ollama => Ok(Self::Ollama(OllamaProvider::new(
                &config.llm.base_url,
                config.llm.model.clone(),
                config.embedding.model.clone(),
            ))),
            BackendKind::OpenAi => Self::openai_from_config(config, false),
        }
    }

    fn openai_from_config(config: &Config, for_embeddings: bool) -> Result<Self, LlmError> {
        let api_key = config
            .openai
            .api_key
            .as_ref()
            .ok_or(LlmError::MissingConfig {
                provider: "openai",
                what: "api_key (openai.api_key or PASSAGE_OPENAI_API_KEY)",
            })?;

        let embedding_model = for_embeddings.then(|| config.embedding.model.clone());
        let provider = OpenAiProvider::new(
            api_key.clone(),
            config.openai.base_url.clone(),
            config.llm.model.clone(),
            config.llm.max_tokens,
            config.llm.temperature,
            embedding_model,
        )
        .with_batch_size(config.embedding.batch_size);

        Ok(Self::OpenAi(provider))
    }
}

impl LlmProvider for AnyProvider {
    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }

    fn supports_streaming(&self) -> bool {
        delegate_provider!(self, |p| p.supports_streaming())
    }

    fn supports_embeddings(&self) -> bool {
        delegate_provider!(self, |p| p.supports_embeddings())
    }

    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        delegate_provider!(self, |p| p.chat(messages).await)
    }

    async fn chat_stream(&self, messages: &[Message]) -> Result<ChatStream, LlmError> {
        delegate_provider!(self, |p| p.chat_stream(messages).await)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        delegate_provider!(self, |p| p.embed(text).await)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        delegate_provider!(self, |p| p.embed_batch(texts).await)
    }
}
