use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub openai: OpenAiConfig,
    pub limits: LimitsConfig,
    pub retrieval: RetrievalConfig,
    pub indexing: IndexingConfig,
    pub answer: AnswerConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_tokens: usize,
    pub overlap: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: BackendKind,
    pub model: String,
    pub batch_size: usize,
    /// Vector dimension of the deterministic hash backend. Model-backed
    /// backends get their dimension from the model itself.
    pub dimensions: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: BackendKind,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_files_per_request: usize,
    pub max_file_mb: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Half-width, in characters, of the snippet window around a match.
    pub snippet_window: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    pub workers: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub render_interval_ms: u64,
}

/// Selects which provider backs embeddings or chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Hash,
    Ollama,
    OpenAi,
}

impl BackendKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "hash" => Some(Self::Hash),
            "ollama" => Some(Self::Ollama),
            "openai" => Some(Self::OpenAi),
            _ => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hash => "hash",
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        };
        f.write_str(s)
    }
}

impl Config {
    /// Load configuration from a TOML file with `PASSAGE_*` env overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PASSAGE_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("PASSAGE_EMBED_BACKEND") {
            match BackendKind::parse(&v) {
                Some(kind) => self.embedding.backend = kind,
                None => tracing::warn!("ignoring unknown PASSAGE_EMBED_BACKEND value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("PASSAGE_EMBED_MODEL") {
            self.embedding.model = v;
        }
        if let Ok(v) = std::env::var("PASSAGE_LLM_BACKEND") {
            match BackendKind::parse(&v) {
                Some(kind) => self.llm.backend = kind,
                None => tracing::warn!("ignoring unknown PASSAGE_LLM_BACKEND value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("PASSAGE_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("PASSAGE_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("PASSAGE_OPENAI_API_KEY") {
            self.openai.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("PASSAGE_OPENAI_BASE_URL") {
            self.openai.base_url = v;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            llm: LlmConfig::default(),
            openai: OpenAiConfig::default(),
            limits: LimitsConfig::default(),
            retrieval: RetrievalConfig::default(),
            indexing: IndexingConfig::default(),
            answer: AnswerConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            overlap: 64,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Hash,
            model: "nomic-embed-text".into(),
            batch_size: 64,
            dimensions: 8,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Ollama,
            base_url: "http://localhost:11434".into(),
            model: "llama3:8b".into(),
            max_tokens: 512,
            temperature: 0.2,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files_per_request: 3,
            max_file_mb: 30,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            snippet_window: 200,
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self { workers: 2 }
    }
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            render_interval_ms: 500,
        }
    }
}
