use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RagError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "ragline.toml";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub embedder: EmbedderConfig,
    pub llm: LlmConfig,
    pub search: SearchOptionsConfig,
    pub bm25: Bm25Config,
    pub prompt: PromptConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk length in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbedderConfig {
    pub provider: String,
    pub model: String,
    pub endpoint: Option<String>,
    pub dimensions: usize,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            endpoint: None,
            dimensions: 768,
            batch_size: 32,
            timeout_secs: 120,
        }
    }
}

impl EmbedderConfig {
    pub fn endpoint(&self) -> String {
        resolve_endpoint(self.endpoint.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub endpoint: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "deepseek-r1:8b".to_string(),
            endpoint: None,
            temperature: 0.0,
            timeout_secs: 300,
        }
    }
}

impl LlmConfig {
    pub fn endpoint(&self) -> String {
        resolve_endpoint(self.endpoint.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    #[default]
    Cosine,
    Dot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchOptionsConfig {
    pub top_k: usize,
    pub hybrid_enabled: bool,
    /// RRF rank constant
    pub hybrid_k: f32,
    pub semantic_weight: f32,
    pub lexical_weight: f32,
    /// Each sub-retriever fetches `top_k * candidate_multiplier` candidates before fusion
    pub candidate_multiplier: usize,
    pub similarity: Similarity,
}

impl Default for SearchOptionsConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            hybrid_enabled: false,
            hybrid_k: 60.0,
            semantic_weight: 0.5,
            lexical_weight: 0.5,
            candidate_multiplier: 2,
            similarity: Similarity::Cosine,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Bm25Config {
    pub k1: f32,
    pub b: f32,
    pub lowercase: bool,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            lowercase: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    pub template: String,
    /// Context budget in cl100k tokens. `None` keeps every retrieved passage.
    pub max_context_tokens: Option<usize>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: crate::prompt::DEFAULT_TEMPLATE.to_string(),
            max_context_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub index_path: PathBuf,
    pub uploads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = data_dir();
        Self {
            index_path: base.join("index.json"),
            uploads_dir: base.join("uploads"),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ragline")
}

fn resolve_endpoint(configured: Option<&str>) -> String {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var("OLLAMA_HOST").ok().filter(|h| !h.is_empty()))
        .map(|host| {
            if host.starts_with("http://") || host.starts_with("https://") {
                host
            } else {
                format!("http://{}", host)
            }
        })
        .unwrap_or_else(|| DEFAULT_OLLAMA_ENDPOINT.to_string())
}

impl Config {
    /// Load configuration from `path`, or from `ragline.toml` in the current
    /// directory. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(RagError::InvalidConfig(
                "chunking.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunking.overlap ({}) must be less than chunking.chunk_size ({})",
                self.chunking.overlap, self.chunking.chunk_size
            )));
        }
        if self.embedder.batch_size == 0 {
            return Err(RagError::InvalidConfig(
                "embedder.batch_size must be greater than zero".to_string(),
            ));
        }
        if self.search.top_k == 0 {
            return Err(RagError::InvalidConfig(
                "search.top_k must be greater than zero".to_string(),
            ));
        }
        if self.search.candidate_multiplier == 0 {
            return Err(RagError::InvalidConfig(
                "search.candidate_multiplier must be greater than zero".to_string(),
            ));
        }
        if !(self.search.hybrid_k.is_finite() && self.search.hybrid_k >= 0.0) {
            return Err(RagError::InvalidConfig(
                "search.hybrid_k must be a non-negative number".to_string(),
            ));
        }
        for (name, weight) in [
            ("search.semantic_weight", self.search.semantic_weight),
            ("search.lexical_weight", self.search.lexical_weight),
        ] {
            if !(weight.is_finite() && weight > 0.0) {
                return Err(RagError::InvalidConfig(format!(
                    "{} must be a positive number",
                    name
                )));
            }
        }
        if !(self.bm25.k1.is_finite() && self.bm25.k1 >= 0.0) {
            return Err(RagError::InvalidConfig(
                "bm25.k1 must be a non-negative number".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(RagError::InvalidConfig(
                "bm25.b must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
