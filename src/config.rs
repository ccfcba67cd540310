use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL of the embeddings API; override for OpenAI-compatible
    /// endpoints served elsewhere.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            dims: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Documents per vector-store insert call.
    #[serde(default = "default_write_batch_size")]
    pub write_batch_size: usize,
    /// Stored document text is truncated to this many characters.
    /// Zero disables truncation.
    #[serde(default = "default_max_document_chars")]
    pub max_document_chars: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            write_batch_size: default_write_batch_size(),
            max_document_chars: default_max_document_chars(),
        }
    }
}

fn default_write_batch_size() -> usize {
    50
}
fn default_max_document_chars() -> usize {
    8192
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Result cap applied when a request does not specify one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Minimum similarity score applied when a request does not specify one.
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_threshold: default_threshold(),
        }
    }
}

fn default_limit() -> usize {
    10
}
fn default_threshold() -> f32 {
    0.25
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate embedding
    if config.embedding.is_enabled() {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    // Validate index
    if config.index.write_batch_size == 0 {
        anyhow::bail!("index.write_batch_size must be >= 1");
    }

    // Validate search
    if config.search.default_limit < 1 {
        anyhow::bail!("search.default_limit must be >= 1");
    }

    if !(0.0..=1.0).contains(&config.search.default_threshold) {
        anyhow::bail!("search.default_threshold must be in [0.0, 1.0]");
    }

    Ok(config)
}
