use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ChunkSealError, Result};
use crate::types::{NonceStrategy, DEFAULT_CHUNK_SIZE};

/// Top-level configuration (loaded from chunkseal.toml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkSealConfig {
    pub chunking: ChunkingConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Plaintext bytes per chunk (default: 65536)
    pub chunk_size: usize,
    /// Worker thread count (0 = shared pool sized to cpu_count)
    pub workers: usize,
    /// Per-chunk nonce generation: "random" or "salted-counter"
    pub nonce_strategy: NonceStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level or EnvFilter directive (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: 0,
            nonce_strategy: NonceStrategy::Random,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChunkSealError::Config("chunk_size must be non-zero".into()));
        }
        Ok(())
    }
}

impl ChunkSealConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ChunkSealError::Config(format!("parsing config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "config file not found: {}  (using defaults)",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ChunkSealError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        match self.log.format.as_str() {
            "json" | "text" => Ok(()),
            other => Err(ChunkSealError::Config(format!(
                "log.format must be \"json\" or \"text\", got {other:?}"
            ))),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self)
            .map_err(|e| ChunkSealError::Config(format!("serializing config: {e}")))
    }
}
