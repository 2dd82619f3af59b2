//! Pipeline configuration.
//!
//! All knobs are serde-loadable from a JSON file and carry defaults that
//! match the shipped learning-platform client, so an empty config file is a
//! valid config file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::RagError;

/// Configuration for the chunking engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
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

/// Configuration for the embedding worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Expected embedding dimensionality. Mixing dimensionalities in one
    /// store is a fatal configuration error.
    pub dimension: usize,
    /// Number of long-lived worker tasks, each owning its own model instance.
    pub workers: usize,
    /// Pending-job capacity per worker queue.
    pub queue_depth: usize,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: 384,
            workers: 2,
            queue_depth: 32,
            timeout_secs: 30,
        }
    }
}

/// Configuration for query-time retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum similarity for a match to be returned (0.0-1.0).
    pub threshold: f32,
    /// Maximum number of matches to return.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            top_k: 5,
        }
    }
}

/// Configuration for the conversation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Number of most recent turns sent to the generation service.
    pub max_turns: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { max_turns: 10 }
    }
}

/// Configuration for the downstream generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "nex-agi/deepseek-v3.1-nex-n1:free".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

/// Top-level configuration for the ingestion and retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub conversation: ConversationConfig,
    pub generation: GenerationConfig,
    /// Maximum number of chunks embedded/persisted concurrently during
    /// ingestion.
    pub max_concurrent_chunks: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            conversation: ConversationConfig::default(),
            generation: GenerationConfig::default(),
            max_concurrent_chunks: 4,
        }
    }
}

impl RagConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, RagError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RagError::config(format!("failed to read {}: {e}", path.display())))?;
        let config: RagConfig = serde_json::from_str(&raw)
            .map_err(|e| RagError::config(format!("failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunking.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be at least 1".into()));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(RagError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.overlap, self.chunking.chunk_size
            )));
        }
        if self.embedding.dimension == 0 {
            return Err(RagError::Config("embedding dimension must be at least 1".into()));
        }
        if self.embedding.workers == 0 {
            return Err(RagError::Config("embedding pool needs at least one worker".into()));
        }
        if self.embedding.queue_depth == 0 {
            return Err(RagError::Config("embedding queue_depth must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.retrieval.threshold) {
            return Err(RagError::Config(format!(
                "retrieval threshold must be within [0, 1], got {}",
                self.retrieval.threshold
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(RagError::Config("retrieval top_k must be at least 1".into()));
        }
        if self.conversation.max_turns == 0 {
            return Err(RagError::Config("conversation max_turns must be at least 1".into()));
        }
        if self.max_concurrent_chunks == 0 {
            return Err(RagError::Config("max_concurrent_chunks must be at least 1".into()));
        }
        Ok(())
    }
}
