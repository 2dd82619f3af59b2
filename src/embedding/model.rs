//! Embedding model runtime boundary.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::RagError;

/// A loaded embedding model instance.
///
/// Returns raw per-token vectors; pooling and normalization are owned by the
/// embedding service so the unit-norm invariant is enforced in one place.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Dimensionality of the vectors this model produces.
    fn dimension(&self) -> usize;

    /// Run feature extraction over `text`, returning one vector per token.
    async fn feature_extract(&self, text: &str) -> Result<Vec<Vec<f32>>, RagError>;
}

/// Loads an embedding model instance.
///
/// Loading is expensive; each worker calls this at most once and keeps the
/// instance for its whole lifetime.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn EmbeddingModel>, RagError>;
}
