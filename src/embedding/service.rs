//! Pooled embedding service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::core::config::EmbeddingConfig;
use crate::core::errors::RagError;
use crate::embedding::model::ModelLoader;
use crate::embedding::worker::{spawn_worker, EmbedJob};

/// Converts text into fixed-dimension, mean-pooled, L2-normalized vectors
/// without blocking the caller.
///
/// Owns a pool of long-lived workers and dispatches jobs round-robin.
/// Dropping the service closes the queues and the workers exit on their own.
pub struct EmbeddingService {
    senders: Vec<mpsc::Sender<EmbedJob>>,
    next: AtomicUsize,
    timeout: Duration,
    dimension: usize,
}

impl EmbeddingService {
    /// Spawn the worker pool described by `config`.
    pub fn spawn(loader: Arc<dyn ModelLoader>, config: &EmbeddingConfig) -> Result<Self, RagError> {
        if config.workers == 0 {
            return Err(RagError::Config(
                "embedding pool needs at least one worker".to_string(),
            ));
        }
        if config.dimension == 0 {
            return Err(RagError::Config(
                "embedding dimension must be at least 1".to_string(),
            ));
        }

        let mut senders = Vec::with_capacity(config.workers);
        for worker_id in 0..config.workers {
            let (tx, rx) = mpsc::channel(config.queue_depth.max(1));
            spawn_worker(worker_id, Arc::clone(&loader), rx);
            senders.push(tx);
        }

        Ok(Self {
            senders,
            next: AtomicUsize::new(0),
            timeout: Duration::from_secs(config.timeout_secs),
            dimension: config.dimension,
        })
    }

    /// The configured embedding dimensionality.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed `text` into a unit-norm vector.
    ///
    /// Fails with [`RagError::Embedding`] on model or timeout trouble and
    /// with [`RagError::Config`] when the model's output dimensionality does
    /// not match the configured one.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = EmbedJob {
            id: Uuid::new_v4(),
            text: text.to_string(),
            reply: reply_tx,
        };

        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.senders.len();
        self.senders[slot]
            .send(job)
            .await
            .map_err(|_| RagError::Embedding("embedding worker queue is closed".to_string()))?;

        let result = tokio::time::timeout(self.timeout, reply_rx)
            .await
            .map_err(|_| {
                RagError::Embedding(format!(
                    "embedding timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|_| RagError::Embedding("embedding worker dropped the request".to_string()))?;

        let vector = result?;
        if vector.len() != self.dimension {
            return Err(RagError::Config(format!(
                "embedding dimension mismatch: model produced {}, configured {}",
                vector.len(),
                self.dimension
            )));
        }
        Ok(vector)
    }
}
