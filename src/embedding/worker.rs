//! Long-lived embedding worker tasks.
//!
//! Each worker owns a job queue and at most one loaded model instance,
//! loaded lazily on the first job and reused afterwards. Requests are plain
//! messages carrying a correlation id and a oneshot reply channel; a worker
//! processes one inference at a time, so concurrency comes from running
//! several workers, never from sharing a model.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::errors::RagError;
use crate::embedding::model::{EmbeddingModel, ModelLoader};
use crate::vector_math;

/// A single embedding request.
pub(crate) struct EmbedJob {
    pub id: Uuid,
    pub text: String,
    pub reply: oneshot::Sender<Result<Vec<f32>, RagError>>,
}

/// Spawn a worker draining `jobs` until every sender is dropped.
pub(crate) fn spawn_worker(
    worker_id: usize,
    loader: Arc<dyn ModelLoader>,
    mut jobs: mpsc::Receiver<EmbedJob>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut model: Option<Arc<dyn EmbeddingModel>> = None;

        while let Some(job) = jobs.recv().await {
            let result = run_job(&loader, &mut model, &job.text).await;
            if job.reply.send(result).is_err() {
                tracing::debug!(
                    worker = worker_id,
                    id = %job.id,
                    "embedding caller went away before the reply"
                );
            }
        }

        tracing::debug!(worker = worker_id, "embedding worker shut down");
    })
}

async fn run_job(
    loader: &Arc<dyn ModelLoader>,
    model_slot: &mut Option<Arc<dyn EmbeddingModel>>,
    text: &str,
) -> Result<Vec<f32>, RagError> {
    let model = match model_slot {
        Some(model) => Arc::clone(model),
        None => {
            let loaded = loader.load().await?;
            tracing::info!(dimension = loaded.dimension(), "embedding model loaded");
            *model_slot = Some(Arc::clone(&loaded));
            loaded
        }
    };

    let token_vectors = model.feature_extract(text).await?;
    if token_vectors.is_empty() {
        return Err(RagError::Embedding(
            "model produced no token vectors".to_string(),
        ));
    }

    let mut pooled = vector_math::mean_pool(&token_vectors)?;
    vector_math::l2_normalize(&mut pooled);
    Ok(pooled)
}
