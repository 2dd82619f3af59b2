//! Document ingestion pipeline.
//!
//! Upload → extract → chunk → embed → persist, with per-chunk partial-failure
//! tolerance: a chunk whose embedding or persistence fails is logged, counted
//! and skipped, so one flaky call cannot lose a whole document. Upload and
//! extraction failures, and documents with no extractable text, abort the
//! whole run.

use std::sync::Arc;

use futures_util::stream::StreamExt;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use serde_json::json;

use crate::chunking::{ChunkingEngine, DocumentChunk};
use crate::core::errors::RagError;
use crate::embedding::EmbeddingService;
use crate::extract::{TextExtractor, UploadedFile};
use crate::store::{BlobStore, DocumentStore, NewDocument, NewSection};

/// Ingestion phase reported to the progress observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestPhase {
    Uploading,
    Extracting,
    SavingMetadata,
    Embedding,
    Complete,
}

/// A progress update: phase, overall percentage and a display message.
#[derive(Debug, Clone, Serialize)]
pub struct IngestProgress {
    pub phase: IngestPhase,
    pub percent: u8,
    pub message: String,
}

/// Observer callback for ingestion progress.
///
/// The pipeline never depends on the observer staying interested; updates
/// are fire-and-forget.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: IngestProgress);
}

/// Observer that discards all updates.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _update: IngestProgress) {}
}

/// Terminal summary of one ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub document_id: String,
    /// Chunks embedded and persisted successfully.
    pub chunk_count: usize,
    /// Chunks skipped after a failed embedding or persistence call.
    pub failed_chunk_count: usize,
}

/// Orchestrates file ingestion end to end.
pub struct IngestionPipeline {
    chunker: ChunkingEngine,
    extractor: TextExtractor,
    embedder: Arc<EmbeddingService>,
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    max_concurrent_chunks: usize,
}

impl IngestionPipeline {
    pub fn new(
        chunker: ChunkingEngine,
        extractor: TextExtractor,
        embedder: Arc<EmbeddingService>,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        max_concurrent_chunks: usize,
    ) -> Self {
        Self {
            chunker,
            extractor,
            embedder,
            store,
            blobs,
            max_concurrent_chunks: max_concurrent_chunks.max(1),
        }
    }

    /// Ingest one file for `owner_id`.
    ///
    /// Partial success is a valid terminal state; check
    /// [`IngestReport::failed_chunk_count`].
    pub async fn ingest(
        &self,
        file: &UploadedFile,
        owner_id: &str,
        progress: &dyn ProgressSink,
    ) -> Result<IngestReport, RagError> {
        progress.report(IngestProgress {
            phase: IngestPhase::Uploading,
            percent: 10,
            message: "Uploading to storage...".to_string(),
        });
        let storage_path = build_storage_path(owner_id, file);
        self.blobs.upload(&storage_path, &file.bytes).await?;

        progress.report(IngestProgress {
            phase: IngestPhase::Extracting,
            percent: 30,
            message: "Parsing document...".to_string(),
        });
        let text = self.extractor.extract(file).await?;
        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            return Err(RagError::EmptyDocument);
        }

        progress.report(IngestProgress {
            phase: IngestPhase::SavingMetadata,
            percent: 50,
            message: "Saving metadata...".to_string(),
        });
        let record = self
            .store
            .insert_document(NewDocument {
                owner_id: owner_id.to_string(),
                title: file.name.clone(),
                storage_path,
            })
            .await?;

        progress.report(IngestProgress {
            phase: IngestPhase::Embedding,
            percent: 60,
            message: "Generating embeddings...".to_string(),
        });

        let total = chunks.len();
        let mut outcomes = futures_util::stream::iter(
            chunks
                .into_iter()
                .map(|chunk| self.process_chunk(&record.id, &file.name, chunk)),
        )
        .buffer_unordered(self.max_concurrent_chunks);

        let mut chunk_count = 0usize;
        let mut failed_chunk_count = 0usize;
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(()) => chunk_count += 1,
                Err((index, err)) => {
                    tracing::error!(
                        document_id = %record.id,
                        chunk_index = index,
                        error = %err,
                        "skipping chunk after failure"
                    );
                    failed_chunk_count += 1;
                }
            }
            let done = chunk_count + failed_chunk_count;
            let percent = 60 + ((done * 40) / total) as u8;
            progress.report(IngestProgress {
                phase: IngestPhase::Embedding,
                percent,
                message: format!("Indexing chunk {done}/{total}"),
            });
        }
        drop(outcomes);

        progress.report(IngestProgress {
            phase: IngestPhase::Complete,
            percent: 100,
            message: "Complete".to_string(),
        });

        tracing::info!(
            document_id = %record.id,
            chunk_count,
            failed_chunk_count,
            "ingestion finished"
        );

        Ok(IngestReport {
            document_id: record.id,
            chunk_count,
            failed_chunk_count,
        })
    }

    /// Embed (with one retry) and persist a single chunk.
    async fn process_chunk(
        &self,
        document_id: &str,
        file_name: &str,
        chunk: DocumentChunk,
    ) -> Result<(), (usize, RagError)> {
        let index = chunk.index;

        let embedding = match self.embedder.embed(&chunk.content).await {
            Ok(vector) => vector,
            Err(first) => {
                tracing::warn!(chunk_index = index, error = %first, "retrying embedding once");
                self.embedder
                    .embed(&chunk.content)
                    .await
                    .map_err(|err| (index, err))?
            }
        };

        let mut metadata = chunk.metadata.clone();
        metadata.insert("chunk_index".to_string(), json!(chunk.index));
        metadata.insert("char_length".to_string(), json!(chunk.char_length));
        metadata.insert("original_file".to_string(), json!(file_name));

        self.store
            .insert_section(NewSection {
                document_id: document_id.to_string(),
                content: chunk.content,
                embedding,
                metadata: serde_json::Value::Object(metadata),
            })
            .await
            .map_err(|err| (index, err))
    }
}

/// Storage path in the shape `{owner}/{salt}_{timestamp}.{ext}`.
fn build_storage_path(owner_id: &str, file: &UploadedFile) -> String {
    let salt: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    let timestamp = chrono::Utc::now().timestamp_millis();
    format!("{owner_id}/{salt}_{timestamp}.{}", file.extension())
}
