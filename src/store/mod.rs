//! Document persistence: typed records and storage traits.
//!
//! The backing engines are collaborators behind [`DocumentStore`] and
//! [`BlobStore`]; the crate ships a SQLite vector store and a filesystem
//! blob store as the default implementations.

pub mod blob;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::RagError;

pub use blob::FsBlobStore;
pub use sqlite::SqliteDocumentStore;

/// A persisted uploaded document. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub storage_path: String,
    pub created_at: String,
}

/// Input for creating a [`DocumentRecord`].
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub owner_id: String,
    pub title: String,
    pub storage_path: String,
}

/// Input for persisting one chunk with its embedding.
#[derive(Debug, Clone)]
pub struct NewSection {
    pub document_id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: Value,
}

/// A query-time match. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMatch {
    pub section_id: String,
    pub document_id: String,
    pub content: String,
    /// Cosine similarity mapped into [0, 1].
    pub similarity: f32,
}

/// Nearest-neighbor search parameters.
#[derive(Debug, Clone)]
pub struct SectionQuery {
    pub embedding: Vec<f32>,
    pub threshold: f32,
    pub top_k: usize,
    pub owner_id: Option<String>,
}

/// Vector-capable document store.
///
/// `search_nearest` results are pre-sorted by descending similarity and
/// already threshold-filtered and truncated to `top_k`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_document(&self, document: NewDocument) -> Result<DocumentRecord, RagError>;

    async fn insert_section(&self, section: NewSection) -> Result<(), RagError>;

    async fn search_nearest(&self, query: SectionQuery) -> Result<Vec<DocumentMatch>, RagError>;

    async fn section_count(&self, document_id: &str) -> Result<usize, RagError>;
}

/// Raw upload storage for the original file bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), RagError>;
}
