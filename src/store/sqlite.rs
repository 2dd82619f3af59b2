//! SQLite-backed document and vector store.
//!
//! Embeddings are stored as little-endian f32 BLOBs and scored with cosine
//! similarity at query time. All embeddings in one store share a single
//! dimensionality; a mismatch on insert or search is a fatal configuration
//! error, not a soft miss.

use std::cmp::Ordering;
use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use crate::core::errors::RagError;
use crate::vector_math::cosine_similarity;

use super::{DocumentMatch, DocumentRecord, DocumentStore, NewDocument, NewSection, SectionQuery};

#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
    dimension: usize,
}

impl SqliteDocumentStore {
    pub async fn with_path(db_path: PathBuf, dimension: usize) -> Result<Self, RagError> {
        if dimension == 0 {
            return Err(RagError::Config(
                "store dimension must be at least 1".to_string(),
            ));
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(RagError::store)?;

        let store = Self { pool, dimension };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), RagError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                storage_path TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::store)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS document_sections (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL,
                metadata JSON
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::store)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_document_sections_document_id
             ON document_sections(document_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::store)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_owner_id ON documents(owner_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::store)?;

        Ok(())
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), RagError> {
        if embedding.len() != self.dimension {
            return Err(RagError::Config(format!(
                "embedding dimension mismatch: got {}, store expects {}",
                embedding.len(),
                self.dimension
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn insert_document(&self, document: NewDocument) -> Result<DocumentRecord, RagError> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO documents (id, owner_id, title, storage_path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(&document.owner_id)
        .bind(&document.title)
        .bind(&document.storage_path)
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .map_err(RagError::store)?;

        Ok(DocumentRecord {
            id,
            owner_id: document.owner_id,
            title: document.title,
            storage_path: document.storage_path,
            created_at,
        })
    }

    async fn insert_section(&self, section: NewSection) -> Result<(), RagError> {
        self.check_dimension(&section.embedding)?;

        let id = uuid::Uuid::new_v4().to_string();
        let blob = serialize_embedding(&section.embedding);

        sqlx::query(
            "INSERT INTO document_sections (id, document_id, content, embedding, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(&section.document_id)
        .bind(&section.content)
        .bind(blob)
        .bind(&section.metadata)
        .execute(&self.pool)
        .await
        .map_err(RagError::store)?;

        Ok(())
    }

    async fn search_nearest(&self, query: SectionQuery) -> Result<Vec<DocumentMatch>, RagError> {
        self.check_dimension(&query.embedding)?;

        let rows = if let Some(owner_id) = &query.owner_id {
            sqlx::query(
                "SELECT s.id, s.document_id, s.content, s.embedding
                 FROM document_sections s
                 JOIN documents d ON d.id = s.document_id
                 WHERE d.owner_id = ?1",
            )
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(RagError::store)?
        } else {
            sqlx::query(
                "SELECT s.id, s.document_id, s.content, s.embedding
                 FROM document_sections s",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(RagError::store)?
        };

        let mut matches = Vec::new();
        for row in rows {
            let embedding_bytes: Vec<u8> = row.get("embedding");
            if embedding_bytes.is_empty() {
                continue;
            }
            let embedding = deserialize_embedding(&embedding_bytes);
            let similarity = cosine_similarity(&query.embedding, &embedding)?.clamp(0.0, 1.0);
            if similarity < query.threshold {
                continue;
            }
            matches.push(DocumentMatch {
                section_id: row.get("id"),
                document_id: row.get("document_id"),
                content: row.get("content"),
                similarity,
            });
        }

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        matches.truncate(query.top_k);

        Ok(matches)
    }

    async fn section_count(&self, document_id: &str) -> Result<usize, RagError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document_sections WHERE document_id = ?1")
                .bind(document_id)
                .fetch_one(&self.pool)
                .await
                .map_err(RagError::store)?;
        Ok(count as usize)
    }
}

fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
