//! Query-time retrieval.
//!
//! Retrieval is a best-effort enhancement: embedding or store failures are
//! logged and degrade to an empty result set instead of propagating, so an
//! answer is never blocked on retrieval succeeding.

use std::sync::Arc;

use crate::core::config::RetrievalConfig;
use crate::core::errors::RagError;
use crate::embedding::EmbeddingService;
use crate::store::{DocumentMatch, DocumentStore, SectionQuery};

pub struct RetrievalService {
    embedder: Arc<EmbeddingService>,
    store: Arc<dyn DocumentStore>,
    config: RetrievalConfig,
}

impl RetrievalService {
    pub fn new(
        embedder: Arc<EmbeddingService>,
        store: Arc<dyn DocumentStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Return the most relevant stored sections for `query`, scoped to
    /// `owner_id` when given. Failures degrade to an empty vec.
    pub async fn search(&self, query: &str, owner_id: Option<&str>) -> Vec<DocumentMatch> {
        match self.try_search(query, owner_id).await {
            Ok(matches) => matches,
            Err(err) => {
                tracing::warn!(error = %err, "retrieval failed, degrading to empty context");
                Vec::new()
            }
        }
    }

    async fn try_search(
        &self,
        query: &str,
        owner_id: Option<&str>,
    ) -> Result<Vec<DocumentMatch>, RagError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(query.trim()).await?;
        self.store
            .search_nearest(SectionQuery {
                embedding,
                threshold: self.config.threshold,
                top_k: self.config.top_k,
                owner_id: owner_id.map(str::to_string),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::core::config::EmbeddingConfig;
    use crate::embedding::{EmbeddingModel, ModelLoader};
    use crate::store::{DocumentRecord, NewDocument, NewSection};

    struct AxisModel;

    #[async_trait]
    impl EmbeddingModel for AxisModel {
        fn dimension(&self) -> usize {
            2
        }

        async fn feature_extract(&self, _text: &str) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }

    struct AxisLoader;

    #[async_trait]
    impl ModelLoader for AxisLoader {
        async fn load(&self) -> Result<Arc<dyn EmbeddingModel>, RagError> {
            Ok(Arc::new(AxisModel))
        }
    }

    struct FixedStore {
        matches: Vec<DocumentMatch>,
        fail: bool,
    }

    #[async_trait]
    impl DocumentStore for FixedStore {
        async fn insert_document(&self, _: NewDocument) -> Result<DocumentRecord, RagError> {
            unreachable!("not used in these tests")
        }

        async fn insert_section(&self, _: NewSection) -> Result<(), RagError> {
            unreachable!("not used in these tests")
        }

        async fn search_nearest(
            &self,
            query: SectionQuery,
        ) -> Result<Vec<DocumentMatch>, RagError> {
            if self.fail {
                return Err(RagError::Store("index offline".to_string()));
            }
            Ok(self
                .matches
                .iter()
                .filter(|m| m.similarity >= query.threshold)
                .take(query.top_k)
                .cloned()
                .collect())
        }

        async fn section_count(&self, _: &str) -> Result<usize, RagError> {
            Ok(self.matches.len())
        }
    }

    fn embedder() -> Arc<EmbeddingService> {
        let config = EmbeddingConfig {
            dimension: 2,
            workers: 1,
            queue_depth: 4,
            timeout_secs: 5,
        };
        Arc::new(EmbeddingService::spawn(Arc::new(AxisLoader), &config).unwrap())
    }

    fn match_with(similarity: f32) -> DocumentMatch {
        DocumentMatch {
            section_id: format!("s-{similarity}"),
            document_id: "d-1".to_string(),
            content: "RAG is retrieval-augmented generation.".to_string(),
            similarity,
        }
    }

    #[tokio::test]
    async fn threshold_drops_weak_matches() {
        let store = Arc::new(FixedStore {
            matches: vec![match_with(0.82), match_with(0.3)],
            fail: false,
        });
        let service = RetrievalService::new(embedder(), store, RetrievalConfig::default());

        let matches = service.search("What is RAG?", None).await;
        assert_eq!(matches.len(), 1);
        assert!((matches[0].similarity - 0.82).abs() < 1e-6);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_empty() {
        let store = Arc::new(FixedStore {
            matches: vec![match_with(0.9)],
            fail: true,
        });
        let service = RetrievalService::new(embedder(), store, RetrievalConfig::default());

        assert!(service.search("anything", None).await.is_empty());
    }

    #[tokio::test]
    async fn blank_query_short_circuits() {
        let store = Arc::new(FixedStore {
            matches: vec![match_with(0.9)],
            fail: false,
        });
        let service = RetrievalService::new(embedder(), store, RetrievalConfig::default());

        assert!(service.search("   ", None).await.is_empty());
    }
}
