use thiserror::Error;

/// Error taxonomy for the ingestion and retrieval pipeline.
///
/// Fatal-versus-recoverable handling is decided by the caller:
/// `Extraction` and `EmptyDocument` abort an ingestion outright, while
/// `Embedding` and `Store` are counted and skipped per chunk. `Generation`
/// always surfaces to the end caller.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("document contains no extractable text")]
    EmptyDocument,
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RagError {
    pub fn extraction<E: std::fmt::Display>(err: E) -> Self {
        RagError::Extraction(err.to_string())
    }

    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        RagError::Embedding(err.to_string())
    }

    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        RagError::Store(err.to_string())
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        RagError::Generation(err.to_string())
    }

    pub fn config<E: std::fmt::Display>(err: E) -> Self {
        RagError::Config(err.to_string())
    }
}
