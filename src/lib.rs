//! Document ingestion and retrieval-augmented generation core for the
//! Synapse learning companion.
//!
//! ```text
//! File ──► extract ──► chunking ──► EmbeddingService (worker pool) ──► DocumentStore
//!
//! Query ──► EmbeddingService ──► DocumentStore::search_nearest ──► matches
//!             matches + learner state ──► ContextAssembler ──► system prompt
//!             system prompt + windowed history ──► GenerationService ──► Answer
//! ```
//!
//! The backing store, blob storage, PDF parser, embedding model runtime and
//! completion endpoint are collaborators behind traits; the crate ships
//! SQLite, filesystem and OpenRouter implementations.

pub mod chunking;
pub mod context;
pub mod conversation;
pub mod core;
pub mod embedding;
pub mod extract;
pub mod generation;
pub mod ingestion;
pub mod logging;
pub mod orchestrator;
pub mod retrieval;
pub mod store;
pub mod vector_math;

pub use crate::core::config::RagConfig;
pub use crate::core::errors::RagError;
pub use crate::ingestion::{IngestReport, IngestionPipeline};
pub use crate::orchestrator::{Answer, RagOrchestrator};
pub use crate::retrieval::RetrievalService;
