//! Embedding computation behind an isolated worker boundary.

pub mod model;
pub mod service;
mod worker;

pub use model::{EmbeddingModel, ModelLoader};
pub use service::EmbeddingService;
