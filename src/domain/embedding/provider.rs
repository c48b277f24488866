//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Converts text into vectors. Supplied by the caller and shared with the
/// vector store backends.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a batch of document texts, one vector per input in order
    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Embed a single search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.embed_documents(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("embedding", "Empty embedding response"))
    }

    /// Vector dimensions produced by this provider
    fn dimensions(&self) -> usize;
}
