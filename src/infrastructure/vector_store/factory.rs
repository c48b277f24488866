//! Vector store factory

use std::sync::Arc;

use super::{IndexBinding, MilvusVectorStore, QdrantVectorStore, WeaviateVectorStore};
use crate::domain::{DomainError, EmbeddingProvider, VectorStoreConfig, VectorStoreProvider};

/// Builds the backend matching a resolved configuration
#[derive(Debug)]
pub struct VectorStoreFactory;

impl VectorStoreFactory {
    pub fn create(
        config: &VectorStoreConfig,
        binding: IndexBinding,
        embeddings: Arc<dyn EmbeddingProvider>,
    ) -> Result<Box<dyn VectorStoreProvider>, DomainError> {
        tracing::debug!(
            store_type = %config.store_type(),
            index_name = %binding.index_name,
            "Creating vector store provider"
        );

        match config {
            VectorStoreConfig::Weaviate(config) => Ok(Box::new(WeaviateVectorStore::new(
                config, binding, embeddings,
            ))),
            VectorStoreConfig::Qdrant(config) => Ok(Box::new(QdrantVectorStore::new(
                config, binding, embeddings,
            )?)),
            VectorStoreConfig::Milvus(config) => Ok(Box::new(MilvusVectorStore::new(
                config, binding, embeddings,
            ))),
        }
    }
}
