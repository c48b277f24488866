//! Vector store backends and the dataset index facade

mod facade;
mod factory;
mod milvus;
mod qdrant;
mod weaviate;

use std::sync::Arc;

pub use facade::{select_store_type, VectorIndex};
pub use factory::VectorStoreFactory;
pub use milvus::MilvusVectorStore;
pub use qdrant::QdrantVectorStore;
pub use weaviate::WeaviateVectorStore;

use crate::domain::{AttributeSet, DatasetId, Document, DomainError, EmbeddingProvider};

/// What a backend instance is bound to: one dataset's index
#[derive(Debug, Clone)]
pub struct IndexBinding {
    /// Class or collection name
    pub index_name: String,
    /// Dataset ID, stored on every record as `group_id`
    pub group_id: String,
    /// Metadata fields copied from each document
    pub attributes: AttributeSet,
}

impl IndexBinding {
    pub fn new(index_name: impl Into<String>, dataset_id: &DatasetId, attributes: AttributeSet) -> Self {
        Self {
            index_name: index_name.into(),
            group_id: dataset_id.to_string(),
            attributes,
        }
    }
}

/// Embed every document's text, checking one vector comes back per document
pub(crate) async fn embed_documents(
    embeddings: &Arc<dyn EmbeddingProvider>,
    documents: &[Document],
) -> Result<Vec<Vec<f32>>, DomainError> {
    let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
    let vectors = embeddings.embed_documents(texts).await?;

    if vectors.len() != documents.len() {
        return Err(DomainError::provider(
            "embedding",
            format!(
                "Expected {} embeddings, received {}",
                documents.len(),
                vectors.len()
            ),
        ));
    }

    Ok(vectors)
}

/// Record ID for a document: its `doc_id` when that is a UUID, otherwise a fresh one
pub(crate) fn record_id(document: &Document) -> uuid::Uuid {
    document
        .doc_id()
        .and_then(|id| uuid::Uuid::parse_str(id).ok())
        .unwrap_or_else(uuid::Uuid::new_v4)
}

/// Quote a string as a JSON/GraphQL/Milvus-expression string literal
pub(crate) fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;

    #[test]
    fn test_record_id_reuses_uuid_doc_id() {
        let id = "0b7f8c4e-2f3a-4d8b-9c1e-5a6b7c8d9e0f";
        let doc = Document::new("text").with_metadata("doc_id", id);

        assert_eq!(record_id(&doc).to_string(), id);
    }

    #[test]
    fn test_record_id_generates_for_non_uuid() {
        let doc = Document::new("text").with_metadata("doc_id", "plain");
        assert_ne!(record_id(&doc).to_string(), "plain");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"a"b"#), r#""a\"b""#);
    }

    #[tokio::test]
    async fn test_embed_documents_one_per_document() {
        let embeddings: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::new(3));
        let docs = vec![Document::new("a"), Document::new("b")];

        let vectors = embed_documents(&embeddings, &docs).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 3);
    }
}
