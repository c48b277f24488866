//! Qdrant vector store backend over the Qdrant REST API

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{embed_documents, record_id, IndexBinding};
use crate::domain::vector_store::{QdrantConfig, QdrantEndpoint};
use crate::domain::{
    AddTextsOptions, Document, DomainError, EmbeddingProvider, IndexStruct, ScoredDocument,
    SearchParams, VectorStoreProvider, VectorStoreType,
};
use crate::infrastructure::http::{HttpClient, HttpClientTrait};

const PROVIDER: &str = "qdrant";
const UPSERT_BATCH_SIZE: usize = 64;

/// Qdrant collection holding one dataset's vectors
pub struct QdrantVectorStore<C: HttpClientTrait = HttpClient> {
    client: C,
    base_url: String,
    api_key: Option<String>,
    binding: IndexBinding,
    embeddings: Arc<dyn EmbeddingProvider>,
}

impl<C: HttpClientTrait> Debug for QdrantVectorStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantVectorStore")
            .field("base_url", &self.base_url)
            .field("binding", &self.binding)
            .finish()
    }
}

impl QdrantVectorStore<HttpClient> {
    /// Connect to a remote Qdrant server; local `path:` storage is not available over REST
    pub fn new(
        config: &QdrantConfig,
        binding: IndexBinding,
        embeddings: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DomainError> {
        let client = HttpClient::with_timeout(config.timeout)?;
        Self::with_client(client, config, binding, embeddings)
    }
}

impl<C: HttpClientTrait> QdrantVectorStore<C> {
    pub fn with_client(
        client: C,
        config: &QdrantConfig,
        binding: IndexBinding,
        embeddings: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DomainError> {
        let base_url = match config.resolve_endpoint() {
            QdrantEndpoint::Url(url) => url.trim_end_matches('/').to_string(),
            QdrantEndpoint::Local(path) => {
                return Err(DomainError::configuration(format!(
                    "Qdrant local storage ({}) is not supported, set QDRANT_URL to a server URL",
                    path.display()
                )));
            }
        };

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            binding,
            embeddings,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.binding.index_name)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(key) = &self.api_key {
            headers.push(("api-key", key.as_str()));
        }
        headers
    }

    fn map_err(operation: &str) -> impl Fn(DomainError) -> DomainError + '_ {
        move |e| DomainError::vector_store(PROVIDER, format!("Failed to {}: {}", operation, e))
    }

    async fn collection_exists(&self) -> Result<bool, DomainError> {
        let response = self
            .client
            .get_json(&format!("{}/exists", self.collection_url()), self.headers(), &[])
            .await
            .map_err(Self::map_err("check collection"))?;

        Ok(response["result"]["exists"].as_bool().unwrap_or(false))
    }

    async fn create_collection(&self, dimensions: usize) -> Result<(), DomainError> {
        if self.collection_exists().await? {
            debug!(collection = %self.binding.index_name, "Qdrant collection already exists");
            return Ok(());
        }

        let body = json!({
            "vectors": {"size": dimensions, "distance": "Cosine"}
        });
        self.client
            .put_json(&self.collection_url(), self.headers(), &body)
            .await
            .map_err(Self::map_err("create collection"))?;

        for (field, schema) in [
            ("group_id", json!("keyword")),
            ("metadata.doc_id", json!("keyword")),
            ("metadata.document_id", json!("keyword")),
        ] {
            let body = json!({"field_name": field, "field_schema": schema});
            self.client
                .put_json(
                    &format!("{}/index?wait=true", self.collection_url()),
                    self.headers(),
                    &body,
                )
                .await
                .map_err(Self::map_err("create payload index"))?;
        }

        info!(
            collection = %self.binding.index_name,
            dimensions,
            "Created Qdrant collection"
        );
        Ok(())
    }

    async fn upsert(&self, documents: Vec<Document>) -> Result<(), DomainError> {
        if documents.is_empty() {
            return Ok(());
        }

        let vectors = embed_documents(&self.embeddings, &documents).await?;
        let points: Vec<Value> = documents
            .iter()
            .zip(vectors)
            .map(|(doc, vector)| {
                json!({
                    "id": record_id(doc).to_string(),
                    "vector": vector,
                    "payload": {
                        "page_content": doc.page_content,
                        "metadata": self.binding.attributes.project(&doc.metadata),
                        "group_id": self.binding.group_id,
                    }
                })
            })
            .collect();

        for batch in points.chunks(UPSERT_BATCH_SIZE) {
            self.client
                .put_json(
                    &format!("{}/points?wait=true", self.collection_url()),
                    self.headers(),
                    &json!({"points": batch}),
                )
                .await
                .map_err(Self::map_err("upsert points"))?;
        }

        debug!(
            collection = %self.binding.index_name,
            count = documents.len(),
            "Upserted points into Qdrant"
        );
        Ok(())
    }

    async fn delete_by_filter(&self, filter: Value) -> Result<(), DomainError> {
        if !self.collection_exists().await? {
            return Ok(());
        }

        self.client
            .post_json(
                &format!("{}/points/delete?wait=true", self.collection_url()),
                self.headers(),
                &json!({"filter": filter}),
            )
            .await
            .map_err(Self::map_err("delete points"))?;
        Ok(())
    }

    fn match_value(key: &str, value: &str) -> Value {
        json!({"must": [{"key": key, "match": {"value": value}}]})
    }

    fn match_any(key: &str, values: &[String]) -> Value {
        json!({"must": [{"key": key, "match": {"any": values}}]})
    }

    fn parse_scored_point(point: &Value) -> Result<ScoredDocument, DomainError> {
        let payload = &point["payload"];
        let page_content = payload["page_content"].as_str().ok_or_else(|| {
            DomainError::vector_store(PROVIDER, "Search result is missing page_content")
        })?;

        let mut document = Document::new(page_content);
        if let Some(metadata) = payload["metadata"].as_object() {
            document.metadata = metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
        }

        let score = point["score"].as_f64().unwrap_or(0.0) as f32;
        Ok(ScoredDocument::new(document, score))
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorStoreProvider for QdrantVectorStore<C> {
    fn provider_type(&self) -> VectorStoreType {
        VectorStoreType::Qdrant
    }

    fn index_name(&self) -> &str {
        &self.binding.index_name
    }

    async fn create(
        &self,
        documents: Vec<Document>,
        _options: &AddTextsOptions,
    ) -> Result<IndexStruct, DomainError> {
        self.create_collection(self.embeddings.dimensions()).await?;
        self.upsert(documents).await?;
        Ok(self.to_index_struct())
    }

    async fn add_texts(
        &self,
        documents: Vec<Document>,
        _options: &AddTextsOptions,
    ) -> Result<(), DomainError> {
        self.upsert(documents).await
    }

    async fn text_exists(&self, doc_id: &str) -> Result<bool, DomainError> {
        if !self.collection_exists().await? {
            return Ok(false);
        }

        let body = json!({
            "filter": Self::match_value("metadata.doc_id", doc_id),
            "limit": 1,
            "with_payload": false,
            "with_vector": false,
        });
        let response = self
            .client
            .post_json(
                &format!("{}/points/scroll", self.collection_url()),
                self.headers(),
                &body,
            )
            .await
            .map_err(Self::map_err("scroll points"))?;

        Ok(response["result"]["points"]
            .as_array()
            .is_some_and(|points| !points.is_empty()))
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.delete_by_filter(Self::match_any("metadata.doc_id", ids))
            .await
    }

    async fn delete_by_metadata_field(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.delete_by_filter(Self::match_value(&format!("metadata.{}", key), value))
            .await
    }

    async fn delete_by_group_id(&self, group_id: &str) -> Result<(), DomainError> {
        self.delete_by_filter(Self::match_value("group_id", group_id))
            .await
    }

    async fn delete(&self) -> Result<(), DomainError> {
        if !self.collection_exists().await? {
            return Ok(());
        }

        self.client
            .delete_json(&self.collection_url(), self.headers(), None)
            .await
            .map_err(Self::map_err("delete collection"))?;

        info!(collection = %self.binding.index_name, "Deleted Qdrant collection");
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        let vector = self.embeddings.embed_query(query).await?;

        let mut body = json!({
            "vector": vector,
            "limit": params.top_k,
            "with_payload": true,
        });
        if let Some(threshold) = params.score_threshold {
            body["score_threshold"] = json!(threshold);
        }
        if let Some(ids) = &params.document_ids {
            body["filter"] = Self::match_any("metadata.document_id", ids);
        }

        let response = self
            .client
            .post_json(
                &format!("{}/points/search", self.collection_url()),
                self.headers(),
                &body,
            )
            .await
            .map_err(Self::map_err("search points"))?;

        let points = response["result"].as_array().cloned().unwrap_or_default();
        let mut results = Vec::with_capacity(points.len());

        for point in &points {
            let scored = Self::parse_scored_point(point)?;
            if params.accepts(scored.score) {
                results.push(scored);
            }
        }

        Ok(results)
    }
}
