//! Milvus vector store backend over the Milvus RESTful API (v2)

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{embed_documents, quote, record_id, IndexBinding};
use crate::domain::vector_store::MilvusConfig;
use crate::domain::{
    AddTextsOptions, Document, DomainError, EmbeddingProvider, IndexStruct, ScoredDocument,
    SearchParams, VectorStoreProvider, VectorStoreType,
};
use crate::infrastructure::http::{HttpClient, HttpClientTrait};

const PROVIDER: &str = "milvus";

const FIELD_ID: &str = "id";
const FIELD_CONTENT: &str = "page_content";
const FIELD_METADATA: &str = "metadata";
const FIELD_GROUP: &str = "group_id";
const FIELD_VECTOR: &str = "vector";

const MAX_CONTENT_LENGTH: u32 = 65_535;

/// Milvus collection holding one dataset's vectors.
///
/// Group deletion and full-text search are not available on this backend.
pub struct MilvusVectorStore<C: HttpClientTrait = HttpClient> {
    client: C,
    base_url: String,
    auth_header: Option<String>,
    binding: IndexBinding,
    embeddings: Arc<dyn EmbeddingProvider>,
}

impl<C: HttpClientTrait> Debug for MilvusVectorStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MilvusVectorStore")
            .field("base_url", &self.base_url)
            .field("binding", &self.binding)
            .finish()
    }
}

impl MilvusVectorStore<HttpClient> {
    pub fn new(
        config: &MilvusConfig,
        binding: IndexBinding,
        embeddings: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self::with_client(HttpClient::new(), config, binding, embeddings)
    }
}

impl<C: HttpClientTrait> MilvusVectorStore<C> {
    pub fn with_client(
        client: C,
        config: &MilvusConfig,
        binding: IndexBinding,
        embeddings: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            client,
            base_url: config.base_url(),
            auth_header: config.token().map(|token| format!("Bearer {}", token)),
            binding,
            embeddings,
        }
    }

    fn collection_name(&self) -> &str {
        &self.binding.index_name
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(auth) = &self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }

    /// Call a v2 endpoint and unwrap the `{code, data}` envelope
    async fn call(&self, path: &str, mut body: Value) -> Result<Value, DomainError> {
        body["collectionName"] = json!(self.collection_name());

        let response = self
            .client
            .post_json(
                &format!("{}/v2/vectordb/{}", self.base_url, path),
                self.headers(),
                &body,
            )
            .await
            .map_err(|e| DomainError::vector_store(PROVIDER, format!("{} failed: {}", path, e)))?;

        let code = response["code"].as_i64().unwrap_or(0);
        if code != 0 {
            let message = response["message"].as_str().unwrap_or("unknown error");
            return Err(DomainError::vector_store(
                PROVIDER,
                format!("{} failed with code {}: {}", path, code, message),
            ));
        }

        Ok(response["data"].clone())
    }

    async fn collection_exists(&self) -> Result<bool, DomainError> {
        let data = self.call("collections/has", json!({})).await?;
        Ok(data["has"].as_bool().unwrap_or(false))
    }

    async fn create_collection(&self, dimensions: usize) -> Result<(), DomainError> {
        if self.collection_exists().await? {
            debug!(collection = %self.collection_name(), "Milvus collection already exists");
            return Ok(());
        }

        let body = json!({
            "schema": {
                "autoId": false,
                "enableDynamicField": false,
                "fields": [
                    {
                        "fieldName": FIELD_ID,
                        "dataType": "VarChar",
                        "isPrimary": true,
                        "elementTypeParams": {"max_length": 36}
                    },
                    {
                        "fieldName": FIELD_CONTENT,
                        "dataType": "VarChar",
                        "elementTypeParams": {"max_length": MAX_CONTENT_LENGTH}
                    },
                    {"fieldName": FIELD_METADATA, "dataType": "JSON"},
                    {
                        "fieldName": FIELD_GROUP,
                        "dataType": "VarChar",
                        "elementTypeParams": {"max_length": 64}
                    },
                    {
                        "fieldName": FIELD_VECTOR,
                        "dataType": "FloatVector",
                        "elementTypeParams": {"dim": dimensions.to_string()}
                    }
                ]
            },
            "indexParams": [{
                "fieldName": FIELD_VECTOR,
                "indexName": FIELD_VECTOR,
                "metricType": "COSINE",
                "indexType": "AUTOINDEX"
            }]
        });
        self.call("collections/create", body).await?;

        info!(
            collection = %self.collection_name(),
            dimensions,
            "Created Milvus collection"
        );
        Ok(())
    }

    async fn insert(&self, documents: Vec<Document>) -> Result<(), DomainError> {
        if documents.is_empty() {
            return Ok(());
        }

        let vectors = embed_documents(&self.embeddings, &documents).await?;
        let rows: Vec<Value> = documents
            .iter()
            .zip(vectors)
            .map(|(doc, vector)| {
                json!({
                    FIELD_ID: record_id(doc).to_string(),
                    FIELD_CONTENT: doc.page_content,
                    FIELD_METADATA: self.binding.attributes.project(&doc.metadata),
                    FIELD_GROUP: self.binding.group_id,
                    FIELD_VECTOR: vector,
                })
            })
            .collect();

        self.call("entities/insert", json!({"data": rows})).await?;

        debug!(
            collection = %self.collection_name(),
            count = documents.len(),
            "Inserted entities into Milvus"
        );
        Ok(())
    }

    async fn delete_where(&self, filter: String) -> Result<(), DomainError> {
        if !self.collection_exists().await? {
            return Ok(());
        }
        self.call("entities/delete", json!({"filter": filter})).await?;
        Ok(())
    }

    fn metadata_path(key: &str) -> String {
        format!("{}[{}]", FIELD_METADATA, quote(key))
    }

    fn in_list(key: &str, values: &[String]) -> String {
        let values: Vec<String> = values.iter().map(|v| quote(v)).collect();
        format!("{} in [{}]", Self::metadata_path(key), values.join(", "))
    }

    fn parse_hit(hit: &Value) -> ScoredDocument {
        let mut document = Document::new(hit[FIELD_CONTENT].as_str().unwrap_or_default());
        if let Some(metadata) = hit[FIELD_METADATA].as_object() {
            document.metadata = metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
        }

        // COSINE metric reports similarity in `distance`
        let score = hit["distance"].as_f64().unwrap_or(0.0) as f32;
        ScoredDocument::new(document, score)
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorStoreProvider for MilvusVectorStore<C> {
    fn provider_type(&self) -> VectorStoreType {
        VectorStoreType::Milvus
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
        self.insert(documents).await?;
        Ok(self.to_index_struct())
    }

    async fn add_texts(
        &self,
        documents: Vec<Document>,
        _options: &AddTextsOptions,
    ) -> Result<(), DomainError> {
        self.insert(documents).await
    }

    async fn text_exists(&self, doc_id: &str) -> Result<bool, DomainError> {
        if !self.collection_exists().await? {
            return Ok(false);
        }

        let body = json!({
            "filter": format!("{} == {}", Self::metadata_path("doc_id"), quote(doc_id)),
            "outputFields": [FIELD_ID],
            "limit": 1,
        });
        let data = self.call("entities/query", body).await?;

        Ok(data.as_array().is_some_and(|rows| !rows.is_empty()))
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.delete_where(Self::in_list("doc_id", ids)).await
    }

    async fn delete_by_metadata_field(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.delete_where(format!("{} == {}", Self::metadata_path(key), quote(value)))
            .await
    }

    async fn delete(&self) -> Result<(), DomainError> {
        if !self.collection_exists().await? {
            return Ok(());
        }

        self.call("collections/drop", json!({})).await?;
        info!(collection = %self.collection_name(), "Dropped Milvus collection");
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        let vector = self.embeddings.embed_query(query).await?;

        let mut body = json!({
            "data": [vector],
            "annsField": FIELD_VECTOR,
            "limit": params.top_k,
            "outputFields": [FIELD_CONTENT, FIELD_METADATA],
            "searchParams": {"metricType": "COSINE"},
        });
        if let Some(ids) = &params.document_ids {
            body["filter"] = json!(Self::in_list("document_id", ids));
        }

        let data = self.call("entities/search", body).await?;

        Ok(data
            .as_array()
            .into_iter()
            .flatten()
            .map(Self::parse_hit)
            .filter(|scored| params.accepts(scored.score))
            .collect())
    }
}
