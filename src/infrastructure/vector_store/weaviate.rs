//! Weaviate vector store backend over the Weaviate REST and GraphQL APIs

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::{embed_documents, quote, record_id, IndexBinding};
use crate::domain::vector_store::WeaviateConfig;
use crate::domain::{
    AddTextsOptions, Document, DomainError, EmbeddingProvider, IndexStruct, ScoredDocument,
    SearchParams, VectorStoreProvider, VectorStoreType,
};
use crate::infrastructure::http::{HttpClient, HttpClientTrait};

const PROVIDER: &str = "weaviate";

/// Property holding the document text
const TEXT_PROPERTY: &str = "text";
const GROUP_PROPERTY: &str = "group_id";

/// Filterable properties compare whole values, not word tokens
fn keyword_property(name: &str) -> Value {
    json!({"name": name, "dataType": ["text"], "tokenization": "field"})
}

/// Weaviate class holding one dataset's vectors
pub struct WeaviateVectorStore<C: HttpClientTrait = HttpClient> {
    client: C,
    endpoint: String,
    auth_header: Option<String>,
    batch_size: usize,
    binding: IndexBinding,
    embeddings: Arc<dyn EmbeddingProvider>,
}

impl<C: HttpClientTrait> Debug for WeaviateVectorStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeaviateVectorStore")
            .field("endpoint", &self.endpoint)
            .field("batch_size", &self.batch_size)
            .field("binding", &self.binding)
            .finish()
    }
}

impl WeaviateVectorStore<HttpClient> {
    pub fn new(
        config: &WeaviateConfig,
        binding: IndexBinding,
        embeddings: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self::with_client(HttpClient::new(), config, binding, embeddings)
    }
}

impl<C: HttpClientTrait> WeaviateVectorStore<C> {
    pub fn with_client(
        client: C,
        config: &WeaviateConfig,
        binding: IndexBinding,
        embeddings: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            auth_header: config.api_key.as_ref().map(|key| format!("Bearer {}", key)),
            batch_size: config.batch_size,
            binding,
            embeddings,
        }
    }

    fn class_name(&self) -> &str {
        &self.binding.index_name
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(auth) = &self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }

    /// Configured attributes, minus names that clash with the built-in properties
    fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.binding
            .attributes
            .iter()
            .filter(|name| *name != TEXT_PROPERTY && *name != GROUP_PROPERTY)
    }

    fn map_err(operation: &str) -> impl Fn(DomainError) -> DomainError + '_ {
        move |e| DomainError::vector_store(PROVIDER, format!("Failed to {}: {}", operation, e))
    }

    async fn class_exists(&self) -> Result<bool, DomainError> {
        let schema = self
            .client
            .get_json(&format!("{}/v1/schema", self.endpoint), self.headers(), &[])
            .await
            .map_err(Self::map_err("read schema"))?;

        Ok(schema["classes"]
            .as_array()
            .is_some_and(|classes| {
                classes
                    .iter()
                    .any(|c| c["class"].as_str() == Some(self.class_name()))
            }))
    }

    async fn create_class(&self) -> Result<(), DomainError> {
        if self.class_exists().await? {
            debug!(class = %self.class_name(), "Weaviate class already exists");
            return Ok(());
        }

        let mut properties = vec![
            json!({"name": TEXT_PROPERTY, "dataType": ["text"]}),
            keyword_property(GROUP_PROPERTY),
        ];
        properties.extend(self.attribute_names().map(keyword_property));

        let body = json!({
            "class": self.class_name(),
            "vectorizer": "none",
            "properties": properties,
        });

        self.client
            .post_json(&format!("{}/v1/schema", self.endpoint), self.headers(), &body)
            .await
            .map_err(Self::map_err("create class"))?;

        info!(class = %self.class_name(), "Created Weaviate class");
        Ok(())
    }

    fn properties(&self, document: &Document) -> Map<String, Value> {
        let mut properties: Map<String, Value> = self
            .binding
            .attributes
            .project(&document.metadata)
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(_) => (k, v),
                other => (k, Value::String(other.to_string())),
            })
            .collect();

        properties.insert(TEXT_PROPERTY.to_string(), json!(document.page_content));
        properties.insert(GROUP_PROPERTY.to_string(), json!(self.binding.group_id));
        properties
    }

    async fn insert(&self, documents: Vec<Document>) -> Result<(), DomainError> {
        if documents.is_empty() {
            return Ok(());
        }

        let vectors = embed_documents(&self.embeddings, &documents).await?;
        let objects: Vec<Value> = documents
            .iter()
            .zip(vectors)
            .map(|(doc, vector)| {
                json!({
                    "class": self.class_name(),
                    "id": record_id(doc).to_string(),
                    "properties": self.properties(doc),
                    "vector": vector,
                })
            })
            .collect();

        for batch in objects.chunks(self.batch_size) {
            let response = self
                .client
                .post_json(
                    &format!("{}/v1/batch/objects", self.endpoint),
                    self.headers(),
                    &json!({"objects": batch}),
                )
                .await
                .map_err(Self::map_err("insert objects"))?;

            Self::check_batch_errors(&response)?;
        }

        debug!(
            class = %self.class_name(),
            count = documents.len(),
            "Inserted objects into Weaviate"
        );
        Ok(())
    }

    /// Batch responses report per-object failures inside a 200 response
    fn check_batch_errors(response: &Value) -> Result<(), DomainError> {
        let Some(items) = response.as_array() else {
            return Ok(());
        };

        let messages: Vec<String> = items
            .iter()
            .filter_map(|item| item["result"]["errors"]["error"].as_array())
            .flatten()
            .filter_map(|e| e["message"].as_str().map(str::to_string))
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(DomainError::vector_store(
                PROVIDER,
                format!("Batch insert failed: {}", messages.join("; ")),
            ))
        }
    }

    async fn graphql(&self, query: String) -> Result<Value, DomainError> {
        let response = self
            .client
            .post_json(
                &format!("{}/v1/graphql", self.endpoint),
                self.headers(),
                &json!({"query": query}),
            )
            .await
            .map_err(Self::map_err("run query"))?;

        if let Some(errors) = response["errors"].as_array().filter(|e| !e.is_empty()) {
            let messages: Vec<&str> = errors.iter().filter_map(|e| e["message"].as_str()).collect();
            return Err(DomainError::vector_store(
                PROVIDER,
                format!("Query failed: {}", messages.join("; ")),
            ));
        }

        Ok(response["data"]["Get"][self.class_name()].clone())
    }

    async fn batch_delete(&self, filter: Value) -> Result<(), DomainError> {
        if !self.class_exists().await? {
            return Ok(());
        }

        let body = json!({
            "match": {"class": self.class_name(), "where": filter}
        });
        self.client
            .delete_json(
                &format!("{}/v1/batch/objects", self.endpoint),
                self.headers(),
                Some(&body),
            )
            .await
            .map_err(Self::map_err("delete objects"))?;
        Ok(())
    }

    fn equal_filter(path: &str, value: &str) -> Value {
        json!({"path": [path], "operator": "Equal", "valueText": value})
    }

    fn any_filter(path: &str, values: &[String]) -> Value {
        json!({"path": [path], "operator": "ContainsAny", "valueTextArray": values})
    }

    /// GraphQL `where` argument restricting results to the given documents
    fn document_filter(params: &SearchParams) -> String {
        match &params.document_ids {
            Some(ids) => {
                let values: Vec<String> = ids.iter().map(|id| quote(id)).collect();
                format!(
                    r#", where: {{path: ["document_id"], operator: ContainsAny, valueTextArray: [{}]}}"#,
                    values.join(", ")
                )
            }
            None => String::new(),
        }
    }

    fn selected_fields(&self, additional: &str) -> String {
        let mut fields: Vec<&str> = vec![TEXT_PROPERTY];
        fields.extend(self.attribute_names());
        format!("{} _additional {{ {} }}", fields.join(" "), additional)
    }

    fn parse_object(&self, object: &Value, score: f32) -> ScoredDocument {
        let mut document = Document::new(object[TEXT_PROPERTY].as_str().unwrap_or_default());
        for name in self.attribute_names() {
            if let Some(value) = object.get(name).filter(|v| !v.is_null()) {
                document.metadata.insert(name.to_string(), value.clone());
            }
        }
        ScoredDocument::new(document, score)
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorStoreProvider for WeaviateVectorStore<C> {
    fn provider_type(&self) -> VectorStoreType {
        VectorStoreType::Weaviate
    }

    fn index_name(&self) -> &str {
        &self.binding.index_name
    }

    async fn create(
        &self,
        documents: Vec<Document>,
        _options: &AddTextsOptions,
    ) -> Result<IndexStruct, DomainError> {
        self.create_class().await?;
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
        if !self.class_exists().await? {
            return Ok(false);
        }

        let query = format!(
            r#"{{ Get {{ {}(where: {{path: ["doc_id"], operator: Equal, valueText: {}}}, limit: 1) {{ doc_id }} }} }}"#,
            self.class_name(),
            quote(doc_id)
        );
        let objects = self.graphql(query).await?;

        Ok(objects.as_array().is_some_and(|o| !o.is_empty()))
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.batch_delete(Self::any_filter("doc_id", ids)).await
    }

    async fn delete_by_metadata_field(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.batch_delete(Self::equal_filter(key, value)).await
    }

    async fn delete_by_group_id(&self, group_id: &str) -> Result<(), DomainError> {
        self.batch_delete(Self::equal_filter(GROUP_PROPERTY, group_id))
            .await
    }

    async fn delete(&self) -> Result<(), DomainError> {
        if !self.class_exists().await? {
            return Ok(());
        }

        self.client
            .delete_json(
                &format!("{}/v1/schema/{}", self.endpoint, self.class_name()),
                self.headers(),
                None,
            )
            .await
            .map_err(Self::map_err("delete class"))?;

        info!(class = %self.class_name(), "Deleted Weaviate class");
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        let vector = self.embeddings.embed_query(query).await?;
        let vector = serde_json::to_string(&vector)
            .map_err(|e| DomainError::internal(format!("Failed to encode vector: {}", e)))?;

        let query = format!(
            "{{ Get {{ {}(nearVector: {{vector: {}}}, limit: {}{}) {{ {} }} }} }}",
            self.class_name(),
            vector,
            params.top_k,
            Self::document_filter(params),
            self.selected_fields("distance"),
        );
        let objects = self.graphql(query).await?;

        let mut results = Vec::new();
        for object in objects.as_array().into_iter().flatten() {
            // Cosine distance to similarity
            let distance = object["_additional"]["distance"].as_f64().unwrap_or(1.0) as f32;
            let scored = self.parse_object(object, 1.0 - distance);
            if params.accepts(scored.score) {
                results.push(scored);
            }
        }

        Ok(results)
    }

    async fn search_by_full_text_index(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        let query = format!(
            "{{ Get {{ {}(bm25: {{query: {}, properties: [{}]}}, limit: {}{}) {{ {} }} }} }}",
            self.class_name(),
            quote(query),
            quote(TEXT_PROPERTY),
            params.top_k,
            Self::document_filter(params),
            self.selected_fields("score"),
        );
        let objects = self.graphql(query).await?;

        let results: Vec<ScoredDocument> = objects
            .as_array()
            .into_iter()
            .flatten()
            .map(|object| {
                // bm25 scores come back as strings
                let score = match &object["_additional"]["score"] {
                    Value::String(s) => s.parse::<f32>().unwrap_or(0.0),
                    Value::Number(n) => n.as_f64().unwrap_or(0.0) as f32,
                    _ => 0.0,
                };
                self.parse_object(object, score)
            })
            .filter(|scored| params.accepts(scored.score))
            .collect();

        if results.is_empty() {
            warn!(class = %self.class_name(), "Full-text search returned no results");
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::{AttributeSet, DatasetId};
    use crate::infrastructure::http::{HttpMethod, MockHttpClient};

    const ENDPOINT: &str = "http://weaviate:8080";
    const CLASS: &str = "Vector_index_ds_1_Node";

    fn config(batch_size: usize) -> WeaviateConfig {
        WeaviateConfig {
            endpoint: format!("{}/", ENDPOINT),
            api_key: Some("wv-key".to_string()),
            batch_size,
        }
    }

    fn store(client: MockHttpClient, batch_size: usize) -> WeaviateVectorStore<MockHttpClient> {
        let binding = IndexBinding::new(
            CLASS,
            &DatasetId::new("ds-1").unwrap(),
            AttributeSet::default(),
        );
        WeaviateVectorStore::with_client(
            client,
            &config(batch_size),
            binding,
            Arc::new(MockEmbeddingProvider::new(3)),
        )
    }

    fn url(path: &str) -> String {
        format!("{}{}", ENDPOINT, path)
    }

    fn schema_with_class() -> Value {
        json!({"classes": [{"class": CLASS}]})
    }

    #[tokio::test]
    async fn test_create_defines_class_and_batches_objects() {
        let client = MockHttpClient::new()
            .with_response(HttpMethod::Get, url("/v1/schema"), json!({"classes": []}))
            .with_response(HttpMethod::Post, url("/v1/schema"), json!({}))
            .with_response(HttpMethod::Post, url("/v1/batch/objects"), json!([]));
        let store = store(client, 2);

        let docs = vec![
            Document::new("one").with_metadata("doc_id", "a"),
            Document::new("two").with_metadata("doc_id", "b"),
            Document::new("three").with_metadata("doc_id", "c"),
        ];
        let index_struct = store.create(docs, &AddTextsOptions::new()).await.unwrap();

        assert_eq!(index_struct.store_type, VectorStoreType::Weaviate);

        let schema = &store.client.requests_to(HttpMethod::Post, &url("/v1/schema"))[0];
        let body = schema.body.as_ref().unwrap();
        assert_eq!(body["class"], CLASS);
        assert_eq!(body["vectorizer"], "none");
        assert_eq!(schema.header("Authorization"), Some("Bearer wv-key"));

        let batches = store
            .client
            .requests_to(HttpMethod::Post, &url("/v1/batch/objects"));
        assert_eq!(batches.len(), 2);
        let first = &batches[0].body.as_ref().unwrap()["objects"][0];
        assert_eq!(first["properties"]["text"], "one");
        assert_eq!(first["properties"]["doc_id"], "a");
        assert_eq!(first["properties"]["group_id"], "ds-1");
        assert_eq!(first["vector"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_class_filters_on_whole_values() {
        let client = MockHttpClient::new()
            .with_response(HttpMethod::Get, url("/v1/schema"), json!({"classes": []}))
            .with_response(HttpMethod::Post, url("/v1/schema"), json!({}));
        let binding = IndexBinding::new(
            CLASS,
            &DatasetId::new("ds-1").unwrap(),
            AttributeSet::new(["doc_id", "document_id", "text", "group_id"]),
        );
        let store = WeaviateVectorStore::with_client(
            client,
            &config(100),
            binding,
            Arc::new(MockEmbeddingProvider::new(3)),
        );

        store.create(Vec::new(), &AddTextsOptions::new()).await.unwrap();

        let schema = &store.client.requests_to(HttpMethod::Post, &url("/v1/schema"))[0];
        let properties = schema.body.as_ref().unwrap()["properties"]
            .as_array()
            .unwrap()
            .clone();
        let names: Vec<&str> = properties
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["text", "group_id", "doc_id", "document_id"]);

        for property in &properties {
            let expected = if property["name"] == "text" {
                Value::Null
            } else {
                json!("field")
            };
            assert_eq!(property["tokenization"], expected, "{}", property["name"]);
        }
    }

    #[tokio::test]
    async fn test_batch_object_errors_surface() {
        let client = MockHttpClient::new().with_response(
            HttpMethod::Post,
            url("/v1/batch/objects"),
            json!([{"result": {"errors": {"error": [{"message": "bad vector"}]}}}]),
        );
        let store = store(client, 100);

        let err = store
            .add_texts(vec![Document::new("one")], &AddTextsOptions::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bad vector"));
    }

    #[tokio::test]
    async fn test_search_converts_distance_to_score() {
        let client = MockHttpClient::new().with_response(
            HttpMethod::Post,
            url("/v1/graphql"),
            json!({"data": {"Get": {CLASS: [
                {"text": "near", "doc_id": "a", "_additional": {"distance": 0.1}},
                {"text": "far", "doc_id": "b", "_additional": {"distance": 0.8}}
            ]}}}),
        );
        let store = store(client, 100);

        let params = SearchParams::new()
            .with_score_threshold(0.5)
            .with_document_ids(vec!["doc-9".to_string()]);
        let results = store.search("question", &params).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.page_content, "near");
        assert!((results[0].score - 0.9).abs() < 1e-6);
        assert_eq!(results[0].document.doc_id(), Some("a"));

        let query = store.client.requests()[0].body.as_ref().unwrap()["query"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(query.contains("nearVector"));
        assert!(query.contains(r#"valueTextArray: ["doc-9"]"#));
    }

    #[tokio::test]
    async fn test_full_text_search_uses_bm25() {
        let client = MockHttpClient::new().with_response(
            HttpMethod::Post,
            url("/v1/graphql"),
            json!({"data": {"Get": {CLASS: [
                {"text": "rust book", "doc_id": "a", "_additional": {"score": "1.25"}}
            ]}}}),
        );
        let store = store(client, 100);

        let results = store
            .search_by_full_text_index("rust", &SearchParams::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.25).abs() < 1e-6);

        let strict = SearchParams::new().with_score_threshold(2.0);
        let results = store.search_by_full_text_index("rust", &strict).await.unwrap();
        assert!(results.is_empty());

        let query = store.client.requests()[0].body.as_ref().unwrap()["query"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(query.contains(r#"bm25: {query: "rust""#));
    }

    #[tokio::test]
    async fn test_graphql_errors_surface() {
        let client = MockHttpClient::new()
            .with_response(HttpMethod::Get, url("/v1/schema"), schema_with_class())
            .with_response(
                HttpMethod::Post,
                url("/v1/graphql"),
                json!({"errors": [{"message": "no such class"}]}),
            );
        let store = store(client, 100);

        let err = store.text_exists("a").await.unwrap_err();
        assert!(matches!(err, DomainError::VectorStore { .. }));
        assert!(err.to_string().contains("no such class"));
    }

    #[tokio::test]
    async fn test_text_exists() {
        let client = MockHttpClient::new()
            .with_response(HttpMethod::Get, url("/v1/schema"), schema_with_class())
            .with_response(
                HttpMethod::Post,
                url("/v1/graphql"),
                json!({"data": {"Get": {CLASS: [{"doc_id": "a"}]}}}),
            );
        let store = store(client, 100);

        assert!(store.text_exists("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_group_id_matches_group_property() {
        let client = MockHttpClient::new()
            .with_response(HttpMethod::Get, url("/v1/schema"), schema_with_class())
            .with_response(HttpMethod::Delete, url("/v1/batch/objects"), json!({}));
        let store = store(client, 100);

        store.delete_by_group_id("ds-1").await.unwrap();

        let request = &store
            .client
            .requests_to(HttpMethod::Delete, &url("/v1/batch/objects"))[0];
        let filter = &request.body.as_ref().unwrap()["match"]["where"];
        assert_eq!(filter["path"], json!(["group_id"]));
        assert_eq!(filter["valueText"], "ds-1");
    }

    #[tokio::test]
    async fn test_delete_by_ids_matches_doc_ids() {
        let client = MockHttpClient::new()
            .with_response(HttpMethod::Get, url("/v1/schema"), schema_with_class())
            .with_response(HttpMethod::Delete, url("/v1/batch/objects"), json!({}));
        let store = store(client, 100);

        store
            .delete_by_ids(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        let request = &store
            .client
            .requests_to(HttpMethod::Delete, &url("/v1/batch/objects"))[0];
        let matcher = &request.body.as_ref().unwrap()["match"];
        assert_eq!(matcher["class"], CLASS);
        assert_eq!(matcher["where"]["path"], json!(["doc_id"]));
        assert_eq!(matcher["where"]["operator"], "ContainsAny");
        assert_eq!(matcher["where"]["valueTextArray"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_delete_by_ids_empty_is_noop() {
        let store = store(MockHttpClient::new(), 100);

        store.delete_by_ids(&[]).await.unwrap();
        assert!(store.client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_metadata_field_matches_exact_value() {
        let client = MockHttpClient::new()
            .with_response(HttpMethod::Get, url("/v1/schema"), schema_with_class())
            .with_response(HttpMethod::Delete, url("/v1/batch/objects"), json!({}));
        let store = store(client, 100);

        store
            .delete_by_metadata_field("document_id", "doc-1")
            .await
            .unwrap();

        let request = &store
            .client
            .requests_to(HttpMethod::Delete, &url("/v1/batch/objects"))[0];
        let filter = &request.body.as_ref().unwrap()["match"]["where"];
        assert_eq!(filter["path"], json!(["document_id"]));
        assert_eq!(filter["operator"], "Equal");
        assert_eq!(filter["valueText"], "doc-1");
    }

    #[tokio::test]
    async fn test_delete_missing_class_is_noop() {
        let client = MockHttpClient::new().with_response(
            HttpMethod::Get,
            url("/v1/schema"),
            json!({"classes": []}),
        );
        let store = store(client, 100);

        store.delete().await.unwrap();
        assert_eq!(store.client.requests().len(), 1);
    }
}
