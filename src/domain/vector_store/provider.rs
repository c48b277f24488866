//! Vector store capability interface

use std::fmt::Debug;

use async_trait::async_trait;

use super::document::{Document, ScoredDocument};
use super::index_struct::IndexStruct;
use super::store_type::VectorStoreType;
use crate::domain::DomainError;

/// Options forwarded with `create` / `add_texts`
#[derive(Debug, Clone, Default)]
pub struct AddTextsOptions {
    /// Skip documents whose `doc_id` is already stored (incremental adds only)
    pub duplicate_check: bool,
}

impl AddTextsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_check(mut self, duplicate_check: bool) -> Self {
        self.duplicate_check = duplicate_check;
        self
    }
}

/// Search parameters for similarity and full-text queries
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Number of results to return
    pub top_k: usize,
    /// Drop results scoring below this value
    pub score_threshold: Option<f32>,
    /// Restrict results to these `document_id` values
    pub document_ids: Option<Vec<String>>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: None,
            document_ids: None,
        }
    }
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    pub fn with_document_ids(mut self, ids: Vec<String>) -> Self {
        self.document_ids = Some(ids);
        self
    }

    /// Whether a score passes the configured threshold
    pub fn accepts(&self, score: f32) -> bool {
        self.score_threshold.is_none_or(|t| score >= t)
    }
}

/// Operations every vector store backend exposes to the index facade.
///
/// The facade dereferences to this trait, so callers reach queries, deletes and
/// existence checks on the selected backend directly. Capabilities only some
/// backends have come with a default body that reports
/// [`DomainError::UnsupportedCapability`].
#[async_trait]
pub trait VectorStoreProvider: Send + Sync + Debug {
    /// Backend this provider talks to
    fn provider_type(&self) -> VectorStoreType;

    /// Class or collection name holding this dataset's vectors
    fn index_name(&self) -> &str;

    /// Snapshot needed to reconnect to this index later
    fn to_index_struct(&self) -> IndexStruct {
        IndexStruct::new(self.provider_type(), self.index_name())
    }

    /// Provision backend storage and insert the first batch of documents
    async fn create(
        &self,
        documents: Vec<Document>,
        options: &AddTextsOptions,
    ) -> Result<IndexStruct, DomainError>;

    /// Insert documents into an already provisioned index
    async fn add_texts(
        &self,
        documents: Vec<Document>,
        options: &AddTextsOptions,
    ) -> Result<(), DomainError>;

    /// Whether a record with the given `doc_id` is stored
    async fn text_exists(&self, doc_id: &str) -> Result<bool, DomainError>;

    /// Delete records by `doc_id`
    async fn delete_by_ids(&self, ids: &[String]) -> Result<(), DomainError>;

    /// Delete records where a metadata field equals a value
    async fn delete_by_metadata_field(&self, key: &str, value: &str) -> Result<(), DomainError>;

    async fn delete_by_document_id(&self, document_id: &str) -> Result<(), DomainError> {
        self.delete_by_metadata_field("document_id", document_id)
            .await
    }

    async fn delete_by_group_id(&self, _group_id: &str) -> Result<(), DomainError> {
        Err(DomainError::unsupported_capability(
            self.provider_type().as_str(),
            "delete_by_group_id",
        ))
    }

    /// Drop the whole index
    async fn delete(&self) -> Result<(), DomainError>;

    /// Vector similarity search
    async fn search(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<ScoredDocument>, DomainError>;

    /// Keyword search over stored text
    async fn search_by_full_text_index(
        &self,
        _query: &str,
        _params: &SearchParams,
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        Err(DomainError::unsupported_capability(
            self.provider_type().as_str(),
            "search_by_full_text_index",
        ))
    }
}
