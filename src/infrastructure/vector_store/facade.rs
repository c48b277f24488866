//! Dataset index facade: picks a backend and exposes it behind one interface

use std::ops::Deref;
use std::sync::Arc;

use tracing::{debug, error, info};

use super::{IndexBinding, VectorStoreFactory};
use crate::domain::{
    AddTextsOptions, AttributeSet, BackendConfig, Dataset, DatasetRepository, Document,
    DomainError, EmbeddingProvider, VectorStoreConfig, VectorStoreProvider, VectorStoreType,
};

/// Resolve which backend a dataset uses.
///
/// A type recorded on the dataset wins over the configured `VECTOR_STORE`, so
/// a dataset stays bound to the backend it was created on.
pub fn select_store_type(
    dataset: &Dataset,
    config: &BackendConfig,
) -> Result<VectorStoreType, DomainError> {
    let recorded = dataset.recorded_store_type()?;
    let candidate = recorded.as_deref().or(config.vector_store());

    match candidate {
        Some(store_type) => store_type.parse(),
        None => Err(DomainError::configuration("Vector store must be specified.")),
    }
}

/// Vector index of one dataset.
///
/// Dereferences to the selected [`VectorStoreProvider`], so searches, deletes
/// and existence checks go straight to the backend. Only `add_texts` is handled
/// here, because the first insert also records the index on the dataset.
#[derive(Debug)]
pub struct VectorIndex {
    dataset: Dataset,
    repository: Arc<dyn DatasetRepository>,
    attributes: AttributeSet,
    provider: Box<dyn VectorStoreProvider>,
}

impl VectorIndex {
    /// Select and initialize the backend for `dataset`.
    ///
    /// No network calls are made here; backends connect lazily on first use.
    pub fn new(
        dataset: Dataset,
        repository: Arc<dyn DatasetRepository>,
        config: &BackendConfig,
        embeddings: Arc<dyn EmbeddingProvider>,
        attributes: Option<AttributeSet>,
    ) -> Result<Self, DomainError> {
        let attributes = attributes.unwrap_or_default();
        let store_type = select_store_type(&dataset, config)?;
        let store_config = VectorStoreConfig::resolve(store_type, config)?;

        let binding = IndexBinding::new(dataset.index_name()?, dataset.id(), attributes.clone());
        let provider = VectorStoreFactory::create(&store_config, binding, embeddings)?;

        debug!(
            dataset_id = %dataset.id(),
            store_type = %store_type,
            index_name = %provider.index_name(),
            "Initialized vector index"
        );

        Ok(Self::with_provider(dataset, repository, provider, attributes))
    }

    /// Wrap an already constructed backend
    pub fn with_provider(
        dataset: Dataset,
        repository: Arc<dyn DatasetRepository>,
        provider: Box<dyn VectorStoreProvider>,
        attributes: AttributeSet,
    ) -> Self {
        Self {
            dataset,
            repository,
            attributes,
            provider,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Insert documents, provisioning the backend index on first use.
    ///
    /// The first call creates the backend index, records its structure on the
    /// dataset and commits the dataset once. A failed commit leaves the
    /// backend index in place.
    pub async fn add_texts(
        &mut self,
        documents: Vec<Document>,
        options: &AddTextsOptions,
    ) -> Result<(), DomainError> {
        if self.dataset.has_index_struct()? {
            let documents = self.filter_duplicates(documents, options).await?;
            if documents.is_empty() {
                debug!(dataset_id = %self.dataset.id(), "No new documents to add");
                return Ok(());
            }
            return self.provider.add_texts(documents, options).await;
        }

        let count = documents.len();
        let index_struct = self.provider.create(documents, options).await?;

        let mut dataset = self.dataset.clone();
        dataset.set_index_struct(&index_struct)?;

        if let Err(e) = self.repository.save(&dataset).await {
            error!(
                dataset_id = %dataset.id(),
                store_type = %index_struct.store_type,
                index_name = %index_struct.class_prefix(),
                error = %e,
                "Backend index created but dataset commit failed"
            );
            return Err(e);
        }

        self.dataset = dataset;

        info!(
            dataset_id = %self.dataset.id(),
            store_type = %index_struct.store_type,
            documents = count,
            "Created vector index"
        );
        Ok(())
    }

    async fn filter_duplicates(
        &self,
        documents: Vec<Document>,
        options: &AddTextsOptions,
    ) -> Result<Vec<Document>, DomainError> {
        if !options.duplicate_check {
            return Ok(documents);
        }

        let mut kept = Vec::with_capacity(documents.len());
        for document in documents {
            let exists = match document.doc_id() {
                Some(doc_id) => self.provider.text_exists(doc_id).await?,
                None => false,
            };
            if !exists {
                kept.push(document);
            }
        }
        Ok(kept)
    }
}

impl Deref for VectorIndex {
    type Target = dyn VectorStoreProvider;

    fn deref(&self) -> &Self::Target {
        self.provider.as_ref()
    }
}
