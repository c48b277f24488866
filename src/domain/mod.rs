//! Domain layer - Core entities, traits and errors

pub mod dataset;
pub mod embedding;
pub mod error;
pub mod tool;
pub mod vector_store;

pub use dataset::{Dataset, DatasetId, DatasetRepository, InMemoryDatasetRepository};
pub use embedding::EmbeddingProvider;
pub use error::DomainError;
pub use tool::{Tool, ToolCredentials, ToolInvokeMessage, ToolProviderController, ToolRuntime};
pub use vector_store::{
    AddTextsOptions, AttributeSet, BackendConfig, Document, IndexStruct, ScoredDocument,
    SearchParams, VectorStoreConfig, VectorStoreProvider, VectorStoreType, DEFAULT_ATTRIBUTES,
};
