//! Vector store domain - backend selection types and the capability interface

mod config;
mod document;
mod index_struct;
mod provider;
mod store_type;

pub use config::{
    BackendConfig, MilvusConfig, QdrantConfig, QdrantEndpoint, VectorStoreConfig, WeaviateConfig,
    BACKEND_CONFIG_KEYS, VECTOR_STORE_KEY,
};
pub use document::{AttributeSet, Document, ScoredDocument, DEFAULT_ATTRIBUTES};
pub use index_struct::{IndexStruct, VectorStoreLocation};
pub use provider::{AddTextsOptions, SearchParams, VectorStoreProvider};
pub use store_type::VectorStoreType;

#[cfg(test)]
pub use provider::mock::{MockCalls, MockVectorStoreProvider};
