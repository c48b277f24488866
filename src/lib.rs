//! PMP Vector Index
//!
//! Binds datasets to a vector store backend and keeps that binding:
//! - Backend selection across Weaviate, Qdrant and Milvus from configuration
//! - A dataset's recorded backend wins over configuration once its index exists
//! - One index facade forwarding search, delete and existence checks to the backend
//! - WolframAlpha tool with credential validation by probe query

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::DomainError;
pub use infrastructure::vector_store::VectorIndex;
