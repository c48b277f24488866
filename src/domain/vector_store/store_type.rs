//! Supported vector store backends

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Closed set of vector store backends a dataset can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreType {
    /// Weaviate schema-based search engine
    Weaviate,
    /// Qdrant vector similarity engine with payload filtering
    Qdrant,
    /// Milvus vector database
    Milvus,
}

impl VectorStoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weaviate => "weaviate",
            Self::Qdrant => "qdrant",
            Self::Milvus => "milvus",
        }
    }
}

impl fmt::Display for VectorStoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VectorStoreType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weaviate" => Ok(Self::Weaviate),
            "qdrant" => Ok(Self::Qdrant),
            "milvus" => Ok(Self::Milvus),
            _ => Err(DomainError::configuration(format!(
                "Vector store {} is not supported.",
                s
            ))),
        }
    }
}
