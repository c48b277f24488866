//! Persisted snapshot of a backend's addressing information

use serde::{Deserialize, Serialize};

use super::store_type::VectorStoreType;
use crate::domain::DomainError;

/// Backend-side location of a dataset's vectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorStoreLocation {
    /// Class (Weaviate) or collection (Qdrant, Milvus) name
    pub class_prefix: String,
}

/// Structural descriptor written onto a dataset after its index is first created.
///
/// The serialized form is `{"type": "qdrant", "vector_store": {"class_prefix": "..."}}`
/// and is what lets a restarted process reconnect to the same backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStruct {
    #[serde(rename = "type")]
    pub store_type: VectorStoreType,
    pub vector_store: VectorStoreLocation,
}

impl IndexStruct {
    pub fn new(store_type: VectorStoreType, class_prefix: impl Into<String>) -> Self {
        Self {
            store_type,
            vector_store: VectorStoreLocation {
                class_prefix: class_prefix.into(),
            },
        }
    }

    pub fn class_prefix(&self) -> &str {
        &self.vector_store.class_prefix
    }

    /// Serialize to the textual form stored on the dataset
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self)
            .map_err(|e| DomainError::internal(format!("Failed to serialize index struct: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let index_struct = IndexStruct::new(VectorStoreType::Weaviate, "Vector_index_abc_Node");
        let value: serde_json::Value =
            serde_json::from_str(&index_struct.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "weaviate");
        assert_eq!(value["vector_store"]["class_prefix"], "Vector_index_abc_Node");
    }
}
