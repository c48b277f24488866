//! Dataset entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_dataset_id, validate_dataset_name, DatasetValidationError};
use crate::domain::vector_store::IndexStruct;
use crate::domain::DomainError;

/// Dataset identifier - alphanumeric + hyphens, max 64 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(id: impl Into<String>) -> Result<Self, DatasetValidationError> {
        let id = id.into();
        validate_dataset_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DatasetId {
    type Error = DatasetValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DatasetId> for String {
    fn from(id: DatasetId) -> Self {
        id.0
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A logical collection of documents and its derived vector index.
///
/// `index_struct` holds the serialized [`IndexStruct`] written the first time the
/// index is created. Once present it pins the dataset to that backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    id: DatasetId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index_struct: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(id: DatasetId, name: impl Into<String>) -> Result<Self, DatasetValidationError> {
        let name = name.into();
        validate_dataset_name(&name)?;

        let now = Utc::now();
        Ok(Self {
            id,
            name,
            index_struct: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Set the raw serialized index structure (as loaded from storage)
    pub fn with_index_struct(mut self, index_struct: impl Into<String>) -> Self {
        self.index_struct = Some(index_struct.into());
        self
    }

    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    pub fn id(&self) -> &DatasetId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index_struct(&self) -> Option<&str> {
        self.index_struct.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Parsed index structure; `None` when absent, blank or an empty object
    pub fn index_struct_dict(
        &self,
    ) -> Result<Option<serde_json::Map<String, serde_json::Value>>, DomainError> {
        let raw = match self.index_struct.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
            DomainError::validation(format!(
                "Index struct of dataset '{}' is not valid JSON: {}",
                self.id, e
            ))
        })?;

        match value {
            serde_json::Value::Object(map) if map.is_empty() => Ok(None),
            serde_json::Value::Object(map) => Ok(Some(map)),
            serde_json::Value::Null => Ok(None),
            _ => Err(DomainError::validation(format!(
                "Index struct of dataset '{}' must be a JSON object",
                self.id
            ))),
        }
    }

    pub fn has_index_struct(&self) -> Result<bool, DomainError> {
        Ok(self.index_struct_dict()?.is_some())
    }

    /// Backend type recorded when the index was first created
    pub fn recorded_store_type(&self) -> Result<Option<String>, DomainError> {
        let Some(dict) = self.index_struct_dict()? else {
            return Ok(None);
        };

        dict.get("type")
            .and_then(|t| t.as_str())
            .map(|t| Some(t.to_string()))
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "Index struct of dataset '{}' does not record a vector store type",
                    self.id
                ))
            })
    }

    /// Class or collection name for this dataset's vectors.
    ///
    /// Reuses the recorded name when the index already exists so a restarted
    /// process reconnects to the same backend object.
    pub fn index_name(&self) -> Result<String, DomainError> {
        let recorded = self.index_struct_dict()?.and_then(|dict| {
            dict.get("vector_store")
                .and_then(|vs| vs.get("class_prefix"))
                .and_then(|p| p.as_str())
                .map(str::to_string)
        });

        Ok(recorded.unwrap_or_else(|| Self::gen_index_name(&self.id)))
    }

    /// `Vector_index_<id with '-' replaced by '_'>_Node`
    pub fn gen_index_name(id: &DatasetId) -> String {
        format!("Vector_index_{}_Node", id.as_str().replace('-', "_"))
    }

    /// Record the index structure produced by the backend's first create
    pub fn set_index_struct(&mut self, index_struct: &IndexStruct) -> Result<(), DomainError> {
        self.index_struct = Some(index_struct.to_json()?);
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vector_store::VectorStoreType;

    fn dataset() -> Dataset {
        Dataset::new(DatasetId::new("ds-1").unwrap(), "Docs").unwrap()
    }

    #[test]
    fn test_new_dataset_has_no_index_struct() {
        let ds = dataset();

        assert!(ds.index_struct().is_none());
        assert!(!ds.has_index_struct().unwrap());
        assert_eq!(ds.recorded_store_type().unwrap(), None);
    }

    #[test]
    fn test_blank_and_empty_object_count_as_absent() {
        assert!(!dataset().with_index_struct("").has_index_struct().unwrap());
        assert!(!dataset().with_index_struct("{}").has_index_struct().unwrap());
        assert!(!dataset().with_index_struct("null").has_index_struct().unwrap());
    }

    #[test]
    fn test_invalid_json_index_struct() {
        let ds = dataset().with_index_struct("not json");
        assert!(matches!(
            ds.index_struct_dict(),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_set_index_struct_round_trips_type_and_name() {
        let mut ds = dataset();
        ds.set_index_struct(&IndexStruct::new(VectorStoreType::Qdrant, "Vector_index_ds_1_Node"))
            .unwrap();

        assert_eq!(ds.recorded_store_type().unwrap().as_deref(), Some("qdrant"));
        assert_eq!(ds.index_name().unwrap(), "Vector_index_ds_1_Node");
    }

    #[test]
    fn test_recorded_index_name_wins_over_generated() {
        let ds = dataset()
            .with_index_struct(r#"{"type":"weaviate","vector_store":{"class_prefix":"Legacy_Class"}}"#);

        assert_eq!(ds.index_name().unwrap(), "Legacy_Class");
    }

    #[test]
    fn test_generated_index_name() {
        let id = DatasetId::new("0b7f8c4e-2f3a").unwrap();
        assert_eq!(Dataset::gen_index_name(&id), "Vector_index_0b7f8c4e_2f3a_Node");
    }

    #[test]
    fn test_index_struct_without_type() {
        let ds = dataset().with_index_struct(r#"{"vector_store":{"class_prefix":"X"}}"#);
        assert!(matches!(
            ds.recorded_store_type(),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_dataset_id_serde_validates() {
        let result: Result<DatasetId, _> = serde_json::from_str("\"bad_id\"");
        assert!(result.is_err());
    }
}
