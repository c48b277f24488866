//! Documents stored in a vector index

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata fields attached to every stored vector record unless overridden
pub const DEFAULT_ATTRIBUTES: &[&str] = &["doc_id", "dataset_id", "document_id", "doc_hash"];

/// A text segment plus the metadata used to filter it later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// String value of a metadata field, if present and a string
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    pub fn doc_id(&self) -> Option<&str> {
        self.metadata_str("doc_id")
    }
}

/// A document returned from a similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    /// Similarity score, higher is closer
    pub score: f32,
}

impl ScoredDocument {
    pub fn new(document: Document, score: f32) -> Self {
        Self { document, score }
    }
}

/// Ordered set of metadata field names stored alongside each vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSet(Vec<String>);

impl AttributeSet {
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();

        for attribute in attributes {
            let attribute = attribute.into();
            if !names.contains(&attribute) {
                names.push(attribute);
            }
        }

        Self(names)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|a| a == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only the configured attributes of a document's metadata
    pub fn project(
        &self,
        metadata: &HashMap<String, serde_json::Value>,
    ) -> serde_json::Map<String, serde_json::Value> {
        self.iter()
            .filter_map(|name| metadata.get(name).map(|v| (name.to_string(), v.clone())))
            .collect()
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::new(DEFAULT_ATTRIBUTES.iter().copied())
    }
}
