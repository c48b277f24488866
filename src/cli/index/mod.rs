//! Index command - adds documents from a JSON file to a dataset

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use super::context;
use crate::domain::{AddTextsOptions, Document};

/// Arguments for the index command
#[derive(Args, Clone)]
pub struct IndexArgs {
    /// Dataset ID
    pub dataset: String,

    /// JSON file holding an array of `{"page_content": ..., "metadata": {...}}`
    #[arg(long, short)]
    pub file: PathBuf,

    /// Create the dataset with this name if it does not exist
    #[arg(long)]
    pub name: Option<String>,

    /// Skip documents whose doc_id is already indexed
    #[arg(long)]
    pub duplicate_check: bool,

    /// Metadata fields stored with each vector (defaults to doc_id, dataset_id, document_id, doc_hash)
    #[arg(long, value_delimiter = ',')]
    pub attributes: Option<Vec<String>>,
}

pub fn read_documents(raw: &str) -> anyhow::Result<Vec<Document>> {
    serde_json::from_str(raw).context("Documents file must be a JSON array of documents")
}

/// Run the index command
pub async fn run(args: IndexArgs) -> anyhow::Result<()> {
    let config = context::bootstrap()?;

    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let documents = read_documents(&raw)?;
    let count = documents.len();

    let repository = context::open_repository(&config).await?;
    let dataset = context::load_dataset(&repository, &args.dataset, args.name.as_deref()).await?;
    let mut index = context::open_index(&config, dataset, repository, args.attributes)?;

    let options = AddTextsOptions::new().with_duplicate_check(args.duplicate_check);
    index.add_texts(documents, &options).await?;

    info!(
        dataset_id = %index.dataset().id(),
        store_type = %index.provider_type(),
        index_name = %index.index_name(),
        documents = count,
        "Indexed documents"
    );
    println!("Indexed {} documents into {}", count, index.index_name());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_documents() {
        let raw = r#"[
            {"page_content": "first", "metadata": {"doc_id": "a", "document_id": "doc-1"}},
            {"page_content": "second"}
        ]"#;

        let documents = read_documents(raw).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].doc_id(), Some("a"));
        assert!(documents[1].metadata.is_empty());
    }

    #[test]
    fn test_read_documents_rejects_object() {
        assert!(read_documents(r#"{"page_content": "x"}"#).is_err());
    }
}
