//! Search command - queries a dataset's index and prints JSON results

use clap::Args;
use serde_json::json;

use super::context;
use crate::domain::{ScoredDocument, SearchParams};

/// Arguments for the search command
#[derive(Args, Clone)]
pub struct SearchArgs {
    /// Dataset ID
    pub dataset: String,

    /// Query text
    pub query: String,

    /// Number of results
    #[arg(long, default_value_t = 4)]
    pub top_k: usize,

    /// Drop results scoring below this value
    #[arg(long)]
    pub score_threshold: Option<f32>,

    /// Restrict to these document IDs
    #[arg(long = "document-id")]
    pub document_ids: Vec<String>,

    /// Keyword search instead of vector similarity
    #[arg(long)]
    pub full_text: bool,
}

impl SearchArgs {
    pub fn params(&self) -> SearchParams {
        let mut params = SearchParams::new().with_top_k(self.top_k);
        if let Some(threshold) = self.score_threshold {
            params = params.with_score_threshold(threshold);
        }
        if !self.document_ids.is_empty() {
            params = params.with_document_ids(self.document_ids.clone());
        }
        params
    }
}

fn render(results: &[ScoredDocument]) -> serde_json::Value {
    results
        .iter()
        .map(|r| {
            json!({
                "score": r.score,
                "page_content": r.document.page_content,
                "metadata": r.document.metadata,
            })
        })
        .collect()
}

/// Run the search command
pub async fn run(args: SearchArgs) -> anyhow::Result<()> {
    let config = context::bootstrap()?;

    let repository = context::open_repository(&config).await?;
    let dataset = context::load_dataset(&repository, &args.dataset, None).await?;
    let index = context::open_index(&config, dataset, repository, None)?;

    let params = args.params();
    let results = if args.full_text {
        index.search_by_full_text_index(&args.query, &params).await?
    } else {
        index.search(&args.query, &params).await?
    };

    println!("{}", serde_json::to_string_pretty(&render(&results))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Document;

    fn args() -> SearchArgs {
        SearchArgs {
            dataset: "ds-1".to_string(),
            query: "rust".to_string(),
            top_k: 4,
            score_threshold: None,
            document_ids: Vec::new(),
            full_text: false,
        }
    }

    #[test]
    fn test_params_defaults() {
        let params = args().params();

        assert_eq!(params.top_k, 4);
        assert!(params.score_threshold.is_none());
        assert!(params.document_ids.is_none());
    }

    #[test]
    fn test_params_with_filters() {
        let mut args = args();
        args.score_threshold = Some(0.7);
        args.document_ids = vec!["doc-1".to_string()];

        let params = args.params();
        assert_eq!(params.score_threshold, Some(0.7));
        assert_eq!(params.document_ids, Some(vec!["doc-1".to_string()]));
    }

    #[test]
    fn test_render() {
        let results = vec![ScoredDocument::new(
            Document::new("hello").with_metadata("doc_id", "a"),
            0.5,
        )];

        let rendered = render(&results);
        assert_eq!(rendered[0]["page_content"], "hello");
        assert_eq!(rendered[0]["metadata"]["doc_id"], "a");
        assert_eq!(rendered[0]["score"], 0.5);
    }
}
