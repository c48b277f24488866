//! Delete command - removes records or the whole index of a dataset

use clap::Args;
use tracing::info;

use super::context;

/// Arguments for the delete command
#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Dataset ID
    pub dataset: String,

    /// Delete every record belonging to this document
    #[arg(long, conflicts_with_all = ["ids", "group"])]
    pub document_id: Option<String>,

    /// Delete records by doc_id
    #[arg(long, value_delimiter = ',', conflicts_with = "group")]
    pub ids: Option<Vec<String>>,

    /// Delete every record of the dataset's group, keeping the index
    #[arg(long)]
    pub group: bool,
}

/// Run the delete command
pub async fn run(args: DeleteArgs) -> anyhow::Result<()> {
    let config = context::bootstrap()?;

    let repository = context::open_repository(&config).await?;
    let dataset = context::load_dataset(&repository, &args.dataset, None).await?;
    let index = context::open_index(&config, dataset, repository, None)?;

    if let Some(document_id) = &args.document_id {
        index.delete_by_document_id(document_id).await?;
        info!(document_id = %document_id, "Deleted document records");
    } else if let Some(ids) = &args.ids {
        index.delete_by_ids(ids).await?;
        info!(count = ids.len(), "Deleted records by doc_id");
    } else if args.group {
        let group_id = index.dataset().id().to_string();
        index.delete_by_group_id(&group_id).await?;
        info!(group_id = %group_id, "Deleted group records");
    } else {
        index.delete().await?;
        info!(index_name = %index.index_name(), "Deleted index");
    }

    Ok(())
}
