//! CLI module for the vector index
//!
//! Subcommands:
//! - `index`: add documents from a JSON file to a dataset's index
//! - `search`: query a dataset's index
//! - `delete`: remove records or the whole index
//! - `validate-tool`: probe WolframAlpha credentials

mod context;
pub mod delete;
pub mod index;
pub mod search;
pub mod validate_tool;

use clap::{Parser, Subcommand};

/// Dataset vector index over Weaviate, Qdrant and Milvus
#[derive(Parser)]
#[command(name = "pmp-vector-index")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add documents to a dataset, creating its index on first use
    Index(index::IndexArgs),

    /// Similarity or full-text search over a dataset
    Search(search::SearchArgs),

    /// Delete records from a dataset's index, or the index itself
    Delete(delete::DeleteArgs),

    /// Validate WolframAlpha credentials with a probe query
    ValidateTool(validate_tool::ValidateToolArgs),
}
