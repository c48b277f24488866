use clap::Parser;
use pmp_vector_index::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Index(args) => cli::index::run(args).await,
        Command::Search(args) => cli::search::run(args).await,
        Command::Delete(args) => cli::delete::run(args).await,
        Command::ValidateTool(args) => cli::validate_tool::run(args).await,
    }
}
