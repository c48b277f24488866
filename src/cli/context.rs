//! Wiring shared by the subcommands

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::{AppConfig, StorageBackend};
use crate::domain::{
    AttributeSet, Dataset, DatasetId, DatasetRepository, EmbeddingProvider,
    InMemoryDatasetRepository,
};
use crate::infrastructure::dataset::{PostgresDatasetRepository, PostgresPoolConfig};
use crate::infrastructure::embedding::OpenAiEmbeddingProvider;
use crate::infrastructure::http::HttpClient;
use crate::infrastructure::logging;
use crate::infrastructure::vector_store::VectorIndex;

/// Load `.env`, configuration and logging
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging).context("Failed to initialize logging")?;
    Ok(config)
}

pub async fn open_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn DatasetRepository>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory dataset storage; index bindings are lost on exit");
            Ok(Arc::new(InMemoryDatasetRepository::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for postgres storage")?;
            let pool = PostgresPoolConfig::new(url).with_max_connections(config.storage.max_connections);

            info!("Connecting to PostgreSQL...");
            let repository = PostgresDatasetRepository::connect(&pool).await?;
            Ok(Arc::new(repository))
        }
    }
}

pub fn embeddings(config: &AppConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let embedding = &config.embedding;
    let api_key = embedding
        .api_key
        .as_deref()
        .context("OPENAI_API_KEY must be set")?;

    let provider = match &embedding.base_url {
        Some(base_url) => OpenAiEmbeddingProvider::with_base_url(HttpClient::new(), api_key, base_url),
        None => OpenAiEmbeddingProvider::new(HttpClient::new(), api_key),
    };
    let provider = match &embedding.model {
        Some(model) => provider.with_model(model.clone(), embedding.dimensions)?,
        None => provider,
    };

    Ok(Arc::new(provider))
}

/// Fetch a dataset, creating it when `create_name` is given and it does not exist
pub async fn load_dataset(
    repository: &Arc<dyn DatasetRepository>,
    id: &str,
    create_name: Option<&str>,
) -> anyhow::Result<Dataset> {
    let id = DatasetId::new(id)?;

    if let Some(dataset) = repository.get(&id).await? {
        return Ok(dataset);
    }

    match create_name {
        Some(name) => {
            let dataset = repository.create(Dataset::new(id, name)?).await?;
            info!(dataset_id = %dataset.id(), "Created dataset");
            Ok(dataset)
        }
        None => anyhow::bail!("Dataset '{}' not found", id),
    }
}

/// Build the index facade for a dataset from the loaded configuration
pub fn open_index(
    config: &AppConfig,
    dataset: Dataset,
    repository: Arc<dyn DatasetRepository>,
    attributes: Option<Vec<String>>,
) -> anyhow::Result<VectorIndex> {
    let backend = config.backend_config(std::env::vars());
    let index = VectorIndex::new(
        dataset,
        repository,
        &backend,
        embeddings(config)?,
        attributes.map(AttributeSet::new),
    )?;
    Ok(index)
}
