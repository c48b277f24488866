//! Dataset repository trait

use async_trait::async_trait;

use super::{Dataset, DatasetId};
use crate::domain::DomainError;

/// Persistence for datasets.
///
/// `save` is the commit primitive: it upserts the dataset and returns once the
/// write is durable.
#[async_trait]
pub trait DatasetRepository: Send + Sync + std::fmt::Debug {
    async fn get(&self, id: &DatasetId) -> Result<Option<Dataset>, DomainError>;

    async fn list(&self) -> Result<Vec<Dataset>, DomainError>;

    /// Create a new dataset, failing if the ID is taken
    async fn create(&self, dataset: Dataset) -> Result<Dataset, DomainError>;

    /// Insert or update a dataset
    async fn save(&self, dataset: &Dataset) -> Result<(), DomainError>;

    async fn delete(&self, id: &DatasetId) -> Result<bool, DomainError>;
}

/// In-memory implementation of DatasetRepository
pub mod in_memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Data is lost when the process exits
    #[derive(Debug, Default)]
    pub struct InMemoryDatasetRepository {
        datasets: RwLock<HashMap<String, Dataset>>,
    }

    impl InMemoryDatasetRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a dataset, failing if the lock is poisoned
        pub fn with_dataset(self, dataset: Dataset) -> Result<Self, DomainError> {
            self.datasets
                .write()
                .map_err(lock_error)?
                .insert(dataset.id().to_string(), dataset);
            Ok(self)
        }
    }

    fn lock_error(e: impl std::fmt::Display) -> DomainError {
        DomainError::storage(format!("Failed to acquire dataset lock: {}", e))
    }

    #[async_trait]
    impl DatasetRepository for InMemoryDatasetRepository {
        async fn get(&self, id: &DatasetId) -> Result<Option<Dataset>, DomainError> {
            let datasets = self.datasets.read().map_err(lock_error)?;
            Ok(datasets.get(id.as_str()).cloned())
        }

        async fn list(&self) -> Result<Vec<Dataset>, DomainError> {
            let datasets = self.datasets.read().map_err(lock_error)?;
            let mut list: Vec<Dataset> = datasets.values().cloned().collect();
            list.sort_by_key(|d| d.created_at());
            Ok(list)
        }

        async fn create(&self, dataset: Dataset) -> Result<Dataset, DomainError> {
            let mut datasets = self.datasets.write().map_err(lock_error)?;
            let id = dataset.id().to_string();

            if datasets.contains_key(&id) {
                return Err(DomainError::conflict(format!(
                    "Dataset '{}' already exists",
                    id
                )));
            }

            datasets.insert(id, dataset.clone());
            Ok(dataset)
        }

        async fn save(&self, dataset: &Dataset) -> Result<(), DomainError> {
            let mut datasets = self.datasets.write().map_err(lock_error)?;
            datasets.insert(dataset.id().to_string(), dataset.clone());
            Ok(())
        }

        async fn delete(&self, id: &DatasetId) -> Result<bool, DomainError> {
            let mut datasets = self.datasets.write().map_err(lock_error)?;
            Ok(datasets.remove(id.as_str()).is_some())
        }
    }

}
