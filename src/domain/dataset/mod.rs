//! Dataset domain - document collections and their persisted index binding

mod entity;
mod repository;
mod validation;

pub use entity::{Dataset, DatasetId};
pub use repository::in_memory::InMemoryDatasetRepository;
pub use repository::DatasetRepository;
pub use validation::{validate_dataset_id, DatasetValidationError};

#[cfg(test)]
pub use repository::mock::MockDatasetRepository;
