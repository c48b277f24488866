//! Dataset repository implementations

mod postgres_repository;

pub use postgres_repository::{PostgresDatasetRepository, PostgresPoolConfig};
