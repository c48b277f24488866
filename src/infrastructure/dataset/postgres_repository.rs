//! PostgreSQL dataset repository implementation

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::domain::{Dataset, DatasetId, DatasetRepository, DomainError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS datasets (
        id VARCHAR(64) PRIMARY KEY,
        name TEXT NOT NULL,
        index_struct TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Connection pool settings
#[derive(Debug, Clone)]
pub struct PostgresPoolConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl PostgresPoolConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

/// PostgreSQL implementation of DatasetRepository
#[derive(Debug, Clone)]
pub struct PostgresDatasetRepository {
    pool: PgPool,
}

impl PostgresDatasetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and make sure the `datasets` table exists
    pub async fn connect(config: &PostgresPoolConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        let repository = Self::new(pool);
        repository.ensure_table().await?;
        Ok(repository)
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create datasets table: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl DatasetRepository for PostgresDatasetRepository {
    async fn get(&self, id: &DatasetId) -> Result<Option<Dataset>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, index_struct, created_at, updated_at
            FROM datasets
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get dataset: {}", e)))?;

        row.as_ref().map(row_to_dataset).transpose()
    }

    async fn list(&self) -> Result<Vec<Dataset>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, index_struct, created_at, updated_at
            FROM datasets
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list datasets: {}", e)))?;

        rows.iter().map(row_to_dataset).collect()
    }

    async fn create(&self, dataset: Dataset) -> Result<Dataset, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO datasets (id, name, index_struct, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(dataset.id().as_str())
        .bind(dataset.name())
        .bind(dataset.index_struct())
        .bind(dataset.created_at())
        .bind(dataset.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e.to_string()) {
                DomainError::conflict(format!("Dataset '{}' already exists", dataset.id()))
            } else {
                DomainError::storage(format!("Failed to create dataset: {}", e))
            }
        })?;

        Ok(dataset)
    }

    async fn save(&self, dataset: &Dataset) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO datasets (id, name, index_struct, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                index_struct = EXCLUDED.index_struct,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(dataset.id().as_str())
        .bind(dataset.name())
        .bind(dataset.index_struct())
        .bind(dataset.created_at())
        .bind(dataset.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to save dataset: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, id: &DatasetId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM datasets WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete dataset: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn is_unique_violation(message: &str) -> bool {
    message.contains("duplicate key") || message.contains("unique constraint")
}

fn row_to_dataset(row: &PgRow) -> Result<Dataset, DomainError> {
    let id: String = row.get("id");
    let name: String = row.get("name");
    let index_struct: Option<String> = row.get("index_struct");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    let id = DatasetId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid dataset ID in database: {}", e)))?;
    let dataset = Dataset::new(id, name)
        .map_err(|e| DomainError::storage(format!("Invalid dataset in database: {}", e)))?
        .with_timestamps(created_at, updated_at);

    Ok(match index_struct {
        Some(index_struct) => dataset.with_index_struct(index_struct),
        None => dataset,
    })
}
