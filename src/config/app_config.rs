use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::BackendConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Backend keys from the `[vector_store]` table; the process environment wins
    #[serde(default)]
    pub vector_store: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Where datasets are persisted
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// OpenAI-compatible embeddings endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddingConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub dimensions: Option<usize>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        Ok(config.with_env(std::env::vars()))
    }

    /// Fill unset values from the conventional unprefixed variables
    /// (`OPENAI_API_KEY`, `OPENAI_BASE_URL`, `EMBEDDING_MODEL`, `DATABASE_URL`)
    pub fn with_env<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if value.trim().is_empty() {
                continue;
            }
            let slot = match key.as_str() {
                "OPENAI_API_KEY" => &mut self.embedding.api_key,
                "OPENAI_BASE_URL" => &mut self.embedding.base_url,
                "EMBEDDING_MODEL" => &mut self.embedding.model,
                "DATABASE_URL" => &mut self.storage.database_url,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        self
    }

    /// Backend configuration: the `[vector_store]` table overlaid with the
    /// backend keys present in `vars`
    pub fn backend_config<I>(&self, vars: I) -> BackendConfig
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let from_file = BackendConfig::from_vars(
            self.vector_store
                .iter()
                .map(|(k, v)| (k.to_uppercase(), v.clone())),
        );
        from_file.merge(BackendConfig::from_vars(vars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.max_connections, 5);
        assert!(config.embedding.api_key.is_none());
    }

    #[test]
    fn test_with_env_fills_unset_values_only() {
        let mut config = AppConfig::default();
        config.embedding.model = Some("text-embedding-3-large".to_string());

        let config = config.with_env(vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("EMBEDDING_MODEL", "text-embedding-ada-002"),
            ("DATABASE_URL", "postgres://localhost/db"),
            ("OPENAI_BASE_URL", " "),
        ]));

        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.embedding.model.as_deref(), Some("text-embedding-3-large"));
        assert_eq!(config.storage.database_url.as_deref(), Some("postgres://localhost/db"));
        assert!(config.embedding.base_url.is_none());
    }

    #[test]
    fn test_backend_config_env_overrides_file() {
        let mut config = AppConfig::default();
        config
            .vector_store
            .insert("vector_store".to_string(), "weaviate".to_string());
        config
            .vector_store
            .insert("weaviate_endpoint".to_string(), "http://weaviate:8080".to_string());

        let backend = config.backend_config(vars(&[("VECTOR_STORE", "qdrant"), ("PATH", "/bin")]));

        assert_eq!(backend.vector_store(), Some("qdrant"));
        assert_eq!(backend.get("WEAVIATE_ENDPOINT"), Some("http://weaviate:8080"));
        assert_eq!(backend.get("PATH"), None);
    }

    #[test]
    fn test_deserialize_from_toml_source() {
        let source = r#"
            [logging]
            level = "debug"
            format = "json"

            [storage]
            backend = "postgres"
            database_url = "postgres://localhost/datasets"

            [vector_store]
            VECTOR_STORE = "milvus"
            MILVUS_HOST = "localhost"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);

        let backend = config.backend_config(Vec::new());
        assert_eq!(backend.vector_store(), Some("milvus"));
        assert_eq!(backend.get("MILVUS_HOST"), Some("localhost"));
    }
}
