//! Backend configuration: the raw key/value mapping and the typed per-backend shapes

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use super::store_type::VectorStoreType;
use crate::domain::DomainError;

pub const VECTOR_STORE_KEY: &str = "VECTOR_STORE";

/// Keys read from the process environment into a [`BackendConfig`]
pub const BACKEND_CONFIG_KEYS: &[&str] = &[
    VECTOR_STORE_KEY,
    "WEAVIATE_ENDPOINT",
    "WEAVIATE_API_KEY",
    "WEAVIATE_BATCH_SIZE",
    "QDRANT_URL",
    "QDRANT_API_KEY",
    "QDRANT_ROOT_PATH",
    "QDRANT_CLIENT_TIMEOUT",
    "MILVUS_HOST",
    "MILVUS_PORT",
    "MILVUS_USER",
    "MILVUS_PASSWORD",
    "MILVUS_SECURE",
];

const DEFAULT_WEAVIATE_BATCH_SIZE: usize = 100;
const DEFAULT_QDRANT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_MILVUS_PORT: u16 = 19530;

/// Opaque configuration mapping scoped to the vector store backends.
///
/// Blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct BackendConfig(HashMap<String, String>);

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Collect the known backend keys out of a variable iterator (e.g. `std::env::vars()`)
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self(
            vars.into_iter()
                .filter(|(key, _)| BACKEND_CONFIG_KEYS.contains(&key.as_str()))
                .collect(),
        )
    }

    /// Overlay `other` on top of this mapping; keys in `other` win
    pub fn merge(mut self, other: BackendConfig) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, DomainError> {
        self.get(key)
            .ok_or_else(|| DomainError::configuration(format!("{} must be set", key)))
    }

    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, DomainError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| {
                    DomainError::configuration(format!("Invalid value '{}' for {}: {}", raw, key, e))
                })
            })
            .transpose()
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, DomainError> {
        self.get(key)
            .map(|raw| match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(DomainError::configuration(format!(
                    "Invalid boolean '{}' for {}",
                    raw, key
                ))),
            })
            .transpose()
    }

    /// Backend type requested by configuration
    pub fn vector_store(&self) -> Option<&str> {
        self.get(VECTOR_STORE_KEY)
    }
}

/// Weaviate connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaviateConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub batch_size: usize,
}

impl WeaviateConfig {
    pub fn from_backend_config(config: &BackendConfig) -> Result<Self, DomainError> {
        let batch_size = config
            .get_parsed::<usize>("WEAVIATE_BATCH_SIZE")?
            .unwrap_or(DEFAULT_WEAVIATE_BATCH_SIZE);

        if batch_size == 0 {
            return Err(DomainError::configuration(
                "WEAVIATE_BATCH_SIZE must be greater than zero",
            ));
        }

        Ok(Self {
            endpoint: config.require("WEAVIATE_ENDPOINT")?.to_string(),
            api_key: config.get("WEAVIATE_API_KEY").map(str::to_string),
            batch_size,
        })
    }
}

/// Where a Qdrant index lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QdrantEndpoint {
    /// Remote server reached over HTTP
    Url(String),
    /// Local on-disk storage (`path:` prefix), resolved against the root path
    Local(PathBuf),
}

/// Qdrant connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QdrantConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub root_path: PathBuf,
    pub timeout: Duration,
}

impl QdrantConfig {
    pub fn from_backend_config(config: &BackendConfig) -> Result<Self, DomainError> {
        let timeout = config
            .get_parsed::<f64>("QDRANT_CLIENT_TIMEOUT")?
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|e| {
                    DomainError::configuration(format!("Invalid QDRANT_CLIENT_TIMEOUT: {}", e))
                })
            })
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_QDRANT_TIMEOUT_SECS));

        Ok(Self {
            endpoint: config.require("QDRANT_URL")?.to_string(),
            api_key: config.get("QDRANT_API_KEY").map(str::to_string),
            root_path: PathBuf::from(config.get("QDRANT_ROOT_PATH").unwrap_or(".")),
            timeout,
        })
    }

    pub fn resolve_endpoint(&self) -> QdrantEndpoint {
        match self.endpoint.strip_prefix("path:") {
            Some(path) => {
                let path = Path::new(path);
                if path.is_absolute() {
                    QdrantEndpoint::Local(path.to_path_buf())
                } else {
                    QdrantEndpoint::Local(self.root_path.join(path))
                }
            }
            None => QdrantEndpoint::Url(self.endpoint.clone()),
        }
    }
}

/// Milvus connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilvusConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub secure: bool,
}

impl MilvusConfig {
    pub fn from_backend_config(config: &BackendConfig) -> Result<Self, DomainError> {
        Ok(Self {
            host: config.require("MILVUS_HOST")?.to_string(),
            port: config
                .get_parsed::<u16>("MILVUS_PORT")?
                .unwrap_or(DEFAULT_MILVUS_PORT),
            user: config.get("MILVUS_USER").map(str::to_string),
            password: config.get("MILVUS_PASSWORD").map(str::to_string),
            secure: config.get_bool("MILVUS_SECURE")?.unwrap_or(false),
        })
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Bearer token in Milvus' `user:password` form
    pub fn token(&self) -> Option<String> {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some(format!("{}:{}", user, password)),
            (Some(user), None) => Some(format!("{}:", user)),
            _ => None,
        }
    }
}

/// Typed backend configuration, one variant per supported vector store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorStoreConfig {
    Weaviate(WeaviateConfig),
    Qdrant(QdrantConfig),
    Milvus(MilvusConfig),
}

impl VectorStoreConfig {
    /// Extract the nested configuration for `store_type` from the raw mapping
    pub fn resolve(store_type: VectorStoreType, config: &BackendConfig) -> Result<Self, DomainError> {
        match store_type {
            VectorStoreType::Weaviate => {
                WeaviateConfig::from_backend_config(config).map(Self::Weaviate)
            }
            VectorStoreType::Qdrant => QdrantConfig::from_backend_config(config).map(Self::Qdrant),
            VectorStoreType::Milvus => MilvusConfig::from_backend_config(config).map(Self::Milvus),
        }
    }

    pub fn store_type(&self) -> VectorStoreType {
        match self {
            Self::Weaviate(_) => VectorStoreType::Weaviate,
            Self::Qdrant(_) => VectorStoreType::Qdrant,
            Self::Milvus(_) => VectorStoreType::Milvus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_keeps_only_backend_keys() {
        let config = BackendConfig::from_vars(vec![
            ("VECTOR_STORE".to_string(), "qdrant".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ]);

        assert_eq!(config.vector_store(), Some("qdrant"));
        assert_eq!(config.get("HOME"), None);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let config = BackendConfig::new().with("VECTOR_STORE", "  ");
        assert_eq!(config.vector_store(), None);
    }

    #[test]
    fn test_weaviate_config_defaults_batch_size() {
        let config = BackendConfig::new().with("WEAVIATE_ENDPOINT", "http://localhost:8080");
        let weaviate = WeaviateConfig::from_backend_config(&config).unwrap();

        assert_eq!(weaviate.batch_size, 100);
        assert_eq!(weaviate.api_key, None);
    }

    #[test]
    fn test_weaviate_config_rejects_bad_batch_size() {
        let config = BackendConfig::new()
            .with("WEAVIATE_ENDPOINT", "http://localhost:8080")
            .with("WEAVIATE_BATCH_SIZE", "lots");

        let err = WeaviateConfig::from_backend_config(&config).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
        assert!(err.to_string().contains("WEAVIATE_BATCH_SIZE"));
    }

    #[test]
    fn test_weaviate_config_requires_endpoint() {
        let err = WeaviateConfig::from_backend_config(&BackendConfig::new()).unwrap_err();
        assert!(err.to_string().contains("WEAVIATE_ENDPOINT"));
    }

    #[test]
    fn test_qdrant_config_timeout_and_local_path() {
        let config = BackendConfig::new()
            .with("QDRANT_URL", "path:storage/qdrant")
            .with("QDRANT_ROOT_PATH", "/srv/app")
            .with("QDRANT_CLIENT_TIMEOUT", "5");
        let qdrant = QdrantConfig::from_backend_config(&config).unwrap();

        assert_eq!(qdrant.timeout, Duration::from_secs(5));
        assert_eq!(
            qdrant.resolve_endpoint(),
            QdrantEndpoint::Local(PathBuf::from("/srv/app/storage/qdrant"))
        );
    }

    #[test]
    fn test_qdrant_config_remote_url() {
        let config = BackendConfig::new().with("QDRANT_URL", "http://qdrant:6333");
        let qdrant = QdrantConfig::from_backend_config(&config).unwrap();

        assert_eq!(qdrant.timeout, Duration::from_secs(20));
        assert_eq!(
            qdrant.resolve_endpoint(),
            QdrantEndpoint::Url("http://qdrant:6333".to_string())
        );
    }

    #[test]
    fn test_milvus_config_url_and_token() {
        let config = BackendConfig::new()
            .with("MILVUS_HOST", "milvus")
            .with("MILVUS_USER", "root")
            .with("MILVUS_PASSWORD", "Milvus")
            .with("MILVUS_SECURE", "true");
        let milvus = MilvusConfig::from_backend_config(&config).unwrap();

        assert_eq!(milvus.base_url(), "https://milvus:19530");
        assert_eq!(milvus.token().as_deref(), Some("root:Milvus"));
    }

    #[test]
    fn test_milvus_config_rejects_bad_port() {
        let config = BackendConfig::new()
            .with("MILVUS_HOST", "milvus")
            .with("MILVUS_PORT", "99999");

        assert!(MilvusConfig::from_backend_config(&config).is_err());
    }

    #[test]
    fn test_resolve_matches_store_type() {
        let config = BackendConfig::new().with("MILVUS_HOST", "localhost");
        let resolved = VectorStoreConfig::resolve(VectorStoreType::Milvus, &config).unwrap();

        assert_eq!(resolved.store_type(), VectorStoreType::Milvus);
    }
}
