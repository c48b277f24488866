use thiserror::Error;

/// Core domain errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("'{provider}' vector store has no capability '{capability}'")]
    UnsupportedCapability {
        provider: String,
        capability: String,
    },

    #[error("Credential validation failed: {message}")]
    CredentialValidation { message: String },

    #[error("Tool invocation failed: {message}")]
    ToolInvoke { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Vector store error: {provider} - {message}")]
    VectorStore { provider: String, message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unsupported_capability(
        provider: impl Into<String>,
        capability: impl Into<String>,
    ) -> Self {
        Self::UnsupportedCapability {
            provider: provider.into(),
            capability: capability.into(),
        }
    }

    pub fn credential_validation(message: impl Into<String>) -> Self {
        Self::CredentialValidation {
            message: message.into(),
        }
    }

    pub fn tool_invoke(message: impl Into<String>) -> Self {
        Self::ToolInvoke {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn vector_store(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VectorStore {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let error = DomainError::configuration("Vector store must be specified.");
        assert_eq!(
            error.to_string(),
            "Configuration error: Vector store must be specified."
        );
    }

    #[test]
    fn test_unsupported_capability_names_capability() {
        let error = DomainError::unsupported_capability("qdrant", "search_by_full_text_index");
        assert_eq!(
            error.to_string(),
            "'qdrant' vector store has no capability 'search_by_full_text_index'"
        );
    }

    #[test]
    fn test_credential_validation_keeps_message() {
        let error = DomainError::credential_validation("Invalid appid");
        assert_eq!(error.to_string(), "Credential validation failed: Invalid appid");
    }
}
