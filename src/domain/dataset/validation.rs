//! Dataset validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for dataset IDs
pub const MAX_DATASET_ID_LENGTH: usize = 64;

/// Alphanumeric with inner hyphens, which covers UUIDs
static DATASET_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?$").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum DatasetValidationError {
    EmptyId,
    IdTooLong { length: usize, max: usize },
    InvalidIdFormat { id: String },
    EmptyName,
}

impl fmt::Display for DatasetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Dataset ID cannot be empty"),
            Self::IdTooLong { length, max } => {
                write!(f, "Dataset ID too long: {} characters (max {})", length, max)
            }
            Self::InvalidIdFormat { id } => write!(
                f,
                "Invalid dataset ID format '{}': must be alphanumeric with hyphens",
                id
            ),
            Self::EmptyName => write!(f, "Dataset name cannot be empty"),
        }
    }
}

impl std::error::Error for DatasetValidationError {}

impl From<DatasetValidationError> for crate::domain::DomainError {
    fn from(err: DatasetValidationError) -> Self {
        match err {
            DatasetValidationError::EmptyName => Self::validation(err.to_string()),
            _ => Self::invalid_id(err.to_string()),
        }
    }
}

pub fn validate_dataset_id(id: &str) -> Result<(), DatasetValidationError> {
    if id.is_empty() {
        return Err(DatasetValidationError::EmptyId);
    }

    if id.len() > MAX_DATASET_ID_LENGTH {
        return Err(DatasetValidationError::IdTooLong {
            length: id.len(),
            max: MAX_DATASET_ID_LENGTH,
        });
    }

    if !DATASET_ID_PATTERN.is_match(id) {
        return Err(DatasetValidationError::InvalidIdFormat { id: id.to_string() });
    }

    Ok(())
}

pub fn validate_dataset_name(name: &str) -> Result<(), DatasetValidationError> {
    if name.trim().is_empty() {
        return Err(DatasetValidationError::EmptyName);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_dataset_ids() {
        assert!(validate_dataset_id("a").is_ok());
        assert!(validate_dataset_id("product-docs").is_ok());
        assert!(validate_dataset_id("0b7f8c4e-2f3a-4d8b-9c1e-5a6b7c8d9e0f").is_ok());
    }

    #[test]
    fn test_invalid_dataset_ids() {
        assert!(matches!(
            validate_dataset_id(""),
            Err(DatasetValidationError::EmptyId)
        ));
        assert!(matches!(
            validate_dataset_id(&"a".repeat(65)),
            Err(DatasetValidationError::IdTooLong { .. })
        ));
        assert!(matches!(
            validate_dataset_id("my_dataset"),
            Err(DatasetValidationError::InvalidIdFormat { .. })
        ));
        assert!(matches!(
            validate_dataset_id("dataset-"),
            Err(DatasetValidationError::InvalidIdFormat { .. })
        ));
    }

    #[test]
    fn test_dataset_name() {
        assert!(validate_dataset_name("Docs").is_ok());
        assert_eq!(
            validate_dataset_name("   "),
            Err(DatasetValidationError::EmptyName)
        );
    }
}
