//! Error types for the forge-units crate.

use thiserror::Error;

/// Result type alias using HarmonizeError.
pub type HarmonizeResult<T> = Result<T, HarmonizeError>;

/// Errors that can occur while converting or cataloguing parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarmonizeError {
    #[error("Cannot convert from '{from}' to '{to}': incompatible dimensions ({from_dimension} vs {to_dimension})")]
    IncompatibleUnits {
        from: String,
        to: String,
        from_dimension: String,
        to_dimension: String,
    },

    #[error("Unknown unit '{unit}' in '{expression}'")]
    UnknownUnit { unit: String, expression: String },

    #[error("Invalid catalog entry: {0}")]
    InvalidCatalogEntry(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Catalog entry not found: {0}")]
    UnknownCatalogEntry(String),

    #[error("Failed to load catalog: {0}")]
    CatalogLoad(String),
}

impl From<std::io::Error> for HarmonizeError {
    fn from(err: std::io::Error) -> Self {
        HarmonizeError::CatalogLoad(err.to_string())
    }
}

impl From<serde_yaml::Error> for HarmonizeError {
    fn from(err: serde_yaml::Error) -> Self {
        HarmonizeError::CatalogLoad(format!("YAML error: {}", err))
    }
}
