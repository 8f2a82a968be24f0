//! Error types for model definition and data fetching.

use thiserror::Error;

use forge_common::GeoError;
use forge_units::HarmonizeError;

use crate::capability::Capability;

/// Result type alias using ForgeError.
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Error type returned by download collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while defining models or fetching data from them.
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error(transparent)]
    Geo(#[from] GeoError),

    #[error(transparent)]
    Harmonize(#[from] HarmonizeError),

    #[error("Invalid model identity: {0}")]
    InvalidIdentity(String),

    #[error("Location {location} lies outside the allowed area of model '{model}'")]
    LocationNotAllowed { model: String, location: String },

    #[error("Forecast period {requested} is outside the forecast horizon {horizon}")]
    ForecastPeriodOutOfHorizon { requested: String, horizon: String },

    #[error("Historical period {requested} is outside the supported period {supported}")]
    HistoricalPeriodUnsupported { requested: String, supported: String },

    #[error("Unknown parameter '{parameter}' for model '{model}'")]
    UnknownParameter { model: String, parameter: String },

    #[error("Missing required filter '{0}'")]
    MissingFilter(String),

    #[error("Filter '{filter}' is not supported by model '{model}'")]
    UnsupportedFilter { model: String, filter: String },

    #[error("Unsupported capability combination: {0}")]
    UnsupportedCapabilityCombination(String),

    #[error("Capability '{capability}' requires {config}")]
    MissingCapabilityConfig {
        capability: Capability,
        config: &'static str,
    },

    #[error("Download failed for model '{model}'")]
    DownloadFailed {
        model: String,
        #[source]
        source: BoxError,
    },

    #[error("Downloaded data has no series for parameter '{0}'")]
    MissingSeries(String),

    #[error("Provider '{0}' is already registered")]
    DuplicateProvider(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        ForgeError::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for ForgeError {
    fn from(err: serde_yaml::Error) -> Self {
        ForgeError::Config(format!("YAML error: {}", err))
    }
}
