//! Error types for location, CRS and period validation.

use thiserror::Error;

use crate::crs::CrsKind;

/// Result type alias using GeoError.
pub type GeoResult<T> = Result<T, GeoError>;

/// Errors raised while validating coordinates, geometries and periods.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("Coordinate '{axis}' must be a finite number, got {value}")]
    TypeMismatch { axis: &'static str, value: String },

    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),

    #[error("CRS {0} is deprecated, use a non-deprecated CRS instead")]
    DeprecatedCrs(String),

    #[error("CRS {code} is a {kind} system, only geographic and geocentric systems are supported")]
    UnsupportedCrsKind { code: String, kind: CrsKind },

    #[error("Coordinate {axis}={value} lies outside [{min}, {max}] for {crs}")]
    OutOfBounds {
        crs: String,
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}
