//! Validated geographic locations.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::crs::{BuiltinCrsRegistry, CanonicalPoint, CrsCode, CrsDefinition, CrsKind, CrsRegistry};
use crate::error::{GeoError, GeoResult};

/// Tolerance used when comparing canonical coordinates.
pub const LOCATION_EPSILON: f64 = 1e-9;

/// A coordinate pair known to be valid in its CRS.
///
/// `x` holds the value of the CRS's first axis and `y` the second, so for
/// EPSG:4326 `x` is the latitude. Locations can only be obtained through a
/// [`LocationValidator`]; equality compares the canonical WGS84 form, which
/// makes it independent of the CRS the location was declared in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawLocation", into = "RawLocation")]
pub struct Location {
    x: f64,
    y: f64,
    crs: CrsCode,
    canonical: CanonicalPoint,
}

impl Location {
    /// Validate a location against the built-in CRS registry.
    pub fn new(x: f64, y: f64, crs: impl Into<CrsCode>) -> GeoResult<Self> {
        LocationValidator::builtin().validate(x, y, crs.into())
    }

    /// Shorthand for an EPSG:4326 location.
    pub fn wgs84(lat: f64, lon: f64) -> GeoResult<Self> {
        Self::new(lat, lon, CrsCode::WGS84)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn crs(&self) -> CrsCode {
        self.crs
    }

    pub fn canonical(&self) -> CanonicalPoint {
        self.canonical
    }

    /// Longitude/latitude in WGS84, if this location is geographic.
    pub fn as_wgs84(&self) -> Option<(f64, f64)> {
        match self.canonical {
            CanonicalPoint::Geographic { lon, lat } => Some((lon, lat)),
            CanonicalPoint::Geocentric { .. } => None,
        }
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.canonical.approx_eq(&other.canonical, LOCATION_EPSILON)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) in {}", self.x, self.y, self.crs)
    }
}

/// Serialized form of a location; validated on the way in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawLocation {
    x: f64,
    y: f64,
    #[serde(default = "default_crs")]
    crs: CrsCode,
}

fn default_crs() -> CrsCode {
    CrsCode::WGS84
}

impl TryFrom<RawLocation> for Location {
    type Error = GeoError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Location::new(raw.x, raw.y, raw.crs)
    }
}

impl From<Location> for RawLocation {
    fn from(location: Location) -> Self {
        RawLocation {
            x: location.x,
            y: location.y,
            crs: location.crs,
        }
    }
}

/// Validates coordinate pairs against the CRS definitions of a registry.
#[derive(Debug, Clone, Default)]
pub struct LocationValidator<R = BuiltinCrsRegistry> {
    registry: R,
}

impl LocationValidator<BuiltinCrsRegistry> {
    pub fn builtin() -> Self {
        Self {
            registry: BuiltinCrsRegistry,
        }
    }
}

impl<R: CrsRegistry> LocationValidator<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Validate `(x, y)` in `crs`.
    ///
    /// Checks, in order: finite coordinates, a registered CRS, not
    /// deprecated, geographic or geocentric, and within the axis bounds.
    pub fn validate(&self, x: f64, y: f64, crs: CrsCode) -> GeoResult<Location> {
        debug!(x, y, crs = %crs, "Validating location");

        check_finite("x", x)?;
        check_finite("y", y)?;

        let definition = self.validate_crs(&crs)?;

        for (value, bounds) in [x, y].into_iter().zip(definition.axis_bounds.iter()) {
            if !bounds.contains(value) {
                return Err(GeoError::OutOfBounds {
                    crs: crs.to_string(),
                    axis: bounds.name,
                    value,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }

        let canonical = definition.to_canonical(x, y).ok_or_else(|| GeoError::UnsupportedCrsKind {
            code: crs.to_string(),
            kind: definition.kind,
        })?;

        Ok(Location { x, y, crs, canonical })
    }

    /// Validate with the CRS given as a string such as `"EPSG:4326"`.
    pub fn validate_code(&self, x: f64, y: f64, crs: &str) -> GeoResult<Location> {
        check_finite("x", x)?;
        check_finite("y", y)?;
        self.validate(x, y, CrsCode::parse(crs)?)
    }

    /// Validate raw text input, e.g. command line arguments.
    pub fn validate_str(&self, x: &str, y: &str, crs: &str) -> GeoResult<Location> {
        let x = parse_coordinate("x", x)?;
        let y = parse_coordinate("y", y)?;
        self.validate_code(x, y, crs)
    }

    /// Check that `crs` is registered, current, and supported by [`Location`].
    pub fn validate_crs(&self, crs: &CrsCode) -> GeoResult<CrsDefinition> {
        let definition = self.registry.resolve(crs)?;

        if definition.deprecated {
            return Err(GeoError::DeprecatedCrs(crs.to_string()));
        }

        if !matches!(definition.kind, CrsKind::Geographic | CrsKind::Geocentric) {
            return Err(GeoError::UnsupportedCrsKind {
                code: crs.to_string(),
                kind: definition.kind,
            });
        }

        Ok(definition)
    }
}

fn check_finite(axis: &'static str, value: f64) -> GeoResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeoError::TypeMismatch {
            axis,
            value: value.to_string(),
        })
    }
}

fn parse_coordinate(axis: &'static str, raw: &str) -> GeoResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| GeoError::TypeMismatch {
            axis,
            value: raw.to_string(),
        })
}
