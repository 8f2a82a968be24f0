//! Coordinate Reference System types and the registry used to resolve them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GeoError, GeoResult};

/// Semi-major axis of the WGS84 ellipsoid in metres.
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// An authority-qualified CRS identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CrsCode {
    /// A code from the EPSG geodetic parameter dataset.
    Epsg(u32),
    /// OGC CRS84: WGS84 with longitude/latitude axis order.
    Crs84,
}

impl CrsCode {
    /// WGS84 geographic 2D (latitude first).
    pub const WGS84: CrsCode = CrsCode::Epsg(4326);

    /// Parse a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:4326"
    /// - "4326" (bare EPSG code)
    /// - "OGC:CRS84" / "CRS:84"
    pub fn parse(s: &str) -> GeoResult<Self> {
        let trimmed = s.trim();
        let normalized = trimmed.to_uppercase();

        if matches!(normalized.as_str(), "OGC:CRS84" | "CRS:84" | "CRS84") {
            return Ok(CrsCode::Crs84);
        }

        let digits = normalized.strip_prefix("EPSG:").unwrap_or(&normalized);
        digits
            .parse::<u32>()
            .map(CrsCode::Epsg)
            .map_err(|_| GeoError::UnknownCrs(trimmed.to_string()))
    }
}

impl FromStr for CrsCode {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CrsCode::parse(s)
    }
}

impl TryFrom<String> for CrsCode {
    type Error = GeoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CrsCode::parse(&value)
    }
}

impl From<CrsCode> for String {
    fn from(code: CrsCode) -> Self {
        code.to_string()
    }
}

impl From<u32> for CrsCode {
    fn from(epsg: u32) -> Self {
        CrsCode::Epsg(epsg)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsCode::Epsg(code) => write!(f, "EPSG:{}", code),
            CrsCode::Crs84 => write!(f, "OGC:CRS84"),
        }
    }
}

/// The kind of coordinate system a CRS is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrsKind {
    /// Angular coordinates on an ellipsoid (degrees)
    Geographic,
    /// Earth-centred, earth-fixed cartesian coordinates (metres)
    Geocentric,
    /// Planar coordinates produced by a map projection
    Projected,
}

impl fmt::Display for CrsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            CrsKind::Geographic => "geographic",
            CrsKind::Geocentric => "geocentric",
            CrsKind::Projected => "projected",
        };
        write!(f, "{}", kind)
    }
}

/// Axis order for coordinate interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// X (longitude/easting), Y (latitude/northing)
    XY,
    /// Y (latitude/northing), X (longitude/easting)
    LatLon,
}

/// Inclusive bounds of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub const fn new(name: &'static str, min: f64, max: f64) -> Self {
        Self { name, min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

const LATITUDE: AxisBounds = AxisBounds::new("latitude", -90.0, 90.0);
const LONGITUDE: AxisBounds = AxisBounds::new("longitude", -180.0, 180.0);
const ECEF_X: AxisBounds = AxisBounds::new("X", -WGS84_SEMI_MAJOR_AXIS, WGS84_SEMI_MAJOR_AXIS);
const ECEF_Y: AxisBounds = AxisBounds::new("Y", -WGS84_SEMI_MAJOR_AXIS, WGS84_SEMI_MAJOR_AXIS);

/// A coordinate pair re-expressed in the frame used for comparisons.
///
/// Geographic systems map to WGS84 longitude/latitude in degrees, geocentric
/// systems to WGS84 ECEF metres. Datum shifts below one metre are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanonicalPoint {
    Geographic { lon: f64, lat: f64 },
    Geocentric { x: f64, y: f64 },
}

impl CanonicalPoint {
    /// Planar coordinates of this point within its frame.
    pub fn xy(&self) -> (f64, f64) {
        match *self {
            CanonicalPoint::Geographic { lon, lat } => (lon, lat),
            CanonicalPoint::Geocentric { x, y } => (x, y),
        }
    }

    /// Whether both points live in the same canonical frame.
    pub fn same_frame(&self, other: &CanonicalPoint) -> bool {
        matches!(
            (self, other),
            (CanonicalPoint::Geographic { .. }, CanonicalPoint::Geographic { .. })
                | (CanonicalPoint::Geocentric { .. }, CanonicalPoint::Geocentric { .. })
        )
    }

    /// Compare two points within `epsilon` canonical units.
    pub fn approx_eq(&self, other: &CanonicalPoint, epsilon: f64) -> bool {
        match (*self, *other) {
            (
                CanonicalPoint::Geographic { lon: lon_a, lat: lat_a },
                CanonicalPoint::Geographic { lon: lon_b, lat: lat_b },
            ) => {
                if (lat_a - lat_b).abs() > epsilon {
                    return false;
                }
                // Every longitude names the same point at a pole
                if (lat_a.abs() - 90.0).abs() <= epsilon {
                    return true;
                }
                let delta = (lon_a - lon_b).rem_euclid(360.0);
                delta.min(360.0 - delta) <= epsilon
            }
            (
                CanonicalPoint::Geocentric { x: x_a, y: y_a },
                CanonicalPoint::Geocentric { x: x_b, y: y_b },
            ) => (x_a - x_b).abs() <= epsilon && (y_a - y_b).abs() <= epsilon,
            _ => false,
        }
    }
}

/// Full CRS definition as resolved from a registry.
#[derive(Debug, Clone, PartialEq)]
pub struct CrsDefinition {
    pub code: CrsCode,
    pub name: String,
    pub kind: CrsKind,
    pub deprecated: bool,
    pub axis_order: AxisOrder,
    /// Bounds of the first and second axis, in declaration order.
    pub axis_bounds: [AxisBounds; 2],
}

impl CrsDefinition {
    pub fn new(
        code: CrsCode,
        name: impl Into<String>,
        kind: CrsKind,
        axis_order: AxisOrder,
        axis_bounds: [AxisBounds; 2],
    ) -> Self {
        Self {
            code,
            name: name.into(),
            kind,
            deprecated: false,
            axis_order,
            axis_bounds,
        }
    }

    /// Mark this definition as deprecated.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        self.kind == CrsKind::Geographic
    }

    /// Check if this is an earth-centred cartesian CRS.
    pub fn is_geocentric(&self) -> bool {
        self.kind == CrsKind::Geocentric
    }

    /// True when the first coordinate is a northing (EPSG:4326), false when
    /// it is an easting (OGC:CRS84, UTM zones).
    pub fn is_first_coordinate_northing(&self) -> bool {
        self.axis_order == AxisOrder::LatLon
    }

    /// Re-express `(x, y)` in the canonical frame.
    ///
    /// Returns `None` for projected systems, which have no canonical form here.
    pub fn to_canonical(&self, x: f64, y: f64) -> Option<CanonicalPoint> {
        match self.kind {
            CrsKind::Geographic => {
                let (lon, lat) = match self.axis_order {
                    AxisOrder::XY => (x, y),
                    AxisOrder::LatLon => (y, x),
                };
                Some(CanonicalPoint::Geographic { lon, lat })
            }
            CrsKind::Geocentric => Some(CanonicalPoint::Geocentric { x, y }),
            CrsKind::Projected => None,
        }
    }
}

/// Source of CRS definitions.
pub trait CrsRegistry: Send + Sync {
    /// Resolve a code, failing with `UnknownCrs` if it is not registered.
    fn resolve(&self, code: &CrsCode) -> GeoResult<CrsDefinition>;
}

impl<R: CrsRegistry + ?Sized> CrsRegistry for std::sync::Arc<R> {
    fn resolve(&self, code: &CrsCode) -> GeoResult<CrsDefinition> {
        (**self).resolve(code)
    }
}

/// Registry of the reference systems meteorological providers commonly use.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCrsRegistry;

impl BuiltinCrsRegistry {
    /// All codes this registry can resolve, deprecated ones included.
    pub fn known_codes() -> &'static [CrsCode] {
        &[
            CrsCode::Epsg(4326),
            CrsCode::Crs84,
            CrsCode::Epsg(4258),
            CrsCode::Epsg(4269),
            CrsCode::Epsg(4979),
            CrsCode::Epsg(4978),
            CrsCode::Epsg(4936),
            CrsCode::Epsg(4327),
            CrsCode::Epsg(4329),
            CrsCode::Epsg(4140),
            CrsCode::Epsg(3857),
            CrsCode::Epsg(28992),
            CrsCode::Epsg(32631),
            CrsCode::Epsg(25831),
        ]
    }

    fn lookup(code: CrsCode) -> Option<CrsDefinition> {
        use AxisOrder::{LatLon, XY};
        use CrsKind::{Geocentric, Geographic, Projected};

        let lat_lon = [LATITUDE, LONGITUDE];
        let lon_lat = [LONGITUDE, LATITUDE];
        let ecef = [ECEF_X, ECEF_Y];

        let definition = match code {
            CrsCode::Crs84 => CrsDefinition::new(code, "WGS 84 (CRS84)", Geographic, XY, lon_lat),
            CrsCode::Epsg(4326) => CrsDefinition::new(code, "WGS 84", Geographic, LatLon, lat_lon),
            CrsCode::Epsg(4258) => CrsDefinition::new(code, "ETRS89", Geographic, LatLon, lat_lon),
            CrsCode::Epsg(4269) => CrsDefinition::new(code, "NAD83", Geographic, LatLon, lat_lon),
            CrsCode::Epsg(4979) => CrsDefinition::new(code, "WGS 84 (3D)", Geographic, LatLon, lat_lon),
            CrsCode::Epsg(4978) => CrsDefinition::new(code, "WGS 84 (geocentric)", Geocentric, XY, ecef),
            CrsCode::Epsg(4936) => CrsDefinition::new(code, "ETRS89 (geocentric)", Geocentric, XY, ecef),

            CrsCode::Epsg(4327) => {
                CrsDefinition::new(code, "WGS 84 (geographic 3D)", Geographic, LatLon, lat_lon).deprecated()
            }
            CrsCode::Epsg(4329) => {
                CrsDefinition::new(code, "WGS 84 (3D)", Geographic, LatLon, lat_lon).deprecated()
            }
            CrsCode::Epsg(4140) => {
                CrsDefinition::new(code, "NAD83(CSRS98)", Geographic, LatLon, lat_lon).deprecated()
            }

            // Projected bounds are approximate areas of use in metres
            CrsCode::Epsg(3857) => {
                let max_extent = 20037508.342789244;
                CrsDefinition::new(
                    code,
                    "WGS 84 / Pseudo-Mercator",
                    Projected,
                    XY,
                    [
                        AxisBounds::new("easting", -max_extent, max_extent),
                        AxisBounds::new("northing", -max_extent, max_extent),
                    ],
                )
            }
            CrsCode::Epsg(28992) => CrsDefinition::new(
                code,
                "Amersfoort / RD New",
                Projected,
                XY,
                [
                    AxisBounds::new("easting", 646.36, 308975.28),
                    AxisBounds::new("northing", 276050.82, 636456.31),
                ],
            ),
            CrsCode::Epsg(32631) | CrsCode::Epsg(25831) => CrsDefinition::new(
                code,
                if code == CrsCode::Epsg(32631) {
                    "WGS 84 / UTM zone 31N"
                } else {
                    "ETRS89 / UTM zone 31N"
                },
                Projected,
                XY,
                [
                    AxisBounds::new("easting", 166021.44, 833978.56),
                    AxisBounds::new("northing", 0.0, 9329005.18),
                ],
            ),
            _ => return None,
        };

        Some(definition)
    }
}

impl CrsRegistry for BuiltinCrsRegistry {
    fn resolve(&self, code: &CrsCode) -> GeoResult<CrsDefinition> {
        Self::lookup(*code).ok_or_else(|| GeoError::UnknownCrs(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(CrsCode::parse("EPSG:4326").unwrap(), CrsCode::Epsg(4326));
        assert_eq!(CrsCode::parse("epsg:3857").unwrap(), CrsCode::Epsg(3857));
        assert_eq!(CrsCode::parse("4258").unwrap(), CrsCode::Epsg(4258));
        assert_eq!(CrsCode::parse("CRS:84").unwrap(), CrsCode::Crs84);
        assert_eq!(CrsCode::parse("ogc:crs84").unwrap(), CrsCode::Crs84);
        assert!(matches!(
            CrsCode::parse("EPSG:not-a-code"),
            Err(GeoError::UnknownCrs(_))
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        for code in BuiltinCrsRegistry::known_codes() {
            assert_eq!(CrsCode::parse(&code.to_string()).unwrap(), *code);
        }
    }

    #[test]
    fn test_axis_order() {
        let registry = BuiltinCrsRegistry;
        assert!(registry.resolve(&CrsCode::WGS84).unwrap().is_first_coordinate_northing());
        assert!(!registry.resolve(&CrsCode::Crs84).unwrap().is_first_coordinate_northing());
        assert!(!registry.resolve(&CrsCode::Epsg(32631)).unwrap().is_first_coordinate_northing());
    }

    #[test]
    fn test_unknown_code() {
        assert!(matches!(
            BuiltinCrsRegistry.resolve(&CrsCode::Epsg(99999)),
            Err(GeoError::UnknownCrs(code)) if code == "EPSG:99999"
        ));
    }

    #[test]
    fn test_canonical_swaps_lat_lon() {
        let wgs84 = BuiltinCrsRegistry.resolve(&CrsCode::WGS84).unwrap();
        let crs84 = BuiltinCrsRegistry.resolve(&CrsCode::Crs84).unwrap();
        assert_eq!(wgs84.to_canonical(52.0, 5.0), crs84.to_canonical(5.0, 52.0));

        let rd_new = BuiltinCrsRegistry.resolve(&CrsCode::Epsg(28992)).unwrap();
        assert!(rd_new.to_canonical(155000.0, 463000.0).is_none());
    }

    #[test]
    fn test_canonical_longitude_wraps() {
        let a = CanonicalPoint::Geographic { lon: 180.0, lat: 10.0 };
        let b = CanonicalPoint::Geographic { lon: -180.0, lat: 10.0 };
        assert!(a.approx_eq(&b, 1e-9));

        let pole_a = CanonicalPoint::Geographic { lon: 12.0, lat: 90.0 };
        let pole_b = CanonicalPoint::Geographic { lon: -70.0, lat: 90.0 };
        assert!(pole_a.approx_eq(&pole_b, 1e-9));
    }

    #[test]
    fn test_frames_never_equal() {
        let geographic = CanonicalPoint::Geographic { lon: 0.0, lat: 0.0 };
        let geocentric = CanonicalPoint::Geocentric { x: 0.0, y: 0.0 };
        assert!(!geographic.same_frame(&geocentric));
        assert!(!geographic.approx_eq(&geocentric, 1.0));
    }
}
