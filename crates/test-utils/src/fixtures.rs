//! Common test fixtures for meteoforge tests.
//!
//! Plain data only, so crates at any level of the workspace can use them.

/// Coordinates as `(x, y)` in EPSG:4326 axis order (latitude, longitude).
pub mod coords {
    pub const DE_BILT: (f64, f64) = (52.1, 5.18);
    pub const NORTH_POLE: (f64, f64) = (90.0, 0.0);
    pub const ANTIMERIDIAN: (f64, f64) = (0.0, 180.0);
    pub const SQUARE_CENTER: (f64, f64) = (5.0, 5.0);
    pub const SQUARE_CORNER: (f64, f64) = (10.0, 10.0);
    pub const OUTSIDE_SQUARE: (f64, f64) = (50.0, 50.0);
    /// Latitude out of range
    pub const INVALID_LATITUDE: (f64, f64) = (95.0, 5.0);
}

/// Polygon vertices as `(x, y)` pairs in EPSG:4326.
pub mod areas {
    /// Axis-aligned 10x10 degree square at the origin
    pub const SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)];

    pub const TRIANGLE: [(f64, f64); 3] = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)];

    /// Rough outline of the Netherlands
    pub const NETHERLANDS: [(f64, f64); 4] =
        [(50.7, 3.3), (53.6, 3.3), (53.6, 7.3), (50.7, 7.3)];

    /// All vertices on one line
    pub const COLLINEAR: [(f64, f64); 3] = [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)];
}

/// A catalog file with two entries.
pub const CATALOG_YAML: &str = r#"
entries:
  - catalog_id: 167
    name: 2 metre temperature
    short_name: 2t
    description: Temperature of air at 2m above the surface
    unit: K
    si_unit: K
    imperial_unit: degF
    us_unit: degF
  - catalog_id: 165
    name: 10 metre U wind component
    short_name: 10u
    description: Eastward component of the 10m wind
    unit: m s-1
    si_unit: m s-1
    imperial_unit: mph
    us_unit: knot
"#;

/// A provider with one spatial and forecasting model over [`areas::SQUARE`].
pub const PROVIDER_YAML: &str = r#"
id: demo
name: Demo Weather Service
models:
  - identity:
      id: square
      name: Square Model
      description: Forecasts over a ten degree square
      information_url: https://example.com/models/square
      license: CC BY 4.0
    capabilities: [spatial, forecast]
    parameters:
      - id: t2m
        catalog: 2t
        base_unit: degC
      - id: wind
        catalog: 10u
        base_unit: km/h
    allowed_area:
      polygon:
        - { x: 0.0, y: 0.0 }
        - { x: 0.0, y: 10.0 }
        - { x: 10.0, y: 10.0 }
        - { x: 10.0, y: 0.0 }
    forecast_horizon: 0/72
"#;

/// A provider with a historical model whose licence comes from
/// `FORGE_FIXTURE_LICENSE` (default "Public Domain").
pub const HISTORICAL_PROVIDER_YAML: &str = r#"
id: archive
name: Archive Service
models:
  - identity:
      id: reanalysis
      name: Reanalysis
      description: Hourly reanalysis at fixed stations
      information_url: https://example.com/reanalysis
      license: ${FORGE_FIXTURE_LICENSE:-Public Domain}
    capabilities: [spatial, historical]
    parameters:
      - id: t2m
        catalog: 2t
        base_unit: K
    allowed_area:
      locations:
        - { x: 52.1, y: 5.18 }
    historical_period: 2000-01-01T00:00:00Z/2024-01-01T00:00:00Z
"#;
