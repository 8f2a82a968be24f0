//! Property-style tests for location validation and polygon containment.

use forge_common::{
    BuiltinCrsRegistry, CrsCode, CrsKind, CrsRegistry, GeoError, Location, LocationValidator,
    PolygonalArea,
};
use test_utils::assert_coords_approx_eq;

fn sample_coordinates(crs: CrsCode) -> Vec<(f64, f64)> {
    let definition = BuiltinCrsRegistry.resolve(&crs).unwrap();
    let [first, second] = definition.axis_bounds;
    let mut samples = Vec::new();
    for fx in [0.0, 0.25, 0.5, 0.75, 1.0] {
        for fy in [0.0, 0.1, 0.5, 0.9, 1.0] {
            samples.push((
                first.min + fx * (first.max - first.min),
                second.min + fy * (second.max - second.min),
            ));
        }
    }
    samples
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_valid_crs_in_bounds_keeps_coordinates() {
    let validator = LocationValidator::builtin();
    for code in BuiltinCrsRegistry::known_codes() {
        let definition = BuiltinCrsRegistry.resolve(code).unwrap();
        if definition.deprecated || definition.kind == CrsKind::Projected {
            continue;
        }
        for (x, y) in sample_coordinates(*code) {
            let loc = validator.validate(x, y, *code).unwrap();
            assert_eq!(loc.x(), x, "x changed for {}", code);
            assert_eq!(loc.y(), y, "y changed for {}", code);
            assert_eq!(loc.crs(), *code);
        }
    }
}

#[test]
fn test_deprecated_crs_always_rejected() {
    let validator = LocationValidator::builtin();
    for code in [CrsCode::Epsg(4327), CrsCode::Epsg(4329), CrsCode::Epsg(4140)] {
        for (x, y) in [(0.0, 0.0), (45.0, 90.0), (1000.0, -1000.0), (-90.0, 180.0)] {
            assert!(
                matches!(validator.validate(x, y, code), Err(GeoError::DeprecatedCrs(_))),
                "{} ({}, {}) should be deprecated",
                code,
                x,
                y
            );
        }
    }
}

#[test]
fn test_projected_crs_rejected_before_bounds() {
    let validator = LocationValidator::builtin();
    for code in [CrsCode::Epsg(3857), CrsCode::Epsg(28992), CrsCode::Epsg(32631)] {
        assert!(matches!(
            validator.validate(1e12, 1e12, code),
            Err(GeoError::UnsupportedCrsKind { .. })
        ));
    }
}

#[test]
fn test_unknown_crs() {
    let validator = LocationValidator::builtin();
    assert!(matches!(
        validator.validate(0.0, 0.0, CrsCode::Epsg(1)),
        Err(GeoError::UnknownCrs(_))
    ));
    assert!(matches!(
        validator.validate_code(0.0, 0.0, "EPSG:abc"),
        Err(GeoError::UnknownCrs(_))
    ));
}

#[test]
fn test_out_of_bounds_reports_constraint() {
    let err = Location::new(-91.0, 0.0, CrsCode::WGS84).unwrap_err();
    match err {
        GeoError::OutOfBounds { axis, value, min, max, .. } => {
            assert_eq!(axis, "latitude");
            assert_eq!(value, -91.0);
            assert_eq!((min, max), (-90.0, 90.0));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn test_equality_is_crs_independent() {
    let origin_a = Location::new(0.0, 0.0, CrsCode::WGS84).unwrap();
    let origin_b = Location::new(0.0, 0.0, CrsCode::Crs84).unwrap();
    assert_eq!(origin_a, origin_b);

    let utrecht = Location::new(52.0907, 5.1214, CrsCode::WGS84).unwrap();
    let utrecht_crs84 = Location::new(5.1214, 52.0907, CrsCode::Crs84).unwrap();
    let utrecht_etrs89 = Location::new(52.0907, 5.1214, CrsCode::Epsg(4258)).unwrap();
    assert_eq!(utrecht, utrecht_crs84);
    assert_eq!(utrecht, utrecht_etrs89);
    assert_ne!(utrecht, Location::new(52.0907, 5.1215, CrsCode::WGS84).unwrap());
}

#[test]
fn test_canonical_frame_is_lon_lat() {
    let utrecht = Location::new(52.0907, 5.1214, CrsCode::WGS84).unwrap();
    let utrecht_crs84 = Location::new(5.1214, 52.0907, CrsCode::Crs84).unwrap();
    for location in [utrecht, utrecht_crs84] {
        let (lon, lat) = location.canonical().xy();
        assert_coords_approx_eq!((lon, lat), (5.1214, 52.0907), 1e-12);
    }
    assert_eq!(utrecht.as_wgs84(), Some((5.1214, 52.0907)));
}

#[test]
fn test_equality_tolerates_round_trip_error() {
    let a = Location::wgs84(10.0, 20.0).unwrap();
    let b = Location::wgs84(10.0 + 1e-12, 20.0 - 1e-12).unwrap();
    assert_eq!(a, b);
}

// ============================================================================
// Containment
// ============================================================================

fn ring() -> Vec<Location> {
    [(0.0, 0.0), (0.0, 10.0), (4.0, 14.0), (10.0, 10.0), (10.0, 0.0)]
        .into_iter()
        .map(|(lat, lon)| Location::wgs84(lat, lon).unwrap())
        .collect()
}

fn sample_points() -> Vec<Location> {
    let mut points = Vec::new();
    for lat in [-1.0, 0.0, 2.5, 4.0, 5.0, 9.9, 10.0, 12.0] {
        for lon in [-1.0, 0.0, 3.0, 10.0, 12.0, 13.0, 14.0, 15.0] {
            points.push(Location::wgs84(lat, lon).unwrap());
        }
    }
    points
}

#[test]
fn test_contains_is_reflexive_on_vertices() {
    let area = PolygonalArea::new(ring()).unwrap();
    for vertex in ring() {
        assert!(area.contains(&vertex), "vertex {} not contained", vertex);
    }
}

#[test]
fn test_contains_stable_under_rotation() {
    let base = PolygonalArea::new(ring()).unwrap();
    let expected: Vec<bool> = sample_points().iter().map(|p| base.contains(p)).collect();

    for shift in 1..ring().len() {
        let mut rotated = ring();
        rotated.rotate_left(shift);
        let area = PolygonalArea::new(rotated).unwrap();
        let actual: Vec<bool> = sample_points().iter().map(|p| area.contains(p)).collect();
        assert_eq!(actual, expected, "rotation by {} changed containment", shift);
    }

    let mut reversed = ring();
    reversed.reverse();
    let area = PolygonalArea::new(reversed).unwrap();
    let actual: Vec<bool> = sample_points().iter().map(|p| area.contains(p)).collect();
    assert_eq!(actual, expected, "reversing the ring changed containment");
}
