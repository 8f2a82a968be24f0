//! Harmonization properties over the default parameter catalog.

use std::io::Write;

use forge_units::{
    CatalogEntry, HarmonizeError, ParameterCatalog, ParameterHarmonizer, UnitConverter,
    UnitSystem,
};

const SAMPLES: &[f64] = &[-40.0, -1.5, 0.0, 0.25, 1.0, 12.5, 273.15, 1013.25, 101_325.0];

fn assert_close(actual: f64, expected: f64, context: &str) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: expected {}, got {}",
        context,
        expected,
        actual
    );
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_round_trip_every_entry_and_system_pair() {
    let catalog = ParameterCatalog::eccodes_defaults().unwrap();
    let harmonizer = ParameterHarmonizer::new();

    for entry in catalog.iter() {
        for from in UnitSystem::ALL {
            for to in UnitSystem::ALL {
                for &value in SAMPLES {
                    let there = harmonizer.to_system(value, entry, from, to).unwrap();
                    let back = harmonizer.to_system(there, entry, to, from).unwrap();
                    assert_close(
                        back,
                        value,
                        &format!("{} {} -> {} -> {}", entry.short_name(), from, to, from),
                    );
                }
            }
        }
    }
}

#[test]
fn test_identity_for_every_entry() {
    let catalog = ParameterCatalog::eccodes_defaults().unwrap();
    let harmonizer = ParameterHarmonizer::new();

    for entry in catalog.iter() {
        for system in UnitSystem::ALL {
            let values = harmonizer.to_system_all(SAMPLES, entry, system, system).unwrap();
            assert_eq!(values, SAMPLES, "{} in {}", entry.short_name(), system);
        }
    }
}

// ============================================================================
// Injected converters
// ============================================================================

/// Converter that only knows how to double values, to prove the harmonizer
/// delegates all arithmetic.
struct DoublingConverter;

impl UnitConverter for DoublingConverter {
    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, HarmonizeError> {
        if from == to {
            Ok(value)
        } else {
            Ok(value * 2.0)
        }
    }
}

#[test]
fn test_harmonizer_delegates_to_converter() {
    let catalog = ParameterCatalog::eccodes_defaults().unwrap();
    let entry: &CatalogEntry = catalog.get("2t").unwrap();
    let harmonizer = ParameterHarmonizer::with_converter(DoublingConverter);

    assert_eq!(
        harmonizer
            .to_system(10.0, entry, UnitSystem::Si, UnitSystem::Us)
            .unwrap(),
        20.0
    );
    // K -> K: the converter sees identical unit strings
    assert_eq!(
        harmonizer
            .to_system(10.0, entry, UnitSystem::Original, UnitSystem::Si)
            .unwrap(),
        10.0
    );
}

// ============================================================================
// Catalog files
// ============================================================================

#[test]
fn test_load_catalog_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
entries:
  - catalog_id: 167
    name: 2 metre temperature
    short_name: 2t
    description: Temperature of air at 2 m
    unit: K
    si_unit: K
    imperial_unit: degF
    us_unit: degF
  - catalog_id: 165
    name: 10 metre U wind component
    short_name: 10u
    description: Eastward wind at 10 m height
    unit: m s-1
    si_unit: m s-1
    imperial_unit: mph
    us_unit: knot
"#
    )
    .unwrap();

    let catalog = ParameterCatalog::load(file.path()).unwrap();
    assert_eq!(catalog.len(), 2);

    let wind = catalog.get("10u").unwrap();
    let knots = ParameterHarmonizer::new()
        .to_system(10.0, wind, UnitSystem::Si, UnitSystem::Us)
        .unwrap();
    assert_close(knots, 10.0 * 3600.0 / 1852.0, "m/s to knots");
}

#[test]
fn test_missing_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ParameterCatalog::load(dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, HarmonizeError::CatalogLoad(_)));
}
