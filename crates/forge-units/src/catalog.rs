//! Reference catalog of harmonizable parameters.
//!
//! Entries follow the ECMWF parameter database: a numeric id, a long name,
//! a short name used in GRIB files, and the unit of the quantity in each
//! unit system.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use forge_common::naming::check_length;

use crate::error::{HarmonizeError, HarmonizeResult};
use crate::system::UnitSystem;

/// Unvalidated catalog entry fields, as written in a catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCatalogEntry {
    pub catalog_id: u32,
    pub name: String,
    pub short_name: String,
    pub description: String,
    /// Unit of the quantity as published by the catalog
    pub unit: String,
    pub si_unit: String,
    pub imperial_unit: String,
    pub us_unit: String,
}

/// A validated, immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalogEntry", into = "RawCatalogEntry")]
pub struct CatalogEntry {
    catalog_id: u8,
    name: String,
    short_name: String,
    description: String,
    unit: String,
    si_unit: String,
    imperial_unit: String,
    us_unit: String,
}

impl CatalogEntry {
    /// Validate field lengths and the id range (1..=254).
    pub fn new(raw: RawCatalogEntry) -> HarmonizeResult<Self> {
        let catalog_id = u8::try_from(raw.catalog_id)
            .ok()
            .filter(|id| (1..=254).contains(id))
            .ok_or_else(|| {
                HarmonizeError::InvalidCatalogEntry(format!(
                    "catalog_id must be in 1..=254, got {}",
                    raw.catalog_id
                ))
            })?;

        let checks = [
            check_length("name", &raw.name, 8, 120),
            check_length("short_name", &raw.short_name, 1, 8),
            check_length("description", &raw.description, 12, 512),
            check_length("unit", &raw.unit, 1, 20),
            check_length("si_unit", &raw.si_unit, 1, 20),
            check_length("imperial_unit", &raw.imperial_unit, 1, 20),
            check_length("us_unit", &raw.us_unit, 1, 20),
        ];
        for check in checks {
            check.map_err(|msg| {
                HarmonizeError::InvalidCatalogEntry(format!("{} ({})", msg, raw.short_name))
            })?;
        }

        Ok(Self {
            catalog_id,
            name: raw.name,
            short_name: raw.short_name,
            description: raw.description,
            unit: raw.unit,
            si_unit: raw.si_unit,
            imperial_unit: raw.imperial_unit,
            us_unit: raw.us_unit,
        })
    }

    pub fn catalog_id(&self) -> u8 {
        self.catalog_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The unit string this entry uses for `system`.
    pub fn unit_for(&self, system: UnitSystem) -> &str {
        match system {
            UnitSystem::Original => &self.unit,
            UnitSystem::Si => &self.si_unit,
            UnitSystem::Imperial => &self.imperial_unit,
            UnitSystem::Us => &self.us_unit,
        }
    }
}

impl TryFrom<RawCatalogEntry> for CatalogEntry {
    type Error = HarmonizeError;

    fn try_from(raw: RawCatalogEntry) -> Result<Self, Self::Error> {
        CatalogEntry::new(raw)
    }
}

impl From<CatalogEntry> for RawCatalogEntry {
    fn from(entry: CatalogEntry) -> Self {
        RawCatalogEntry {
            catalog_id: u32::from(entry.catalog_id),
            name: entry.name,
            short_name: entry.short_name,
            description: entry.description,
            unit: entry.unit,
            si_unit: entry.si_unit,
            imperial_unit: entry.imperial_unit,
            us_unit: entry.us_unit,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    entries: Vec<CatalogEntry>,
}

/// Catalog entries indexed by short name and catalog id.
#[derive(Debug, Clone, Default)]
pub struct ParameterCatalog {
    entries: Vec<Arc<CatalogEntry>>,
    by_short_name: HashMap<String, usize>,
    by_id: HashMap<u8, usize>,
}

impl ParameterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting duplicate ids or short names.
    pub fn from_entries<I>(entries: I) -> HarmonizeResult<Self>
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, entry: CatalogEntry) -> HarmonizeResult<Arc<CatalogEntry>> {
        if self.by_short_name.contains_key(entry.short_name()) {
            return Err(HarmonizeError::InvalidCatalogEntry(format!(
                "duplicate short name '{}'",
                entry.short_name()
            )));
        }
        if self.by_id.contains_key(&entry.catalog_id()) {
            return Err(HarmonizeError::InvalidCatalogEntry(format!(
                "duplicate catalog id {} ('{}')",
                entry.catalog_id(),
                entry.short_name()
            )));
        }

        let index = self.entries.len();
        self.by_short_name.insert(entry.short_name().to_string(), index);
        self.by_id.insert(entry.catalog_id(), index);
        let entry = Arc::new(entry);
        self.entries.push(Arc::clone(&entry));
        Ok(entry)
    }

    pub fn get(&self, short_name: &str) -> Option<&Arc<CatalogEntry>> {
        self.by_short_name.get(short_name).map(|i| &self.entries[*i])
    }

    pub fn get_by_id(&self, catalog_id: u8) -> Option<&Arc<CatalogEntry>> {
        self.by_id.get(&catalog_id).map(|i| &self.entries[*i])
    }

    /// Like [`get`](Self::get), failing with `UnknownCatalogEntry`.
    pub fn require(&self, short_name: &str) -> HarmonizeResult<Arc<CatalogEntry>> {
        self.get(short_name)
            .cloned()
            .ok_or_else(|| HarmonizeError::UnknownCatalogEntry(short_name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CatalogEntry>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a catalog from YAML with a top-level `entries` list.
    pub fn from_yaml_str(yaml: &str) -> HarmonizeResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::from_entries(file.entries)
    }

    pub fn load(path: impl AsRef<Path>) -> HarmonizeResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading parameter catalog");
        let content = std::fs::read_to_string(path)
            .map_err(|e| HarmonizeError::CatalogLoad(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_yaml_str(&content)?;
        info!(path = %path.display(), entries = catalog.len(), "Loaded parameter catalog");
        Ok(catalog)
    }

    /// Common surface parameters from the ECMWF parameter database.
    pub fn eccodes_defaults() -> HarmonizeResult<Self> {
        Self::from_entries(
            ECCODES_DEFAULTS
                .iter()
                .map(|row| CatalogEntry::new(row.to_raw()))
                .collect::<HarmonizeResult<Vec<_>>>()?,
        )
    }
}

struct DefaultRow {
    id: u32,
    short_name: &'static str,
    name: &'static str,
    description: &'static str,
    units: [&'static str; 4],
}

impl DefaultRow {
    fn to_raw(&self) -> RawCatalogEntry {
        let [unit, si_unit, imperial_unit, us_unit] = self.units;
        RawCatalogEntry {
            catalog_id: self.id,
            name: self.name.to_string(),
            short_name: self.short_name.to_string(),
            description: self.description.to_string(),
            unit: unit.to_string(),
            si_unit: si_unit.to_string(),
            imperial_unit: imperial_unit.to_string(),
            us_unit: us_unit.to_string(),
        }
    }
}

const ECCODES_DEFAULTS: &[DefaultRow] = &[
    DefaultRow {
        id: 167,
        short_name: "2t",
        name: "2 metre temperature",
        description: "Temperature of air at 2 m above the surface of land, sea or inland waters",
        units: ["K", "K", "degF", "degF"],
    },
    DefaultRow {
        id: 168,
        short_name: "2d",
        name: "2 metre dewpoint temperature",
        description: "Temperature to which the air at 2 m would have to be cooled for saturation",
        units: ["K", "K", "degF", "degF"],
    },
    DefaultRow {
        id: 165,
        short_name: "10u",
        name: "10 metre U wind component",
        description: "Eastward component of the wind at a height of 10 m above the surface",
        units: ["m s-1", "m s-1", "mph", "mph"],
    },
    DefaultRow {
        id: 166,
        short_name: "10v",
        name: "10 metre V wind component",
        description: "Northward component of the wind at a height of 10 m above the surface",
        units: ["m s-1", "m s-1", "mph", "mph"],
    },
    DefaultRow {
        id: 49,
        short_name: "10fg",
        name: "Maximum 10 metre wind gust",
        description: "Maximum 3 second wind gust at 10 m height since the previous post-processing",
        units: ["m s-1", "m s-1", "mph", "mph"],
    },
    DefaultRow {
        id: 151,
        short_name: "msl",
        name: "Mean sea level pressure",
        description: "Pressure of the atmosphere adjusted to the height of mean sea level",
        units: ["Pa", "Pa", "inHg", "inHg"],
    },
    DefaultRow {
        id: 134,
        short_name: "sp",
        name: "Surface pressure",
        description: "Pressure of the atmosphere on the surface of land, sea and inland water",
        units: ["Pa", "Pa", "inHg", "inHg"],
    },
    DefaultRow {
        id: 228,
        short_name: "tp",
        name: "Total precipitation",
        description: "Accumulated liquid and frozen water that falls to the Earth's surface",
        units: ["m", "m", "in", "in"],
    },
    DefaultRow {
        id: 164,
        short_name: "tcc",
        name: "Total cloud cover",
        description: "Proportion of a grid box covered by cloud, as a fraction between 0 and 1",
        units: ["1", "1", "%", "%"],
    },
    DefaultRow {
        id: 157,
        short_name: "r",
        name: "Relative humidity",
        description: "Water vapour pressure as a percentage of the saturation vapour pressure",
        units: ["%", "%", "%", "%"],
    },
    DefaultRow {
        id: 169,
        short_name: "ssrd",
        name: "Surface short-wave (solar) radiation downwards",
        description: "Accumulated solar radiation reaching a horizontal plane at the surface",
        units: ["J m-2", "J m-2", "J m-2", "J m-2"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawCatalogEntry {
        RawCatalogEntry {
            catalog_id: 167,
            name: "2 metre temperature".to_string(),
            short_name: "2t".to_string(),
            description: "Air temperature at two metres".to_string(),
            unit: "K".to_string(),
            si_unit: "K".to_string(),
            imperial_unit: "degF".to_string(),
            us_unit: "degF".to_string(),
        }
    }

    #[test]
    fn test_entry_validation() {
        assert!(CatalogEntry::new(raw()).is_ok());

        for bad_id in [0, 255, 1000] {
            let err = CatalogEntry::new(RawCatalogEntry {
                catalog_id: bad_id,
                ..raw()
            })
            .unwrap_err();
            assert!(err.to_string().contains("1..=254"), "{}", err);
        }

        let err = CatalogEntry::new(RawCatalogEntry {
            name: "temp".to_string(),
            ..raw()
        })
        .unwrap_err();
        assert!(err.to_string().contains("name"));

        assert!(CatalogEntry::new(RawCatalogEntry {
            short_name: "too_long_name".to_string(),
            ..raw()
        })
        .is_err());
        assert!(CatalogEntry::new(RawCatalogEntry {
            us_unit: String::new(),
            ..raw()
        })
        .is_err());
    }

    #[test]
    fn test_unit_for_system() {
        let entry = CatalogEntry::new(raw()).unwrap();
        assert_eq!(entry.unit_for(UnitSystem::Original), "K");
        assert_eq!(entry.unit_for(UnitSystem::Si), "K");
        assert_eq!(entry.unit_for(UnitSystem::Imperial), "degF");
        assert_eq!(entry.unit_for(UnitSystem::Us), "degF");
    }

    #[test]
    fn test_defaults_are_valid() {
        let catalog = ParameterCatalog::eccodes_defaults().unwrap();
        assert_eq!(catalog.len(), ECCODES_DEFAULTS.len());
        assert_eq!(catalog.get("2t").unwrap().catalog_id(), 167);
        assert_eq!(catalog.get_by_id(151).unwrap().short_name(), "msl");
        assert!(catalog.get("nope").is_none());
        assert!(matches!(
            catalog.require("nope"),
            Err(HarmonizeError::UnknownCatalogEntry(_))
        ));
    }

    #[test]
    fn test_duplicates_rejected() {
        let entry = CatalogEntry::new(raw()).unwrap();
        let mut catalog = ParameterCatalog::new();
        catalog.insert(entry.clone()).unwrap();
        assert!(catalog.insert(entry).is_err());

        let same_id = CatalogEntry::new(RawCatalogEntry {
            short_name: "t2".to_string(),
            ..raw()
        })
        .unwrap();
        assert!(catalog.insert(same_id).unwrap_err().to_string().contains("167"));
    }

    #[test]
    fn test_yaml_catalog() {
        let yaml = r#"
entries:
  - catalog_id: 228
    name: Total precipitation
    short_name: tp
    description: Accumulated precipitation at the surface
    unit: m
    si_unit: m
    imperial_unit: in
    us_unit: in
"#;
        let catalog = ParameterCatalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.get("tp").unwrap().unit_for(UnitSystem::Us), "in");

        let invalid = yaml.replace("catalog_id: 228", "catalog_id: 300");
        assert!(ParameterCatalog::from_yaml_str(&invalid).is_err());
    }
}
