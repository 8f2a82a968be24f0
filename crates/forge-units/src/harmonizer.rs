//! Conversion of parameter values between unit systems.

use std::fmt;
use std::sync::Arc;
use tracing::trace;

use forge_common::naming::{check_identifier, check_length};

use crate::catalog::CatalogEntry;
use crate::convert::{DimensionalConverter, UnitConverter};
use crate::error::{HarmonizeError, HarmonizeResult};
use crate::system::UnitSystem;

/// Moves values between the unit systems of a catalog entry.
///
/// The harmonizer only picks unit strings; all arithmetic is delegated to the
/// converter.
#[derive(Debug, Clone, Default)]
pub struct ParameterHarmonizer<C = DimensionalConverter> {
    converter: C,
}

impl ParameterHarmonizer<DimensionalConverter> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: UnitConverter> ParameterHarmonizer<C> {
    pub fn with_converter(converter: C) -> Self {
        Self { converter }
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Convert `value`, expressed in `from`'s unit for `entry`, to `to`'s unit.
    pub fn to_system(
        &self,
        value: f64,
        entry: &CatalogEntry,
        from: UnitSystem,
        to: UnitSystem,
    ) -> HarmonizeResult<f64> {
        if from == to {
            return Ok(value);
        }
        self.converter
            .convert(value, entry.unit_for(from), entry.unit_for(to))
    }

    /// Slice form of [`to_system`](Self::to_system).
    pub fn to_system_all(
        &self,
        values: &[f64],
        entry: &CatalogEntry,
        from: UnitSystem,
        to: UnitSystem,
    ) -> HarmonizeResult<Vec<f64>> {
        if from == to {
            return Ok(values.to_vec());
        }
        trace!(
            parameter = entry.short_name(),
            from = %from,
            to = %to,
            count = values.len(),
            "Harmonizing values"
        );
        self.converter
            .convert_all(values, entry.unit_for(from), entry.unit_for(to))
    }

    /// Convert between explicit unit strings.
    pub fn convert_units(&self, values: &[f64], from: &str, to: &str) -> HarmonizeResult<Vec<f64>> {
        if from == to {
            return Ok(values.to_vec());
        }
        self.converter.convert_all(values, from, to)
    }
}

/// A model parameter linked to a catalog entry.
///
/// `base_unit` is the unit the provider delivers raw data in; it may differ
/// from every unit of the catalog entry (e.g. `hPa` for a `Pa` entry).
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonizedParameter {
    id: String,
    catalog_entry: Arc<CatalogEntry>,
    base_unit: String,
}

impl HarmonizedParameter {
    pub fn new(
        id: impl Into<String>,
        catalog_entry: Arc<CatalogEntry>,
        base_unit: impl Into<String>,
    ) -> HarmonizeResult<Self> {
        let id = id.into();
        let base_unit = base_unit.into();

        check_identifier("parameter id", &id, 2, 12).map_err(HarmonizeError::InvalidParameter)?;
        check_length("base_unit", &base_unit, 1, 20).map_err(HarmonizeError::InvalidParameter)?;

        Ok(Self {
            id,
            catalog_entry,
            base_unit,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn catalog_entry(&self) -> &Arc<CatalogEntry> {
        &self.catalog_entry
    }

    pub fn base_unit(&self) -> &str {
        &self.base_unit
    }

    /// Unit used for this parameter in `system`; `Original` is the base unit.
    pub fn unit_for(&self, system: UnitSystem) -> &str {
        match system {
            UnitSystem::Original => &self.base_unit,
            other => self.catalog_entry.unit_for(other),
        }
    }

    /// Convert raw values in the base unit into `system`.
    pub fn from_base<C: UnitConverter>(
        &self,
        values: &[f64],
        system: UnitSystem,
        harmonizer: &ParameterHarmonizer<C>,
    ) -> HarmonizeResult<Vec<f64>> {
        harmonizer.convert_units(values, &self.base_unit, self.unit_for(system))
    }

    /// Convert values expressed in `system` back into the base unit.
    pub fn to_base<C: UnitConverter>(
        &self,
        values: &[f64],
        system: UnitSystem,
        harmonizer: &ParameterHarmonizer<C>,
    ) -> HarmonizeResult<Vec<f64>> {
        harmonizer.convert_units(values, self.unit_for(system), &self.base_unit)
    }
}

impl fmt::Display for HarmonizedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.id,
            self.catalog_entry.short_name(),
            self.base_unit
        )
    }
}
