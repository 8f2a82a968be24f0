//! Assembly of fetch chains from capability sets.

use tracing::warn;

use forge_common::{AllowedArea, LeadTimePeriod, TimePeriod};

use crate::capability::{Capability, CapabilitySet};
use crate::error::{ForgeError, Result};
use crate::stage::{FetchStage, HistoricalStage, PeriodRequirement, PredictiveStage, SpatialStage};

/// Configuration consumed by the capability stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityConfig {
    pub allowed_area: Option<AllowedArea>,
    pub forecast_horizon: Option<LeadTimePeriod>,
    pub historical_period: Option<TimePeriod>,
}

/// Builds the ordered stage chain for a capability set.
///
/// Only the combinations in [`ModelComposer::LEGAL_COMBINATIONS`] are
/// accepted. Stages always run spatial first, then forecast, then
/// historical.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelComposer;

impl ModelComposer {
    pub const LEGAL_COMBINATIONS: &'static [&'static [Capability]] = &[
        &[],
        &[Capability::Spatial],
        &[Capability::Spatial, Capability::Predictive],
        &[Capability::Spatial, Capability::Historical],
        &[Capability::Spatial, Capability::Predictive, Capability::Historical],
    ];

    pub fn is_legal(capabilities: &CapabilitySet) -> bool {
        Self::LEGAL_COMBINATIONS
            .iter()
            .any(|combo| combo.iter().copied().collect::<CapabilitySet>() == *capabilities)
    }

    pub fn compose(
        capabilities: &CapabilitySet,
        config: CapabilityConfig,
    ) -> Result<Vec<Box<dyn FetchStage>>> {
        if !Self::is_legal(capabilities) {
            return Err(ForgeError::UnsupportedCapabilityCombination(format!(
                "{} (a model needs the spatial capability before forecast or historical)",
                capabilities
            )));
        }

        let CapabilityConfig {
            allowed_area,
            forecast_horizon,
            historical_period,
        } = config;

        warn_unused(capabilities, Capability::Spatial, allowed_area.is_some(), "allowed_area");
        warn_unused(
            capabilities,
            Capability::Predictive,
            forecast_horizon.is_some(),
            "forecast_horizon",
        );
        warn_unused(
            capabilities,
            Capability::Historical,
            historical_period.is_some(),
            "historical_period",
        );

        let requirement = if capabilities.contains(Capability::Predictive)
            && capabilities.contains(Capability::Historical)
        {
            PeriodRequirement::EitherTemporal
        } else {
            PeriodRequirement::Mandatory
        };

        let mut stages: Vec<Box<dyn FetchStage>> = Vec::new();
        for capability in capabilities.iter() {
            match capability {
                Capability::Spatial => {
                    let area = allowed_area.clone().ok_or(ForgeError::MissingCapabilityConfig {
                        capability,
                        config: "an allowed area",
                    })?;
                    stages.push(Box::new(SpatialStage::new(area)));
                }
                Capability::Predictive => {
                    let horizon = forecast_horizon.ok_or(ForgeError::MissingCapabilityConfig {
                        capability,
                        config: "a forecast horizon",
                    })?;
                    stages.push(Box::new(PredictiveStage::new(horizon.validate()?, requirement)));
                }
                Capability::Historical => {
                    let supported = historical_period.ok_or(ForgeError::MissingCapabilityConfig {
                        capability,
                        config: "a supported historical period",
                    })?;
                    stages.push(Box::new(HistoricalStage::new(supported.validate()?, requirement)));
                }
            }
        }

        Ok(stages)
    }
}

fn warn_unused(capabilities: &CapabilitySet, capability: Capability, present: bool, field: &str) {
    if present && !capabilities.contains(capability) {
        warn!(
            capability = %capability,
            field,
            "Ignoring configuration for a capability the model does not have"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_common::{GeoError, Location};

    fn config() -> CapabilityConfig {
        CapabilityConfig {
            allowed_area: Some(AllowedArea::Locations(vec![Location::wgs84(52.0, 5.0).unwrap()])),
            forecast_horizon: Some(LeadTimePeriod::hours(0, 48)),
            historical_period: Some(
                TimePeriod::parse("2000-01-01T00:00:00Z/2020-01-01T00:00:00Z").unwrap(),
            ),
        }
    }

    fn set(capabilities: &[Capability]) -> CapabilitySet {
        capabilities.iter().copied().collect()
    }

    #[test]
    fn test_every_legal_combination_composes_in_order() {
        for combo in ModelComposer::LEGAL_COMBINATIONS {
            let stages = ModelComposer::compose(&set(combo), config()).unwrap();
            let order: Vec<Capability> = stages.iter().map(|s| s.capability()).collect();
            assert_eq!(order.as_slice(), *combo);
        }
    }

    #[test]
    fn test_illegal_combinations_rejected() {
        for combo in [
            vec![Capability::Predictive],
            vec![Capability::Historical],
            vec![Capability::Predictive, Capability::Historical],
        ] {
            let err = ModelComposer::compose(&set(&combo), config()).unwrap_err();
            assert!(
                matches!(err, ForgeError::UnsupportedCapabilityCombination(_)),
                "{:?}",
                combo
            );
        }
    }

    #[test]
    fn test_missing_config() {
        let err = ModelComposer::compose(
            &set(&[Capability::Spatial, Capability::Predictive]),
            CapabilityConfig {
                forecast_horizon: None,
                ..config()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ForgeError::MissingCapabilityConfig {
                capability: Capability::Predictive,
                ..
            }
        ));

        let err = ModelComposer::compose(&set(&[Capability::Spatial]), CapabilityConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("allowed area"));
    }

    #[test]
    fn test_invalid_horizon_rejected_at_build() {
        let err = ModelComposer::compose(
            &set(&[Capability::Spatial, Capability::Predictive]),
            CapabilityConfig {
                forecast_horizon: Some(LeadTimePeriod::hours(72, 0)),
                ..config()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ForgeError::Geo(GeoError::InvalidPeriod(_))));
    }

    #[test]
    fn test_unused_config_ignored() {
        let stages = ModelComposer::compose(&CapabilitySet::new(), config()).unwrap();
        assert!(stages.is_empty());
    }
}
