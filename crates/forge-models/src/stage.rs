//! Filter stages that validate a request before download.
//!
//! Each capability contributes one stage. A stage inspects the request,
//! may normalize it, and fails with the first violation it finds.

use std::fmt;

use forge_common::{AllowedArea, LeadTimePeriod, TimePeriod};

use crate::capability::Capability;
use crate::error::{ForgeError, Result};
use crate::observer::Stage;
use crate::request::FetchRequest;

/// One link of a model's fetch chain.
pub trait FetchStage: Send + Sync + fmt::Debug {
    fn capability(&self) -> Capability;

    fn stage(&self) -> Stage;

    /// Validate (and possibly normalize) `request` for model `model`.
    fn apply(&self, model: &str, request: &mut FetchRequest) -> Result<()>;
}

/// Whether a temporal stage insists on its own period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodRequirement {
    /// The period must be supplied
    Mandatory,
    /// The model has both temporal capabilities; at least one period must be supplied
    EitherTemporal,
}

/// Restricts requests to an allowed area.
#[derive(Debug, Clone)]
pub struct SpatialStage {
    allowed_area: AllowedArea,
}

impl SpatialStage {
    pub fn new(allowed_area: AllowedArea) -> Self {
        Self { allowed_area }
    }

    pub fn allowed_area(&self) -> &AllowedArea {
        &self.allowed_area
    }
}

impl FetchStage for SpatialStage {
    fn capability(&self) -> Capability {
        Capability::Spatial
    }

    fn stage(&self) -> Stage {
        Stage::Spatial
    }

    /// Area filters are checked through their vertices.
    fn apply(&self, model: &str, request: &mut FetchRequest) -> Result<()> {
        let filter = match request.location.take() {
            Some(filter) if !filter.is_empty() => filter,
            _ => return Err(ForgeError::MissingFilter("location".to_string())),
        };

        if let Some(outside) = filter
            .locations()
            .iter()
            .find(|location| !self.allowed_area.allows(location))
        {
            return Err(ForgeError::LocationNotAllowed {
                model: model.to_string(),
                location: outside.to_string(),
            });
        }

        request.location = Some(filter.normalized());
        Ok(())
    }
}

/// Restricts forecast requests to the model's horizon.
#[derive(Debug, Clone)]
pub struct PredictiveStage {
    horizon: LeadTimePeriod,
    requirement: PeriodRequirement,
}

impl PredictiveStage {
    pub fn new(horizon: LeadTimePeriod, requirement: PeriodRequirement) -> Self {
        Self { horizon, requirement }
    }

    pub fn horizon(&self) -> LeadTimePeriod {
        self.horizon
    }
}

impl FetchStage for PredictiveStage {
    fn capability(&self) -> Capability {
        Capability::Predictive
    }

    fn stage(&self) -> Stage {
        Stage::Predictive
    }

    fn apply(&self, _model: &str, request: &mut FetchRequest) -> Result<()> {
        let Some(period) = request.forecast_period else {
            return match self.requirement {
                PeriodRequirement::Mandatory => {
                    Err(ForgeError::MissingFilter("forecast_period".to_string()))
                }
                PeriodRequirement::EitherTemporal if request.historical_period.is_none() => Err(
                    ForgeError::MissingFilter("forecast_period or historical_period".to_string()),
                ),
                PeriodRequirement::EitherTemporal => Ok(()),
            };
        };

        let period = period.validate()?;
        if !period.is_within(&self.horizon) {
            return Err(ForgeError::ForecastPeriodOutOfHorizon {
                requested: period.to_string(),
                horizon: self.horizon.to_string(),
            });
        }
        Ok(())
    }
}

/// Restricts historical requests to the period the model covers.
#[derive(Debug, Clone)]
pub struct HistoricalStage {
    supported: TimePeriod,
    requirement: PeriodRequirement,
}

impl HistoricalStage {
    pub fn new(supported: TimePeriod, requirement: PeriodRequirement) -> Self {
        Self {
            supported,
            requirement,
        }
    }

    pub fn supported_period(&self) -> TimePeriod {
        self.supported
    }
}

impl FetchStage for HistoricalStage {
    fn capability(&self) -> Capability {
        Capability::Historical
    }

    fn stage(&self) -> Stage {
        Stage::Historical
    }

    fn apply(&self, _model: &str, request: &mut FetchRequest) -> Result<()> {
        let Some(period) = request.historical_period else {
            return match self.requirement {
                PeriodRequirement::Mandatory => {
                    Err(ForgeError::MissingFilter("historical_period".to_string()))
                }
                // the forecast stage already required one of the two
                PeriodRequirement::EitherTemporal => Ok(()),
            };
        };

        let period = period.validate()?;
        if !period.is_within(&self.supported) {
            return Err(ForgeError::HistoricalPeriodUnsupported {
                requested: period.to_string(),
                supported: self.supported.to_string(),
            });
        }
        Ok(())
    }
}
