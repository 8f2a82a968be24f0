//! Download and processing collaborators of a model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use forge_units::{DimensionalConverter, HarmonizedParameter, ParameterHarmonizer, UnitConverter, UnitSystem};

use crate::error::{BoxError, ForgeError, Result};
use crate::request::DownloadRequest;

/// Data as delivered by a provider, in each parameter's base unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    #[serde(default)]
    pub times: Vec<DateTime<Utc>>,
    /// Values keyed by parameter id
    pub series: BTreeMap<String, Vec<f64>>,
}

impl RawPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_times(mut self, times: Vec<DateTime<Utc>>) -> Self {
        self.times = times;
        self
    }

    pub fn with_series(mut self, parameter: impl Into<String>, values: Vec<f64>) -> Self {
        self.series.insert(parameter.into(), values);
        self
    }
}

/// One parameter's values after harmonization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonizedSeries {
    pub unit: String,
    pub values: Vec<f64>,
}

/// The outcome of a successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonizedResult {
    pub unit_system: UnitSystem,
    pub times: Vec<DateTime<Utc>>,
    /// Series keyed by parameter id
    pub series: BTreeMap<String, HarmonizedSeries>,
}

impl HarmonizedResult {
    pub fn get(&self, parameter: &str) -> Option<&HarmonizedSeries> {
        self.series.get(parameter)
    }
}

/// Fetches raw data for a validated request.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, request: &DownloadRequest) -> std::result::Result<RawPayload, BoxError>;
}

/// Turns a raw payload into harmonized series.
pub trait Processor: Send + Sync {
    fn process(
        &self,
        payload: RawPayload,
        parameters: &[&HarmonizedParameter],
        system: UnitSystem,
    ) -> Result<HarmonizedResult>;
}

/// Default processor: converts each requested series from its base unit
/// into the target unit system.
#[derive(Debug, Clone, Default)]
pub struct HarmonizingProcessor<C = DimensionalConverter> {
    harmonizer: ParameterHarmonizer<C>,
}

impl HarmonizingProcessor<DimensionalConverter> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: UnitConverter> HarmonizingProcessor<C> {
    pub fn with_harmonizer(harmonizer: ParameterHarmonizer<C>) -> Self {
        Self { harmonizer }
    }
}

impl<C: UnitConverter> Processor for HarmonizingProcessor<C> {
    fn process(
        &self,
        mut payload: RawPayload,
        parameters: &[&HarmonizedParameter],
        system: UnitSystem,
    ) -> Result<HarmonizedResult> {
        let mut series = BTreeMap::new();

        for parameter in parameters {
            let raw = payload
                .series
                .remove(parameter.id())
                .ok_or_else(|| ForgeError::MissingSeries(parameter.id().to_string()))?;

            let values = parameter.from_base(&raw, system, &self.harmonizer)?;
            debug!(
                parameter = parameter.id(),
                from = parameter.base_unit(),
                to = parameter.unit_for(system),
                count = values.len(),
                "Harmonized series"
            );

            series.insert(
                parameter.id().to_string(),
                HarmonizedSeries {
                    unit: parameter.unit_for(system).to_string(),
                    values,
                },
            );
        }

        if !payload.series.is_empty() {
            debug!(
                extra = ?payload.series.keys().collect::<Vec<_>>(),
                "Dropping series that were not requested"
            );
        }

        Ok(HarmonizedResult {
            unit_system: system,
            times: payload.times,
            series,
        })
    }
}
