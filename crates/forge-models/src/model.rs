//! Models: identity, parameters and a fetch chain.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

use forge_common::{AllowedArea, LeadTimePeriod, TimePeriod};
use forge_units::HarmonizedParameter;

use crate::capability::{Capability, CapabilitySet};
use crate::composer::{CapabilityConfig, ModelComposer};
use crate::error::{ForgeError, Result};
use crate::identity::ModelIdentity;
use crate::observer::{Stage, StageObserver, TracingObserver};
use crate::processing::{Downloader, HarmonizedResult, HarmonizingProcessor, Processor};
use crate::request::{DownloadRequest, FetchRequest, ParameterSelection};
use crate::stage::FetchStage;

/// Filters a model accepts, as reported to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SupportedFilters {
    /// "polygon" or "points" when the model is spatial
    pub location: Option<&'static str>,
    pub forecast_period: bool,
    pub historical_period: bool,
}

impl SupportedFilters {
    pub fn accepts(&self, filter: &str) -> bool {
        match filter {
            "location" => self.location.is_some(),
            "forecast_period" => self.forecast_period,
            "historical_period" => self.historical_period,
            _ => false,
        }
    }
}

/// A meteorological model with a fixed, validated fetch chain.
///
/// Models are immutable once built and can be shared between tasks.
pub struct Model {
    identity: ModelIdentity,
    parameters: Vec<HarmonizedParameter>,
    capabilities: CapabilitySet,
    config: CapabilityConfig,
    stages: Vec<Box<dyn FetchStage>>,
    downloader: Arc<dyn Downloader>,
    processor: Arc<dyn Processor>,
    observer: Arc<dyn StageObserver>,
}

impl Model {
    pub fn builder(identity: ModelIdentity) -> ModelBuilder {
        ModelBuilder::new(identity)
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }

    pub fn identity(&self) -> &ModelIdentity {
        &self.identity
    }

    pub fn metadata(&self) -> [(&'static str, &str); 5] {
        self.identity.metadata()
    }

    pub fn parameters(&self) -> &[HarmonizedParameter] {
        &self.parameters
    }

    pub fn parameter(&self, id: &str) -> Option<&HarmonizedParameter> {
        self.parameters.iter().find(|p| p.id() == id)
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    pub fn allowed_area(&self) -> Option<&AllowedArea> {
        self.config.allowed_area.as_ref()
    }

    pub fn forecast_horizon(&self) -> Option<LeadTimePeriod> {
        self.config.forecast_horizon
    }

    pub fn supported_historical_period(&self) -> Option<TimePeriod> {
        self.config.historical_period
    }

    pub fn supported_filters(&self) -> SupportedFilters {
        SupportedFilters {
            location: self.allowed_area().map(AllowedArea::filter_kind),
            forecast_period: self.capabilities.contains(Capability::Predictive),
            historical_period: self.capabilities.contains(Capability::Historical),
        }
    }

    /// Validate `request` through the capability chain, download, and
    /// harmonize the result into the requested unit system.
    ///
    /// Stages run in chain order and the first failure aborts the fetch;
    /// the downloader is only reached when every stage passed.
    #[instrument(skip(self, request), fields(model = %self.identity.id()))]
    pub async fn fetch(&self, mut request: FetchRequest) -> Result<HarmonizedResult> {
        let model = self.identity.id();

        for stage in &self.stages {
            self.run_stage(stage.stage(), || stage.apply(model, &mut request))?;
        }

        let parameters = self.run_stage(Stage::Parameters, || self.resolve_parameters(&request))?;

        let download_request = DownloadRequest {
            model_id: model.to_string(),
            parameters: parameters.iter().map(|p| p.id().to_string()).collect(),
            location: request.location.clone(),
            historical_period: request.historical_period,
            forecast_period: request.forecast_period,
        };

        self.observer.stage_entered(model, Stage::Download);
        let payload = match self.downloader.download(&download_request).await {
            Ok(payload) => payload,
            Err(source) => {
                let err = ForgeError::DownloadFailed {
                    model: model.to_string(),
                    source,
                };
                self.observer.stage_failed(model, Stage::Download, &err);
                return Err(err);
            }
        };
        self.observer.stage_passed(model, Stage::Download);

        let result = self.run_stage(Stage::Process, || {
            self.processor.process(payload, &parameters, request.unit_system)
        })?;

        info!(
            parameters = result.series.len(),
            unit_system = %result.unit_system,
            "Fetched model data"
        );
        Ok(result)
    }

    fn run_stage<T>(&self, stage: Stage, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let model = self.identity.id();
        self.observer.stage_entered(model, stage);
        match f() {
            Ok(value) => {
                self.observer.stage_passed(model, stage);
                Ok(value)
            }
            Err(err) => {
                self.observer.stage_failed(model, stage, &err);
                Err(err)
            }
        }
    }

    /// Check requested ids and filters against what the model declares.
    fn resolve_parameters(&self, request: &FetchRequest) -> Result<Vec<&HarmonizedParameter>> {
        let supported = self.supported_filters();
        if let Some(filter) = request.filters().into_iter().find(|f| !supported.accepts(f)) {
            return Err(ForgeError::UnsupportedFilter {
                model: self.id().to_string(),
                filter: filter.to_string(),
            });
        }

        match &request.parameters {
            ParameterSelection::All => Ok(self.parameters.iter().collect()),
            ParameterSelection::Ids(ids) if ids.is_empty() => {
                Err(ForgeError::MissingFilter("parameters".to_string()))
            }
            ParameterSelection::Ids(ids) => {
                let mut seen = HashSet::new();
                let mut resolved = Vec::with_capacity(ids.len());
                for id in ids {
                    let parameter = self.parameter(id).ok_or_else(|| ForgeError::UnknownParameter {
                        model: self.id().to_string(),
                        parameter: id.clone(),
                    })?;
                    if seen.insert(parameter.id()) {
                        resolved.push(parameter);
                    }
                }
                Ok(resolved)
            }
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForgeModel<{}>", self.identity.id())
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("identity", &self.identity)
            .field("parameters", &self.parameters)
            .field("capabilities", &self.capabilities)
            .field("stages", &self.stages)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Model`]; all validation happens in [`ModelBuilder::build`].
pub struct ModelBuilder {
    identity: ModelIdentity,
    parameters: Vec<HarmonizedParameter>,
    capabilities: CapabilitySet,
    config: CapabilityConfig,
    downloader: Option<Arc<dyn Downloader>>,
    processor: Option<Arc<dyn Processor>>,
    observer: Option<Arc<dyn StageObserver>>,
}

impl ModelBuilder {
    pub fn new(identity: ModelIdentity) -> Self {
        Self {
            identity,
            parameters: Vec::new(),
            capabilities: CapabilitySet::new(),
            config: CapabilityConfig::default(),
            downloader: None,
            processor: None,
            observer: None,
        }
    }

    pub fn parameter(mut self, parameter: HarmonizedParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameters(mut self, parameters: impl IntoIterator<Item = HarmonizedParameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        for capability in capabilities {
            self.capabilities.insert(capability);
        }
        self
    }

    pub fn allowed_area(mut self, area: AllowedArea) -> Self {
        self.config.allowed_area = Some(area);
        self
    }

    pub fn forecast_horizon(mut self, horizon: LeadTimePeriod) -> Self {
        self.config.forecast_horizon = Some(horizon);
        self
    }

    pub fn historical_period(mut self, period: TimePeriod) -> Self {
        self.config.historical_period = Some(period);
        self
    }

    pub fn downloader(mut self, downloader: Arc<dyn Downloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    pub fn processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> Result<Model> {
        let model = self.identity.id().to_string();

        if self.parameters.is_empty() {
            return Err(ForgeError::Config(format!("model '{}' declares no parameters", model)));
        }
        let mut ids = HashSet::new();
        if let Some(duplicate) = self.parameters.iter().find(|p| !ids.insert(p.id())) {
            return Err(ForgeError::Config(format!(
                "model '{}' declares parameter '{}' twice",
                model,
                duplicate.id()
            )));
        }

        let stages = ModelComposer::compose(&self.capabilities, self.config.clone())?;

        let downloader = self
            .downloader
            .ok_or_else(|| ForgeError::Config(format!("model '{}' has no downloader", model)))?;

        let config = CapabilityConfig {
            allowed_area: self.config.allowed_area.filter(|_| self.capabilities.contains(Capability::Spatial)),
            forecast_horizon: self
                .config
                .forecast_horizon
                .filter(|_| self.capabilities.contains(Capability::Predictive)),
            historical_period: self
                .config
                .historical_period
                .filter(|_| self.capabilities.contains(Capability::Historical)),
        };

        let processor: Arc<dyn Processor> = match self.processor {
            Some(processor) => processor,
            None => Arc::new(HarmonizingProcessor::new()),
        };
        let observer: Arc<dyn StageObserver> = match self.observer {
            Some(observer) => observer,
            None => Arc::new(TracingObserver),
        };

        Ok(Model {
            identity: self.identity,
            parameters: self.parameters,
            capabilities: self.capabilities,
            config,
            stages,
            downloader,
            processor,
            observer,
        })
    }
}
