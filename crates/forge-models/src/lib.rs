//! Capability-composed meteorological models.
//!
//! A [`Model`] combines an identity, a list of harmonized parameters and an
//! ordered chain of filter stages derived from its capabilities:
//!
//! - **spatial**: requests must name locations inside an allowed area
//! - **forecast**: requests carry a lead time window within a horizon
//! - **historical**: requests carry a time window within a supported period
//!
//! Fetching runs the stages in that order, resolves the requested
//! parameters, hands a [`DownloadRequest`] to the model's [`Downloader`]
//! and converts the result into the requested unit system.
//!
//! # Example
//!
//! ```ignore
//! let model = Model::builder(identity)
//!     .capabilities([Capability::Spatial, Capability::Predictive])
//!     .allowed_area(area)
//!     .forecast_horizon(LeadTimePeriod::hours(0, 72))
//!     .parameter(t2m)
//!     .downloader(Arc::new(my_downloader))
//!     .build()?;
//!
//! let result = model
//!     .fetch(
//!         FetchRequest::new()
//!             .with_location(Location::wgs84(52.1, 5.2)?)
//!             .with_forecast_period(LeadTimePeriod::hours(0, 24)),
//!     )
//!     .await?;
//! ```

pub mod capability;
pub mod composer;
pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod observer;
pub mod processing;
pub mod provider;
pub mod request;
pub mod stage;

pub use capability::{Capability, CapabilitySet};
pub use composer::{CapabilityConfig, ModelComposer};
pub use config::{load_provider_dir, ModelDefinition, ParameterDefinition, ProviderDefinition};
pub use error::{BoxError, ForgeError, Result};
pub use identity::{ModelIdentity, RawIdentity};
pub use model::{Model, ModelBuilder, SupportedFilters};
pub use observer::{Stage, StageObserver, TracingObserver};
pub use processing::{
    Downloader, HarmonizedResult, HarmonizedSeries, HarmonizingProcessor, Processor, RawPayload,
};
pub use provider::{Provider, ProviderManager};
pub use request::{DownloadRequest, FetchRequest, ParameterSelection};
pub use stage::{FetchStage, HistoricalStage, PeriodRequirement, PredictiveStage, SpatialStage};
