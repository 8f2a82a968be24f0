//! Fetch requests and the download requests derived from them.

use serde::{Deserialize, Serialize};

use forge_common::{LeadTimePeriod, LocationFilter, TimePeriod};
use forge_units::UnitSystem;

/// Which declared parameters a caller wants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSelection {
    #[default]
    All,
    Ids(Vec<String>),
}

impl ParameterSelection {
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParameterSelection::Ids(ids.into_iter().map(Into::into).collect())
    }
}

/// One call to [`Model::fetch`](crate::Model::fetch).
///
/// Stages may normalize the request (a single location becomes a list) as
/// it passes through the chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub parameters: ParameterSelection,
    #[serde(default)]
    pub location: Option<LocationFilter>,
    #[serde(default)]
    pub historical_period: Option<TimePeriod>,
    #[serde(default)]
    pub forecast_period: Option<LeadTimePeriod>,
    #[serde(default)]
    pub unit_system: UnitSystem,
}

impl FetchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = ParameterSelection::ids(ids);
        self
    }

    pub fn with_location(mut self, location: impl Into<LocationFilter>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_historical_period(mut self, period: TimePeriod) -> Self {
        self.historical_period = Some(period);
        self
    }

    pub fn with_forecast_period(mut self, period: LeadTimePeriod) -> Self {
        self.forecast_period = Some(period);
        self
    }

    pub fn with_unit_system(mut self, system: UnitSystem) -> Self {
        self.unit_system = system;
        self
    }

    /// Names of the filters this request sets.
    pub fn filters(&self) -> Vec<&'static str> {
        let mut filters = Vec::new();
        if self.location.is_some() {
            filters.push("location");
        }
        if self.forecast_period.is_some() {
            filters.push("forecast_period");
        }
        if self.historical_period.is_some() {
            filters.push("historical_period");
        }
        filters
    }
}

/// What the download collaborator is asked for, after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub model_id: String,
    /// Resolved parameter ids, in declaration order
    pub parameters: Vec<String>,
    pub location: Option<LocationFilter>,
    pub historical_period: Option<TimePeriod>,
    pub forecast_period: Option<LeadTimePeriod>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_common::Location;

    #[test]
    fn test_builder_and_filters() {
        let request = FetchRequest::new()
            .with_parameters(["t2m"])
            .with_location(Location::wgs84(5.0, 5.0).unwrap())
            .with_forecast_period(LeadTimePeriod::hours(0, 24));

        assert_eq!(request.parameters, ParameterSelection::Ids(vec!["t2m".to_string()]));
        assert_eq!(request.filters(), vec!["location", "forecast_period"]);
        assert_eq!(request.unit_system, UnitSystem::Si);
        assert!(FetchRequest::new().filters().is_empty());
    }

    #[test]
    fn test_request_from_json() {
        let request: FetchRequest = serde_json::from_str(
            r#"{
                "parameters": {"ids": ["t2m", "wind"]},
                "location": {"point": {"x": 52.1, "y": 5.2}},
                "forecast_period": "0h/24h",
                "unit_system": "imperial"
            }"#,
        )
        .unwrap();
        assert_eq!(request.unit_system, UnitSystem::Imperial);
        assert_eq!(request.forecast_period, Some(LeadTimePeriod::hours(0, 24)));
        assert!(matches!(request.location, Some(LocationFilter::Point(_))));
    }
}
