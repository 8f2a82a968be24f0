//! Subcommand handlers. Each returns the JSON document to print.

use anyhow::{bail, Context, Result};
use clap::Args;
use forge_common::{BuiltinCrsRegistry, CrsRegistry, LeadTimePeriod, Location, LocationValidator, TimePeriod};
use forge_models::{FetchRequest, Model};
use forge_units::{CatalogEntry, DimensionalConverter, ParameterHarmonizer, UnitConverter, UnitSystem};
use serde_json::{json, Value};

use crate::registry::{load_catalog, load_manager, Settings};

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Model path as `provider/model`
    pub model: String,

    /// Location as `x,y`; repeat for several locations
    #[arg(long = "location", allow_hyphen_values = true)]
    pub locations: Vec<String>,

    #[arg(long, default_value = "EPSG:4326")]
    pub crs: String,

    /// Forecast lead time window, e.g. `0/24` or `+0h/+24h`
    #[arg(long)]
    pub forecast: Option<String>,

    /// Historical window as `start/end` in RFC 3339
    #[arg(long)]
    pub historical: Option<String>,

    /// Parameter ids (default: all)
    #[arg(long, value_delimiter = ',')]
    pub parameters: Vec<String>,

    /// Unit system: original, si, imperial or us
    #[arg(long, default_value = "si")]
    pub units: String,
}

pub fn validate_location(x: &str, y: &str, crs: &str) -> Result<Value> {
    let location = LocationValidator::builtin().validate_str(x, y, crs)?;
    Ok(location_json(&location))
}

fn location_json(location: &Location) -> Value {
    let (cx, cy) = location.canonical().xy();
    json!({
        "x": location.x(),
        "y": location.y(),
        "crs": location.crs().to_string(),
        "canonical": [cx, cy],
    })
}

pub fn list_crs() -> Value {
    let registry = BuiltinCrsRegistry;
    let systems: Vec<Value> = BuiltinCrsRegistry::known_codes()
        .iter()
        .filter_map(|code| registry.resolve(code).ok())
        .map(|definition| {
            json!({
                "code": definition.code.to_string(),
                "name": definition.name,
                "kind": definition.kind.to_string(),
                "deprecated": definition.deprecated,
            })
        })
        .collect();
    Value::Array(systems)
}

pub fn convert(from: &str, to: &str, values: &[f64]) -> Result<Value> {
    let converter = DimensionalConverter;
    let converted = converter.convert_all(values, from, to)?;
    Ok(json!({
        "from": from,
        "to": to,
        "dimension": converter.dimension_of(from)?.to_string(),
        "values": converted,
    }))
}

pub fn harmonize(settings: &Settings, parameter: &str, from: &str, to: &str, values: &[f64]) -> Result<Value> {
    let catalog = load_catalog(settings)?;
    let entry = catalog.require(parameter)?;
    let from: UnitSystem = from.parse()?;
    let to: UnitSystem = to.parse()?;

    let harmonizer = ParameterHarmonizer::new();
    let converted = harmonizer.to_system_all(values, &entry, from, to)?;
    Ok(json!({
        "parameter": entry.short_name(),
        "from": { "system": from, "unit": entry.unit_for(from) },
        "to": { "system": to, "unit": entry.unit_for(to) },
        "values": converted,
    }))
}

pub fn show_catalog(settings: &Settings) -> Result<Value> {
    let catalog = load_catalog(settings)?;
    let entries: Vec<&CatalogEntry> = catalog.iter().map(|e| &**e).collect();
    Ok(serde_json::to_value(entries)?)
}

pub fn list_models(settings: &Settings) -> Result<Value> {
    let catalog = load_catalog(settings)?;
    let manager = load_manager(settings, &catalog)?;
    let models: Vec<Value> = manager
        .models()
        .map(|(provider, model)| {
            json!({
                "path": format!("{}/{}", provider, model.id()),
                "name": model.identity().name(),
                "capabilities": model.capabilities().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();
    Ok(Value::Array(models))
}

pub fn describe_model(settings: &Settings, path: &str) -> Result<Value> {
    let catalog = load_catalog(settings)?;
    let manager = load_manager(settings, &catalog)?;
    let model = manager.resolve(path)?;
    Ok(model_json(&model))
}

fn model_json(model: &Model) -> Value {
    let metadata: serde_json::Map<String, Value> = model
        .metadata()
        .iter()
        .map(|(key, value)| (key.to_string(), Value::from(*value)))
        .collect();
    let parameters: Vec<Value> = model
        .parameters()
        .iter()
        .map(|p| {
            json!({
                "id": p.id(),
                "catalog": p.catalog_entry().short_name(),
                "base_unit": p.base_unit(),
                "units": UnitSystem::ALL
                    .iter()
                    .map(|s| (s.as_str().to_string(), Value::from(p.unit_for(*s))))
                    .collect::<serde_json::Map<_, _>>(),
            })
        })
        .collect();

    json!({
        "metadata": metadata,
        "capabilities": model.capabilities().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        "supported_filters": model.supported_filters(),
        "forecast_horizon": model.forecast_horizon(),
        "historical_period": model.supported_historical_period(),
        "parameters": parameters,
    })
}

pub fn check_area(settings: &Settings, path: &str, x: &str, y: &str, crs: &str) -> Result<Value> {
    let catalog = load_catalog(settings)?;
    let manager = load_manager(settings, &catalog)?;
    let model = manager.resolve(path)?;
    let location = LocationValidator::builtin().validate_str(x, y, crs)?;

    let Some(area) = model.allowed_area() else {
        bail!("model '{}' has no spatial capability", path);
    };
    Ok(json!({
        "model": path,
        "location": location_json(&location),
        "allowed": area.allows(&location),
    }))
}

pub async fn fetch(settings: &Settings, args: FetchArgs) -> Result<Value> {
    let catalog = load_catalog(settings)?;
    let manager = load_manager(settings, &catalog)?;
    let model = manager.resolve(&args.model)?;

    let mut request = FetchRequest::new().with_unit_system(args.units.parse()?);
    if !args.parameters.is_empty() {
        request = request.with_parameters(args.parameters);
    }

    let validator = LocationValidator::builtin();
    let mut locations = Vec::with_capacity(args.locations.len());
    for raw in &args.locations {
        let (x, y) = raw
            .split_once(',')
            .with_context(|| format!("location '{}' must be written as x,y", raw))?;
        locations.push(validator.validate_str(x, y, &args.crs)?);
    }
    match locations.len() {
        0 => {}
        1 => request = request.with_location(locations[0]),
        _ => request = request.with_location(locations),
    }

    if let Some(forecast) = &args.forecast {
        request = request.with_forecast_period(LeadTimePeriod::parse(forecast)?);
    }
    if let Some(historical) = &args.historical {
        request = request.with_historical_period(TimePeriod::parse(historical)?);
    }

    let result = model.fetch(request).await?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_utils::{assert_approx_eq, workspace_config_dir, ConfigDir};

    fn shipped() -> Settings {
        Settings {
            config_dir: workspace_config_dir(),
            catalog_file: None,
            payload_dir: PathBuf::from("payloads"),
        }
    }

    #[test]
    fn test_validate_location_output() {
        let output = validate_location("52.1", "5.18", "EPSG:4326").unwrap();
        assert_eq!(output["crs"], "EPSG:4326");
        assert_approx_eq!(output["canonical"][0].as_f64().unwrap(), 5.18, 1e-12);
        assert!(validate_location("95", "0", "EPSG:4326").is_err());
        assert!(validate_location("abc", "0", "EPSG:4326").is_err());
    }

    #[test]
    fn test_list_crs_includes_wgs84() {
        let systems = list_crs();
        assert!(systems
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s["code"] == "EPSG:4326"));
    }

    #[test]
    fn test_convert_output() {
        let output = convert("degC", "K", &[0.0, 100.0]).unwrap();
        assert_approx_eq!(output["values"][0].as_f64().unwrap(), 273.15, 1e-9);
        assert_eq!(output["dimension"], "[temperature]");
        assert!(convert("m", "s", &[1.0]).is_err());
    }

    #[test]
    fn test_harmonize_output() {
        let output = harmonize(&shipped(), "2t", "si", "imperial", &[300.0]).unwrap();
        assert_eq!(output["to"]["unit"], "degF");
        assert_approx_eq!(output["values"][0].as_f64().unwrap(), 80.33, 1e-9);
        assert!(harmonize(&shipped(), "nope", "si", "us", &[1.0]).is_err());
        assert!(harmonize(&shipped(), "2t", "si", "martian", &[1.0]).is_err());
    }

    #[test]
    fn test_describe_model() {
        let output = describe_model(&shipped(), "knmi/harmonie").unwrap();
        assert_eq!(output["metadata"]["Name"], "Harmonie Arome");
        assert_eq!(output["supported_filters"]["location"], "polygon");
        assert_eq!(output["forecast_horizon"], "+0h/+60h");
        assert_eq!(output["parameters"][4]["units"]["original"], "hPa");
    }

    #[test]
    fn test_check_area() {
        let inside = check_area(&shipped(), "knmi/harmonie", "52.1", "5.18", "EPSG:4326").unwrap();
        assert_eq!(inside["allowed"], true);
        let outside = check_area(&shipped(), "knmi/harmonie", "40.0", "5.18", "EPSG:4326").unwrap();
        assert_eq!(outside["allowed"], false);
    }

    #[tokio::test]
    async fn test_fetch_from_payload_file() {
        let dir = ConfigDir::new().unwrap();
        dir.write(
            "payloads/knmi/harmonie.json",
            r#"{
                "times": ["2024-01-15T00:00:00Z", "2024-01-15T01:00:00Z"],
                "series": {"t2m": [273.15, 283.15], "pressure": [1013.25, 1000.0]}
            }"#,
        )
        .unwrap();
        let settings = Settings {
            payload_dir: dir.path().join("payloads"),
            ..shipped()
        };

        let output = fetch(
            &settings,
            FetchArgs {
                model: "knmi/harmonie".to_string(),
                locations: vec!["52.1,5.18".to_string()],
                crs: "EPSG:4326".to_string(),
                forecast: Some("0/24".to_string()),
                historical: None,
                parameters: vec!["t2m".to_string(), "pressure".to_string()],
                units: "si".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(output["unit_system"], "si");
        assert_eq!(output["series"]["t2m"]["unit"], "K");
        assert_eq!(output["series"]["pressure"]["unit"], "Pa");
        assert_approx_eq!(output["series"]["pressure"]["values"][0].as_f64().unwrap(), 101_325.0, 1e-6);
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_location_text() {
        let result = fetch(
            &shipped(),
            FetchArgs {
                model: "knmi/harmonie".to_string(),
                locations: vec!["52.1;5.18".to_string()],
                crs: "EPSG:4326".to_string(),
                forecast: Some("0/24".to_string()),
                historical: None,
                parameters: Vec::new(),
                units: "si".to_string(),
            },
        )
        .await;
        assert!(result.is_err());
    }
}
