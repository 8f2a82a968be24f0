//! Provider registry and YAML provider definitions.

use std::sync::Arc;

use async_trait::async_trait;
use forge_common::LeadTimePeriod;
use forge_models::{
    load_provider_dir, BoxError, Capability, DownloadRequest, Downloader, FetchRequest,
    ForgeError, ModelIdentity, Provider, ProviderDefinition, ProviderManager, RawPayload,
};
use forge_units::{ParameterCatalog, UnitSystem};
use test_utils::fixtures::{self, coords};
use test_utils::{assert_approx_eq, ConfigDir};

struct ConstantDownloader(f64);

#[async_trait]
impl Downloader for ConstantDownloader {
    async fn download(&self, request: &DownloadRequest) -> Result<RawPayload, BoxError> {
        Ok(request
            .parameters
            .iter()
            .fold(RawPayload::new(), |payload, p| payload.with_series(p.clone(), vec![self.0])))
    }
}

fn downloader(_provider: &str, _identity: &ModelIdentity) -> Arc<dyn Downloader> {
    Arc::new(ConstantDownloader(20.0))
}

fn catalog() -> ParameterCatalog {
    ParameterCatalog::from_yaml_str(fixtures::CATALOG_YAML).unwrap()
}

fn demo_provider() -> Provider {
    ProviderDefinition::from_yaml_str(fixtures::PROVIDER_YAML)
        .unwrap()
        .into_provider(&catalog(), downloader)
        .unwrap()
}

// ============================================================================
// Definitions
// ============================================================================

#[test]
fn test_provider_definition_builds_models() {
    let provider = demo_provider();
    assert_eq!(provider.id(), "demo");
    assert_eq!(provider.name(), "Demo Weather Service");

    let model = provider.model("square").unwrap();
    assert_eq!(model.identity().name(), "Square Model");
    assert!(model.capabilities().contains(Capability::Spatial));
    assert!(model.capabilities().contains(Capability::Predictive));
    assert_eq!(model.forecast_horizon(), Some(LeadTimePeriod::hours(0, 72)));
    assert_eq!(
        model.parameters().iter().map(|p| p.id()).collect::<Vec<_>>(),
        vec!["t2m", "wind"]
    );
    assert_eq!(model.parameter("wind").unwrap().catalog_entry().unit_for(UnitSystem::Us), "knot");
}

#[tokio::test]
async fn test_model_from_definition_fetches() {
    let provider = demo_provider();
    let model = provider.model("square").unwrap();

    let (x, y) = coords::SQUARE_CENTER;
    let result = model
        .fetch(
            FetchRequest::new()
                .with_location(forge_common::Location::wgs84(x, y).unwrap())
                .with_forecast_period(LeadTimePeriod::hours(0, 24))
                .with_unit_system(UnitSystem::Us),
        )
        .await
        .unwrap();

    assert_approx_eq!(result.get("t2m").unwrap().values[0], 68.0, 1e-9);
    assert_approx_eq!(result.get("wind").unwrap().values[0], 20.0 / 1.852, 1e-9);
}

#[test]
fn test_environment_defaults_in_definitions() {
    std::env::remove_var("FORGE_FIXTURE_LICENSE");
    let definition = ProviderDefinition::from_yaml_str(fixtures::HISTORICAL_PROVIDER_YAML).unwrap();
    assert_eq!(definition.models[0].identity.license(), "Public Domain");

    let provider = definition.into_provider(&catalog(), downloader).unwrap();
    let model = provider.model("reanalysis").unwrap();
    assert_eq!(model.supported_filters().location, Some("points"));
    assert!(model.supported_filters().historical_period);
}

#[test]
fn test_unknown_catalog_entry() {
    let yaml = fixtures::PROVIDER_YAML.replace("catalog: 10u", "catalog: 10v");
    let err = ProviderDefinition::from_yaml_str(&yaml)
        .unwrap()
        .into_provider(&catalog(), downloader)
        .unwrap_err();
    assert!(matches!(err, ForgeError::Harmonize(_)), "{:?}", err);
}

#[test]
fn test_invalid_identity_in_definition() {
    let yaml = fixtures::PROVIDER_YAML.replace("name: Square Model", "name: square model");
    let err = ProviderDefinition::from_yaml_str(&yaml).unwrap_err();
    assert!(err.to_string().contains("name"), "{}", err);
}

#[test]
fn test_load_provider_dir() {
    let dir = ConfigDir::new().unwrap();
    dir.write("providers/b_demo.yaml", fixtures::PROVIDER_YAML).unwrap();
    dir.write("providers/a_archive.yml", fixtures::HISTORICAL_PROVIDER_YAML).unwrap();
    dir.write("providers/README.md", "not a provider").unwrap();
    dir.mkdir("providers/nested").unwrap();

    let definitions = load_provider_dir(dir.path().join("providers")).unwrap();
    let ids: Vec<_> = definitions.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["archive", "demo"]);
}

#[test]
fn test_load_provider_dir_reports_file() {
    let dir = ConfigDir::new().unwrap();
    dir.write("broken.yaml", "id: [unterminated").unwrap();

    let err = load_provider_dir(dir.path()).unwrap_err();
    assert!(matches!(&err, ForgeError::Config(msg) if msg.contains("broken.yaml")), "{}", err);
}

#[test]
fn test_missing_variable_reports_file_and_name() {
    std::env::remove_var("FORGE_FIXTURE_MISSING_URL");
    let dir = ConfigDir::new().unwrap();
    let yaml = fixtures::PROVIDER_YAML.replace(
        "name: Demo Weather Service",
        "name: Demo Weather Service\nurl: ${FORGE_FIXTURE_MISSING_URL}",
    );
    dir.write("demo.yaml", &yaml).unwrap();

    let err = ProviderDefinition::load(dir.path().join("demo.yaml")).unwrap_err();
    assert!(
        matches!(&err, ForgeError::Config(msg)
            if msg.contains("demo.yaml") && msg.contains("FORGE_FIXTURE_MISSING_URL") && msg.contains("offset")),
        "{}",
        err
    );
}

#[test]
fn test_shipped_provider_definitions_load() {
    let definitions = load_provider_dir(test_utils::workspace_providers_dir()).unwrap();
    assert!(!definitions.is_empty());

    let catalog = ParameterCatalog::eccodes_defaults().unwrap();
    for definition in definitions {
        definition.into_provider(&catalog, downloader).unwrap();
    }
}

// ============================================================================
// Manager
// ============================================================================

#[test]
fn test_manager_resolves_models() {
    let mut manager = ProviderManager::new();
    manager.register(demo_provider()).unwrap();

    assert_eq!(manager.len(), 1);
    assert_eq!(manager.resolve("demo/square").unwrap().id(), "square");
    assert_eq!(manager.model("demo", "square").unwrap().to_string(), "ForgeModel<square>");
    assert_eq!(manager.models().count(), 1);

    assert!(matches!(manager.provider("nope"), Err(ForgeError::ProviderNotFound(_))));
    assert!(matches!(manager.resolve("demo/nope"), Err(ForgeError::ModelNotFound(_))));
    assert!(matches!(manager.resolve("demo"), Err(ForgeError::ModelNotFound(_))));
}

#[test]
fn test_manager_rejects_duplicate_provider() {
    let mut manager = ProviderManager::new();
    manager.register(demo_provider()).unwrap();
    let err = manager.register(demo_provider()).unwrap_err();
    assert!(matches!(err, ForgeError::DuplicateProvider(id) if id == "demo"));
}

#[test]
fn test_provider_rejects_duplicate_model() {
    let yaml = format!(
        "{}{}",
        fixtures::PROVIDER_YAML,
        fixtures::PROVIDER_YAML
            .split_once("models:\n")
            .map(|(_, models)| models)
            .unwrap()
    );
    let err = ProviderDefinition::from_yaml_str(&yaml)
        .unwrap()
        .into_provider(&catalog(), downloader)
        .unwrap_err();
    assert!(matches!(err, ForgeError::Config(msg) if msg.contains("square")));
}

#[test]
fn test_provider_id_validation() {
    assert!(Provider::new("Bad Id", "Some Provider").is_err());
    assert!(Provider::new("ok", "lowercase name").is_err());
    assert!(Provider::new("ok", "Fine Name").is_ok());
}
