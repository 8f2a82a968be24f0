//! Builds the provider registry from the configuration directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use forge_models::{load_provider_dir, Downloader, ProviderManager};
use forge_units::ParameterCatalog;
use tracing::info;

use crate::downloader::FileDownloader;

/// Where configuration and payloads are read from.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub catalog_file: Option<PathBuf>,
    pub payload_dir: PathBuf,
}

impl Settings {
    pub fn providers_dir(&self) -> PathBuf {
        self.config_dir.join("providers")
    }
}

/// Load the catalog file, or the built-in ECCODES defaults when none is set.
pub fn load_catalog(settings: &Settings) -> Result<ParameterCatalog> {
    match &settings.catalog_file {
        Some(path) => ParameterCatalog::load(path)
            .with_context(|| format!("Failed to load parameter catalog from {:?}", path)),
        None => ParameterCatalog::eccodes_defaults().context("Failed to build default catalog"),
    }
}

pub fn load_manager(settings: &Settings, catalog: &ParameterCatalog) -> Result<ProviderManager> {
    let providers_dir = settings.providers_dir();
    let definitions = load_provider_dir(&providers_dir)
        .with_context(|| format!("Failed to load providers from {:?}", providers_dir))?;

    let mut manager = ProviderManager::new();
    for definition in definitions {
        let payload_dir: &Path = &settings.payload_dir;
        let provider = definition.into_provider(catalog, |provider, identity| {
            Arc::new(FileDownloader::for_model(payload_dir, provider, identity.id())) as Arc<dyn Downloader>
        })?;
        manager.register(provider)?;
    }

    info!(
        providers = manager.len(),
        models = manager.models().count(),
        "Loaded provider registry"
    );
    Ok(manager)
}
