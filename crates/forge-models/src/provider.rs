//! Providers and the registry that maps ids to their models.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use forge_common::naming::{check_capitalized_words, check_identifier};

use crate::error::{ForgeError, Result};
use crate::model::Model;

/// A named group of models, usually one weather service.
#[derive(Debug, Clone)]
pub struct Provider {
    id: String,
    name: String,
    models: Vec<Arc<Model>>,
}

impl Provider {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let name = name.into();
        check_identifier("provider id", &id, 2, 32).map_err(ForgeError::Config)?;
        check_capitalized_words("provider name", &name, 2, 64).map_err(ForgeError::Config)?;
        Ok(Self {
            id,
            name,
            models: Vec::new(),
        })
    }

    pub fn with_model(mut self, model: Model) -> Result<Self> {
        self.add_model(model)?;
        Ok(self)
    }

    pub fn add_model(&mut self, model: Model) -> Result<()> {
        if self.model(model.id()).is_some() {
            return Err(ForgeError::Config(format!(
                "provider '{}' already has a model '{}'",
                self.id,
                model.id()
            )));
        }
        self.models.push(Arc::new(model));
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn models(&self) -> &[Arc<Model>] {
        &self.models
    }

    pub fn model(&self, id: &str) -> Option<&Arc<Model>> {
        self.models.iter().find(|m| m.id() == id)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {} models)", self.name, self.id, self.models.len())
    }
}

/// Registry of providers, ordered by id.
#[derive(Debug, Default)]
pub struct ProviderManager {
    providers: BTreeMap<String, Provider>,
}

impl ProviderManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Provider) -> Result<()> {
        if self.providers.contains_key(provider.id()) {
            return Err(ForgeError::DuplicateProvider(provider.id().to_string()));
        }
        info!(
            provider = provider.id(),
            models = provider.models().len(),
            "Registered provider"
        );
        self.providers.insert(provider.id().to_string(), provider);
        Ok(())
    }

    pub fn provider(&self, id: &str) -> Result<&Provider> {
        self.providers
            .get(id)
            .ok_or_else(|| ForgeError::ProviderNotFound(id.to_string()))
    }

    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.providers.values()
    }

    pub fn model(&self, provider: &str, model: &str) -> Result<Arc<Model>> {
        self.provider(provider)?
            .model(model)
            .cloned()
            .ok_or_else(|| ForgeError::ModelNotFound(format!("{}/{}", provider, model)))
    }

    /// Look up a model by a `provider/model` path.
    pub fn resolve(&self, path: &str) -> Result<Arc<Model>> {
        match path.split_once('/') {
            Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
                self.model(provider, model)
            }
            _ => Err(ForgeError::ModelNotFound(format!(
                "{} (expected 'provider/model')",
                path
            ))),
        }
    }

    /// Every registered model as `(provider id, model)`.
    pub fn models(&self) -> impl Iterator<Item = (&str, &Arc<Model>)> {
        self.providers
            .values()
            .flat_map(|p| p.models().iter().map(move |m| (p.id(), m)))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
