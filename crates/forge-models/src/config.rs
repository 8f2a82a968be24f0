//! YAML provider and model definitions.
//!
//! One file describes one provider and its models. Values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::WalkDir;

use forge_common::{AllowedArea, LeadTimePeriod, TimePeriod};
use forge_units::{HarmonizedParameter, ParameterCatalog};

use crate::capability::Capability;
use crate::error::{ForgeError, Result};
use crate::identity::ModelIdentity;
use crate::model::ModelBuilder;
use crate::processing::Downloader;
use crate::provider::Provider;

/// A model parameter bound to a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub id: String,
    /// Short name of the catalog entry
    pub catalog: String,
    pub base_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub identity: ModelIdentity,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub allowed_area: Option<AllowedArea>,
    #[serde(default)]
    pub forecast_horizon: Option<LeadTimePeriod>,
    #[serde(default)]
    pub historical_period: Option<TimePeriod>,
}

impl ModelDefinition {
    /// Resolve parameters against `catalog` and prepare a builder.
    ///
    /// The caller still has to attach a downloader before building.
    pub fn into_builder(self, catalog: &ParameterCatalog) -> Result<ModelBuilder> {
        let mut builder = ModelBuilder::new(self.identity).capabilities(self.capabilities);

        for parameter in self.parameters {
            let entry = catalog.require(&parameter.catalog)?;
            builder = builder.parameter(HarmonizedParameter::new(
                parameter.id,
                entry,
                parameter.base_unit,
            )?);
        }

        if let Some(area) = self.allowed_area {
            builder = builder.allowed_area(area);
        }
        if let Some(horizon) = self.forecast_horizon {
            builder = builder.forecast_horizon(horizon);
        }
        if let Some(period) = self.historical_period {
            builder = builder.historical_period(period);
        }
        Ok(builder)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
}

impl ProviderDefinition {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        Ok(serde_yaml::from_str(&expanded)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ForgeError::Config(format!("Failed to read {:?}: {}", path, e)))?;
        let definition = Self::from_yaml_str(&content)
            .map_err(|e| ForgeError::Config(format!("Failed to parse {:?}: {}", path, e)))?;
        debug!(
            path = %path.display(),
            provider = %definition.id,
            models = definition.models.len(),
            "Loaded provider definition"
        );
        Ok(definition)
    }

    /// Build the provider, asking `downloader` for each model's collaborator.
    pub fn into_provider<F>(self, catalog: &ParameterCatalog, mut downloader: F) -> Result<Provider>
    where
        F: FnMut(&str, &ModelIdentity) -> Arc<dyn Downloader>,
    {
        let mut provider = Provider::new(self.id, self.name)?;
        for definition in self.models {
            let download = downloader(provider.id(), &definition.identity);
            let model = definition.into_builder(catalog)?.downloader(download).build()?;
            provider.add_model(model)?;
        }
        Ok(provider)
    }
}

/// Load every `.yaml`/`.yml` provider definition in `dir`, sorted by file name.
pub fn load_provider_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<ProviderDefinition>> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry
            .map_err(|e| ForgeError::Config(format!("Failed to read directory {:?}: {}", dir, e)))?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml")) {
            paths.push(path.to_path_buf());
        }
    }

    let definitions = paths
        .iter()
        .map(ProviderDefinition::load)
        .collect::<Result<Vec<_>>>()?;
    info!(
        dir = %dir.display(),
        providers = definitions.len(),
        "Loaded provider definitions"
    );
    Ok(definitions)
}

// ============================================================================
// Environment variable substitution
// ============================================================================

/// Replace every `${...}` in `content`; errors carry the byte offset of the `$`.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut expanded = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        let offset = content.len() - rest.len() + start;
        expanded.push_str(&rest[..start]);

        let body = &rest[start + 2..];
        let end = closing_brace(body).ok_or_else(|| {
            ForgeError::Config(format!("unclosed '${{' at offset {}", offset))
        })?;
        expanded.push_str(&resolve_var_expr(&body[..end], offset)?);
        rest = &body[end + 1..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}

fn closing_brace(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// `VAR` or `VAR:-default`; an empty variable falls back to the default.
fn resolve_var_expr(expr: &str, offset: usize) -> Result<String> {
    let (name, default) = match expr.split_once(":-") {
        Some((name, default)) => (name.trim(), Some(default)),
        None => (expr.trim(), None),
    };
    if name.is_empty() {
        return Err(ForgeError::Config(format!(
            "empty variable name at offset {}",
            offset
        )));
    }

    match (std::env::var(name), default) {
        (Ok(value), Some(_)) if !value.is_empty() => Ok(value),
        (Ok(value), None) => Ok(value),
        (_, Some(default)) => Ok(default.to_string()),
        (Err(_), None) => Err(ForgeError::Config(format!(
            "environment variable {} at offset {} is not set",
            name, offset
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_simple() {
        std::env::set_var("FORGE_TEST_VAR", "test_value");
        let result = expand_env_vars("prefix_${FORGE_TEST_VAR}_suffix").unwrap();
        assert_eq!(result, "prefix_test_value_suffix");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        std::env::remove_var("FORGE_NONEXISTENT_VAR");
        let result = expand_env_vars("value_${FORGE_NONEXISTENT_VAR:-default}_end").unwrap();
        assert_eq!(result, "value_default_end");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        std::env::remove_var("FORGE_REQUIRED_VAR");
        match expand_env_vars("name: x\nurl: ${FORGE_REQUIRED_VAR}") {
            Err(ForgeError::Config(msg)) => {
                assert!(msg.contains("FORGE_REQUIRED_VAR"), "{}", msg);
                assert!(msg.contains("offset 13"), "{}", msg);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_expand_env_vars_unclosed() {
        match expand_env_vars("url: ${OPEN") {
            Err(ForgeError::Config(msg)) => assert!(msg.contains("offset 5"), "{}", msg),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(expand_env_vars("url: ${}").is_err());
    }

    #[test]
    fn test_nested_braces_in_default() {
        std::env::remove_var("FORGE_NESTED_VAR");
        assert_eq!(
            expand_env_vars("${FORGE_NESTED_VAR:-{a}} tail").unwrap(),
            "{a} tail"
        );
    }

    #[test]
    fn test_resolve_var_expr_override_default() {
        std::env::set_var("FORGE_SET_VAR", "custom");
        assert_eq!(resolve_var_expr("FORGE_SET_VAR:-default", 0).unwrap(), "custom");
        std::env::set_var("FORGE_EMPTY_VAR", "");
        assert_eq!(resolve_var_expr("FORGE_EMPTY_VAR:-default", 0).unwrap(), "default");
    }

    #[test]
    fn test_plain_dollar_untouched() {
        assert_eq!(expand_env_vars("costs $5").unwrap(), "costs $5");
    }
}
