//! Descriptive identity of a model.

use serde::{Deserialize, Serialize};
use std::fmt;

use forge_common::naming::{check_capitalized_words, check_identifier, check_length};

use crate::error::{ForgeError, Result};

const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

/// Unvalidated identity fields, as written in a model definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIdentity {
    pub id: String,
    pub name: String,
    pub description: String,
    pub information_url: String,
    pub license: String,
}

/// Validated, immutable model identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIdentity", into = "RawIdentity")]
pub struct ModelIdentity {
    id: String,
    name: String,
    description: String,
    information_url: String,
    license: String,
}

impl ModelIdentity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        information_url: impl Into<String>,
        license: impl Into<String>,
    ) -> Result<Self> {
        Self::from_raw(RawIdentity {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            information_url: information_url.into(),
            license: license.into(),
        })
    }

    pub fn from_raw(raw: RawIdentity) -> Result<Self> {
        check_identifier("id", &raw.id, 3, 12)
            .and_then(|_| check_capitalized_words("name", &raw.name, 4, 32))
            .and_then(|_| check_length("description", &raw.description, 12, 256))
            .and_then(|_| check_url("information_url", &raw.information_url))
            .and_then(|_| check_length("license", &raw.license, 4, 256))
            .map_err(ForgeError::InvalidIdentity)?;

        Ok(Self {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            information_url: raw.information_url,
            license: raw.license,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn information_url(&self) -> &str {
        &self.information_url
    }

    pub fn license(&self) -> &str {
        &self.license
    }

    /// Human-readable metadata, in display order.
    pub fn metadata(&self) -> [(&'static str, &str); 5] {
        [
            ("ID", &self.id),
            ("Name", &self.name),
            ("Description", &self.description),
            ("Information URL", &self.information_url),
            ("License", &self.license),
        ]
    }
}

impl TryFrom<RawIdentity> for ModelIdentity {
    type Error = ForgeError;

    fn try_from(raw: RawIdentity) -> Result<Self> {
        ModelIdentity::from_raw(raw)
    }
}

impl From<ModelIdentity> for RawIdentity {
    fn from(identity: ModelIdentity) -> Self {
        RawIdentity {
            id: identity.id,
            name: identity.name,
            description: identity.description,
            information_url: identity.information_url,
            license: identity.license,
        }
    }
}

impl fmt::Display for ModelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

fn check_url(field: &str, value: &str) -> std::result::Result<(), String> {
    check_length(field, value, 1, 256)?;

    let (scheme, rest) = value
        .split_once("://")
        .ok_or_else(|| format!("{} must be an absolute URL, got '{}'", field, value))?;

    if !URL_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
        return Err(format!(
            "{} scheme must be one of {}, got '{}'",
            field,
            URL_SCHEMES.join(", "),
            scheme
        ));
    }

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(format!("{} has no valid host: '{}'", field, value));
    }
    Ok(())
}
