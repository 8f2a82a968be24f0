//! Unit systems a parameter can be expressed in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HarmonizeError;

/// The supported unit systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// The provider's native units, as downloaded
    Original,
    /// SI units
    #[default]
    Si,
    /// Imperial units
    Imperial,
    /// US customary units
    Us,
}

impl UnitSystem {
    pub const ALL: [UnitSystem; 4] = [
        UnitSystem::Original,
        UnitSystem::Si,
        UnitSystem::Imperial,
        UnitSystem::Us,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Original => "original",
            UnitSystem::Si => "si",
            UnitSystem::Imperial => "imperial",
            UnitSystem::Us => "us",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = HarmonizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "original" | "native" => Ok(UnitSystem::Original),
            "si" | "metric" => Ok(UnitSystem::Si),
            "imperial" => Ok(UnitSystem::Imperial),
            "us" => Ok(UnitSystem::Us),
            other => Err(HarmonizeError::InvalidParameter(format!(
                "unknown unit system '{}', expected one of original, si, imperial, us",
                other
            ))),
        }
    }
}
