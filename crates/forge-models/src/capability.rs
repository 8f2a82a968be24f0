//! Optional model capabilities and sets of them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A filter behaviour a model may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Requests are restricted to an allowed area
    Spatial,
    /// Requests carry a forecast lead time window
    #[serde(rename = "forecast", alias = "predictive")]
    Predictive,
    /// Requests carry a historical time window
    Historical,
}

impl Capability {
    /// All capabilities, in chain order.
    pub const ALL: [Capability; 3] = [
        Capability::Spatial,
        Capability::Predictive,
        Capability::Historical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Spatial => "spatial",
            Capability::Predictive => "forecast",
            Capability::Historical => "historical",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The capabilities a model is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet {
    spatial: bool,
    predictive: bool,
    historical: bool,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    pub fn insert(&mut self, capability: Capability) {
        match capability {
            Capability::Spatial => self.spatial = true,
            Capability::Predictive => self.predictive = true,
            Capability::Historical => self.historical = true,
        }
    }

    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::Spatial => self.spatial,
            Capability::Predictive => self.predictive,
            Capability::Historical => self.historical,
        }
    }

    /// Members in chain order: spatial, forecast, historical.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::new();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.as_str()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
