//! Diagnostics hooks for the fetch chain.

use std::fmt;
use tracing::{debug, warn};

use crate::error::ForgeError;

/// A step of the fetch chain, in the order steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Spatial,
    Predictive,
    Historical,
    Parameters,
    Download,
    Process,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Spatial => "spatial",
            Stage::Predictive => "forecast",
            Stage::Historical => "historical",
            Stage::Parameters => "parameters",
            Stage::Download => "download",
            Stage::Process => "process",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives an event for every stage a fetch passes through.
pub trait StageObserver: Send + Sync {
    fn stage_entered(&self, _model: &str, _stage: Stage) {}

    fn stage_passed(&self, _model: &str, _stage: Stage) {}

    fn stage_failed(&self, _model: &str, _stage: Stage, _error: &ForgeError) {}
}

/// Observer that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn stage_entered(&self, model: &str, stage: Stage) {
        debug!(model, stage = %stage, "Entering fetch stage");
    }

    fn stage_passed(&self, model: &str, stage: Stage) {
        debug!(model, stage = %stage, "Fetch stage passed");
    }

    fn stage_failed(&self, model: &str, stage: Stage, error: &ForgeError) {
        warn!(model, stage = %stage, error = %error, "Fetch stage failed");
    }
}
