//! Engine configuration
//!
//! Every tunable of the scoring pipeline in one serde struct. `Default`
//! reproduces the reference model; JSON files may override any subset.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VitalsError};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::normalizer::ReferenceRanges;
use crate::scoring::RiskWeights;
use crate::trends::TrendThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ranges: ReferenceRanges,
    pub weights: RiskWeights,
    pub trends: TrendThresholds,
    /// Maximum number of snapshots kept in history
    pub history_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ranges: ReferenceRanges::default(),
            weights: RiskWeights::default(),
            trends: TrendThresholds::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Check every section, failing on the first problem
    pub fn validate(&self) -> Result<()> {
        self.ranges.validate()?;
        self.weights.validate()?;
        self.trends.validate()?;
        if self.history_capacity == 0 {
            return Err(VitalsError::Configuration(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
