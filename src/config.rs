use crate::errors::{OptionsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffConfig {
    /// Ceiling on sample points per series.
    pub max_points: usize,
    /// Series at least this long are sampled on the rayon pool.
    pub parallel_threshold: usize,
}

impl PayoffConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_points == 0 {
            return Err(OptionsError::Config("payoff.max_points must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for PayoffConfig {
    fn default() -> Self {
        Self {
            max_points: 100_000,
            parallel_threshold: 4_096,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Maximum number of cached series.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 128,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub caption: String,
    pub x_label: String,
    pub y_label: String,
    /// Draw caption, axis descriptions and tick labels.
    pub show_labels: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            caption: "Options Payoff Chart".to_string(),
            x_label: "Underlying Price".to_string(),
            y_label: "Payoff".to_string(),
            show_labels: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub payoff: PayoffConfig,
    pub cache: CacheConfig,
    pub chart: ChartConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(?path, "Loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.payoff.validate()?;
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(OptionsError::Config("cache.capacity must be at least 1".into()));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(OptionsError::Config("chart dimensions must be positive".into()));
        }
        Ok(())
    }
}
