//! Configuration loading for disha-plan

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

/// Coverage planner configuration
#[derive(Clone, Debug, Deserialize)]
pub struct CoverageConfig {
    /// Minimum marginal surface points for a viewpoint to enter the
    /// surface queue (default: 40)
    #[serde(default = "default_min_add_point_num")]
    pub min_add_point_num: usize,

    /// Minimum marginal frontier points for a viewpoint to enter the
    /// frontier queue (default: 15)
    #[serde(default = "default_min_add_frontier_point_num")]
    pub min_add_frontier_point_num: usize,

    /// Width of the randomized greedy sampling window (default: 5)
    #[serde(default = "default_greedy_sample_range")]
    pub greedy_sample_range: usize,

    /// Number of select-and-tour iterations per planning cycle; the
    /// shortest tour wins (default: 10)
    #[serde(default = "default_path_optimization_iterations")]
    pub path_optimization_iterations: usize,

    /// Fixed seed for the greedy sampling PRNG. When unset, each
    /// selection pass seeds from the OS.
    #[serde(default)]
    pub sample_seed: Option<u64>,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            min_add_point_num: default_min_add_point_num(),
            min_add_frontier_point_num: default_min_add_frontier_point_num(),
            greedy_sample_range: default_greedy_sample_range(),
            path_optimization_iterations: default_path_optimization_iterations(),
            sample_seed: None,
        }
    }
}

// Default value functions
fn default_min_add_point_num() -> usize {
    40
}
fn default_min_add_frontier_point_num() -> usize {
    15
}
fn default_greedy_sample_range() -> usize {
    5
}
fn default_path_optimization_iterations() -> usize {
    10
}

impl CoverageConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CoverageConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Builder-style setter for the surface queue threshold.
    pub fn with_min_add_point_num(mut self, count: usize) -> Self {
        self.min_add_point_num = count;
        self
    }

    /// Builder-style setter for the frontier queue threshold.
    pub fn with_min_add_frontier_point_num(mut self, count: usize) -> Self {
        self.min_add_frontier_point_num = count;
        self
    }

    /// Builder-style setter for the sampling window width.
    pub fn with_greedy_sample_range(mut self, range: usize) -> Self {
        self.greedy_sample_range = range;
        self
    }

    /// Builder-style setter for the per-cycle iteration count.
    pub fn with_path_optimization_iterations(mut self, iterations: usize) -> Self {
        self.path_optimization_iterations = iterations;
        self
    }

    /// Builder-style setter for the deterministic sampling seed.
    pub fn with_sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = Some(seed);
        self
    }
}
