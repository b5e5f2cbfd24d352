//! Unified configuration schema for the flood evacuation planner.
//!
//! One YAML file drives world generation, the hydrology model, the search
//! engine, the reward weights and the run itself.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {msg}")]
    Invalid { msg: String },
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Random world generation settings.
    #[serde(default)]
    pub world: WorldConfig,
    /// Water model settings.
    pub hydrology: HydrologyConfig,
    /// Decision engine settings.
    pub search: SearchConfig,
    /// Per-cell payoff weights.
    pub reward: RewardConfig,
    /// Run horizon and seed.
    pub run: RunConfig,
}

/// Random world generation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    /// Elevation is drawn uniformly from `[0, max_elevation)`.
    #[serde(default = "default_max_elevation")]
    pub max_elevation: f64,
    /// Population is drawn uniformly from `[0, max_population]`.
    #[serde(default = "default_max_population")]
    pub max_population: f64,
    /// Probability that a cell carries a storm drain.
    #[serde(default = "default_drain_density")]
    pub drain_density: f64,
}

fn default_max_elevation() -> f64 {
    4.0
}

fn default_max_population() -> f64 {
    100.0
}

fn default_drain_density() -> f64 {
    0.3
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 6,
            height: 6,
            max_elevation: default_max_elevation(),
            max_population: default_max_population(),
            drain_density: default_drain_density(),
        }
    }
}

/// Water model.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HydrologyConfig {
    /// Water level at which a cell counts as flooded.
    pub flood_level: f64,
    /// Rain added to every cell per step.
    pub precip_rate: f64,
    /// Fraction of a cell's depth that may move to lower neighbours per step.
    #[serde(default = "default_flow_rate")]
    pub flow_rate: f64,
    /// Water removed per step by a working drain.
    #[serde(default = "default_drain_rate")]
    pub drain_rate: f64,
    /// Per-step probability that a working drain clogs.
    #[serde(default = "default_drain_failure_prob")]
    pub drain_failure_prob: f64,
}

fn default_flow_rate() -> f64 {
    0.25
}

fn default_drain_rate() -> f64 {
    0.4
}

fn default_drain_failure_prob() -> f64 {
    0.1
}

/// Which action chooser drives the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One-level lookahead scored by random rollouts.
    #[default]
    Rollout,
    /// Multi-level UCB tree search.
    Tree,
}

/// Decision engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Maximum cells evacuated per step.
    pub capacity: u32,
    /// Number of candidate actions sampled per decision (`m`).
    pub branch_samples: u32,
    /// UCB exploration constant (`c`). Zero disables the bonus.
    #[serde(default)]
    pub exploration: f64,
    /// Upper bound on the enumerated action space before sampling.
    #[serde(default = "default_max_actions")]
    pub max_actions: u64,
    #[serde(default)]
    pub strategy: Strategy,
    /// Iterations per decision for the tree strategy.
    #[serde(default = "default_tree_iterations")]
    pub tree_iterations: u32,
    /// Maximum tree depth below the root for the tree strategy.
    #[serde(default = "default_tree_depth")]
    pub tree_depth: u32,
    /// Evaluate candidate rollouts on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
}

fn default_max_actions() -> u64 {
    1_000_000
}

fn default_tree_iterations() -> u32 {
    64
}

fn default_tree_depth() -> u32 {
    2
}

/// Payoff weights, each multiplied by the cell population.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RewardConfig {
    pub flood_evac: f64,
    pub dry_evac: f64,
    pub flood_no_evac: f64,
    pub dry_no_evac: f64,
}

/// Run configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    /// Total number of simulated steps.
    pub sim_time: u32,
    #[serde(default)]
    pub seed: u64,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        if w.width == 0 || w.height == 0 {
            return Err(invalid("world.width and world.height must be > 0"));
        }
        if !(w.max_elevation.is_finite() && w.max_elevation >= 0.0) {
            return Err(invalid("world.max_elevation must be finite and >= 0"));
        }
        if !(w.max_population.is_finite() && w.max_population >= 0.0) {
            return Err(invalid("world.max_population must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&w.drain_density) {
            return Err(invalid("world.drain_density must be in [0, 1]"));
        }

        let h = &self.hydrology;
        if !(h.flood_level.is_finite() && h.flood_level > 0.0) {
            return Err(invalid("hydrology.flood_level must be finite and > 0"));
        }
        if !(h.precip_rate.is_finite() && h.precip_rate >= 0.0) {
            return Err(invalid("hydrology.precip_rate must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&h.flow_rate) {
            return Err(invalid("hydrology.flow_rate must be in [0, 1]"));
        }
        if !(h.drain_rate.is_finite() && h.drain_rate >= 0.0) {
            return Err(invalid("hydrology.drain_rate must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&h.drain_failure_prob) {
            return Err(invalid("hydrology.drain_failure_prob must be in [0, 1]"));
        }

        let s = &self.search;
        if s.capacity == 0 {
            return Err(invalid("search.capacity must be > 0"));
        }
        if s.branch_samples == 0 {
            return Err(invalid("search.branch_samples must be > 0"));
        }
        if !(s.exploration.is_finite() && s.exploration >= 0.0) {
            return Err(invalid("search.exploration must be finite and >= 0"));
        }
        if s.max_actions == 0 {
            return Err(invalid("search.max_actions must be > 0"));
        }
        if s.strategy == Strategy::Tree && (s.tree_iterations == 0 || s.tree_depth == 0) {
            return Err(invalid(
                "search.tree_iterations and search.tree_depth must be > 0 for the tree strategy",
            ));
        }

        let r = &self.reward;
        for v in [r.flood_evac, r.dry_evac, r.flood_no_evac, r.dry_no_evac] {
            if !v.is_finite() {
                return Err(invalid("reward weights must be finite"));
            }
        }

        if self.run.sim_time == 0 {
            return Err(invalid("run.sim_time must be > 0"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid {
        msg: msg.to_string(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            hydrology: HydrologyConfig {
                flood_level: 10.0,
                precip_rate: 1.0,
                flow_rate: default_flow_rate(),
                drain_rate: default_drain_rate(),
                drain_failure_prob: default_drain_failure_prob(),
            },
            search: SearchConfig {
                capacity: 2,
                branch_samples: 20,
                exploration: 0.0,
                max_actions: default_max_actions(),
                strategy: Strategy::Rollout,
                tree_iterations: default_tree_iterations(),
                tree_depth: default_tree_depth(),
                parallel: false,
            },
            reward: RewardConfig {
                flood_evac: 10.0,
                dry_evac: -1.0,
                flood_no_evac: -20.0,
                dry_no_evac: 0.0,
            },
            run: RunConfig {
                sim_time: 10,
                seed: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_yaml() {
        let config =
            Config::load("../../configs/default.yaml").expect("Failed to load configs/default.yaml");

        assert_eq!(config.world.width, 6);
        assert_eq!(config.world.height, 6);
        assert_eq!(config.hydrology.flood_level, 10.0);
        assert_eq!(config.search.capacity, 2);
        assert_eq!(config.search.branch_samples, 20);
        assert_eq!(config.search.exploration, 0.0);
        assert_eq!(config.search.strategy, Strategy::Rollout);
        assert_eq!(config.reward.flood_no_evac, -20.0);
        assert_eq!(config.run.sim_time, 10);
    }

    #[test]
    fn test_parse_yaml_string() {
        let yaml = r#"
hydrology:
  flood_level: 5.0
  precip_rate: 0.5

search:
  capacity: 3
  branch_samples: 8
  strategy: tree

reward:
  flood_evac: 1.0
  dry_evac: -0.5
  flood_no_evac: -4.0
  dry_no_evac: 0.0

run:
  sim_time: 4
"#;

        let config = Config::from_yaml(yaml).expect("Failed to parse YAML");
        assert_eq!(config.search.capacity, 3);
        assert_eq!(config.search.strategy, Strategy::Tree);
        // Check defaults are applied
        assert_eq!(config.world.width, 6);
        assert_eq!(config.hydrology.flow_rate, 0.25);
        assert_eq!(config.hydrology.drain_failure_prob, 0.1);
        assert_eq!(config.search.max_actions, 1_000_000);
        assert_eq!(config.search.tree_iterations, 64);
        assert_eq!(config.run.seed, 0);
        assert!(!config.search.parallel);
    }

    #[test]
    fn test_invalid_yaml_fails() {
        let invalid_yaml = "this is not: valid: yaml: {{{}}}";
        let result = Config::from_yaml(invalid_yaml);
        assert!(result.is_err());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut cfg = Config::default();
        cfg.search.capacity = 0;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let mut cfg = Config::default();
        cfg.run.sim_time = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn default_round_trips_through_yaml() {
        let cfg = Config::default();
        let yaml = cfg.to_yaml().unwrap();
        let back = Config::from_yaml(&yaml).unwrap();
        assert_eq!(back.search.capacity, cfg.search.capacity);
        assert_eq!(back.hydrology.flood_level, cfg.hydrology.flood_level);
    }
}
