//! Search parameters and the engine that binds them to a water model.

use hw_core::{Action, Config, Coord, HexHydrology, Simulator, World};
use rand::Rng;

use crate::action_space::{
    action_space_size, enumerate_actions, narrow_action_space, sample_actions,
};
use crate::error::SearchError;
use crate::reward::{self, RewardWeights};
use crate::rollout;
use crate::transition;

/// Engine-facing subset of the configuration. Read-only during a search.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub flood_level: f64,
    pub precip_rate: f64,
    /// Maximum cells evacuated per step.
    pub capacity: usize,
    /// Candidate actions kept per decision (`m`).
    pub branch_samples: usize,
    /// UCB exploration constant (`c`).
    pub exploration: f64,
    pub max_actions: u64,
    pub tree_iterations: u32,
    pub tree_depth: u32,
    pub parallel: bool,
    pub weights: RewardWeights,
}

impl SearchParams {
    pub fn from_config(cfg: &Config) -> Result<Self, SearchError> {
        let p = Self::from_config_unchecked(cfg);
        p.validate()?;
        Ok(p)
    }

    fn from_config_unchecked(cfg: &Config) -> Self {
        Self {
            flood_level: cfg.hydrology.flood_level,
            precip_rate: cfg.hydrology.precip_rate,
            capacity: cfg.search.capacity as usize,
            branch_samples: cfg.search.branch_samples as usize,
            exploration: cfg.search.exploration,
            max_actions: cfg.search.max_actions,
            tree_iterations: cfg.search.tree_iterations,
            tree_depth: cfg.search.tree_depth,
            parallel: cfg.search.parallel,
            weights: RewardWeights::from(&cfg.reward),
        }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.flood_level.is_finite() && self.flood_level > 0.0) {
            return Err(SearchError::InvalidConfig {
                msg: "flood_level must be finite and > 0",
            });
        }
        if !(self.precip_rate.is_finite() && self.precip_rate >= 0.0) {
            return Err(SearchError::InvalidConfig {
                msg: "precip_rate must be finite and >= 0",
            });
        }
        if self.capacity == 0 {
            return Err(SearchError::InvalidConfig {
                msg: "capacity must be > 0",
            });
        }
        if self.branch_samples == 0 {
            return Err(SearchError::InvalidConfig {
                msg: "branch_samples must be > 0",
            });
        }
        if !(self.exploration.is_finite() && self.exploration >= 0.0) {
            return Err(SearchError::InvalidConfig {
                msg: "exploration must be finite and >= 0",
            });
        }
        if self.max_actions == 0 {
            return Err(SearchError::InvalidConfig {
                msg: "max_actions must be > 0",
            });
        }
        Ok(())
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::from_config_unchecked(&Config::default())
    }
}

/// A water model plus the parameters every search component reads.
#[derive(Debug)]
pub struct Engine<S> {
    sim: S,
    params: SearchParams,
}

impl Engine<HexHydrology> {
    /// Engine over the hex water model described by `cfg`.
    pub fn from_config(cfg: &Config) -> Result<Self, SearchError> {
        let sim = HexHydrology::new(cfg.hydrology.clone())?;
        Self::new(sim, SearchParams::from_config(cfg)?)
    }
}

impl<S: Simulator> Engine<S> {
    /// Fails when `params.flood_level` disagrees with the simulator's flood level.
    pub fn new(sim: S, params: SearchParams) -> Result<Self, SearchError> {
        params.validate()?;
        if sim.flood_level() != params.flood_level {
            return Err(SearchError::InvalidConfig {
                msg: "flood_level must match the simulator's flood level",
            });
        }
        Ok(Self { sim, params })
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Cells worth considering for evacuation in `world`.
    pub fn candidate_cells(&self, world: &World) -> Vec<Coord> {
        narrow_action_space(world, self.params.flood_level)
    }

    /// Up to `branch_samples` candidate actions for `world`.
    pub fn branched_actions<R: Rng>(
        &self,
        world: &World,
        rng: &mut R,
    ) -> Result<Vec<Action>, SearchError> {
        let coords = self.candidate_cells(world);
        let count = action_space_size(coords.len(), self.params.capacity);
        if count > self.params.max_actions as u128 {
            return Err(SearchError::ActionSpaceTooLarge {
                candidates: coords.len(),
                capacity: self.params.capacity,
                count,
                limit: self.params.max_actions,
            });
        }
        let actions = enumerate_actions(&coords, self.params.capacity);
        Ok(sample_actions(actions, self.params.branch_samples, rng))
    }

    pub fn next_state<R: Rng>(
        &self,
        world: &World,
        action: &Action,
        rng: &mut R,
    ) -> Result<World, SearchError> {
        transition::next_state(&self.sim, world, action, self.params.precip_rate, rng)
    }

    pub fn reward(&self, world: &World, action: &Action, next: &World) -> f64 {
        reward::reward(world, action, next, &self.params.weights)
    }

    pub fn rollout<R: Rng>(
        &self,
        world: &World,
        horizon: u32,
        rng: &mut R,
    ) -> Result<f64, SearchError> {
        rollout::rollout(self, world, horizon, rng)
    }
}
