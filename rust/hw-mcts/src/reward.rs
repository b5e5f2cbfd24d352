//! Immediate reward of one evacuation decision.

use hw_core::{Action, Config, Coord, RewardConfig, World};
use rustc_hash::FxHashSet;

/// Per-person reward for each (flooded next step, evacuated now) outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardWeights {
    /// Flooded and evacuated.
    pub flood_evac: f64,
    /// Dry and evacuated.
    pub dry_evac: f64,
    /// Flooded and not evacuated.
    pub flood_no_evac: f64,
    /// Dry and not evacuated.
    pub dry_no_evac: f64,
}

impl From<&RewardConfig> for RewardWeights {
    fn from(r: &RewardConfig) -> Self {
        Self {
            flood_evac: r.flood_evac,
            dry_evac: r.dry_evac,
            flood_no_evac: r.flood_no_evac,
            dry_no_evac: r.dry_no_evac,
        }
    }
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self::from(&Config::default().reward)
    }
}

impl RewardWeights {
    /// Weight for a single cell outcome.
    pub fn weight(&self, flooded: bool, evacuated: bool) -> f64 {
        match (flooded, evacuated) {
            (true, true) => self.flood_evac,
            (false, true) => self.dry_evac,
            (true, false) => self.flood_no_evac,
            (false, false) => self.dry_no_evac,
        }
    }
}

/// Sum over every cell of `world` of `population * weight`, where the weight matches
/// whether the cell is flooded in `next` and whether `action` named it.
///
/// A cell missing from `next` counts as dry.
pub fn reward(world: &World, action: &Action, next: &World, weights: &RewardWeights) -> f64 {
    let evacuated: FxHashSet<Coord> = action.iter().copied().collect();
    world
        .cells()
        .iter()
        .map(|c| {
            let flooded = next.cell(c.coord).is_some_and(|n| n.is_flooded);
            c.population * weights.weight(flooded, evacuated.contains(&c.coord))
        })
        .sum()
}
