//! Cellular water model: rain, flow between hexes, drain clogging, drainage.
//!
//! Each step is independent and mutates the world in place. Callers compose
//! them in a fixed order; the planner uses rain → flow → drain failure →
//! drainage so clogged drains are known before any water is removed.

use crate::config::HydrologyConfig;
use crate::world::World;
use rand::Rng;
use rand_core::RngCore;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum HydrologyError {
    #[error("invalid precipitation rate {rate}: must be finite and >= 0")]
    InvalidRate { rate: f64 },
    #[error("invalid hydrology parameter: {msg}")]
    InvalidParameter { msg: &'static str },
}

/// One-step water physics.
pub trait Simulator {
    /// Water level at which a cell is flagged flooded.
    fn flood_level(&self) -> f64;

    /// Add `rate` units of water to every cell.
    fn rain(&self, world: &mut World, rate: f64) -> Result<(), HydrologyError>;

    /// Redistribute water towards lower neighbouring surfaces.
    fn flow(&self, world: &mut World) -> Result<(), HydrologyError>;

    /// Randomly clog working drains.
    fn fail_drains(&self, world: &mut World, rng: &mut dyn RngCore) -> Result<(), HydrologyError>;

    /// Remove water through working drains.
    fn drain(&self, world: &mut World) -> Result<(), HydrologyError>;
}

/// Hex-grid water model driven by [`HydrologyConfig`].
#[derive(Debug, Clone)]
pub struct HexHydrology {
    cfg: HydrologyConfig,
}

impl HexHydrology {
    pub fn new(cfg: HydrologyConfig) -> Result<Self, HydrologyError> {
        if !(cfg.flood_level.is_finite() && cfg.flood_level > 0.0) {
            return Err(HydrologyError::InvalidParameter {
                msg: "flood_level must be finite and > 0",
            });
        }
        if !(0.0..=1.0).contains(&cfg.flow_rate) {
            return Err(HydrologyError::InvalidParameter {
                msg: "flow_rate must be in [0, 1]",
            });
        }
        if !(cfg.drain_rate.is_finite() && cfg.drain_rate >= 0.0) {
            return Err(HydrologyError::InvalidParameter {
                msg: "drain_rate must be finite and >= 0",
            });
        }
        if !(0.0..=1.0).contains(&cfg.drain_failure_prob) {
            return Err(HydrologyError::InvalidParameter {
                msg: "drain_failure_prob must be in [0, 1]",
            });
        }
        Ok(Self { cfg })
    }
}

impl Simulator for HexHydrology {
    fn flood_level(&self) -> f64 {
        self.cfg.flood_level
    }

    fn rain(&self, world: &mut World, rate: f64) -> Result<(), HydrologyError> {
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(HydrologyError::InvalidRate { rate });
        }
        for c in world.cells_mut() {
            c.water_level += rate;
        }
        world.refresh_flooded(self.cfg.flood_level);
        Ok(())
    }

    fn flow(&self, world: &mut World) -> Result<(), HydrologyError> {
        if self.cfg.flow_rate == 0.0 {
            return Ok(());
        }

        // Read from a snapshot so the result does not depend on visit order.
        let snapshot: Vec<(f64, f64)> = world
            .cells()
            .iter()
            .map(|c| (c.water_level, c.surface()))
            .collect();
        let width = world.width() as usize;
        let mut delta = vec![0.0f64; snapshot.len()];

        for (idx, &(depth, surface)) in snapshot.iter().enumerate() {
            if depth <= 0.0 {
                continue;
            }
            let coord = world.cells()[idx].coord;

            let mut lower: Vec<(usize, f64)> = Vec::with_capacity(6);
            let mut total_diff = 0.0f64;
            for n in world.neighbors(coord) {
                let n_idx = n.y as usize * width + n.x as usize;
                let n_surface = snapshot[n_idx].1;
                if n_surface < surface {
                    let diff = surface - n_surface;
                    lower.push((n_idx, diff));
                    total_diff += diff;
                }
            }
            if lower.is_empty() || total_diff <= 0.0 {
                continue;
            }

            // At most half the summed surface gap moves in one step.
            let transferable = (depth * self.cfg.flow_rate).min(total_diff / 2.0);
            delta[idx] -= transferable;
            for (n_idx, diff) in lower {
                delta[n_idx] += transferable * diff / total_diff;
            }
        }

        for (c, d) in world.cells_mut().iter_mut().zip(delta) {
            c.water_level = (c.water_level + d).max(0.0);
        }
        world.refresh_flooded(self.cfg.flood_level);
        Ok(())
    }

    fn fail_drains(&self, world: &mut World, rng: &mut dyn RngCore) -> Result<(), HydrologyError> {
        let p = self.cfg.drain_failure_prob;
        for c in world.cells_mut() {
            if c.drain_working() && rng.gen_bool(p) {
                c.drain_failed = true;
            }
        }
        Ok(())
    }

    fn drain(&self, world: &mut World) -> Result<(), HydrologyError> {
        for c in world.cells_mut() {
            if c.drain_working() {
                c.water_level = (c.water_level - self.cfg.drain_rate).max(0.0);
            }
        }
        Ok(())
    }
}
