//! One simulated step: evacuate, then let the water move.

use hw_core::{Action, Simulator, World};
use rand::Rng;

use crate::error::SearchError;

/// Successor of `world` after evacuating `action` and advancing the water model one step.
///
/// `world` is never modified. Evacuation is recorded before any water moves; the
/// water steps then run in fixed order: rain, flow, drain failure, drainage.
pub fn next_state<S: Simulator, R: Rng>(
    sim: &S,
    world: &World,
    action: &Action,
    precip_rate: f64,
    rng: &mut R,
) -> Result<World, SearchError> {
    let mut next = world.clone();
    next.apply_evacuation(action)?;
    sim.rain(&mut next, precip_rate)?;
    sim.flow(&mut next)?;
    sim.fail_drains(&mut next, rng)?;
    sim.drain(&mut next)?;
    Ok(next)
}
