//! Monte-Carlo utility estimate under a random evacuation policy.

use hw_core::{Action, Simulator, World};
use rand::Rng;

use crate::action_space::sample_cells;
use crate::engine::Engine;
use crate::error::SearchError;

/// Total reward collected over `horizon` simulated steps from `world`.
///
/// Each step evacuates every candidate cell when there are fewer than `capacity` of
/// them, otherwise `capacity` cells drawn with replacement.
///
/// `horizon == 0` is not an error here: it yields 0, which is what a tree leaf at the
/// last step contributes. Callers that take a horizon from the user reject 0 with
/// [`SearchError::InvalidHorizon`] before reaching this point.
pub fn rollout<S: Simulator, R: Rng>(
    engine: &Engine<S>,
    world: &World,
    horizon: u32,
    rng: &mut R,
) -> Result<f64, SearchError> {
    let capacity = engine.params().capacity;
    let mut total = 0.0;
    let mut owned: Option<World> = None;

    for _ in 0..horizon {
        let current = owned.as_ref().unwrap_or(world);
        let candidates = engine.candidate_cells(current);
        let action = if candidates.len() < capacity {
            Action::new(candidates)
        } else {
            Action::new(sample_cells(&candidates, capacity, rng))
        };
        let next = engine.next_state(current, &action, rng)?;
        total += engine.reward(current, &action, &next);
        owned = Some(next);
    }
    Ok(total)
}
