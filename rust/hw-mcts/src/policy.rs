//! Receding-horizon policy driver.
//!
//! At every step an [`ActionChooser`] picks an evacuation for the current world, the
//! action is applied through the transition, and the realised reward is accumulated.

use hw_core::{Action, Simulator, Strategy, World};
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::engine::{Engine, SearchParams};
use crate::error::SearchError;
use crate::tree_search::TreeChooser;

/// RNG threaded through every search call.
pub type SearchRng = ChaCha8Rng;

/// Picks one action for `world` given the steps left in the run.
pub trait ActionChooser<S: Simulator> {
    fn choose_action(
        &mut self,
        engine: &Engine<S>,
        world: &World,
        horizon: u32,
        rng: &mut SearchRng,
    ) -> Result<Action, SearchError>;
}

/// One-level lookahead: every sampled candidate is scored by a rollout from its successor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolloutChooser;

impl RolloutChooser {
    /// Rollout utility of each candidate, in candidate order.
    ///
    /// Each candidate gets its own RNG seeded from `rng`, so sequential and parallel
    /// evaluation agree.
    pub fn evaluate<S: Simulator + Sync>(
        engine: &Engine<S>,
        world: &World,
        actions: &[Action],
        horizon: u32,
        rng: &mut SearchRng,
    ) -> Result<Vec<f64>, SearchError> {
        let seeds: Vec<u64> = actions.iter().map(|_| rng.next_u64()).collect();
        let score = |action: &Action, seed: u64| -> Result<f64, SearchError> {
            let mut r = SearchRng::seed_from_u64(seed);
            let next = engine.next_state(world, action, &mut r)?;
            engine.rollout(&next, horizon, &mut r)
        };

        if engine.params().parallel {
            actions
                .par_iter()
                .zip(seeds.par_iter())
                .map(|(a, &s)| score(a, s))
                .collect()
        } else {
            actions
                .iter()
                .zip(seeds.iter())
                .map(|(a, &s)| score(a, s))
                .collect()
        }
    }
}

impl<S: Simulator + Sync> ActionChooser<S> for RolloutChooser {
    fn choose_action(
        &mut self,
        engine: &Engine<S>,
        world: &World,
        horizon: u32,
        rng: &mut SearchRng,
    ) -> Result<Action, SearchError> {
        if horizon == 0 {
            return Err(SearchError::InvalidHorizon);
        }
        let actions = engine.branched_actions(world, rng)?;
        if actions.is_empty() {
            return Ok(Action::empty());
        }
        let utilities = Self::evaluate(engine, world, &actions, horizon, rng)?;

        let mut best = 0usize;
        for (i, &u) in utilities.iter().enumerate().skip(1) {
            if u > utilities[best] {
                best = i;
            }
        }
        Ok(actions.into_iter().nth(best).unwrap_or_else(Action::empty))
    }
}

/// Chooser selected by `search.strategy`.
pub fn chooser_for_strategy<S: Simulator + Sync>(
    strategy: Strategy,
    params: &SearchParams,
) -> Box<dyn ActionChooser<S>> {
    match strategy {
        Strategy::Rollout => Box::new(RolloutChooser),
        Strategy::Tree => Box::new(TreeChooser::from_params(params)),
    }
}

/// What happened on one executed step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub step: u32,
    /// Steps remaining when the action was chosen, this one included.
    pub horizon: u32,
    pub action: Action,
    pub reward: f64,
    pub cumulative_reward: f64,
    pub flooded_cells: usize,
    pub evacuated_cells: usize,
    pub total_water: f64,
}

#[derive(Debug, Clone)]
pub struct PolicyOutcome {
    pub net_reward: f64,
    pub final_world: World,
    pub steps: u32,
}

/// Net reward realised over `total_steps` executed steps from `world`.
pub fn run_policy<S, C>(
    engine: &Engine<S>,
    chooser: &mut C,
    world: &World,
    total_steps: u32,
    rng: &mut SearchRng,
) -> Result<f64, SearchError>
where
    S: Simulator,
    C: ActionChooser<S> + ?Sized,
{
    run_policy_traced(engine, chooser, world, total_steps, rng, |_| {}).map(|o| o.net_reward)
}

/// [`run_policy`], reporting each executed step to `on_step`.
///
/// Step rewards are scored against the pre-action world.
pub fn run_policy_traced<S, C, F>(
    engine: &Engine<S>,
    chooser: &mut C,
    world: &World,
    total_steps: u32,
    rng: &mut SearchRng,
    mut on_step: F,
) -> Result<PolicyOutcome, SearchError>
where
    S: Simulator,
    C: ActionChooser<S> + ?Sized,
    F: FnMut(&StepRecord),
{
    if total_steps == 0 {
        return Err(SearchError::InvalidHorizon);
    }
    let mut current = world.clone();
    let mut net = 0.0;

    for t in 0..total_steps {
        let horizon = total_steps - t;
        let action = chooser.choose_action(engine, &current, horizon, rng)?;
        let next = engine.next_state(&current, &action, rng)?;
        let reward = engine.reward(&current, &action, &next);
        net += reward;

        on_step(&StepRecord {
            step: t,
            horizon,
            action,
            reward,
            cumulative_reward: net,
            flooded_cells: next.flooded_count(),
            evacuated_cells: next.evacuated_count(),
            total_water: next.total_water(),
        });
        current = next;
    }

    Ok(PolicyOutcome {
        net_reward: net,
        final_world: current,
        steps: total_steps,
    })
}
