//! Evacuation search for the flood planner.
//!
//! The design uses:
//! - Candidate cells narrowed by water level, combinations up to the per-step capacity,
//!   then `m` samples drawn with replacement
//! - Stochastic transitions via the `hw_core::Simulator` steps, always on a cloned world
//! - Rollout-scored one-level lookahead, or an arena-backed UCB tree
//! - An explicit seeded RNG threaded through every call

pub mod action_space;
pub mod arena;
pub mod engine;
pub mod error;
pub mod node;
pub mod policy;
pub mod reward;
pub mod rollout;
pub mod transition;
pub mod tree;
pub mod tree_search;

pub use action_space::{
    action_space_size, enumerate_actions, narrow_action_space, sample_actions, sample_cells,
};
pub use engine::{Engine, SearchParams};
pub use error::SearchError;
pub use node::{Node, NodeId};
pub use policy::{
    chooser_for_strategy, run_policy, run_policy_traced, ActionChooser, PolicyOutcome,
    RolloutChooser, SearchRng, StepRecord,
};
pub use reward::{reward, RewardWeights};
pub use rollout::rollout;
pub use transition::next_state;
pub use tree::SearchTree;
pub use tree_search::TreeChooser;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod reward_tests;
#[cfg(test)]
mod tree_tests;
