//! Multi-level UCB search over the [`SearchTree`].

use hw_core::{Action, Simulator, World};

use crate::engine::{Engine, SearchParams};
use crate::error::SearchError;
use crate::node::NodeId;
use crate::policy::{ActionChooser, SearchRng};
use crate::tree::SearchTree;

/// Select, expand, roll out, backpropagate; then pick the best root child.
#[derive(Debug, Clone, Copy)]
pub struct TreeChooser {
    pub iterations: u32,
    /// Nodes deeper than this below the root are never expanded.
    pub max_depth: u32,
    pub exploration: f64,
}

impl TreeChooser {
    pub fn from_params(p: &SearchParams) -> Self {
        Self {
            iterations: p.tree_iterations,
            max_depth: p.tree_depth,
            exploration: p.exploration,
        }
    }

    /// Builds and searches a tree rooted at `world`; returns it for inspection.
    pub fn search<S: Simulator>(
        &self,
        engine: &Engine<S>,
        world: &World,
        horizon: u32,
        rng: &mut SearchRng,
    ) -> Result<SearchTree, SearchError> {
        let mut tree = SearchTree::new(world.clone());
        let root = tree.root();
        if tree.expand(engine, root, rng)? == 0 {
            return Ok(tree);
        }

        for _ in 0..self.iterations {
            let mut leaf = tree.select_leaf(self.exploration)?;
            let node = tree.node(leaf);
            let expandable =
                node.visits > 0 && node.depth < self.max_depth && node.depth < horizon;
            if expandable && tree.expand(engine, leaf, rng)? > 0 {
                leaf = tree.children(leaf)[0];
            }
            let node = tree.node(leaf);
            let remaining = horizon.saturating_sub(node.depth);
            let value = path_reward(engine, &tree, leaf)
                + engine.rollout(&node.state, remaining, rng)?;
            tree.backpropagate(leaf, value);
        }
        Ok(tree)
    }
}

/// Rewards realised along the edges from the root down to `id`.
fn path_reward<S: Simulator>(engine: &Engine<S>, tree: &SearchTree, id: NodeId) -> f64 {
    let mut total = 0.0;
    let mut cur = tree.node(id);
    while let (Some(p), Some(action)) = (cur.parent, cur.action.as_ref()) {
        let parent = tree.node(p);
        total += engine.reward(&parent.state, action, &cur.state);
        cur = parent;
    }
    total
}

impl<S: Simulator> ActionChooser<S> for TreeChooser {
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
        let tree = self.search(engine, world, horizon, rng)?;
        Ok(tree
            .best_action(tree.root(), self.exploration)?
            .unwrap_or_else(Action::empty))
    }
}
