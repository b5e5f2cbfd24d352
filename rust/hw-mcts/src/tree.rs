//! Arena-backed search tree with upper-confidence child selection.
//!
//! Nodes never move once pushed, so `NodeId`s stay valid for the life of the tree.
//! Parents are plain ids: a child reads its parent's visit count, never mutates it.

use hw_core::{Action, Simulator, World};
use rand::Rng;

use crate::arena::Arena;
use crate::engine::Engine;
use crate::error::SearchError;
use crate::node::{Node, NodeId};

pub struct SearchTree {
    arena: Arena,
    root: NodeId,
}

impl SearchTree {
    pub fn new(root_state: World) -> Self {
        let mut arena = Arena::new();
        let root = arena.push(Node::root(root_state));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Panics on an id that did not come from this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        match self.arena.get(id) {
            Some(n) => n,
            None => panic!("node {id} not in tree of {} nodes", self.arena.len()),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        let len = self.arena.len();
        match self.arena.get_mut(id) {
            Some(n) => n,
            None => panic!("node {id} not in tree of {len} nodes"),
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Attach a child reached from `parent` by `action`.
    pub fn add_child(&mut self, parent: NodeId, action: Action, state: World) -> NodeId {
        let depth = self.node(parent).depth + 1;
        let id = self.arena.push(Node::child(state, action, parent, depth));
        self.node_mut(parent).children.push(id);
        id
    }

    /// One child per sampled candidate action of `id`'s state. Returns how many were added.
    ///
    /// Sampling is with replacement, so two children may carry the same action.
    pub fn expand<S: Simulator, R: Rng>(
        &mut self,
        engine: &Engine<S>,
        id: NodeId,
        rng: &mut R,
    ) -> Result<usize, SearchError> {
        let actions = engine.branched_actions(&self.node(id).state, rng)?;
        let added = actions.len();
        for action in actions {
            let next = engine.next_state(&self.node(id).state, &action, rng)?;
            self.add_child(id, action, next);
        }
        Ok(added)
    }

    /// `reward/visits + c * sqrt(ln(parent.visits)/visits)`, or `+inf` when unvisited.
    ///
    /// A visited node must have a visited parent.
    pub fn selection_score(&self, id: NodeId, exploration: f64) -> Result<f64, SearchError> {
        let node = self.node(id);
        if node.visits == 0 {
            return Ok(f64::INFINITY);
        }
        let parent_visits = match node.parent {
            Some(p) => self.node(p).visits,
            None => 0,
        };
        if parent_visits == 0 {
            return Err(SearchError::UnvisitedParent { node: id });
        }
        let n = node.visits as f64;
        let mean = node.reward / n;
        let bonus = exploration * ((parent_visits as f64).ln() / n).sqrt();
        Ok(mean + bonus)
    }

    /// Highest-scoring child of `parent`; the first one wins ties.
    pub fn best_child(
        &self,
        parent: NodeId,
        exploration: f64,
    ) -> Result<Option<NodeId>, SearchError> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in self.children(parent) {
            let score = self.selection_score(child, exploration)?;
            match best {
                Some((_, s)) if score <= s => {}
                _ => best = Some((child, score)),
            }
        }
        Ok(best.map(|(id, _)| id))
    }

    /// Action of [`Self::best_child`], or `None` when `parent` has no children.
    pub fn best_action(
        &self,
        parent: NodeId,
        exploration: f64,
    ) -> Result<Option<Action>, SearchError> {
        Ok(self
            .best_child(parent, exploration)?
            .and_then(|id| self.node(id).action.clone()))
    }

    pub fn update(&mut self, id: NodeId, reward: f64) {
        let n = self.node_mut(id);
        n.visits += 1;
        n.reward += reward;
    }

    /// `update` on `id` and every ancestor up to the root.
    pub fn backpropagate(&mut self, id: NodeId, reward: f64) {
        let mut cur = Some(id);
        while let Some(c) = cur {
            self.update(c, reward);
            cur = self.node(c).parent;
        }
    }

    /// Walk from the root by [`Self::best_child`] until reaching a node without children.
    pub fn select_leaf(&self, exploration: f64) -> Result<NodeId, SearchError> {
        let mut cur = self.root;
        while let Some(next) = self.best_child(cur, exploration)? {
            cur = next;
        }
        Ok(cur)
    }
}
