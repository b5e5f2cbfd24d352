//! Search-tree node.

use hw_core::{Action, World};

pub type NodeId = u32;

#[derive(Debug, Clone)]
pub struct Node {
    /// Snapshot owned by this node.
    pub state: World,
    /// Action that led here from the parent; `None` at the root.
    pub action: Option<Action>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub visits: u32,
    /// Accumulated reward over all visits.
    pub reward: f64,
    pub depth: u32,
}

impl Node {
    pub fn root(state: World) -> Self {
        Self {
            state,
            action: None,
            parent: None,
            children: Vec::new(),
            visits: 0,
            reward: 0.0,
            depth: 0,
        }
    }

    pub fn child(state: World, action: Action, parent: NodeId, depth: u32) -> Self {
        Self {
            state,
            action: Some(action),
            parent: Some(parent),
            children: Vec::new(),
            visits: 0,
            reward: 0.0,
            depth,
        }
    }

    pub fn mean_reward(&self) -> Option<f64> {
        if self.visits == 0 {
            None
        } else {
            Some(self.reward / self.visits as f64)
        }
    }
}
