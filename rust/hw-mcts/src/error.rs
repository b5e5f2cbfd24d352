//! Search error taxonomy.

use hw_core::{HydrologyError, WorldError};
use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid config: {msg}")]
    InvalidConfig { msg: &'static str },
    #[error("horizon must be > 0")]
    InvalidHorizon,
    #[error(
        "action space too large: {candidates} candidate cells at capacity {capacity} \
         enumerate to {count} actions (limit {limit})"
    )]
    ActionSpaceTooLarge {
        candidates: usize,
        capacity: usize,
        count: u128,
        limit: u64,
    },
    #[error("node {node} scored before its parent was visited")]
    UnvisitedParent { node: NodeId },
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Hydrology(#[from] HydrologyError),
}
