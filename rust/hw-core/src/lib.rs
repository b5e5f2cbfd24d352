//! hw-core: hex world container, water model, and configuration.

pub mod action;
pub mod config;
pub mod hydrology;
pub mod world;

pub use action::{Action, Coord};
pub use config::{
    Config, ConfigError, HydrologyConfig, RewardConfig, RunConfig, SearchConfig, Strategy,
    WorldConfig,
};
pub use hydrology::{HexHydrology, HydrologyError, Simulator};
pub use world::{Cell, World, WorldError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod hydrology_tests;
