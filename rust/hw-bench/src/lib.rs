//! Shared fixtures for the hw benchmarks.

use hw_core::{Config, Coord, HexHydrology, World, WorldConfig};
use hw_mcts::{Engine, SearchRng};
use rand_core::SeedableRng;

/// `n` candidate coordinates along a single row.
pub fn row_coords(n: u32) -> Vec<Coord> {
    (0..n).map(|x| Coord::new(x, 0)).collect()
}

/// A generated `width x height` world with every cell wet enough to be a candidate.
pub fn wet_world(width: u32, height: u32, seed: u64) -> World {
    let cfg = WorldConfig {
        width,
        height,
        ..WorldConfig::default()
    };
    let mut rng = SearchRng::seed_from_u64(seed);
    let mut w = World::generate(&cfg, &mut rng);
    for c in w.cells_mut() {
        c.water_level = 4.0;
    }
    w
}

/// Engine over the default configuration.
pub fn default_engine() -> Engine<HexHydrology> {
    match Engine::from_config(&Config::default()) {
        Ok(e) => e,
        Err(e) => panic!("default config must build an engine: {e}"),
    }
}
