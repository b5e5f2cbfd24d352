//! Candidate evacuation actions.
//!
//! - narrowing: only cells that are wet but not yet flooded are worth evacuating
//! - enumeration: every subset of the candidates up to the capacity, deterministic order
//! - sampling: uniform draws **with replacement**, so duplicates are possible

use hw_core::{Action, Coord, World};
use rand::Rng;

/// A cell is a candidate once its water exceeds this fraction of the flood level.
pub const CANDIDATE_FRACTION: f64 = 0.25;

/// Coordinates of cells with `water_level > 0.25 * flood_level` that are not flooded.
///
/// Order follows the world's cell order.
pub fn narrow_action_space(world: &World, flood_level: f64) -> Vec<Coord> {
    let min_level = CANDIDATE_FRACTION * flood_level;
    world
        .cells()
        .iter()
        .filter(|c| c.water_level > min_level && !c.is_flooded)
        .map(|c| c.coord)
        .collect()
}

/// `Σ_{i=0..=min(k,n)} C(n, i)`, saturating at `u128::MAX`.
pub fn action_space_size(n: usize, capacity: usize) -> u128 {
    let k = capacity.min(n);
    let mut total: u128 = 0;
    let mut c: u128 = 1; // C(n, 0)
    for i in 0..=k {
        total = match total.checked_add(c) {
            Some(t) => t,
            None => return u128::MAX,
        };
        if i == k {
            break;
        }
        // C(n, i+1) = C(n, i) * (n - i) / (i + 1), exact at every step.
        c = match c.checked_mul((n - i) as u128) {
            Some(v) => v / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    total
}

/// Every combination of `coords` of size `0..=min(capacity, coords.len())`.
///
/// Grouped by size, lexicographic by index within a size; the empty action is first.
pub fn enumerate_actions(coords: &[Coord], capacity: usize) -> Vec<Action> {
    let k_max = capacity.min(coords.len());
    let mut out = Vec::new();
    for k in 0..=k_max {
        push_combinations(coords, k, &mut out);
    }
    out
}

fn push_combinations(coords: &[Coord], k: usize, out: &mut Vec<Action>) {
    let n = coords.len();
    if k > n {
        return;
    }
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.iter().map(|&i| coords[i]).collect());

        // Rightmost position that has not reached its final value.
        let Some(pos) = (0..k).rev().find(|&p| idx[p] != p + n - k) else {
            return;
        };
        idx[pos] += 1;
        for p in pos + 1..k {
            idx[p] = idx[p - 1] + 1;
        }
    }
}

/// Keep `actions` when there are fewer than `m`; otherwise draw `m` with replacement.
pub fn sample_actions<R: Rng>(actions: Vec<Action>, m: usize, rng: &mut R) -> Vec<Action> {
    if actions.len() < m {
        return actions;
    }
    (0..m)
        .map(|_| actions[rng.gen_range(0..actions.len())].clone())
        .collect()
}

/// `k` cells drawn uniformly with replacement from `coords`.
pub fn sample_cells<R: Rng>(coords: &[Coord], k: usize, rng: &mut R) -> Vec<Coord> {
    if coords.is_empty() {
        return Vec::new();
    }
    (0..k)
        .map(|_| coords[rng.gen_range(0..coords.len())])
        .collect()
}
