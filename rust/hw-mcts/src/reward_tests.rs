use crate::{reward, RewardWeights};
use hw_core::{Action, Coord, World};

fn weights() -> RewardWeights {
    RewardWeights {
        flood_evac: 10.0,
        dry_evac: -1.0,
        flood_no_evac: -20.0,
        dry_no_evac: 0.5,
    }
}

fn single_cell(population: f64) -> World {
    let mut w = World::new(1, 1);
    w.cells_mut()[0].population = population;
    w
}

fn flooded(mut w: World) -> World {
    w.cells_mut()[0].is_flooded = true;
    w
}

#[test]
fn each_outcome_applies_exactly_one_weight() {
    let w = single_cell(2.0);
    let evac = Action::new(vec![Coord::new(0, 0)]);
    let stay = Action::empty();
    let wt = weights();

    assert_eq!(reward(&w, &evac, &flooded(w.clone()), &wt), 2.0 * 10.0);
    assert_eq!(reward(&w, &evac, &w, &wt), 2.0 * -1.0);
    assert_eq!(reward(&w, &stay, &flooded(w.clone()), &wt), 2.0 * -20.0);
    assert_eq!(reward(&w, &stay, &w, &wt), 2.0 * 0.5);
}

#[test]
fn empty_population_contributes_nothing() {
    let w = single_cell(0.0);
    assert_eq!(reward(&w, &Action::empty(), &flooded(w.clone()), &weights()), 0.0);
}

#[test]
fn reward_sums_over_cells() {
    let mut w = World::new(2, 1);
    for c in w.cells_mut() {
        c.population = 1.0;
    }
    let mut next = w.clone();
    next.cells_mut()[1].is_flooded = true;
    let a = Action::new(vec![Coord::new(1, 0)]);
    // cell 0: dry, stayed; cell 1: flooded, evacuated
    assert_eq!(reward(&w, &a, &next, &weights()), 0.5 + 10.0);
}

#[test]
fn duplicate_cells_in_an_action_count_once() {
    let w = single_cell(1.0);
    let a = Action::new(vec![Coord::new(0, 0), Coord::new(0, 0)]);
    assert_eq!(reward(&w, &a, &flooded(w.clone()), &weights()), 10.0);
}

#[test]
fn weights_follow_the_config() {
    let cfg = hw_core::Config::default();
    let wt = RewardWeights::from(&cfg.reward);
    assert_eq!(wt.flood_no_evac, cfg.reward.flood_no_evac);
    assert_eq!(wt, RewardWeights::default());
}
