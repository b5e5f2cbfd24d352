use std::collections::BTreeSet;

use crate::{Engine, SearchError, SearchTree};
use hw_core::{Action, Config, Coord, World};

use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

fn tree_with_children(n: u32) -> SearchTree {
    let mut t = SearchTree::new(World::new(3, 1));
    let root = t.root();
    for i in 0..n {
        t.add_child(root, Action::new(vec![Coord::new(i, 0)]), World::new(3, 1));
    }
    t
}

fn set_stats(t: &mut SearchTree, id: u32, visits: u32, reward: f64) {
    for _ in 0..visits {
        t.update(id, reward / visits as f64);
    }
}

#[test]
fn unvisited_nodes_score_infinity() {
    let t = tree_with_children(1);
    let child = t.children(t.root())[0];
    assert_eq!(t.selection_score(child, 1.4).unwrap(), f64::INFINITY);
    assert_eq!(t.selection_score(t.root(), 0.0).unwrap(), f64::INFINITY);
}

#[test]
fn score_is_mean_reward_without_exploration() {
    let mut t = tree_with_children(1);
    let root = t.root();
    let child = t.children(root)[0];
    set_stats(&mut t, root, 4, 0.0);
    set_stats(&mut t, child, 4, 10.0);
    let s = t.selection_score(child, 0.0).unwrap();
    assert!((s - 2.5).abs() < 1e-12);
}

#[test]
fn score_includes_exploration_bonus() {
    let mut t = tree_with_children(1);
    let root = t.root();
    let child = t.children(root)[0];
    set_stats(&mut t, root, 10, 0.0);
    set_stats(&mut t, child, 2, 4.0);
    let want = 2.0 + 1.5 * ((10f64).ln() / 2.0).sqrt();
    let s = t.selection_score(child, 1.5).unwrap();
    assert!((s - want).abs() < 1e-12);
}

#[test]
fn score_does_not_increase_with_visits() {
    // Fixed reward total and parent visits: more visits shrink both terms.
    let mut prev = f64::INFINITY;
    for visits in 1..20u32 {
        let mut t = tree_with_children(1);
        let root = t.root();
        let child = t.children(root)[0];
        set_stats(&mut t, root, 50, 0.0);
        set_stats(&mut t, child, visits, 30.0);
        let s = t.selection_score(child, 2.0).unwrap();
        assert!(s.is_finite());
        assert!(s <= prev, "visits={visits} score={s} prev={prev}");
        prev = s;
    }
}

#[test]
fn visited_node_under_unvisited_parent_is_an_error() {
    let mut t = tree_with_children(1);
    let child = t.children(t.root())[0];
    t.update(child, 1.0);
    let err = t.selection_score(child, 1.0).unwrap_err();
    assert!(matches!(err, SearchError::UnvisitedParent { node } if node == child));

    // A visited root has no parent to read.
    let root = t.root();
    t.update(root, 1.0);
    assert!(t.selection_score(root, 1.0).is_err());
}

#[test]
fn best_action_prefers_the_unvisited_child() {
    let mut t = tree_with_children(2);
    let root = t.root();
    let kids = t.children(root).to_vec();
    set_stats(&mut t, root, 5, 0.0);
    set_stats(&mut t, kids[1], 5, 10.0);

    let best = t.best_action(root, 0.0).unwrap();
    assert_eq!(best, Some(Action::new(vec![Coord::new(0, 0)])));
}

#[test]
fn best_action_takes_the_first_of_equal_scores() {
    let mut t = tree_with_children(3);
    let root = t.root();
    let kids = t.children(root).to_vec();
    set_stats(&mut t, root, 6, 0.0);
    set_stats(&mut t, kids[0], 2, 2.0);
    set_stats(&mut t, kids[1], 2, 6.0);
    set_stats(&mut t, kids[2], 2, 6.0);
    let best = t.best_action(root, 0.0).unwrap();
    assert_eq!(best, Some(Action::new(vec![Coord::new(1, 0)])));
}

#[test]
fn best_action_of_a_leaf_is_none() {
    let t = tree_with_children(0);
    assert_eq!(t.best_action(t.root(), 1.0).unwrap(), None);
}

#[test]
fn update_counts_every_visit() {
    let mut t = tree_with_children(0);
    let root = t.root();
    t.update(root, 3.0);
    t.update(root, -1.0);
    let n = t.node(root);
    assert_eq!(n.visits, 2);
    assert_eq!(n.reward, 2.0);
    assert_eq!(n.mean_reward(), Some(1.0));
}

#[test]
fn backpropagate_reaches_the_root() {
    let mut t = tree_with_children(1);
    let root = t.root();
    let child = t.children(root)[0];
    let grandchild = t.add_child(child, Action::empty(), World::new(3, 1));
    assert_eq!(t.node(grandchild).depth, 2);
    assert_eq!(t.node(grandchild).parent, Some(child));

    t.backpropagate(grandchild, 4.0);
    for id in [grandchild, child, root] {
        assert_eq!(t.node(id).visits, 1);
        assert_eq!(t.node(id).reward, 4.0);
    }
}

#[test]
fn select_leaf_descends_through_visited_nodes() {
    let mut t = tree_with_children(2);
    let root = t.root();
    let kids = t.children(root).to_vec();
    assert_eq!(t.select_leaf(0.0).unwrap(), kids[0]);

    t.backpropagate(kids[0], 1.0);
    assert_eq!(t.select_leaf(0.0).unwrap(), kids[1]);

    t.backpropagate(kids[1], 5.0);
    let deep = t.add_child(kids[1], Action::empty(), World::new(3, 1));
    assert_eq!(t.select_leaf(0.0).unwrap(), deep);
}

#[test]
fn expand_adds_one_child_per_sampled_action() {
    let mut cfg = Config::default();
    cfg.search.branch_samples = 3;
    let engine = Engine::from_config(&cfg).unwrap();

    let mut w = World::new(4, 1);
    for c in w.cells_mut() {
        c.water_level = 4.0;
    }
    let mut t = SearchTree::new(w.clone());
    let root = t.root();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let added = t.expand(&engine, root, &mut rng).unwrap();

    assert_eq!(added, 3);
    assert_eq!(t.len(), 4);
    for &c in t.children(root) {
        let n = t.node(c);
        assert_eq!(n.depth, 1);
        assert_eq!(n.parent, Some(root));
        assert_eq!(n.visits, 0);
        let action = n.action.as_ref().unwrap();
        assert!(action.len() <= cfg.search.capacity as usize);
        let distinct: BTreeSet<_> = action.iter().collect();
        assert_eq!(n.state.evacuated_count(), distinct.len());
    }
    assert_eq!(t.node(root).state, w);
}
