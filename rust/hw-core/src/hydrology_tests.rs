use crate::{Coord, HexHydrology, HydrologyConfig, HydrologyError, Simulator, World};

use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

fn cfg() -> HydrologyConfig {
    HydrologyConfig {
        flood_level: 10.0,
        precip_rate: 1.0,
        flow_rate: 0.25,
        drain_rate: 0.5,
        drain_failure_prob: 0.0,
    }
}

#[test]
fn rain_adds_water_everywhere() {
    let sim = HexHydrology::new(cfg()).unwrap();
    let mut w = World::new(3, 2);
    sim.rain(&mut w, 1.5).unwrap();
    for c in w.cells() {
        assert_eq!(c.water_level, 1.5);
    }
}

#[test]
fn rain_rejects_negative_rate() {
    let sim = HexHydrology::new(cfg()).unwrap();
    let mut w = World::new(1, 1);
    let err = sim.rain(&mut w, -1.0).unwrap_err();
    assert_eq!(err, HydrologyError::InvalidRate { rate: -1.0 });
    assert_eq!(w.cells()[0].water_level, 0.0);
}

#[test]
fn rain_to_flood_level_marks_cells_flooded() {
    let sim = HexHydrology::new(cfg()).unwrap();
    let mut w = World::new(2, 2);
    sim.rain(&mut w, 10.0).unwrap();
    assert_eq!(w.flooded_count(), 4);
}

#[test]
fn flow_conserves_water_and_moves_it_downhill() {
    let sim = HexHydrology::new(cfg()).unwrap();
    let mut w = World::new(3, 3);
    let top = Coord::new(1, 1);
    w.cell_mut(top).unwrap().elevation = 5.0;
    w.cell_mut(top).unwrap().water_level = 4.0;

    let before = w.total_water();
    sim.flow(&mut w).unwrap();
    let after = w.total_water();

    assert!((before - after).abs() < 1e-9, "before={before} after={after}");
    assert!(w.cell(top).unwrap().water_level < 4.0);
    for n in w.neighbors(top) {
        assert!(w.cell(n).unwrap().water_level > 0.0);
    }
}

#[test]
fn flow_leaves_level_water_alone() {
    let sim = HexHydrology::new(cfg()).unwrap();
    let mut w = World::new(3, 3);
    for c in w.cells_mut() {
        c.water_level = 2.0;
    }
    let before = w.clone();
    sim.flow(&mut w).unwrap();
    assert_eq!(w, before);
}

#[test]
fn drains_remove_water_only_when_working() {
    let sim = HexHydrology::new(cfg()).unwrap();
    let mut w = World::new(3, 1);
    for c in w.cells_mut() {
        c.water_level = 1.0;
    }
    w.cell_mut(Coord::new(0, 0)).unwrap().has_drain = true;
    w.cell_mut(Coord::new(1, 0)).unwrap().has_drain = true;
    w.cell_mut(Coord::new(1, 0)).unwrap().drain_failed = true;

    sim.drain(&mut w).unwrap();
    assert_eq!(w.cell(Coord::new(0, 0)).unwrap().water_level, 0.5);
    assert_eq!(w.cell(Coord::new(1, 0)).unwrap().water_level, 1.0);
    assert_eq!(w.cell(Coord::new(2, 0)).unwrap().water_level, 1.0);
}

#[test]
fn drainage_never_goes_negative() {
    let sim = HexHydrology::new(cfg()).unwrap();
    let mut w = World::new(1, 1);
    w.cells_mut()[0].has_drain = true;
    w.cells_mut()[0].water_level = 0.2;
    sim.drain(&mut w).unwrap();
    assert_eq!(w.cells()[0].water_level, 0.0);
}

#[test]
fn certain_failure_clogs_every_drain() {
    let sim = HexHydrology::new(HydrologyConfig {
        drain_failure_prob: 1.0,
        ..cfg()
    })
    .unwrap();
    let mut w = World::new(2, 2);
    for c in w.cells_mut() {
        c.has_drain = true;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    sim.fail_drains(&mut w, &mut rng).unwrap();
    assert!(w.cells().iter().all(|c| c.drain_failed));
}

#[test]
fn zero_failure_probability_keeps_drains() {
    let sim = HexHydrology::new(cfg()).unwrap();
    let mut w = World::new(2, 2);
    for c in w.cells_mut() {
        c.has_drain = true;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    sim.fail_drains(&mut w, &mut rng).unwrap();
    assert!(w.cells().iter().all(|c| c.drain_working()));
}

#[test]
fn drain_failure_is_reproducible_for_a_seed() {
    let sim = HexHydrology::new(HydrologyConfig {
        drain_failure_prob: 0.5,
        ..cfg()
    })
    .unwrap();
    let mut base = World::new(6, 6);
    for c in base.cells_mut() {
        c.has_drain = true;
    }

    let mut a = base.clone();
    let mut b = base;
    sim.fail_drains(&mut a, &mut ChaCha8Rng::seed_from_u64(42))
        .unwrap();
    sim.fail_drains(&mut b, &mut ChaCha8Rng::seed_from_u64(42))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn flood_level_comes_from_the_config() {
    let sim = HexHydrology::new(HydrologyConfig {
        flood_level: 7.5,
        ..cfg()
    })
    .unwrap();
    assert_eq!(sim.flood_level(), 7.5);
}

#[test]
fn invalid_parameters_are_rejected() {
    let err = HexHydrology::new(HydrologyConfig {
        flood_level: 0.0,
        ..cfg()
    })
    .unwrap_err();
    assert!(matches!(err, HydrologyError::InvalidParameter { .. }));

    assert!(HexHydrology::new(HydrologyConfig {
        drain_failure_prob: 1.5,
        ..cfg()
    })
    .is_err());
}
