//! Property tests for engine invariants under arbitrary armies and seeds

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;

use skirmish::core::types::{PlayerId, Vec2};
use skirmish::engine::{UnitKind, World};
use skirmish::targeting::{General, GeneralKind};

const DT: f32 = 0.1;

fn kind_strategy() -> impl Strategy<Value = UnitKind> {
    prop_oneof![
        Just(UnitKind::Pikeman),
        Just(UnitKind::Crossbowman),
        Just(UnitKind::Knight),
        Just(UnitKind::Monk),
    ]
}

fn army_strategy() -> impl Strategy<Value = Vec<(UnitKind, f32, f32)>> {
    prop::collection::vec(
        (kind_strategy(), -10.0f32..10.0, -10.0f32..10.0),
        1..8,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_engine_invariants_hold(
        army1 in army_strategy(),
        army2 in army_strategy(),
        seed in 0u64..1000,
        steps in 1usize..120,
    ) {
        let mut world = World::new();
        for (kind, x, y) in &army1 {
            world.spawn_default(PlayerId(1), Vec2::new(*x - 10.0, *y), *kind);
        }
        for (kind, x, y) in &army2 {
            world.spawn_default(PlayerId(2), Vec2::new(*x + 10.0, *y), *kind);
        }
        let spawned = army1.len() + army2.len();

        let mut gens: BTreeMap<PlayerId, Box<dyn General>> = BTreeMap::new();
        gens.insert(PlayerId(1), GeneralKind::Scored.build(seed));
        gens.insert(PlayerId(2), GeneralKind::NearestEnemy.build(seed.wrapping_add(1)));

        for _ in 0..steps {
            world.step(DT, &mut gens);
        }

        // Survivors are alive, in hp bounds, and uniquely identified.
        let mut seen = HashSet::new();
        for unit in world.units() {
            prop_assert!(unit.alive);
            prop_assert!(unit.hp > 0.0);
            prop_assert!(unit.hp <= unit.max_hp);
            prop_assert!(unit.pos.x.is_finite() && unit.pos.y.is_finite());
            prop_assert!(seen.insert(unit.id));
            prop_assert!(unit.id.0 < world.next_id());
        }

        // Every disappearance is accounted for by a death event.
        prop_assert_eq!(world.events().len(), spawned - world.units().len());

        // The clock advanced by exactly the accepted timesteps.
        let expected = DT * steps as f32;
        prop_assert!((world.clock() - expected).abs() < 1e-3);
    }

    #[test]
    fn prop_same_seed_reproduces_run(
        army in army_strategy(),
        seed in 0u64..1000,
    ) {
        let run = || {
            let mut world = World::new();
            for (kind, x, y) in &army {
                world.spawn_default(PlayerId(1), Vec2::new(*x - 8.0, *y), *kind);
                world.spawn_default(PlayerId(2), Vec2::new(*x + 8.0, *y), *kind);
            }
            let mut gens: BTreeMap<PlayerId, Box<dyn General>> = BTreeMap::new();
            gens.insert(PlayerId(1), GeneralKind::Scored.build(seed));
            gens.insert(PlayerId(2), GeneralKind::Scored.build(seed.wrapping_add(1)));
            for _ in 0..60 {
                world.step(DT, &mut gens);
            }
            world
                .units()
                .iter()
                .map(|u| (u.id.0, u.pos.x.to_bits(), u.pos.y.to_bits(), u.hp.to_bits()))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(run(), run());
    }
}
