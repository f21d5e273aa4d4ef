//! Snapshot persistence through full battles
//!
//! Mid-battle saves must restore into worlds that behave identically, and
//! corrupted tags must degrade loudly instead of failing the load.

use std::collections::BTreeMap;

use skirmish::core::types::PlayerId;
use skirmish::engine::{UnitKind, World};
use skirmish::scenario::Scenario;
use skirmish::snapshot;
use skirmish::targeting::{General, GeneralKind};

const DT: f32 = 0.1;

fn mid_battle_world() -> (World, BTreeMap<PlayerId, Box<dyn General>>) {
    let mut world = World::new();
    Scenario::Asymmetric.setup(&mut world, 77);
    let mut gens: BTreeMap<PlayerId, Box<dyn General>> = BTreeMap::new();
    gens.insert(PlayerId(1), GeneralKind::Scored.build(78));
    gens.insert(PlayerId(2), GeneralKind::NearestEnemy.build(79));
    for _ in 0..300 {
        world.step(DT, &mut gens);
    }
    (world, gens)
}

fn fingerprint(world: &World) -> String {
    world
        .units()
        .iter()
        .map(|u| {
            format!(
                "{}:{:.6}:{:.6}:{:.6}:{:.6}:{:?}",
                u.id, u.pos.x, u.pos.y, u.hp, u.reload_remaining, u.target_id
            )
        })
        .collect::<Vec<_>>()
        .join("|")
}

#[test]
fn test_restored_worlds_replay_identically() {
    let (world, gens) = mid_battle_world();
    assert!(
        !world.events().is_empty(),
        "mid-battle save should have casualties already"
    );

    let snap = snapshot::capture(&world, &gens);
    let (mut a, mut gens_a, report_a) = snapshot::restore(&snap, 500).unwrap();
    let (mut b, mut gens_b, report_b) = snapshot::restore(&snap, 500).unwrap();
    assert!(report_a.is_clean() && report_b.is_clean());
    assert_eq!(fingerprint(&a), fingerprint(&world));

    // Same snapshot, same restore seed: the continuations must agree.
    for _ in 0..100 {
        a.step(DT, &mut gens_a);
        b.step(DT, &mut gens_b);
    }
    assert_eq!(a.clock(), b.clock());
    assert_eq!(fingerprint(&a), fingerprint(&b));
    assert_eq!(a.events().len(), b.events().len());
}

#[test]
fn test_file_round_trip_mid_battle() {
    let (world, gens) = mid_battle_world();
    let snap = snapshot::capture(&world, &gens);

    let dir = std::env::temp_dir().join("skirmish-snapshot-integration");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("midbattle.json");
    snapshot::save_to_file(&snap, &path).unwrap();

    let loaded = snapshot::load_from_file(&path).unwrap();
    let (restored, restored_gens, report) = snapshot::restore(&loaded, 0).unwrap();
    assert!(report.is_clean());
    assert_eq!(fingerprint(&restored), fingerprint(&world));
    assert_eq!(restored.clock(), world.clock());
    assert_eq!(restored.events(), world.events());
    assert_eq!(restored_gens.len(), gens.len());
}

#[test]
fn test_corrupted_tags_degrade_with_report() {
    let (world, gens) = mid_battle_world();
    let mut snap = snapshot::capture(&world, &gens);
    snap.units[0].kind = "ballista".to_string();
    snap.generals.insert(2, "oracle".to_string());

    let (restored, restored_gens, report) = snapshot::restore(&snap, 0).unwrap();
    assert_eq!(report.fallbacks.len(), 2);
    assert_eq!(restored.units()[0].kind, UnitKind::Pikeman);
    assert_eq!(
        restored_gens[&PlayerId(2)].kind(),
        GeneralKind::NearestEnemy
    );
    // Everything else survives untouched.
    assert_eq!(restored.units().len(), world.units().len());
}
