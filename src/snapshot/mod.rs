//! Value-only world snapshots
//!
//! A snapshot captures the clock, id allocator, event log, every unit's full
//! field set (including in-flight reload timers and intents), and a strategy
//! tag per owner - enough for the persistence layer to reconstruct an
//! equivalent world. Unknown unit-kind or strategy tags fall back to safe
//! defaults; the fallback is logged and surfaced in the restore report, never
//! silently absorbed.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{PlayerId, SimTime, UnitId, Vec2};
use crate::engine::events::BattleEvent;
use crate::engine::unit::Unit;
use crate::engine::unit_kind::{Tag, UnitKind};
use crate::engine::world::World;
use crate::targeting::{General, GeneralKind};

/// Fallback kind when a snapshot names an unknown unit type
const FALLBACK_UNIT_KIND: UnitKind = UnitKind::Pikeman;
/// Fallback strategy when a snapshot names an unknown general
const FALLBACK_GENERAL: GeneralKind = GeneralKind::NearestEnemy;

/// Full field set of one unit, with the kind as a plain tag so unknown
/// kinds degrade gracefully instead of failing the load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: u64,
    pub owner: u32,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub attack: f32,
    pub armor: f32,
    pub range: f32,
    pub speed: f32,
    pub regen: f32,
    pub reload_time: f32,
    pub reload_remaining: f32,
    pub tags: Vec<Tag>,
    /// Ordered so identical worlds serialize to identical bytes
    pub bonuses: BTreeMap<Tag, f32>,
    pub target_id: Option<u64>,
    pub retreat_to: Option<Vec2>,
    pub kite_from: Option<Vec2>,
    pub alive: bool,
}

impl UnitSnapshot {
    fn capture(unit: &Unit) -> Self {
        Self {
            id: unit.id.0,
            owner: unit.owner.0,
            kind: unit.kind.as_tag().to_string(),
            x: unit.pos.x,
            y: unit.pos.y,
            radius: unit.radius,
            hp: unit.hp,
            max_hp: unit.max_hp,
            attack: unit.attack,
            armor: unit.armor,
            range: unit.range,
            speed: unit.speed,
            regen: unit.regen,
            reload_time: unit.reload_time,
            reload_remaining: unit.reload_remaining,
            tags: unit.tags.clone(),
            bonuses: unit.bonuses.iter().map(|(&t, &b)| (t, b)).collect(),
            target_id: unit.target_id.map(|id| id.0),
            retreat_to: unit.retreat_to,
            kite_from: unit.kite_from,
            alive: unit.alive,
        }
    }

    fn restore(&self, report: &mut RestoreReport) -> Unit {
        let kind = UnitKind::parse_tag(&self.kind).unwrap_or_else(|| {
            tracing::warn!(tag = %self.kind, "unknown unit kind in snapshot, using fallback");
            report.note(format!(
                "unit {} had unknown kind '{}', restored as {}",
                self.id,
                self.kind,
                FALLBACK_UNIT_KIND.as_tag()
            ));
            FALLBACK_UNIT_KIND
        });
        Unit {
            id: UnitId(self.id),
            owner: PlayerId(self.owner),
            kind,
            pos: Vec2::new(self.x, self.y),
            radius: self.radius,
            hp: self.hp,
            max_hp: self.max_hp,
            attack: self.attack,
            armor: self.armor,
            range: self.range,
            speed: self.speed,
            regen: self.regen,
            reload_time: self.reload_time,
            reload_remaining: self.reload_remaining,
            tags: self.tags.clone(),
            bonuses: self.bonuses.iter().map(|(&t, &b)| (t, b)).collect(),
            target_id: self.target_id.map(UnitId),
            retreat_to: self.retreat_to,
            kite_from: self.kite_from,
            alive: self.alive,
        }
    }
}

/// Everything needed to rebuild an equivalent world and strategy set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub clock: SimTime,
    pub next_id: u64,
    pub events: Vec<BattleEvent>,
    pub units: Vec<UnitSnapshot>,
    /// owner → strategy tag
    pub generals: BTreeMap<u32, String>,
}

/// Notes about lossy fallbacks taken while restoring
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    pub fallbacks: Vec<String>,
}

impl RestoreReport {
    fn note(&mut self, message: String) {
        self.fallbacks.push(message);
    }

    pub fn is_clean(&self) -> bool {
        self.fallbacks.is_empty()
    }
}

/// Capture a value-only snapshot of the world and its strategies
pub fn capture(world: &World, generals: &BTreeMap<PlayerId, Box<dyn General>>) -> WorldSnapshot {
    WorldSnapshot {
        clock: world.clock(),
        next_id: world.next_id(),
        events: world.events().to_vec(),
        units: world.units().iter().map(UnitSnapshot::capture).collect(),
        generals: generals
            .iter()
            .map(|(owner, general)| (owner.0, general.kind().as_tag().to_string()))
            .collect(),
    }
}

/// Rebuild a world and its strategies from a snapshot.
///
/// `seed` re-seeds the scored strategies' jitter. The only hard failure is a
/// duplicate unit id; unknown tags degrade to defaults and are reported.
pub fn restore(
    snapshot: &WorldSnapshot,
    seed: u64,
) -> Result<(World, BTreeMap<PlayerId, Box<dyn General>>, RestoreReport)> {
    let mut report = RestoreReport::default();

    let units: Vec<Unit> = snapshot
        .units
        .iter()
        .map(|u| u.restore(&mut report))
        .collect();
    let world = World::from_parts(snapshot.clock, snapshot.next_id, snapshot.events.clone(), units)?;

    let mut generals: BTreeMap<PlayerId, Box<dyn General>> = BTreeMap::new();
    for (&owner, tag) in &snapshot.generals {
        let kind = GeneralKind::parse_tag(tag).unwrap_or_else(|| {
            tracing::warn!(tag = %tag, owner, "unknown strategy tag in snapshot, using fallback");
            report.note(format!(
                "owner {} had unknown strategy '{}', restored as {}",
                owner,
                tag,
                FALLBACK_GENERAL.as_tag()
            ));
            FALLBACK_GENERAL
        });
        generals.insert(PlayerId(owner), kind.build(seed.wrapping_add(owner as u64)));
    }

    Ok((world, generals, report))
}

/// Serialize a snapshot to pretty JSON on disk
pub fn save_to_file(snapshot: &WorldSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a snapshot from a JSON file
pub fn load_from_file(path: &Path) -> Result<WorldSnapshot> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
