//! Per-unit state and the per-tick behavior state machine
//!
//! A living unit each tick: cooldown and regen resolve first, then one of the
//! movement intents (kite, retreat) or the combat/heal behavior runs. Units
//! mutate only themselves and their current target; intent assignment belongs
//! to the targeting strategies.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, SimTime, UnitId, Vec2};
use crate::engine::constants::{
    HEALER_SIGHT_RANGE, HEAL_PULSE, MELEE_EPSILON, MIN_CHIP_DAMAGE, MIN_HP, MIN_RADIUS, MIN_RANGE,
    MIN_RELOAD_TIME, MIN_SPEED, RALLY_ARRIVE_RADIUS,
};
use crate::engine::events::BattleEvent;
use crate::engine::unit_kind::{UnitKind, UnitStats};

/// A single combatant (or healer) on the battlefield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub kind: UnitKind,

    // Spatial
    pub pos: Vec2,
    pub radius: f32,

    // Combat stats
    pub hp: f32,
    pub max_hp: f32,
    pub attack: f32,
    pub armor: f32,
    pub range: f32,
    pub speed: f32,
    pub regen: f32,
    pub reload_time: f32,
    /// Countdown until the next attack/heal pulse is allowed
    pub reload_remaining: f32,

    // Classification
    pub tags: Vec<crate::engine::unit_kind::Tag>,
    pub bonuses: AHashMap<crate::engine::unit_kind::Tag, f32>,

    // Intent (assigned by strategies, revalidated every tick)
    pub target_id: Option<UnitId>,
    pub retreat_to: Option<Vec2>,
    pub kite_from: Option<Vec2>,

    pub alive: bool,
}

impl UnitStats {
    /// Correct structurally invalid stats instead of rejecting the spawn.
    /// A malformed unit must never crash the simulation.
    pub fn sanitized(mut self) -> Self {
        if self.hp < MIN_HP {
            tracing::debug!(hp = self.hp, "clamping non-positive hp");
            self.hp = MIN_HP;
        }
        if self.max_hp < self.hp {
            self.max_hp = self.hp;
        }
        if self.range < MIN_RANGE {
            tracing::debug!(range = self.range, "clamping non-positive range");
            self.range = MIN_RANGE;
        }
        if self.speed < MIN_SPEED {
            tracing::debug!(speed = self.speed, "clamping non-positive speed");
            self.speed = MIN_SPEED;
        }
        if self.reload_time < MIN_RELOAD_TIME {
            self.reload_time = MIN_RELOAD_TIME;
        }
        if self.radius < MIN_RADIUS {
            self.radius = MIN_RADIUS;
        }
        if self.armor < 0.0 {
            self.armor = 0.0;
        }
        if self.regen < 0.0 {
            self.regen = 0.0;
        }
        self
    }
}

impl Unit {
    pub(crate) fn new(id: UnitId, owner: PlayerId, pos: Vec2, kind: UnitKind, stats: UnitStats) -> Self {
        let stats = stats.sanitized();
        Self {
            id,
            owner,
            kind,
            pos,
            radius: stats.radius,
            hp: stats.hp,
            max_hp: stats.max_hp,
            attack: stats.attack,
            armor: stats.armor,
            range: stats.range,
            speed: stats.speed,
            regen: stats.regen,
            reload_time: stats.reload_time,
            reload_remaining: 0.0,
            tags: stats.tags,
            bonuses: stats.bonuses,
            target_id: None,
            retreat_to: None,
            kite_from: None,
            alive: true,
        }
    }

    pub fn distance_to(&self, other: &Unit) -> f32 {
        self.pos.distance(&other.pos)
    }

    pub fn is_wounded(&self) -> bool {
        self.hp < self.max_hp
    }

    pub fn reload_ready(&self) -> bool {
        self.reload_remaining <= 0.0
    }

    /// Base attack plus tag bonuses against this particular target
    pub fn effective_attack_vs(&self, target: &Unit) -> f32 {
        let bonus: f32 = target
            .tags
            .iter()
            .filter_map(|tag| self.bonuses.get(tag))
            .sum();
        self.attack + bonus
    }

    /// Damage of one landed hit, after armor, floored at chip damage
    pub fn damage_vs(&self, target: &Unit) -> f32 {
        (self.effective_attack_vs(target) - target.armor).max(MIN_CHIP_DAMAGE)
    }

    pub(crate) fn kill(&mut self) {
        self.hp = 0.0;
        self.alive = false;
    }

    fn move_toward(&mut self, dest: Vec2, dt: f32) {
        let dir = (dest - self.pos).normalize();
        self.pos = self.pos + dir * (self.speed * dt);
    }

    fn move_away_from(&mut self, threat: Vec2, dt: f32) {
        let dir = (self.pos - threat).normalize();
        self.pos = self.pos + dir * (self.speed * dt);
    }
}

/// Advance one living unit by `dt`. Runs after the collision pass.
///
/// `index` maps id to slot in `units` and stays valid for the whole tick;
/// dead-but-unreaped units are still present and filtered by `alive`.
pub(crate) fn step_unit(
    units: &mut [Unit],
    idx: usize,
    index: &AHashMap<UnitId, usize>,
    dt: f32,
    clock: SimTime,
    events: &mut Vec<BattleEvent>,
) {
    if !units[idx].alive {
        return;
    }

    {
        let unit = &mut units[idx];
        unit.reload_remaining = (unit.reload_remaining - dt).max(0.0);
        if unit.regen > 0.0 && unit.hp < unit.max_hp {
            unit.hp = (unit.hp + unit.regen * dt).min(unit.max_hp);
        }
    }

    // One-tick kite: step directly away from the threat, keep the target.
    if let Some(threat) = units[idx].kite_from.take() {
        units[idx].move_away_from(threat, dt);
        return;
    }

    if let Some(rally) = units[idx].retreat_to {
        if units[idx].pos.distance(&rally) <= RALLY_ARRIVE_RADIUS {
            units[idx].retreat_to = None;
        } else {
            units[idx].move_toward(rally, dt);
            return;
        }
    }

    if units[idx].kind.is_healer() {
        step_healer(units, idx, index, dt);
        return;
    }

    let Some(target_id) = units[idx].target_id else {
        return;
    };
    let target_idx = index
        .get(&target_id)
        .copied()
        .filter(|&j| j != idx && units[j].alive);
    let Some(tj) = target_idx else {
        // Stale reference: clear and wait for the next targeting pass.
        units[idx].target_id = None;
        return;
    };

    let dist = units[idx].distance_to(&units[tj]);
    if dist <= units[idx].range + MELEE_EPSILON {
        if units[idx].reload_ready() {
            let (attacker, target) = two_mut(units, idx, tj);
            target.hp -= attacker.damage_vs(target);
            attacker.reload_remaining = attacker.reload_time;
            if target.hp <= 0.0 {
                target.kill();
                events.push(BattleEvent::unit_died(target.id, target.owner, clock));
            }
        }
    } else {
        let dest = units[tj].pos;
        units[idx].move_toward(dest, dt);
    }
}

/// Healer behavior: approach the lowest-hp wounded ally and pulse-heal it.
///
/// A strategy-assigned heal target is used while it remains a valid wounded
/// ally; otherwise the healer self-selects within its sight range.
fn step_healer(units: &mut [Unit], idx: usize, index: &AHashMap<UnitId, usize>, dt: f32) {
    let assigned = units[idx]
        .target_id
        .and_then(|id| index.get(&id).copied())
        .filter(|&j| {
            j != idx
                && units[j].alive
                && units[j].owner == units[idx].owner
                && units[j].is_wounded()
        });

    let Some(aj) = assigned.or_else(|| lowest_hp_wounded_ally(units, idx)) else {
        units[idx].target_id = None;
        return;
    };
    units[idx].target_id = Some(units[aj].id);

    let dist = units[idx].distance_to(&units[aj]);
    if dist <= units[idx].range + MELEE_EPSILON {
        if units[idx].reload_ready() {
            let (healer, ally) = two_mut(units, idx, aj);
            ally.hp = (ally.hp + HEAL_PULSE).min(ally.max_hp);
            healer.reload_remaining = healer.reload_time;
        }
    } else {
        let dest = units[aj].pos;
        units[idx].move_toward(dest, dt);
    }
}

/// Lowest-hp living wounded ally in sight, ties broken by lowest id
fn lowest_hp_wounded_ally(units: &[Unit], idx: usize) -> Option<usize> {
    let me = &units[idx];
    units
        .iter()
        .enumerate()
        .filter(|(j, ally)| {
            *j != idx
                && ally.alive
                && ally.owner == me.owner
                && ally.is_wounded()
                && me.pos.distance(&ally.pos) <= HEALER_SIGHT_RANGE
        })
        .min_by_key(|(_, ally)| (OrderedFloat(ally.hp), ally.id))
        .map(|(j, _)| j)
}

/// Disjoint mutable access to two slots of the unit collection
fn two_mut(units: &mut [Unit], i: usize, j: usize) -> (&mut Unit, &mut Unit) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = units.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = units.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}
