//! World: owns the unit collection, id allocator, clock, and event log
//!
//! `step` is the sole mutator of simulation state and the unit of atomicity:
//! strategies decide intents, the collision pass separates overlaps, every
//! living unit steps in insertion order, then dead units are reaped and the
//! id index is rebuilt.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::core::error::{Result, SimError};
use crate::core::types::{PlayerId, SimTime, UnitId, Vec2};
use crate::engine::collision::resolve_collisions;
use crate::engine::constants::MAX_STEP_DT;
use crate::engine::events::BattleEvent;
use crate::engine::unit::{step_unit, Unit};
use crate::engine::unit_kind::{UnitKind, UnitStats};
use crate::targeting::{Directive, General};

/// The battlefield and everything on it
#[derive(Debug, Default)]
pub struct World {
    units: Vec<Unit>,
    /// id → slot in `units`; rebuilt after every reap
    index: AHashMap<UnitId, usize>,
    next_id: u64,
    clock: SimTime,
    events: Vec<BattleEvent>,
}

impl World {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            index: AHashMap::new(),
            next_id: 1,
            clock: 0.0,
            events: Vec::new(),
        }
    }

    /// Spawn a unit with an explicit stat bundle. Invalid stats are clamped,
    /// never rejected.
    pub fn spawn(&mut self, owner: PlayerId, pos: Vec2, kind: UnitKind, stats: UnitStats) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.units.len());
        self.units.push(Unit::new(id, owner, pos, kind, stats));
        id
    }

    /// Spawn a unit with its kind's default stats
    pub fn spawn_default(&mut self, owner: PlayerId, pos: Vec2, kind: UnitKind) -> UnitId {
        self.spawn(owner, pos, kind, kind.default_stats())
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// `dt` is clamped to [`MAX_STEP_DT`] so a stalled wall clock cannot
    /// tunnel units across the map; non-positive `dt` is a logged no-op.
    /// Strategies run in ascending owner order, so a tick is deterministic.
    pub fn step(&mut self, dt: f32, generals: &mut BTreeMap<PlayerId, Box<dyn General>>) {
        if dt <= 0.0 {
            tracing::warn!(dt, "ignoring step with non-positive dt");
            return;
        }
        let dt = dt.min(MAX_STEP_DT);
        self.clock += dt;

        for (&owner, general) in generals.iter_mut() {
            let directives = general.give_orders(&*self, owner);
            self.apply_directives(owner, directives);
        }

        resolve_collisions(&mut self.units);

        for idx in 0..self.units.len() {
            step_unit(
                &mut self.units,
                idx,
                &self.index,
                dt,
                self.clock,
                &mut self.events,
            );
        }

        self.reap();
    }

    /// Apply a strategy's directives to the intent fields of `owner`'s units.
    /// Directives aimed at units the strategy does not own are dropped.
    fn apply_directives(&mut self, owner: PlayerId, directives: Vec<Directive>) {
        for directive in directives {
            let Some(unit) = self.unit_mut_checked(directive.unit(), owner) else {
                continue;
            };
            match directive {
                Directive::Target { target, .. } => {
                    unit.target_id = target;
                    unit.retreat_to = None;
                }
                Directive::Retreat { rally, .. } => {
                    unit.target_id = None;
                    unit.retreat_to = Some(rally);
                }
                Directive::Kite { away_from, .. } => {
                    unit.kite_from = Some(away_from);
                }
            }
        }
    }

    fn unit_mut_checked(&mut self, id: UnitId, owner: PlayerId) -> Option<&mut Unit> {
        let idx = self.index.get(&id).copied()?;
        let unit = &mut self.units[idx];
        (unit.alive && unit.owner == owner).then_some(unit)
    }

    /// Remove dead units and rebuild the id index
    fn reap(&mut self) {
        self.units.retain(|u| u.alive);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .units
            .iter()
            .enumerate()
            .map(|(i, u)| (u.id, i))
            .collect();
    }

    /// All units in stable insertion order
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// All living units owned by `owner`, in stable insertion order
    pub fn units_for(&self, owner: PlayerId) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|u| u.owner == owner && u.alive)
            .collect()
    }

    /// O(1) lookup of a unit by id
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.index.get(&id).map(|&idx| &self.units[idx])
    }

    /// Read-only view of the append-only event log
    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Current simulated time
    pub fn clock(&self) -> SimTime {
        self.clock
    }

    /// Next id the allocator will hand out
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Rebuild a world from snapshot parts. The only hard failure is a
    /// duplicate unit id, which would corrupt the index.
    pub(crate) fn from_parts(
        clock: SimTime,
        next_id: u64,
        events: Vec<BattleEvent>,
        units: Vec<Unit>,
    ) -> Result<Self> {
        let mut world = Self {
            units: Vec::with_capacity(units.len()),
            index: AHashMap::with_capacity(units.len()),
            next_id,
            clock,
            events,
        };
        for unit in units {
            if world.index.contains_key(&unit.id) {
                return Err(SimError::DuplicateUnitId(unit.id));
            }
            world.next_id = world.next_id.max(unit.id.0 + 1);
            world.index.insert(unit.id, world.units.len());
            world.units.push(unit);
        }
        Ok(world)
    }
}
