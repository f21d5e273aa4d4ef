//! Nearest-enemy strategy: every idle combatant charges the closest enemy

use ordered_float::OrderedFloat;

use crate::core::types::PlayerId;
use crate::engine::world::World;
use crate::targeting::{has_valid_target, Directive, General, GeneralKind};

/// Assigns the closest living enemy to every unit lacking a valid target,
/// unconditionally. Healers are left to their own devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestEnemyGeneral;

impl NearestEnemyGeneral {
    pub fn new() -> Self {
        Self
    }
}

impl General for NearestEnemyGeneral {
    fn give_orders(&mut self, world: &World, owner: PlayerId) -> Vec<Directive> {
        let mut directives = Vec::new();
        for unit in world.units_for(owner) {
            if unit.kind.is_healer() || has_valid_target(unit, world) {
                continue;
            }
            let nearest = world
                .units()
                .iter()
                .filter(|e| e.alive && e.owner != owner)
                .min_by_key(|e| (OrderedFloat(unit.distance_to(e)), e.id));
            if let Some(enemy) = nearest {
                directives.push(Directive::Target {
                    unit: unit.id,
                    target: Some(enemy.id),
                });
            }
        }
        directives
    }

    fn kind(&self) -> GeneralKind {
        GeneralKind::NearestEnemy
    }
}
