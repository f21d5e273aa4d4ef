//! Aggro-range-limited strategy: react only to enemies that come close

use ordered_float::OrderedFloat;

use crate::core::types::PlayerId;
use crate::engine::world::World;
use crate::targeting::{has_valid_target, Directive, General, GeneralKind};

/// Default detection radius, matching the passive "hold until provoked" feel
pub const DEFAULT_AGGRO_RANGE: f32 = 5.0;

/// Like [`NearestEnemyGeneral`](crate::targeting::NearestEnemyGeneral), but a
/// unit only acquires a target when a living enemy is inside its detection
/// radius; otherwise it stays idle.
#[derive(Debug, Clone, Copy)]
pub struct AggroRangeGeneral {
    pub aggro_range: f32,
}

impl AggroRangeGeneral {
    pub fn new() -> Self {
        Self {
            aggro_range: DEFAULT_AGGRO_RANGE,
        }
    }

    pub fn with_range(aggro_range: f32) -> Self {
        Self { aggro_range }
    }
}

impl Default for AggroRangeGeneral {
    fn default() -> Self {
        Self::new()
    }
}

impl General for AggroRangeGeneral {
    fn give_orders(&mut self, world: &World, owner: PlayerId) -> Vec<Directive> {
        let mut directives = Vec::new();
        for unit in world.units_for(owner) {
            if unit.kind.is_healer() || has_valid_target(unit, world) {
                continue;
            }
            let nearest_in_range = world
                .units()
                .iter()
                .filter(|e| e.alive && e.owner != owner)
                .filter(|e| unit.distance_to(e) < self.aggro_range)
                .min_by_key(|e| (OrderedFloat(unit.distance_to(e)), e.id));
            if let Some(enemy) = nearest_in_range {
                directives.push(Directive::Target {
                    unit: unit.id,
                    target: Some(enemy.id),
                });
            }
        }
        directives
    }

    fn kind(&self) -> GeneralKind {
        GeneralKind::AggroRange
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::engine::unit_kind::UnitKind;

    #[test]
    fn test_ignores_distant_enemies() {
        let mut world = World::new();
        world.spawn_default(PlayerId(1), Vec2::new(0.0, 0.0), UnitKind::Pikeman);
        world.spawn_default(PlayerId(2), Vec2::new(20.0, 0.0), UnitKind::Pikeman);

        let directives = AggroRangeGeneral::new().give_orders(&world, PlayerId(1));
        assert!(directives.is_empty(), "enemy outside aggro range");
    }

    #[test]
    fn test_reacts_inside_range() {
        let mut world = World::new();
        let me = world.spawn_default(PlayerId(1), Vec2::new(0.0, 0.0), UnitKind::Pikeman);
        let close = world.spawn_default(PlayerId(2), Vec2::new(3.0, 0.0), UnitKind::Pikeman);

        let directives = AggroRangeGeneral::new().give_orders(&world, PlayerId(1));
        assert_eq!(
            directives,
            vec![Directive::Target {
                unit: me,
                target: Some(close)
            }]
        );
    }

    #[test]
    fn test_custom_range() {
        let mut world = World::new();
        world.spawn_default(PlayerId(1), Vec2::new(0.0, 0.0), UnitKind::Pikeman);
        world.spawn_default(PlayerId(2), Vec2::new(20.0, 0.0), UnitKind::Pikeman);

        let directives = AggroRangeGeneral::with_range(50.0).give_orders(&world, PlayerId(1));
        assert_eq!(directives.len(), 1);
    }
}
