//! Scored multi-factor strategy
//!
//! Runs at a throttled cadence. For every unit lacking a valid in-range
//! target it scores each living enemy on matchup, distance, wounds, focus
//! fire, defender cover, and overreach, plus seeded jitter to break exact
//! ties. Layered on top: a healer subroutine, a retreat rule for locally
//! outnumbered units, shock-cavalry backline hunting, and ranged kiting.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, SimError};
use crate::core::types::{PlayerId, SimTime, UnitId, Vec2};
use crate::engine::constants::{HEALER_SIGHT_RANGE, MELEE_EPSILON};
use crate::engine::unit::Unit;
use crate::engine::unit_kind::UnitKind;
use crate::engine::world::World;
use crate::targeting::{Directive, General, GeneralKind};

/// Tunable weights for the scored strategy, loadable from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Score lost per unit of distance to the candidate
    pub distance_penalty: f32,
    /// Bonus scaled by the candidate's missing hp fraction
    pub finish_bonus: f32,
    /// Bonus per ally already targeting the candidate
    pub focus_fire_bonus: f32,
    /// Penalty per enemy standing near the candidate
    pub defender_penalty: f32,
    /// Radius in which enemies count as defending the candidate
    pub defender_radius: f32,
    /// Uniform jitter half-width applied to every score
    pub jitter: f32,
    /// Penalty per unit of distance beyond `overreach_factor * range`
    pub overreach_penalty: f32,
    /// Candidates beyond this multiple of the acting unit's range are
    /// de-prioritized
    pub overreach_factor: f32,
    /// Shock-cavalry bonus against backline kinds, shrinking with defenders
    pub assassin_bonus: f32,
    /// A ranged unit kites when a melee threat is inside this distance
    pub kite_radius: f32,
    /// Radius scanned when judging local force balance
    pub retreat_scan_radius: f32,
    /// Retreat when nearby enemies exceed nearby allies by this ratio
    pub retreat_outnumber_ratio: f32,
    /// Hp fraction below which any nearby enemy triggers retreat
    pub critical_hp_fraction: f32,
    /// Minimum simulated seconds between decision passes
    pub reevaluation_interval: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            distance_penalty: 1.0,
            finish_bonus: 8.0,
            focus_fire_bonus: 3.0,
            defender_penalty: 1.5,
            defender_radius: 4.0,
            jitter: 0.5,
            overreach_penalty: 0.5,
            overreach_factor: 3.0,
            assassin_bonus: 6.0,
            kite_radius: 2.0,
            retreat_scan_radius: 8.0,
            retreat_outnumber_ratio: 2.0,
            critical_hp_fraction: 0.25,
            reevaluation_interval: 0.5,
        }
    }
}

impl ScoreWeights {
    /// Load weights from a TOML file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| SimError::ConfigError(format!("failed to parse weights TOML: {e}")))
    }
}

/// Type-vs-type matchup score, keyed on both the acting unit and candidate
fn matchup_bonus(mine: UnitKind, theirs: UnitKind) -> f32 {
    use UnitKind::*;
    match (mine, theirs) {
        (Pikeman, Knight) => 10.0,
        (Pikeman, Crossbowman) => -2.0,
        (Pikeman, Monk) => 2.0,
        (Crossbowman, Pikeman) => 6.0,
        (Crossbowman, Knight) => -4.0,
        (Crossbowman, Monk) => 4.0,
        (Knight, Crossbowman) => 8.0,
        (Knight, Monk) => 8.0,
        (Knight, Pikeman) => -6.0,
        _ => 0.0,
    }
}

/// The scored general. Owns its jitter RNG so runs are reproducible from a
/// seed.
#[derive(Debug, Clone)]
pub struct ScoredGeneral {
    weights: ScoreWeights,
    rng: ChaCha8Rng,
    last_decision: Option<SimTime>,
}

impl ScoredGeneral {
    pub fn new(seed: u64) -> Self {
        Self::with_weights(ScoreWeights::default(), seed)
    }

    pub fn with_weights(weights: ScoreWeights, seed: u64) -> Self {
        Self {
            weights,
            rng: ChaCha8Rng::seed_from_u64(seed),
            last_decision: None,
        }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    fn should_evaluate(&self, now: SimTime) -> bool {
        match self.last_decision {
            None => true,
            Some(last) => now - last >= self.weights.reevaluation_interval,
        }
    }

    /// Assign the lowest-hp wounded ally in sight, or clear the intent
    fn heal_directive(&self, healer: &Unit, allies: &[&Unit]) -> Directive {
        let target = allies
            .iter()
            .filter(|a| {
                a.id != healer.id
                    && a.is_wounded()
                    && healer.distance_to(a) <= HEALER_SIGHT_RANGE
            })
            .min_by_key(|a| (OrderedFloat(a.hp), a.id))
            .map(|a| a.id);
        Directive::Target {
            unit: healer.id,
            target,
        }
    }

    /// Retreat when locally outnumbered (or critically wounded with enemies
    /// near) and no immediate hit is available
    fn retreat_directive(
        &self,
        unit: &Unit,
        allies: &[&Unit],
        enemies: &[&Unit],
        rally: Vec2,
    ) -> Option<Directive> {
        let scan = self.weights.retreat_scan_radius;
        let enemies_near = enemies
            .iter()
            .filter(|e| unit.distance_to(e) <= scan)
            .count();
        if enemies_near == 0 {
            return None;
        }
        let allies_near = allies
            .iter()
            .filter(|a| unit.distance_to(a) <= scan)
            .count();

        let outnumbered =
            enemies_near as f32 > allies_near as f32 * self.weights.retreat_outnumber_ratio;
        let critical = unit.hp < unit.max_hp * self.weights.critical_hp_fraction;
        if !outnumbered && !critical {
            return None;
        }

        // A unit that can land a hit right now stands and fights.
        let can_hit = enemies
            .iter()
            .any(|e| unit.distance_to(e) <= unit.range + MELEE_EPSILON);
        if can_hit {
            return None;
        }

        Some(Directive::Retreat {
            unit: unit.id,
            rally,
        })
    }

    /// Nearest melee threat inside the kite radius, if any
    fn kite_threat<'a>(&self, unit: &Unit, enemies: &[&'a Unit]) -> Option<&'a Unit> {
        enemies
            .iter()
            .filter(|e| !e.kind.is_ranged() && !e.kind.is_healer())
            .filter(|e| unit.distance_to(e) <= self.weights.kite_radius)
            .min_by_key(|e| (OrderedFloat(unit.distance_to(e)), e.id))
            .copied()
    }

    fn score_candidate(
        &mut self,
        unit: &Unit,
        candidate: &Unit,
        pressure: usize,
        enemies: &[&Unit],
    ) -> f32 {
        let dist = unit.distance_to(candidate);
        let defenders = enemies
            .iter()
            .filter(|d| d.id != candidate.id)
            .filter(|d| d.pos.distance(&candidate.pos) <= self.weights.defender_radius)
            .count();

        let mut score = matchup_bonus(unit.kind, candidate.kind);
        score -= self.weights.distance_penalty * dist;
        score += self.weights.finish_bonus * (1.0 - candidate.hp / candidate.max_hp);
        score += self.weights.focus_fire_bonus * pressure as f32;
        score -= self.weights.defender_penalty * defenders as f32;

        if unit.kind == UnitKind::Knight && candidate.kind.is_backline() {
            score += self.weights.assassin_bonus / (1.0 + defenders as f32);
        }

        let overreach = self.weights.overreach_factor * unit.range;
        if dist > overreach {
            score -= self.weights.overreach_penalty * (dist - overreach);
        }

        score + self.rng.gen_range(-self.weights.jitter..=self.weights.jitter)
    }
}

impl General for ScoredGeneral {
    fn give_orders(&mut self, world: &World, owner: PlayerId) -> Vec<Directive> {
        let now = world.clock();
        if !self.should_evaluate(now) {
            return Vec::new();
        }
        self.last_decision = Some(now);

        let allies = world.units_for(owner);
        let enemies: Vec<&Unit> = world
            .units()
            .iter()
            .filter(|u| u.alive && u.owner != owner)
            .collect();

        let rally = centroid(&allies);

        // How many allies already commit to each enemy; updated as this pass
        // hands out new targets so focus fire builds up within one decision.
        let mut pressure: AHashMap<UnitId, usize> = AHashMap::new();
        for ally in &allies {
            if let Some(target) = ally.target_id {
                if enemies.iter().any(|e| e.id == target) {
                    *pressure.entry(target).or_insert(0) += 1;
                }
            }
        }

        let mut directives = Vec::new();
        for unit in &allies {
            if unit.kind.is_healer() {
                directives.push(self.heal_directive(unit, &allies));
                continue;
            }
            if enemies.is_empty() {
                continue;
            }

            if let Some(directive) = self.retreat_directive(unit, &allies, &enemies, rally) {
                directives.push(directive);
                continue;
            }

            if unit.kind.is_ranged() {
                if let Some(threat) = self.kite_threat(unit, &enemies) {
                    directives.push(Directive::Kite {
                        unit: unit.id,
                        away_from: threat.pos,
                    });
                }
            }

            // Keep a valid in-range target; everything else gets re-scored.
            let current = unit
                .target_id
                .filter(|id| enemies.iter().any(|e| e.id == *id));
            if let Some(id) = current {
                if let Some(target) = world.unit(id) {
                    if unit.distance_to(target) <= unit.range + MELEE_EPSILON {
                        continue;
                    }
                }
            }

            let mut best: Option<(f32, UnitId)> = None;
            for candidate in &enemies {
                let own_pressure = pressure
                    .get(&candidate.id)
                    .copied()
                    .unwrap_or(0)
                    .saturating_sub(usize::from(current == Some(candidate.id)));
                let score = self.score_candidate(unit, candidate, own_pressure, &enemies);
                if best.map_or(true, |(b, _)| score > b) {
                    best = Some((score, candidate.id));
                }
            }

            if let Some((_, chosen)) = best {
                if let Some(old) = current {
                    if let Some(count) = pressure.get_mut(&old) {
                        *count = count.saturating_sub(1);
                    }
                }
                *pressure.entry(chosen).or_insert(0) += 1;
                directives.push(Directive::Target {
                    unit: unit.id,
                    target: Some(chosen),
                });
            }
        }

        directives
    }

    fn kind(&self) -> GeneralKind {
        GeneralKind::Scored
    }
}

/// Rally point: centroid of the owner's living units
fn centroid(units: &[&Unit]) -> Vec2 {
    if units.is_empty() {
        return Vec2::default();
    }
    let n = units.len() as f32;
    let sum = units
        .iter()
        .fold(Vec2::default(), |acc, u| acc + u.pos);
    Vec2::new(sum.x / n, sum.y / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;

    fn count_targets(directives: &[Directive]) -> AHashMap<UnitId, usize> {
        let mut counts = AHashMap::new();
        for d in directives {
            if let Directive::Target {
                target: Some(t), ..
            } = d
            {
                *counts.entry(*t).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn test_focus_fire_concentrates_on_one_enemy() {
        let mut world = World::new();
        for i in 0..3 {
            world.spawn_default(
                PlayerId(1),
                Vec2::new(0.0, i as f32 * 2.0),
                UnitKind::Crossbowman,
            );
        }
        world.spawn_default(PlayerId(2), Vec2::new(10.0, 0.0), UnitKind::Crossbowman);
        world.spawn_default(PlayerId(2), Vec2::new(10.0, 4.0), UnitKind::Crossbowman);

        let mut general = ScoredGeneral::new(42);
        let directives = general.give_orders(&world, PlayerId(1));
        let counts = count_targets(&directives);
        assert!(
            counts.values().any(|&n| n >= 2),
            "focus fire should concentrate at least two allies: {counts:?}"
        );
    }

    #[test]
    fn test_decisions_reproducible_under_fixed_seed() {
        let build_world = || {
            let mut world = World::new();
            for i in 0..4 {
                world.spawn_default(
                    PlayerId(1),
                    Vec2::new(0.0, i as f32 * 1.5),
                    UnitKind::Crossbowman,
                );
                world.spawn_default(
                    PlayerId(2),
                    Vec2::new(12.0, i as f32 * 1.5),
                    UnitKind::Pikeman,
                );
            }
            world
        };

        let a = ScoredGeneral::new(7).give_orders(&build_world(), PlayerId(1));
        let b = ScoredGeneral::new(7).give_orders(&build_world(), PlayerId(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_throttle_skips_early_reevaluation() {
        let mut world = World::new();
        world.spawn_default(PlayerId(1), Vec2::new(0.0, 0.0), UnitKind::Pikeman);
        world.spawn_default(PlayerId(2), Vec2::new(5.0, 0.0), UnitKind::Pikeman);

        let mut general = ScoredGeneral::new(1);
        let first = general.give_orders(&world, PlayerId(1));
        assert!(!first.is_empty());

        // Clock has not advanced past the interval.
        let second = general.give_orders(&world, PlayerId(1));
        assert!(second.is_empty());
    }

    #[test]
    fn test_outnumbered_unit_retreats() {
        let mut world = World::new();
        let lone = world.spawn_default(PlayerId(1), Vec2::new(0.0, 0.0), UnitKind::Pikeman);
        for i in 0..5 {
            world.spawn_default(
                PlayerId(2),
                Vec2::new(4.0, i as f32),
                UnitKind::Pikeman,
            );
        }

        let mut general = ScoredGeneral::new(3);
        let directives = general.give_orders(&world, PlayerId(1));
        assert!(
            directives
                .iter()
                .any(|d| matches!(d, Directive::Retreat { unit, .. } if *unit == lone)),
            "lone pikeman against five should fall back: {directives:?}"
        );
    }

    #[test]
    fn test_cornered_unit_fights_instead_of_retreating() {
        let mut world = World::new();
        let lone = world.spawn_default(PlayerId(1), Vec2::new(0.0, 0.0), UnitKind::Pikeman);
        // All five enemies inside melee range: no retreat, stand and swing.
        for i in 0..5 {
            world.spawn_default(
                PlayerId(2),
                Vec2::new(0.5, i as f32 * 0.2),
                UnitKind::Pikeman,
            );
        }

        let mut general = ScoredGeneral::new(3);
        let directives = general.give_orders(&world, PlayerId(1));
        assert!(directives
            .iter()
            .all(|d| !matches!(d, Directive::Retreat { unit, .. } if *unit == lone)));
    }

    #[test]
    fn test_ranged_unit_kites_melee_threat() {
        let mut world = World::new();
        let archer = world.spawn_default(PlayerId(1), Vec2::new(0.0, 0.0), UnitKind::Crossbowman);
        // Enough allies nearby that the retreat rule stays quiet.
        world.spawn_default(PlayerId(1), Vec2::new(-1.0, 0.0), UnitKind::Pikeman);
        world.spawn_default(PlayerId(1), Vec2::new(-1.0, 1.0), UnitKind::Pikeman);
        world.spawn_default(PlayerId(2), Vec2::new(1.5, 0.0), UnitKind::Knight);

        let mut general = ScoredGeneral::new(9);
        let directives = general.give_orders(&world, PlayerId(1));
        assert!(
            directives
                .iter()
                .any(|d| matches!(d, Directive::Kite { unit, .. } if *unit == archer)),
            "crossbowman should kite the adjacent knight: {directives:?}"
        );
    }

    #[test]
    fn test_healer_assigned_lowest_hp_ally() {
        let mut world = World::new();
        let monk = world.spawn_default(PlayerId(1), Vec2::new(0.0, 0.0), UnitKind::Monk);
        world.spawn_default(PlayerId(1), Vec2::new(1.0, 0.0), UnitKind::Pikeman);
        let hurt = world.spawn_default(PlayerId(1), Vec2::new(2.0, 0.0), UnitKind::Pikeman);

        // Wound the second pikeman directly.
        let mut units: Vec<Unit> = world.units().to_vec();
        if let Some(unit) = units.iter_mut().find(|u| u.id == hurt) {
            unit.hp = 5.0;
        }
        let world =
            World::from_parts(world.clock(), world.next_id(), Vec::new(), units).unwrap();

        let mut general = ScoredGeneral::new(11);
        let directives = general.give_orders(&world, PlayerId(1));
        assert!(directives.contains(&Directive::Target {
            unit: monk,
            target: Some(hurt)
        }));
    }

    #[test]
    fn test_knight_prefers_backline_prey() {
        let mut world = World::new();
        let knight = world.spawn_default(PlayerId(1), Vec2::new(0.0, 0.0), UnitKind::Knight);
        // Pikeman slightly closer, undefended crossbowman a bit further out.
        world.spawn_default(PlayerId(2), Vec2::new(5.0, 0.0), UnitKind::Pikeman);
        let archer = world.spawn_default(PlayerId(2), Vec2::new(7.0, 6.0), UnitKind::Crossbowman);

        let mut general = ScoredGeneral::new(5);
        let directives = general.give_orders(&world, PlayerId(1));
        assert!(
            directives.contains(&Directive::Target {
                unit: knight,
                target: Some(archer)
            }),
            "anti-pike matchup plus assassin bonus should beat raw distance: {directives:?}"
        );
    }

    #[test]
    fn test_weights_partial_toml() {
        let weights: ScoreWeights =
            toml::from_str("focus_fire_bonus = 9.5\njitter = 0.0\n").unwrap();
        assert_eq!(weights.focus_fire_bonus, 9.5);
        assert_eq!(weights.jitter, 0.0);
        // Unspecified fields fall back to defaults.
        assert_eq!(
            weights.distance_penalty,
            ScoreWeights::default().distance_penalty
        );
    }
}
