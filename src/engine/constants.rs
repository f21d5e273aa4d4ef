//! Engine constants - all tunable values in one place

// Time
/// Largest `dt` accepted by a single `step` call. Wall-clock-derived deltas
/// are clamped here so a stalled frame cannot tunnel units across the map.
pub const MAX_STEP_DT: f32 = 0.5;

// Geometry
/// Tolerance added to attack/heal range checks so melee units adjacent to
/// their target are considered in range.
pub const MELEE_EPSILON: f32 = 0.1;
/// Below this separation two units are treated as coincident.
pub const COINCIDENT_EPSILON: f32 = 1e-6;

// Combat
/// Minimum damage per landed hit. Keeps combat from stalling forever
/// against armor higher than attack.
pub const MIN_CHIP_DAMAGE: f32 = 1.0;

// Healing
/// Hit points restored per heal pulse, gated by the healer's reload timer.
pub const HEAL_PULSE: f32 = 12.0;
/// How far a healer will look for wounded allies when its strategy has not
/// assigned one.
pub const HEALER_SIGHT_RANGE: f32 = 25.0;

// Retreat
/// A retreating unit closer than this to its rally point stops retreating.
pub const RALLY_ARRIVE_RADIUS: f32 = 1.0;

// Spawn clamping floors (invalid stats are corrected, never rejected)
pub const MIN_HP: f32 = 1.0;
pub const MIN_RANGE: f32 = 0.1;
pub const MIN_SPEED: f32 = 0.1;
pub const MIN_RELOAD_TIME: f32 = 0.05;
pub const MIN_RADIUS: f32 = 0.05;
