//! Targeting strategies ("generals")
//!
//! A general decides intents for one owner's units once per tick (or at a
//! throttled cadence) by reading the pre-step world and returning directives.
//! The engine applies directives to intent fields only; generals never touch
//! hp, position, or cooldowns.

pub mod aggro;
pub mod nearest;
pub mod scored;

pub use aggro::AggroRangeGeneral;
pub use nearest::NearestEnemyGeneral;
pub use scored::{ScoreWeights, ScoredGeneral};

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, UnitId, Vec2};
use crate::engine::world::World;

/// An intent change for a single unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive {
    /// Set or clear the attack/heal target
    Target { unit: UnitId, target: Option<UnitId> },
    /// Abandon the current target and fall back toward a rally point
    Retreat { unit: UnitId, rally: Vec2 },
    /// One-tick micro-movement directly away from a threat, keeping the target
    Kite { unit: UnitId, away_from: Vec2 },
}

impl Directive {
    /// The unit this directive applies to
    pub fn unit(&self) -> UnitId {
        match *self {
            Directive::Target { unit, .. }
            | Directive::Retreat { unit, .. }
            | Directive::Kite { unit, .. } => unit,
        }
    }
}

/// Decide intents for one owner's units
pub trait General {
    /// Inspect the world and return intent changes for `owner`'s units
    fn give_orders(&mut self, world: &World, owner: PlayerId) -> Vec<Directive>;

    /// Variant tag, used by snapshots to reconstruct the strategy
    fn kind(&self) -> GeneralKind;
}

impl std::fmt::Debug for dyn General {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "General({})", self.kind().as_tag())
    }
}

/// Enumerated strategy variants, selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneralKind {
    NearestEnemy,
    AggroRange,
    Scored,
}

impl GeneralKind {
    /// Stable tag used by snapshots and the CLI
    pub fn as_tag(&self) -> &'static str {
        match self {
            GeneralKind::NearestEnemy => "nearest",
            GeneralKind::AggroRange => "aggro",
            GeneralKind::Scored => "scored",
        }
    }

    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag {
            "nearest" => Some(GeneralKind::NearestEnemy),
            "aggro" => Some(GeneralKind::AggroRange),
            "scored" => Some(GeneralKind::Scored),
            _ => None,
        }
    }

    /// Construct the strategy this tag names. `seed` only matters for the
    /// scored variant's tie-breaking jitter.
    pub fn build(&self, seed: u64) -> Box<dyn General> {
        match self {
            GeneralKind::NearestEnemy => Box::new(NearestEnemyGeneral::new()),
            GeneralKind::AggroRange => Box::new(AggroRangeGeneral::new()),
            GeneralKind::Scored => Box::new(ScoredGeneral::new(seed)),
        }
    }
}

/// Does this unit already hold a reference to a living enemy?
pub(crate) fn has_valid_target(unit: &crate::engine::unit::Unit, world: &World) -> bool {
    unit.target_id
        .and_then(|id| world.unit(id))
        .is_some_and(|t| t.alive)
}
