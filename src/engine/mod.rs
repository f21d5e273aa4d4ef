//! Simulation engine: unit model, collision separation, world stepping
//!
//! The engine is a single logical stepper. External readers (renderers,
//! persistence) observe state only between `step` calls.

pub mod collision;
pub mod constants;
pub mod events;
pub mod outcome;
pub mod unit;
pub mod unit_kind;
pub mod world;

pub use constants::*;
pub use events::{BattleEvent, BattleEventKind};
pub use outcome::{check_battle_end, BattleOutcome};
pub use unit::Unit;
pub use unit_kind::{Tag, UnitKind, UnitStats};
pub use world::World;
