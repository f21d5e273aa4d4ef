//! Battle event log entries
//!
//! The log is append-only and owned by the `World`; consumers read a tail.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, SimTime, UnitId};

/// A single recorded battle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEvent {
    /// Simulated time at which the event occurred
    pub tick: SimTime,
    pub kind: BattleEventKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventKind {
    UnitDied { unit: UnitId, owner: PlayerId },
}

impl BattleEvent {
    /// Death record for a unit that just dropped to zero hp
    pub fn unit_died(unit: UnitId, owner: PlayerId, tick: SimTime) -> Self {
        Self {
            tick,
            kind: BattleEventKind::UnitDied { unit, owner },
            description: format!("Unit {unit} ({owner}) died at tick {tick:.2}"),
        }
    }
}
