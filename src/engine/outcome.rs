//! Victory predicate for external drivers
//!
//! The engine never decides a battle is over; the driver observes the roster
//! between ticks and simply stops calling `step`.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, SimTime};
use crate::engine::world::World;

/// Terminal result of a two-sided battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory(PlayerId),
    Draw,
}

/// Check whether the battle between `p1` and `p2` has ended.
///
/// A side wins when the other has no living units and it still has at least
/// one. Both sides empty is a draw, as is exhausting `max_time` with both
/// sides still standing.
pub fn check_battle_end(
    world: &World,
    p1: PlayerId,
    p2: PlayerId,
    max_time: SimTime,
) -> Option<BattleOutcome> {
    let p1_alive = !world.units_for(p1).is_empty();
    let p2_alive = !world.units_for(p2).is_empty();

    match (p1_alive, p2_alive) {
        (false, false) => Some(BattleOutcome::Draw),
        (true, false) => Some(BattleOutcome::Victory(p1)),
        (false, true) => Some(BattleOutcome::Victory(p2)),
        (true, true) => (world.clock() >= max_time).then_some(BattleOutcome::Draw),
    }
}
