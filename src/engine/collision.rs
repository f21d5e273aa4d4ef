//! Pairwise collision separation
//!
//! One O(n²) pass per tick over living pairs, computed fresh every tick:
//! overlapping units are each displaced by half the overlap along the line
//! between their centers, so stacks dissolve instead of persisting.

use crate::core::types::Vec2;
use crate::engine::constants::COINCIDENT_EPSILON;
use crate::engine::unit::Unit;

/// Separate every overlapping pair of living units
pub(crate) fn resolve_collisions(units: &mut [Unit]) {
    for i in 0..units.len() {
        if !units[i].alive {
            continue;
        }
        for j in (i + 1)..units.len() {
            if !units[j].alive {
                continue;
            }
            let min_dist = units[i].radius + units[j].radius;
            let dist = units[i].pos.distance(&units[j].pos);
            if dist >= min_dist {
                continue;
            }

            let dir = if dist > COINCIDENT_EPSILON {
                (units[j].pos - units[i].pos).normalize()
            } else {
                // Coincident centers: separate along +x to stay deterministic.
                Vec2::new(1.0, 0.0)
            };

            let half_overlap = (min_dist - dist) * 0.5;
            units[i].pos = units[i].pos - dir * half_overlap;
            units[j].pos = units[j].pos + dir * half_overlap;
        }
    }
}
