//! Unit kinds and their default stat bundles
//!
//! The roster is small and typed: each kind carries capability tags used for
//! bonus-damage lookups and a bonus table keyed by opposing tags.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Capability tag carried by a unit and matched against bonus tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tag {
    Infantry,
    Archer,
    Cavalry,
    Support,
}

/// Type of unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Pikeman,     // Anti-cavalry line infantry
    Crossbowman, // Ranged, fragile in melee
    Knight,      // Armored cavalry, fast shock
    Monk,        // Healer, no attack
}

/// Full stat bundle accepted by `World::spawn`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitStats {
    pub hp: f32,
    pub max_hp: f32,
    pub attack: f32,
    pub armor: f32,
    pub range: f32,
    pub speed: f32,
    pub regen: f32,
    pub reload_time: f32,
    pub radius: f32,
    pub tags: Vec<Tag>,
    pub bonuses: AHashMap<Tag, f32>,
}

impl UnitKind {
    /// Default stat bundle for this kind
    pub fn default_stats(&self) -> UnitStats {
        match self {
            UnitKind::Pikeman => UnitStats {
                hp: 55.0,
                max_hp: 55.0,
                attack: 4.0,
                armor: 0.0,
                range: 1.0,
                speed: 1.0,
                regen: 0.0,
                reload_time: 3.0,
                radius: 0.4,
                tags: vec![Tag::Infantry],
                bonuses: AHashMap::from_iter([(Tag::Cavalry, 22.0)]),
            },

            UnitKind::Crossbowman => UnitStats {
                hp: 35.0,
                max_hp: 35.0,
                attack: 5.0,
                armor: 0.0,
                range: 5.0,
                speed: 0.96,
                regen: 0.0,
                reload_time: 2.0,
                radius: 0.3,
                tags: vec![Tag::Archer],
                bonuses: AHashMap::new(),
            },

            UnitKind::Knight => UnitStats {
                hp: 100.0,
                max_hp: 100.0,
                attack: 10.0,
                armor: 2.0,
                range: 1.2,
                speed: 1.35,
                regen: 0.0,
                reload_time: 1.8,
                radius: 0.8,
                tags: vec![Tag::Cavalry],
                bonuses: AHashMap::new(),
            },

            UnitKind::Monk => UnitStats {
                hp: 30.0,
                max_hp: 30.0,
                attack: 0.0,
                armor: 0.0,
                range: 9.0,
                speed: 0.7,
                regen: 2.5,
                reload_time: 1.0,
                radius: 0.35,
                tags: vec![Tag::Support],
                bonuses: AHashMap::new(),
            },
        }
    }

    /// Does this kind attack from range?
    pub fn is_ranged(&self) -> bool {
        matches!(self, UnitKind::Crossbowman)
    }

    /// Does this kind heal instead of attack?
    pub fn is_healer(&self) -> bool {
        matches!(self, UnitKind::Monk)
    }

    /// Fragile backline kind (preferred prey for shock cavalry)
    pub fn is_backline(&self) -> bool {
        matches!(self, UnitKind::Crossbowman | UnitKind::Monk)
    }

    /// Stable tag used by snapshots
    pub fn as_tag(&self) -> &'static str {
        match self {
            UnitKind::Pikeman => "pikeman",
            UnitKind::Crossbowman => "crossbowman",
            UnitKind::Knight => "knight",
            UnitKind::Monk => "monk",
        }
    }

    /// Parse a snapshot tag. Unknown tags are the caller's problem: the
    /// snapshot layer falls back to a default kind and reports it.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag {
            "pikeman" => Some(UnitKind::Pikeman),
            "crossbowman" => Some(UnitKind::Crossbowman),
            "knight" => Some(UnitKind::Knight),
            "monk" => Some(UnitKind::Monk),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pikeman_counters_cavalry() {
        let stats = UnitKind::Pikeman.default_stats();
        assert!(stats.bonuses.get(&Tag::Cavalry).copied().unwrap_or(0.0) > 0.0);
    }

    #[test]
    fn test_crossbowman_is_ranged() {
        assert!(UnitKind::Crossbowman.is_ranged());
        assert!(!UnitKind::Knight.is_ranged());
        assert!(UnitKind::Crossbowman.default_stats().range > 2.0);
    }

    #[test]
    fn test_monk_heals_not_fights() {
        assert!(UnitKind::Monk.is_healer());
        assert_eq!(UnitKind::Monk.default_stats().attack, 0.0);
    }

    #[test]
    fn test_knight_fast_and_armored() {
        let stats = UnitKind::Knight.default_stats();
        assert!(stats.speed > 1.0);
        assert!(stats.armor > 0.0);
    }

    #[test]
    fn test_tag_round_trip() {
        for kind in [
            UnitKind::Pikeman,
            UnitKind::Crossbowman,
            UnitKind::Knight,
            UnitKind::Monk,
        ] {
            assert_eq!(UnitKind::parse_tag(kind.as_tag()), Some(kind));
        }
        assert_eq!(UnitKind::parse_tag("trebuchet"), None);
    }
}
