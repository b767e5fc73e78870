//! Read-only view of a player's progression.
//!
//! The save lives in the engine crate; logic only needs levels, completed
//! missions and the pseudo, so it reads them through [`PlayerProgress`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::roster::{Stat, MAX_STAT_LEVEL, ROSTER};

/// Progression queries consumed by the catalog and the encounter director.
pub trait PlayerProgress {
    /// Training level (0..=3) of a character's stat; 0 for unknown ids.
    fn stat_level(&self, character_id: &str) -> u8;

    /// Composite ids (`<charId>.<missionId>`) of completed missions.
    fn completed_missions(&self) -> BTreeSet<String>;

    fn pseudo(&self) -> &str;

    /// True once every character has been trained at least once.
    fn is_final_unlocked(&self) -> bool {
        ROSTER.iter().all(|c| self.stat_level(c.id) >= 1)
    }
}

/// Stat → level mapping used to derive the hero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLevels(BTreeMap<Stat, u8>);

impl StatLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stat at the same level.
    pub fn uniform(level: u8) -> Self {
        let mut levels = Self::new();
        for stat in Stat::ALL {
            levels.set(stat, level);
        }
        levels
    }

    pub fn from_progress(progress: &impl PlayerProgress) -> Self {
        let mut levels = Self::new();
        for character in &ROSTER {
            levels.set(character.stat, progress.stat_level(character.id));
        }
        levels
    }

    pub fn set(&mut self, stat: Stat, level: u8) {
        self.0.insert(stat, level.min(MAX_STAT_LEVEL));
    }

    pub fn with(mut self, stat: Stat, level: u8) -> Self {
        self.set(stat, level);
        self
    }

    pub fn level(&self, stat: Stat) -> u8 {
        self.0.get(&stat).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProgress {
        level: u8,
    }

    impl PlayerProgress for FixedProgress {
        fn stat_level(&self, character_id: &str) -> u8 {
            if character_id == "ali" {
                0
            } else {
                self.level
            }
        }

        fn completed_missions(&self) -> BTreeSet<String> {
            BTreeSet::new()
        }

        fn pseudo(&self) -> &str {
            "TST"
        }
    }

    #[test]
    fn test_levels_clamped() {
        let levels = StatLevels::new().with(Stat::Luck, 9);
        assert_eq!(levels.level(Stat::Luck), MAX_STAT_LEVEL);
        assert_eq!(levels.level(Stat::Speed), 0);
    }

    #[test]
    fn test_from_progress_maps_characters_to_stats() {
        let levels = StatLevels::from_progress(&FixedProgress { level: 2 });
        assert_eq!(levels.level(Stat::Exploit), 2);
        assert_eq!(levels.level(Stat::Speed), 0);
    }

    #[test]
    fn test_final_unlock_requires_every_character() {
        assert!(!FixedProgress { level: 3 }.is_final_unlocked());
    }
}
