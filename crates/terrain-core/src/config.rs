//! Finale configuration.
//!
//! Defaults come from named constants; a JSON file may override any subset
//! of fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use terrain_logic::tuning::CombatTuning;
use thiserror::Error;

/// Regular foes fought between two bosses.
pub const ENEMIES_PER_BOSS: u32 = 2;
/// Boss slots in a full run.
pub const TOTAL_BOSSES: u32 = 8;
/// Pause between a foe's defeat and the next spawn.
pub const SETTLE_DELAY_MS: u64 = 1500;
/// Length of the hit-shake pulse on a unit that took damage.
pub const HIT_PULSE_MS: u64 = 300;

pub const POINTS_PER_ENEMY: u32 = 100;
pub const POINTS_PER_BOSS: u32 = 500;
pub const VICTORY_BONUS: u32 = 1000;

/// Cadence and scoring of the boss rush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    pub enemies_per_boss: u32,
    pub total_bosses: u32,
    pub settle_delay_ms: u64,
    pub hit_pulse_ms: u64,
    pub points_per_enemy: u32,
    pub points_per_boss: u32,
    pub victory_bonus: u32,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            enemies_per_boss: ENEMIES_PER_BOSS,
            total_bosses: TOTAL_BOSSES,
            settle_delay_ms: SETTLE_DELAY_MS,
            hit_pulse_ms: HIT_PULSE_MS,
            points_per_enemy: POINTS_PER_ENEMY,
            points_per_boss: POINTS_PER_BOSS,
            victory_bonus: VICTORY_BONUS,
        }
    }
}

/// Everything tunable about the finale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub encounter: EncounterConfig,
    pub tuning: CombatTuning,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = GameConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = GameConfig::from_json_str(
            r#"{"encounter": {"total_bosses": 3}, "tuning": {"hero": {"hp_per_level": 80}}}"#,
        )
        .unwrap();
        assert_eq!(config.encounter.total_bosses, 3);
        assert_eq!(config.encounter.enemies_per_boss, ENEMIES_PER_BOSS);
        assert_eq!(config.tuning.hero.hp_per_level, 80);
        assert_eq!(config.tuning.hero.damage_per_level, 5);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            GameConfig::from_json_str("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            GameConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
