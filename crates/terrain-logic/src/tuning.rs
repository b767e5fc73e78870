//! Combat coefficients.
//!
//! Every per-stat and per-index coefficient is a named constant, gathered
//! into tables that can be overridden from a JSON config file.

use serde::{Deserialize, Serialize};

// ============================================================================
// BASE STATS (every unit starts here)
// ============================================================================

pub const BASE_MAX_HP: u32 = 100;
pub const BASE_DAMAGE: u32 = 10;
pub const BASE_COOLDOWN_MS: u64 = 2000;
pub const BASE_CRIT_CHANCE: f64 = 0.05;
pub const BASE_DODGE_CHANCE: f64 = 0.05;
pub const BASE_PRECISION: f64 = 0.90;

// ============================================================================
// HERO (per training level, 0..=3)
// ============================================================================

/// Exploit: extra damage per level.
pub const EXPLOIT_DAMAGE_PER_LEVEL: u32 = 5;
/// Rapidité: cooldown reduction per level.
pub const SPEED_COOLDOWN_PER_LEVEL_MS: u64 = 400;
/// Rapidité never brings the cooldown below this.
pub const HERO_MIN_COOLDOWN_MS: u64 = 500;
/// Chance: crit chance per level.
pub const LUCK_CRIT_PER_LEVEL: f64 = 0.15;
/// Agilité: dodge chance per level.
pub const AGILITY_DODGE_PER_LEVEL: f64 = 0.10;
/// Technique: precision per level, capped at 1.0.
pub const TECHNIQUE_PRECISION_PER_LEVEL: f64 = 0.05;
/// Résistance: flat damage reduction per level.
pub const RESISTANCE_DEFENSE_PER_LEVEL: u32 = 2;
/// Intelligence: hp healed after each hero attack, per level.
pub const INTELLIGENCE_REGEN_PER_LEVEL: u32 = 5;
/// Endurance: max hp per level.
pub const ENDURANCE_HP_PER_LEVEL: u32 = 50;

// ============================================================================
// WAVES AND BOSSES
// ============================================================================

pub const WAVE_BASE_HP: u32 = 50;
pub const WAVE_HP_PER_INDEX: u32 = 20;
pub const WAVE_BASE_DAMAGE: u32 = 5;
pub const WAVE_DAMAGE_PER_INDEX: u32 = 2;
pub const WAVE_BASE_COOLDOWN_MS: u64 = 2500;
pub const WAVE_COOLDOWN_PER_INDEX_MS: u64 = 100;
pub const WAVE_MIN_COOLDOWN_MS: u64 = 1000;

pub const BOSS_BASE_HP: u32 = 300;
pub const BOSS_HP_PER_INDEX: u32 = 100;
pub const BOSS_BASE_DAMAGE: u32 = 15;
pub const BOSS_DAMAGE_PER_INDEX: u32 = 5;
pub const BOSS_BASE_COOLDOWN_MS: u64 = 2000;
pub const BOSS_COOLDOWN_PER_INDEX_MS: u64 = 100;
pub const BOSS_MIN_COOLDOWN_MS: u64 = 800;
pub const BOSS_BASE_CRIT: f64 = 0.10;
pub const BOSS_CRIT_PER_INDEX: f64 = 0.02;
pub const BOSS_DEFENSE_PER_INDEX: u32 = 1;

/// Stats every unit is constructed with before any derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    pub max_hp: u32,
    pub damage: u32,
    pub cooldown_ms: u64,
    pub crit_chance: f64,
    pub dodge_chance: f64,
    pub precision: f64,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_hp: BASE_MAX_HP,
            damage: BASE_DAMAGE,
            cooldown_ms: BASE_COOLDOWN_MS,
            crit_chance: BASE_CRIT_CHANCE,
            dodge_chance: BASE_DODGE_CHANCE,
            precision: BASE_PRECISION,
        }
    }
}

/// Per-level offsets applied to the hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroTuning {
    pub damage_per_level: u32,
    pub cooldown_per_level_ms: u64,
    pub min_cooldown_ms: u64,
    pub crit_per_level: f64,
    pub dodge_per_level: f64,
    pub precision_per_level: f64,
    pub defense_per_level: u32,
    pub regen_per_level: u32,
    pub hp_per_level: u32,
}

impl Default for HeroTuning {
    fn default() -> Self {
        Self {
            damage_per_level: EXPLOIT_DAMAGE_PER_LEVEL,
            cooldown_per_level_ms: SPEED_COOLDOWN_PER_LEVEL_MS,
            min_cooldown_ms: HERO_MIN_COOLDOWN_MS,
            crit_per_level: LUCK_CRIT_PER_LEVEL,
            dodge_per_level: AGILITY_DODGE_PER_LEVEL,
            precision_per_level: TECHNIQUE_PRECISION_PER_LEVEL,
            defense_per_level: RESISTANCE_DEFENSE_PER_LEVEL,
            regen_per_level: INTELLIGENCE_REGEN_PER_LEVEL,
            hp_per_level: ENDURANCE_HP_PER_LEVEL,
        }
    }
}

/// Linear difficulty curve indexed by wave number or boss slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingCurve {
    pub base_hp: u32,
    pub hp_per_index: u32,
    pub base_damage: u32,
    pub damage_per_index: u32,
    pub base_cooldown_ms: u64,
    pub cooldown_per_index_ms: u64,
    pub min_cooldown_ms: u64,
    /// `None` keeps the base crit chance.
    pub base_crit: Option<f64>,
    pub crit_per_index: f64,
    pub defense_per_index: u32,
}

impl ScalingCurve {
    pub fn waves() -> Self {
        Self {
            base_hp: WAVE_BASE_HP,
            hp_per_index: WAVE_HP_PER_INDEX,
            base_damage: WAVE_BASE_DAMAGE,
            damage_per_index: WAVE_DAMAGE_PER_INDEX,
            base_cooldown_ms: WAVE_BASE_COOLDOWN_MS,
            cooldown_per_index_ms: WAVE_COOLDOWN_PER_INDEX_MS,
            min_cooldown_ms: WAVE_MIN_COOLDOWN_MS,
            base_crit: None,
            crit_per_index: 0.0,
            defense_per_index: 0,
        }
    }

    pub fn bosses() -> Self {
        Self {
            base_hp: BOSS_BASE_HP,
            hp_per_index: BOSS_HP_PER_INDEX,
            base_damage: BOSS_BASE_DAMAGE,
            damage_per_index: BOSS_DAMAGE_PER_INDEX,
            base_cooldown_ms: BOSS_BASE_COOLDOWN_MS,
            cooldown_per_index_ms: BOSS_COOLDOWN_PER_INDEX_MS,
            min_cooldown_ms: BOSS_MIN_COOLDOWN_MS,
            base_crit: Some(BOSS_BASE_CRIT),
            crit_per_index: BOSS_CRIT_PER_INDEX,
            defense_per_index: BOSS_DEFENSE_PER_INDEX,
        }
    }

    pub fn max_hp(&self, index: u32) -> u32 {
        self.base_hp.saturating_add(self.hp_per_index.saturating_mul(index))
    }

    pub fn damage(&self, index: u32) -> u32 {
        self.base_damage
            .saturating_add(self.damage_per_index.saturating_mul(index))
    }

    pub fn cooldown_ms(&self, index: u32) -> u64 {
        self.base_cooldown_ms
            .saturating_sub(self.cooldown_per_index_ms.saturating_mul(index as u64))
            .max(self.min_cooldown_ms)
    }

    pub fn crit_chance(&self, index: u32) -> Option<f64> {
        self.base_crit
            .map(|base| (base + self.crit_per_index * index as f64).clamp(0.0, 1.0))
    }

    pub fn defense(&self, index: u32) -> u32 {
        self.defense_per_index.saturating_mul(index)
    }
}

impl Default for ScalingCurve {
    fn default() -> Self {
        Self::waves()
    }
}

/// All combat coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub base: BaseStats,
    pub hero: HeroTuning,
    pub waves: ScalingCurve,
    pub bosses: ScalingCurve,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            base: BaseStats::default(),
            hero: HeroTuning::default(),
            waves: ScalingCurve::waves(),
            bosses: ScalingCurve::bosses(),
        }
    }
}
