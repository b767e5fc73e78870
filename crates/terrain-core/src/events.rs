//! Combat events - what the finale tells the presentation layer
//!
//! The director never touches display state. Every change the UI may want to
//! render is pushed as a [`CombatEvent`] and drained once per frame.

use serde::{Deserialize, Serialize};
use terrain_logic::combat::{AttackOutcome, CombatUnit};

/// Which side of the fight a unit is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Hero,
    Foe,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Hero => Side::Foe,
            Side::Foe => Side::Hero,
        }
    }
}

/// What kind of foe was spawned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoeKind {
    /// Regular foe, scaled by wave number
    Wave { index: u32 },
    /// Boss in a 1-based slot
    Boss { slot: u32, quote: String },
}

impl FoeKind {
    pub fn is_boss(&self) -> bool {
        matches!(self, FoeKind::Boss { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterOutcome {
    Victory,
    Defeat,
}

/// Display-facing copy of a unit's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
}

impl From<&CombatUnit> for UnitSnapshot {
    fn from(unit: &CombatUnit) -> Self {
        Self {
            name: unit.name.clone(),
            hp: unit.hp,
            max_hp: unit.max_hp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A new run began with this hero
    RunStarted { hero: UnitSnapshot },
    /// A foe entered the fight
    Spawned { foe: UnitSnapshot, kind: FoeKind },
    /// One attack was resolved
    AttackResolved {
        attacker: Side,
        defender: Side,
        outcome: AttackOutcome,
        /// Defender hp after the attack
        defender_hp: u32,
    },
    /// Post-attack regeneration
    Healed { side: Side, amount: u32 },
    /// Hit-shake animation on/off
    HitPulse { side: Side, active: bool },
    /// A unit reached 0 hp
    Defeated { side: Side, name: String },
    /// Terminal state reached
    EncounterEnded { outcome: EncounterOutcome, score: u32 },
}
