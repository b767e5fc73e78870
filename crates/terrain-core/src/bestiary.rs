//! Names and quotes for everything the hero fights.

use rand::Rng;
use terrain_logic::catalog::{BossProfile, ProgressionCatalog};

use crate::config::TOTAL_BOSSES;

/// Used when the resource defines no `ennemi.*` entries.
pub const DEFAULT_ENEMY_NAMES: &[&str] = &[
    "Vigile zélé",
    "Pigeon agressif",
    "Supporter adverse",
    "Contrôleur de tickets",
];

#[derive(Debug, Clone)]
pub struct Bestiary {
    enemy_names: Vec<String>,
    bosses: Vec<BossProfile>,
}

impl Bestiary {
    pub fn from_catalog(catalog: &ProgressionCatalog, total_bosses: u32) -> Self {
        let mut enemy_names = catalog.enemy_names();
        if enemy_names.is_empty() {
            enemy_names = DEFAULT_ENEMY_NAMES.iter().map(|s| s.to_string()).collect();
        }
        let bosses = (1..=total_bosses).map(|slot| catalog.boss(slot)).collect();
        Self {
            enemy_names,
            bosses,
        }
    }

    /// Boss for a 1-based slot. Slots past the prepared list get a
    /// placeholder name.
    pub fn boss(&self, slot: u32) -> BossProfile {
        (slot as usize)
            .checked_sub(1)
            .and_then(|i| self.bosses.get(i))
            .cloned()
            .unwrap_or_else(|| BossProfile {
                slot,
                name: format!("Boss {slot}"),
                quote: String::new(),
            })
    }

    pub fn random_enemy_name(&self, rng: &mut impl Rng) -> &str {
        if self.enemy_names.is_empty() {
            return DEFAULT_ENEMY_NAMES[0];
        }
        &self.enemy_names[rng.gen_range(0..self.enemy_names.len())]
    }

    pub fn enemy_names(&self) -> &[String] {
        &self.enemy_names
    }
}

impl Default for Bestiary {
    fn default() -> Self {
        Self::from_catalog(&ProgressionCatalog::default(), TOTAL_BOSSES)
    }
}
