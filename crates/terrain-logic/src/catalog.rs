//! Progression catalog - missions, powers and the unlock relation.
//!
//! Everything here is derived on demand from the [`ResourceStore`]:
//!
//! - `mission.<charId>.<missionId>.nom` / `.inf` - mission title / description
//! - `pouvoir.<charId>.<powerId>.nom` / `.inf` - power name / description
//! - `boss.<slot>.nom` / `.citation` - finale bosses
//! - `ennemi.*` - names for regular foes
//! - `message.dieu.<charId>`, `surnom.secondaires.<charId>`, `origines.<charId>` - lore
//!
//! # Unlock inference
//!
//! The resource writes a linked mission and power as four consecutive lines
//! (mission title, mission description, power name, power description). A
//! mission's unlock target is found by scanning forward from its title key:
//! the first title key of the same character decides: a power title gives the
//! target, another mission title means the mission unlocks nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::icons::icon_for;
use crate::power_type::{classify_power_type, PowerType};
use crate::resource::{ResourceNode, ResourceStore, DELIMITER};
use crate::roster::{find_character, Character, ROSTER};

pub const MISSION_NAMESPACE: &str = "mission";
pub const POWER_NAMESPACE: &str = "pouvoir";
pub const BOSS_NAMESPACE: &str = "boss";
pub const ENEMY_NAMESPACE: &str = "ennemi";

/// Field holding a mission title or power name.
pub const TITLE_FIELD: &str = "nom";
/// Field holding a description.
pub const DESCRIPTION_FIELD: &str = "inf";
pub const QUOTE_FIELD: &str = "citation";

/// Suffix of the always-unlocked base power id.
pub const BASE_POWER_SUFFIX: &str = "01";

static SPECIAL_ID: OnceLock<Regex> = OnceLock::new();

/// A mission, as shown in a character's mission list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    /// Composite id, `<charId>.<missionId>`.
    pub id: String,
    pub local_id: String,
    pub title: String,
    pub description: String,
    /// Local id of the power this mission unlocks.
    pub unlocks_power_id: Option<String>,
    pub icon: String,
}

/// A power, with its unlock state for a given player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Power {
    /// Local id within the character's namespace.
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_base: bool,
    pub is_special: bool,
    pub is_unlocked: bool,
    pub icon: String,
    pub power_type: PowerType,
}

/// Lore attached to a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterProfile {
    pub character: &'static Character,
    pub lore: Option<String>,
    pub surnames: Vec<String>,
    pub origin: Option<String>,
}

/// A finale boss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossProfile {
    pub slot: u32,
    pub name: String,
    pub quote: String,
}

/// `<namespace>.<charId>.<localId>.<field>` split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntityKey<'a> {
    namespace: &'a str,
    character: &'a str,
    local_id: &'a str,
    field: &'a str,
}

impl<'a> EntityKey<'a> {
    fn parse(key: &'a str) -> Option<Self> {
        let mut parts = key.split(DELIMITER);
        let key = Self {
            namespace: parts.next()?,
            character: parts.next()?,
            local_id: parts.next()?,
            field: parts.next()?,
        };
        if parts.next().is_some() || key.local_id.is_empty() {
            return None;
        }
        Some(key)
    }

    fn is_title_of(&self, namespace: &str, character: &str) -> bool {
        self.namespace == namespace && self.character == character && self.field == TITLE_FIELD
    }
}

/// Ordering and deduplication key for local ids: numeric ids by value,
/// anything else after them, lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum LocalKey {
    Numeric(u64),
    Text(String),
}

impl LocalKey {
    fn of(local_id: &str) -> Self {
        match local_id.parse::<u64>() {
            Ok(n) => Self::Numeric(n),
            Err(_) => Self::Text(local_id.to_string()),
        }
    }
}

fn entity_key(namespace: &str, character: &str, local_id: &str, field: &str) -> String {
    format!("{namespace}.{character}.{local_id}.{field}")
}

/// Composite mission id, `<charId>.<missionId>`.
pub fn mission_id(character: &str, local_id: &str) -> String {
    format!("{character}{DELIMITER}{local_id}")
}

/// Base power convention: local id ends with `01`.
pub fn is_base_power_id(local_id: &str) -> bool {
    local_id.ends_with(BASE_POWER_SUFFIX)
}

/// Rare power convention: id ends with a digit, `8`, then `1` or `2`.
pub fn is_special_power_id(local_id: &str) -> bool {
    let regex = SPECIAL_ID.get_or_init(|| Regex::new(r"[0-9]8[12]$").unwrap());
    regex.is_match(local_id)
}

/// Read-only catalog built once per session from the resource.
#[derive(Debug, Clone)]
pub struct ProgressionCatalog {
    store: ResourceStore,
    tree: ResourceNode,
}

impl Default for ProgressionCatalog {
    fn default() -> Self {
        Self::new(ResourceStore::new())
    }
}

impl ProgressionCatalog {
    pub fn new(store: ResourceStore) -> Self {
        let tree = store.nest();
        Self { store, tree }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(ResourceStore::parse(text))
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    pub fn tree(&self) -> &ResourceNode {
        &self.tree
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn characters(&self) -> &'static [Character] {
        &ROSTER
    }

    /// Missions of a character in resource order, each with its inferred
    /// unlock target.
    pub fn missions_for(&self, character_id: &str) -> Vec<Mission> {
        let mut missions = Vec::new();
        let mut seen = BTreeSet::new();

        for (position, (key, title)) in self.store.entries().enumerate() {
            let Some(parsed) = EntityKey::parse(key) else {
                continue;
            };
            if !parsed.is_title_of(MISSION_NAMESPACE, character_id)
                || !seen.insert(LocalKey::of(parsed.local_id))
            {
                continue;
            }

            let description = self
                .store
                .get(&entity_key(MISSION_NAMESPACE, character_id, parsed.local_id, DESCRIPTION_FIELD))
                .unwrap_or_default();

            missions.push(Mission {
                id: mission_id(character_id, parsed.local_id),
                local_id: parsed.local_id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                unlocks_power_id: self.infer_unlock(position, character_id),
                icon: icon_for(title, description).to_string(),
            });
        }

        missions
    }

    /// Scan forward from a mission title at `position` for the power it
    /// unlocks.
    fn infer_unlock(&self, position: usize, character_id: &str) -> Option<String> {
        for (key, _) in self.store.entries_after(position) {
            let Some(parsed) = EntityKey::parse(key) else {
                continue;
            };
            if parsed.is_title_of(MISSION_NAMESPACE, character_id) {
                return None;
            }
            if parsed.is_title_of(POWER_NAMESPACE, character_id) {
                return Some(parsed.local_id.to_string());
            }
        }
        None
    }

    /// Local ids of powers unlocked by the given completed missions.
    pub fn unlocked_by_missions(&self, character_id: &str, completed: &BTreeSet<String>) -> BTreeSet<String> {
        self.missions_for(character_id)
            .into_iter()
            .filter(|m| completed.contains(&m.id))
            .filter_map(|m| m.unlocks_power_id)
            .collect()
    }

    /// Powers of a character sorted by numeric id, flagged base/special and
    /// unlocked for the given completed missions.
    pub fn powers_for(&self, character_id: &str, completed: &BTreeSet<String>) -> Vec<Power> {
        let prefix = format!("{POWER_NAMESPACE}{DELIMITER}{character_id}{DELIMITER}");
        let mut locals: BTreeMap<LocalKey, Vec<&str>> = BTreeMap::new();
        for (key, _) in self.store.entries_with_prefix(&prefix) {
            if let Some(parsed) = EntityKey::parse(key) {
                let spellings = locals.entry(LocalKey::of(parsed.local_id)).or_default();
                if !spellings.contains(&parsed.local_id) {
                    spellings.push(parsed.local_id);
                }
            }
        }

        let unlocked: BTreeSet<LocalKey> = self
            .unlocked_by_missions(character_id, completed)
            .iter()
            .map(|id| LocalKey::of(id))
            .collect();
        let mut base_taken = false;

        locals
            .into_iter()
            .map(|(identity, spellings)| {
                // First spelling in resource order is the id; fields may sit
                // under any spelling of the same number.
                let local_id = spellings[0];
                let field = |name: &str| {
                    spellings.iter().find_map(|spelling| {
                        self.store
                            .get(&entity_key(POWER_NAMESPACE, character_id, spelling, name))
                    })
                };
                let name = field(TITLE_FIELD).unwrap_or(local_id);
                let description = field(DESCRIPTION_FIELD).unwrap_or_default();

                let is_base = !base_taken && is_base_power_id(local_id);
                base_taken |= is_base;

                let power_type = classify_power_type(name);
                Power {
                    id: local_id.to_string(),
                    name: name.to_string(),
                    description: description.to_string(),
                    is_base,
                    is_special: is_special_power_id(local_id),
                    is_unlocked: is_base || unlocked.contains(&identity),
                    icon: icon_for(&power_type.display_name, description).to_string(),
                    power_type,
                }
            })
            .collect()
    }

    /// Lore, alternate nicknames and origin of a character.
    pub fn character_profile(&self, character_id: &str) -> Option<CharacterProfile> {
        let character = find_character(character_id)?;

        let surnames = self
            .tree
            .leaf_at(&["surnom", "secondaires", character_id])
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(CharacterProfile {
            character,
            lore: self
                .tree
                .leaf_at(&["message", "dieu", character_id])
                .map(str::to_string),
            surnames,
            origin: self.tree.leaf_at(&["origines", character_id]).map(str::to_string),
        })
    }

    /// Boss for a 1-based slot, falling back to the roster order.
    pub fn boss(&self, slot: u32) -> BossProfile {
        let slot_key = slot.to_string();
        let name = self
            .tree
            .leaf_at(&[BOSS_NAMESPACE, slot_key.as_str(), TITLE_FIELD])
            .map(str::to_string)
            .or_else(|| {
                (slot as usize)
                    .checked_sub(1)
                    .and_then(|i| ROSTER.get(i))
                    .map(|c| c.display_name.to_string())
            })
            .unwrap_or_else(|| format!("Boss {slot}"));
        let quote = self
            .tree
            .leaf_at(&[BOSS_NAMESPACE, slot_key.as_str(), QUOTE_FIELD])
            .unwrap_or_default()
            .to_string();

        BossProfile { slot, name, quote }
    }

    /// Names for regular foes, in resource order.
    pub fn enemy_names(&self) -> Vec<String> {
        let prefix = format!("{ENEMY_NAMESPACE}{DELIMITER}");
        self.store
            .entries_with_prefix(&prefix)
            .map(|(_, name)| name)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}
