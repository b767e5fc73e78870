//! Power type tags.
//!
//! Power names may start with a parenthesized tag, `(Soin Multi) Grande
//! tournée`. The tag gives a label, a category derived from its keywords and
//! an optional target scope; the rest of the name is what gets displayed.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG: OnceLock<Regex> = OnceLock::new();

/// Broad family of a power, derived from its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerCategory {
    /// Name had no tag.
    None,
    LifeRegen,
    ManaAbsorb,
    Heal,
    Mana,
    Damage,
    Shield,
    Debuff,
    Buff,
    Passive,
    /// Tag present but no keyword recognised.
    Other,
}

/// Who a power targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerScope {
    Single,
    Multi,
    All,
    Personal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerType {
    /// Tag content without parentheses, empty when there is no tag.
    pub label: String,
    pub category: PowerCategory,
    pub scope: Option<PowerScope>,
    pub display_name: String,
}

// Paired concepts are checked before their single-keyword counterparts.
const CATEGORY_RULES: &[(&[&str], &[&str], PowerCategory)] = &[
    (&["vie", "life"], &["regen", "régén"], PowerCategory::LifeRegen),
    (&["mana"], &["absorb"], PowerCategory::ManaAbsorb),
    (&["soin", "heal", "vie", "life"], &[], PowerCategory::Heal),
    (&["mana"], &[], PowerCategory::Mana),
    (&["dégât", "degat", "dmg", "attaque", "frappe"], &[], PowerCategory::Damage),
    (&["bouclier", "armure", "défense", "defense", "shield"], &[], PowerCategory::Shield),
    (&["debuff", "malus"], &[], PowerCategory::Debuff),
    (&["buff", "bonus", "boost"], &[], PowerCategory::Buff),
    (&["passif", "passive"], &[], PowerCategory::Passive),
];

const SCOPE_RULES: &[(&str, PowerScope)] = &[
    ("mono", PowerScope::Single),
    ("multi", PowerScope::Multi),
    ("all", PowerScope::All),
    ("tous", PowerScope::All),
    ("perso", PowerScope::Personal),
];

fn has_any(label: &str, words: &[&str]) -> bool {
    words.iter().any(|w| label.contains(w))
}

fn category_of(label: &str) -> PowerCategory {
    CATEGORY_RULES
        .iter()
        .find(|(first, second, _)| {
            has_any(label, first) && (second.is_empty() || has_any(label, second))
        })
        .map(|(_, _, category)| *category)
        .unwrap_or(PowerCategory::Other)
}

fn scope_of(label: &str) -> Option<PowerScope> {
    SCOPE_RULES
        .iter()
        .find(|(word, _)| label.split_whitespace().any(|token| token.starts_with(*word)))
        .map(|(_, scope)| *scope)
}

/// Split a power name into its tag and display name.
pub fn classify_power_type(name: &str) -> PowerType {
    let regex = TAG.get_or_init(|| Regex::new(r"^\s*\(([^)]*)\)\s*(.*)$").unwrap());

    match regex.captures(name) {
        None => PowerType {
            label: String::new(),
            category: PowerCategory::None,
            scope: None,
            display_name: name.to_string(),
        },
        Some(captures) => {
            let label = captures.get(1).map_or("", |m| m.as_str()).trim().to_string();
            let display_name = captures.get(2).map_or("", |m| m.as_str()).trim().to_string();
            let lowered = label.to_lowercase();
            PowerType {
                category: category_of(&lowered),
                scope: scope_of(&lowered),
                label,
                display_name,
            }
        }
    }
}
