//! Keyword → glyph dispatch for missions and powers.
//!
//! An ordered rule table: character-specific phrases first, then generic
//! phrases, then broad thematic keyword groups. The first rule that matches
//! the lowercased `name + description` wins; nothing matching yields
//! [`DEFAULT_ICON`].
//!
//! Theme keywords only match at the start of a word (`sort` matches "sorts",
//! not "sortie" or "ressort"); short ambiguous ones must match a whole word.

/// Glyph used when no rule matches.
pub const DEFAULT_ICON: &str = "✨";

/// How a rule decides whether it applies to a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconMatch {
    /// The exact (lowercase) phrase appears in the text.
    Phrase(&'static str),
    /// Some word of the text starts with one of `stems` or equals one of
    /// `words`.
    Keywords {
        stems: &'static [&'static str],
        words: &'static [&'static str],
    },
}

impl IconMatch {
    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            Self::Phrase(phrase) => haystack.contains(phrase),
            Self::Keywords { stems, words } => haystack
                .split(|c: char| !c.is_alphanumeric())
                .filter(|token| !token.is_empty())
                .any(|token| {
                    stems.iter().any(|stem| token.starts_with(*stem))
                        || words.iter().any(|word| *word == token)
                }),
        }
    }
}

/// Priority tier of a rule, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IconTier {
    Character,
    Phrase,
    Theme,
}

#[derive(Debug, Clone, Copy)]
pub struct IconRule {
    pub tier: IconTier,
    pub rule: IconMatch,
    pub glyph: &'static str,
}

const fn phrase(tier: IconTier, text: &'static str, glyph: &'static str) -> IconRule {
    IconRule {
        tier,
        rule: IconMatch::Phrase(text),
        glyph,
    }
}

const fn theme(
    stems: &'static [&'static str],
    words: &'static [&'static str],
    glyph: &'static str,
) -> IconRule {
    IconRule {
        tier: IconTier::Theme,
        rule: IconMatch::Keywords { stems, words },
        glyph,
    }
}

/// The rule table, already sorted by tier.
pub const ICON_RULES: &[IconRule] = &[
    // Character signatures
    phrase(IconTier::Character, "coup de clé", "🔧"),
    phrase(IconTier::Character, "pas de côté", "🦘"),
    phrase(IconTier::Character, "grand cerveau", "🧠"),
    phrase(IconTier::Character, "coup de bol", "🎲"),
    phrase(IconTier::Character, "second souffle", "🫁"),
    phrase(IconTier::Character, "tête dure", "🪨"),
    phrase(IconTier::Character, "éclair d'ali", "🌩️"),
    phrase(IconTier::Character, "coup d'éclat", "🏆"),
    // Generic phrases
    phrase(IconTier::Phrase, "coup de poing", "👊"),
    phrase(IconTier::Phrase, "coup de pied", "🦶"),
    phrase(IconTier::Phrase, "coup critique", "💥"),
    phrase(IconTier::Phrase, "mur de briques", "🧱"),
    phrase(IconTier::Phrase, "tournée générale", "🍻"),
    phrase(IconTier::Phrase, "ballon", "⚽"),
    // Themes
    theme(&["feu", "flamm", "brûl", "incend"], &[], "🔥"),
    theme(&["glac", "froid"], &["gel", "gèle"], "❄️"),
    theme(&["pluie", "noy"], &["eau", "eaux"], "💧"),
    theme(&["soin", "soign", "régén", "regen"], &["vie", "vies"], "💚"),
    theme(&["bouclier", "armure", "défense", "protèg", "protect"], &[], "🛡️"),
    theme(&["vitesse", "rapid", "sprint", "course", "éclair"], &[], "⚡"),
    theme(&["chance", "jackpot", "fortune"], &["pari", "dé", "dés"], "🍀"),
    theme(&["esquiv", "agil", "saut", "acrobat"], &[], "🌀"),
    theme(&["intellig", "esprit", "ruse", "rusé", "savoir"], &["plan", "plans"], "📚"),
    theme(&["mana", "magi"], &["sort", "sorts"], "🔮"),
    theme(&["poison", "toxi"], &[], "☠️"),
    theme(&["hurl", "voix", "chant"], &["cri", "cris", "crie", "crier"], "📣"),
    theme(&["frapp", "coup", "attaqu", "dégât", "force"], &[], "⚔️"),
    theme(&["mission", "quête", "défi"], &[], "🎯"),
];

/// Glyph for a mission or power, from its name and description.
pub fn icon_for(name: &str, description: &str) -> &'static str {
    let haystack = format!("{} {}", name, description).to_lowercase();
    ICON_RULES
        .iter()
        .find(|rule| rule.rule.matches(&haystack))
        .map(|rule| rule.glyph)
        .unwrap_or(DEFAULT_ICON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_sorted_by_tier() {
        assert!(ICON_RULES.windows(2).all(|w| w[0].tier <= w[1].tier));
    }

    #[test]
    fn test_character_phrase_beats_theme() {
        // "coup" would match the attack theme, the signature phrase wins
        assert_eq!(icon_for("Coup de Clé", "une attaque précise"), "🔧");
    }

    #[test]
    fn test_generic_phrase_beats_theme() {
        assert_eq!(icon_for("Coup de poing", "frappe au feu"), "👊");
    }

    #[test]
    fn test_theme_order() {
        // fire is listed before healing
        assert_eq!(icon_for("Flamme de vie", ""), "🔥");
        assert_eq!(icon_for("Petit soin", ""), "💚");
    }

    #[test]
    fn test_description_is_searched() {
        assert_eq!(icon_for("Mystère", "Lance un sort étrange"), "🔮");
    }

    #[test]
    fn test_short_keywords_need_word_boundary() {
        assert_eq!(icon_for("Lettre", "un mot écrit"), DEFAULT_ICON);
        assert_eq!(icon_for("Envie", "la sortie"), DEFAULT_ICON);
        assert_eq!(icon_for("Grand cri", ""), "📣");
        assert_eq!(icon_for("L'eau vive", ""), "💧");
        assert_eq!(icon_for("Brûlure", ""), "🔥");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(icon_for("Zzz", "rien du tout"), DEFAULT_ICON);
        assert_eq!(icon_for("", ""), DEFAULT_ICON);
    }
}
