//! The eight playable characters and the stat each one trains.

use serde::{Deserialize, Serialize};

/// Combat stat trained by a character's mini-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stat {
    /// Precision of the hero's attacks.
    Technique,
    /// Dodge chance.
    Agility,
    /// Self-heal after each hero attack.
    Intelligence,
    /// Critical hit chance.
    Luck,
    /// Maximum hit points.
    Endurance,
    /// Flat damage reduction.
    Resistance,
    /// Attack cooldown reduction.
    Speed,
    /// Attack damage.
    Exploit,
}

impl Stat {
    pub const ALL: [Stat; 8] = [
        Stat::Technique,
        Stat::Agility,
        Stat::Intelligence,
        Stat::Luck,
        Stat::Endurance,
        Stat::Resistance,
        Stat::Speed,
        Stat::Exploit,
    ];

    /// Label shown on the character card.
    pub fn label(self) -> &'static str {
        match self {
            Self::Technique => "Technique",
            Self::Agility => "Agilité",
            Self::Intelligence => "Intelligence",
            Self::Luck => "Chance",
            Self::Endurance => "Endurance",
            Self::Resistance => "Résistance",
            Self::Speed => "Rapidité",
            Self::Exploit => "Exploit",
        }
    }

    /// Character whose mini-game trains this stat.
    pub fn character(self) -> &'static Character {
        ROSTER
            .iter()
            .find(|c| c.stat == self)
            .unwrap_or(&ROSTER[0])
    }
}

/// A playable character. The roster is fixed for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: &'static str,
    pub display_name: &'static str,
    pub nickname: &'static str,
    pub stat: Stat,
}

impl Character {
    pub fn stat_label(&self) -> &'static str {
        self.stat.label()
    }

    /// Uppercase first letter of the display name, used as avatar.
    pub fn initial(&self) -> char {
        self.display_name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

/// Maximum training level for a stat.
pub const MAX_STAT_LEVEL: u8 = 3;

pub const ROSTER: [Character; 8] = [
    Character { id: "guillaume", display_name: "Guillaume", nickname: "Guy", stat: Stat::Technique },
    Character { id: "pierre", display_name: "Pierre", nickname: "Pip", stat: Stat::Agility },
    Character { id: "thomas", display_name: "Thomas", nickname: "Tom", stat: Stat::Intelligence },
    Character { id: "johann", display_name: "Johann", nickname: "Yo", stat: Stat::Luck },
    Character { id: "jonathan", display_name: "Jonathan", nickname: "Russ", stat: Stat::Endurance },
    Character { id: "yannick", display_name: "Yannick", nickname: "Ya", stat: Stat::Resistance },
    Character { id: "ali", display_name: "Ali", nickname: "Ali", stat: Stat::Speed },
    Character { id: "nicolas", display_name: "Nicolas", nickname: "Nico", stat: Stat::Exploit },
];

pub fn find_character(id: &str) -> Option<&'static Character> {
    ROSTER.iter().find(|c| c.id == id)
}

pub fn is_character(id: &str) -> bool {
    find_character(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_stat_has_one_character() {
        for stat in Stat::ALL {
            let owners = ROSTER.iter().filter(|c| c.stat == stat).count();
            assert_eq!(owners, 1, "{:?}", stat);
            assert_eq!(stat.character().stat, stat);
        }
    }

    #[test]
    fn test_find_character() {
        let ali = find_character("ali").unwrap();
        assert_eq!(ali.stat, Stat::Speed);
        assert_eq!(ali.stat_label(), "Rapidité");
        assert!(find_character("nobody").is_none());
    }

    #[test]
    fn test_initial() {
        assert_eq!(find_character("johann").unwrap().initial(), 'J');
    }
}
