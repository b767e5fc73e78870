//! Combat units and attack resolution.
//!
//! A [`CombatUnit`] carries the stats of one combatant. The hero is derived
//! from training levels, foes from their wave number or boss slot. All rolls
//! take the RNG as a parameter so callers control determinism.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::progress::StatLevels;
use crate::roster::Stat;
use crate::tuning::{BaseStats, HeroTuning, ScalingCurve};

/// Result of an attack landing on a defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomingOutcome {
    Dodged,
    Hit(u32),
}

impl IncomingOutcome {
    /// Hit points removed; 0 for a dodge.
    pub fn amount(self) -> u32 {
        match self {
            Self::Dodged => 0,
            Self::Hit(amount) => amount,
        }
    }
}

/// Full outcome of one attack, seen from the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    /// Precision roll failed: no crit or dodge evaluation.
    Missed,
    Dodged,
    Hit {
        amount: u32,
        critical: bool,
        /// Damage absorbed by the defender's flat defense.
        blocked: u32,
    },
}

impl AttackOutcome {
    pub fn damage(self) -> u32 {
        match self {
            Self::Hit { amount, .. } => amount,
            Self::Missed | Self::Dodged => 0,
        }
    }

    pub fn is_hit(self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}

/// One combatant. `0 <= hp <= max_hp` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatUnit {
    pub id: String,
    pub name: String,
    pub is_hero: bool,
    pub max_hp: u32,
    pub hp: u32,
    pub attack_damage: u32,
    pub attack_cooldown_ms: u64,
    pub crit_chance: f64,
    pub dodge_chance: f64,
    pub precision: f64,
    pub defense: u32,
    pub regen_per_attack: u32,
    /// Frame clock timestamp (ms) of the last attack.
    pub last_attack_at: u64,
}

impl CombatUnit {
    /// Unit with base stats only.
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_hero: bool, base: &BaseStats) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_hero,
            max_hp: base.max_hp.max(1),
            hp: base.max_hp.max(1),
            attack_damage: base.damage,
            attack_cooldown_ms: base.cooldown_ms,
            crit_chance: base.crit_chance.clamp(0.0, 1.0),
            dodge_chance: base.dodge_chance.clamp(0.0, 1.0),
            precision: base.precision.clamp(0.0, 1.0),
            defense: 0,
            regen_per_attack: 0,
            last_attack_at: 0,
        }
    }

    /// Hero derived from training levels.
    pub fn hero(name: impl Into<String>, levels: &StatLevels, base: &BaseStats, tuning: &HeroTuning) -> Self {
        let mut unit = Self::new("hero", name, true, base);
        unit.apply_player_levels(levels, tuning);
        unit
    }

    /// Regular foe scaled by wave number.
    pub fn wave(name: impl Into<String>, index: u32, base: &BaseStats, curve: &ScalingCurve) -> Self {
        let mut unit = Self::new("enemy", name, false, base);
        unit.apply_scaling(index, curve);
        unit
    }

    /// Boss scaled by boss slot (1-based).
    pub fn boss(name: impl Into<String>, slot: u32, base: &BaseStats, curve: &ScalingCurve) -> Self {
        let mut unit = Self::new("boss", name, false, base);
        unit.apply_scaling(slot, curve);
        unit
    }

    /// Apply per-stat offsets on top of the current stats.
    pub fn apply_player_levels(&mut self, levels: &StatLevels, tuning: &HeroTuning) {
        let level = |stat: Stat| levels.level(stat);

        self.attack_damage += level(Stat::Exploit) as u32 * tuning.damage_per_level;

        let speedup = level(Stat::Speed) as u64 * tuning.cooldown_per_level_ms;
        self.attack_cooldown_ms = self
            .attack_cooldown_ms
            .saturating_sub(speedup)
            .max(tuning.min_cooldown_ms);

        self.crit_chance =
            (self.crit_chance + level(Stat::Luck) as f64 * tuning.crit_per_level).clamp(0.0, 1.0);
        self.dodge_chance =
            (self.dodge_chance + level(Stat::Agility) as f64 * tuning.dodge_per_level).clamp(0.0, 1.0);
        self.precision = (self.precision
            + level(Stat::Technique) as f64 * tuning.precision_per_level)
            .min(1.0);

        self.defense += level(Stat::Resistance) as u32 * tuning.defense_per_level;
        self.regen_per_attack += level(Stat::Intelligence) as u32 * tuning.regen_per_level;

        self.max_hp = self
            .max_hp
            .saturating_add(level(Stat::Endurance) as u32 * tuning.hp_per_level)
            .max(1);
        self.hp = self.max_hp;
    }

    /// Replace hp, damage and cooldown (and crit/defense for curves that
    /// define them) with the curve's values at `index`.
    pub fn apply_scaling(&mut self, index: u32, curve: &ScalingCurve) {
        self.max_hp = curve.max_hp(index).max(1);
        self.hp = self.max_hp;
        self.attack_damage = curve.damage(index);
        self.attack_cooldown_ms = curve.cooldown_ms(index);
        if let Some(crit) = curve.crit_chance(index) {
            self.crit_chance = crit;
        }
        if curve.defense_per_index > 0 {
            self.defense = curve.defense(index);
        }
    }

    pub fn is_down(&self) -> bool {
        self.hp == 0
    }

    /// Whether the cooldown has elapsed at frame time `now`.
    pub fn ready_to_attack(&self, now: u64) -> bool {
        now.saturating_sub(self.last_attack_at) >= self.attack_cooldown_ms
    }

    /// Resolve damage landing on this unit: dodge roll, then flat defense
    /// with a floor of 1.
    pub fn resolve_incoming_attack(&mut self, raw_damage: u32, rng: &mut impl Rng) -> IncomingOutcome {
        if rng.gen::<f64>() < self.dodge_chance {
            return IncomingOutcome::Dodged;
        }

        let amount = raw_damage.saturating_sub(self.defense).max(1);
        self.hp = self.hp.saturating_sub(amount);
        IncomingOutcome::Hit(amount)
    }

    /// Heal up to `max_hp`. A downed unit cannot be healed.
    pub fn apply_heal(&mut self, amount: u32) -> u32 {
        if self.hp == 0 {
            return 0;
        }
        let healed = amount.min(self.max_hp - self.hp);
        self.hp += healed;
        healed
    }

    /// Hp as a fraction of max, for health bars.
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }
}

/// Resolve one attack from `attacker` against `defender`.
///
/// Precision roll first (a miss skips everything else), then the crit roll
/// doubles the damage before the defender's dodge and defense apply.
pub fn strike(attacker: &CombatUnit, defender: &mut CombatUnit, rng: &mut impl Rng) -> AttackOutcome {
    if rng.gen::<f64>() >= attacker.precision {
        return AttackOutcome::Missed;
    }

    let mut damage = attacker.attack_damage;
    let critical = rng.gen::<f64>() < attacker.crit_chance;
    if critical {
        damage = damage.saturating_mul(2);
    }

    match defender.resolve_incoming_attack(damage, rng) {
        IncomingOutcome::Dodged => AttackOutcome::Dodged,
        IncomingOutcome::Hit(amount) => AttackOutcome::Hit {
            amount,
            critical,
            blocked: if defender.defense > 0 {
                damage.saturating_sub(amount)
            } else {
                0
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::CombatTuning;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn plain_unit() -> CombatUnit {
        CombatUnit::new("dummy", "Dummy", false, &BaseStats::default())
    }

    #[test]
    fn test_hero_untrained_has_base_stats() {
        let t = CombatTuning::default();
        let hero = CombatUnit::hero("Héros", &StatLevels::new(), &t.base, &t.hero);
        assert_eq!(hero.max_hp, 100);
        assert_eq!(hero.hp, 100);
        assert_eq!(hero.attack_damage, 10);
        assert_eq!(hero.attack_cooldown_ms, 2000);
        assert_eq!(hero.defense, 0);
        assert_eq!(hero.regen_per_attack, 0);
        assert!(hero.is_hero);
    }

    #[test]
    fn test_zero_hp_tuning_still_alive() {
        let mut t = CombatTuning::default();
        t.base.max_hp = 0;
        t.waves.base_hp = 0;
        t.waves.hp_per_index = 0;

        let hero = CombatUnit::hero("Héros", &StatLevels::new(), &t.base, &t.hero);
        let foe = CombatUnit::wave("Rat", 3, &t.base, &t.waves);
        assert_eq!((hero.max_hp, hero.hp), (1, 1));
        assert_eq!((foe.max_hp, foe.hp), (1, 1));
        assert!(!hero.is_down() && !foe.is_down());
    }

    #[test]
    fn test_hero_fully_trained() {
        let t = CombatTuning::default();
        let hero = CombatUnit::hero("Héros", &StatLevels::uniform(3), &t.base, &t.hero);
        assert_eq!(hero.attack_damage, 25);
        assert_eq!(hero.attack_cooldown_ms, 800);
        assert!((hero.crit_chance - 0.50).abs() < 1e-9);
        assert!((hero.dodge_chance - 0.35).abs() < 1e-9);
        assert!((hero.precision - 1.0).abs() < 1e-9);
        assert_eq!(hero.defense, 6);
        assert_eq!(hero.regen_per_attack, 15);
        assert_eq!(hero.max_hp, 250);
        assert_eq!(hero.hp, 250);
    }

    #[test]
    fn test_hero_cooldown_floor() {
        let t = CombatTuning::default();
        let tuning = HeroTuning {
            cooldown_per_level_ms: 1000,
            ..t.hero.clone()
        };
        let hero = CombatUnit::hero("Héros", &StatLevels::uniform(3), &t.base, &tuning);
        assert_eq!(hero.attack_cooldown_ms, tuning.min_cooldown_ms);
    }

    #[test]
    fn test_boss_has_crit_and_defense() {
        let t = CombatTuning::default();
        let boss = CombatUnit::boss("Boss", 3, &t.base, &t.bosses);
        assert_eq!(boss.max_hp, 600);
        assert_eq!(boss.attack_damage, 30);
        assert_eq!(boss.attack_cooldown_ms, 1700);
        assert!((boss.crit_chance - 0.16).abs() < 1e-9);
        assert_eq!(boss.defense, 3);

        let wave = CombatUnit::wave("Rat", 3, &t.base, &t.waves);
        assert_eq!(wave.defense, 0);
        assert!((wave.crit_chance - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_full_dodge_always_dodges() {
        let mut unit = plain_unit();
        unit.dodge_chance = 1.0;
        let mut rng = rng();
        for raw in [0, 1, 5, 500] {
            for _ in 0..100 {
                let outcome = unit.resolve_incoming_attack(raw, &mut rng);
                assert_eq!(outcome, IncomingOutcome::Dodged);
                assert_eq!(outcome.amount(), 0);
            }
        }
        assert_eq!(unit.hp, unit.max_hp);
    }

    #[test]
    fn test_damage_floor_of_one() {
        let mut unit = plain_unit();
        unit.dodge_chance = 0.0;
        unit.defense = 1000;
        let outcome = unit.resolve_incoming_attack(5, &mut rng());
        assert_eq!(outcome, IncomingOutcome::Hit(1));
        assert_eq!(unit.hp, 99);
    }

    #[test]
    fn test_hp_floored_at_zero() {
        let mut unit = plain_unit();
        unit.dodge_chance = 0.0;
        let outcome = unit.resolve_incoming_attack(1000, &mut rng());
        assert_eq!(outcome, IncomingOutcome::Hit(1000));
        assert_eq!(unit.hp, 0);
        assert!(unit.is_down());
    }

    #[test]
    fn test_heal_on_downed_unit() {
        let mut unit = plain_unit();
        unit.hp = 0;
        assert_eq!(unit.apply_heal(50), 0);
        assert_eq!(unit.hp, 0);
    }

    #[test]
    fn test_heal_capped_at_max() {
        let mut unit = plain_unit();
        unit.hp = 95;
        assert_eq!(unit.apply_heal(20), 5);
        assert_eq!(unit.hp, 100);
        assert_eq!(unit.apply_heal(20), 0);
    }

    #[test]
    fn test_strike_zero_precision_misses() {
        let mut attacker = plain_unit();
        attacker.precision = 0.0;
        let mut defender = plain_unit();
        let mut rng = rng();
        for _ in 0..50 {
            assert_eq!(strike(&attacker, &mut defender, &mut rng), AttackOutcome::Missed);
        }
        assert_eq!(defender.hp, defender.max_hp);
    }

    #[test]
    fn test_strike_guaranteed_crit() {
        let mut attacker = plain_unit();
        attacker.precision = 1.0;
        attacker.crit_chance = 1.0;
        let mut defender = plain_unit();
        defender.dodge_chance = 0.0;
        defender.defense = 4;
        let outcome = strike(&attacker, &mut defender, &mut rng());
        assert_eq!(
            outcome,
            AttackOutcome::Hit {
                amount: 16,
                critical: true,
                blocked: 4
            }
        );
        assert_eq!(defender.hp, 84);
    }

    #[test]
    fn test_ready_to_attack() {
        let mut unit = plain_unit();
        unit.last_attack_at = 1000;
        assert!(!unit.ready_to_attack(2999));
        assert!(unit.ready_to_attack(3000));
    }
}
