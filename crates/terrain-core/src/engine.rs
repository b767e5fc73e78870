//! Encounter director - the boss-rush finale
//!
//! Owns the hero and the current foe, and advances the fight one frame at a
//! time. An external scheduler calls [`EncounterDirector::tick`] with a
//! monotonically increasing millisecond clock for as long as it returns
//! `true`. Nothing is rendered here: the director only emits
//! [`CombatEvent`]s.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use terrain_logic::combat::{strike, CombatUnit};
use terrain_logic::progress::{PlayerProgress, StatLevels};
use terrain_logic::tuning::CombatTuning;

use crate::bestiary::Bestiary;
use crate::config::{EncounterConfig, GameConfig};
use crate::events::{CombatEvent, EncounterOutcome, FoeKind, Side, UnitSnapshot};
use crate::schedule::{DeferredAction, DeferredQueue};

/// Hero name when the player has not registered a pseudo.
pub const DEFAULT_HERO_NAME: &str = "Héros";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectorState {
    Idle,
    /// Waiting for the settle delay before the next foe appears
    Spawning,
    Active,
    Victory,
    Defeat,
}

impl DirectorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DirectorState::Victory | DirectorState::Defeat)
    }
}

/// End-of-run numbers for the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub waves_cleared: u32,
    pub bosses_defeated: u32,
    pub outcome: Option<EncounterOutcome>,
    pub score: u32,
}

#[derive(Debug, Clone)]
struct ActiveFoe {
    unit: CombatUnit,
    kind: FoeKind,
}

pub struct EncounterDirector {
    config: EncounterConfig,
    tuning: CombatTuning,
    bestiary: Bestiary,
    rng: StdRng,

    state: DirectorState,
    running: bool,
    /// Bumped on every start; deferred callbacks from older runs are dropped
    run_id: u64,
    /// Foes defeated so far, waves and bosses alike
    wave: u32,
    /// Next boss slot, 1-based
    boss_slot: u32,

    hero: Option<CombatUnit>,
    foe: Option<ActiveFoe>,

    waves_cleared: u32,
    bosses_defeated: u32,
    outcome: Option<EncounterOutcome>,

    deferred: DeferredQueue,
    events: Vec<CombatEvent>,
}

impl EncounterDirector {
    pub fn new(config: GameConfig, bestiary: Bestiary) -> Self {
        Self::with_rng(config, bestiary, StdRng::from_entropy())
    }

    /// Deterministic director for tests and replays.
    pub fn with_seed(config: GameConfig, bestiary: Bestiary, seed: u64) -> Self {
        Self::with_rng(config, bestiary, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, bestiary: Bestiary, rng: StdRng) -> Self {
        Self {
            config: config.encounter,
            tuning: config.tuning,
            bestiary,
            rng,
            state: DirectorState::Idle,
            running: false,
            run_id: 0,
            wave: 0,
            boss_slot: 1,
            hero: None,
            foe: None,
            waves_cleared: 0,
            bosses_defeated: 0,
            outcome: None,
            deferred: DeferredQueue::new(),
            events: Vec::new(),
        }
    }

    /// Begin a new run at time `now`, replacing any run in progress.
    pub fn start(&mut self, now: u64, progress: &impl PlayerProgress) {
        self.deferred.cancel_all();
        self.events.clear();
        self.run_id += 1;
        self.wave = 0;
        self.boss_slot = 1;
        self.waves_cleared = 0;
        self.bosses_defeated = 0;
        self.outcome = None;
        self.foe = None;

        let name = match progress.pseudo() {
            "" => DEFAULT_HERO_NAME,
            pseudo => pseudo,
        };
        let levels = StatLevels::from_progress(progress);
        let mut hero = CombatUnit::hero(name, &levels, &self.tuning.base, &self.tuning.hero);
        hero.last_attack_at = now;

        log::info!(
            "Finale run {} started: {} ({} hp, {} dmg, {} ms)",
            self.run_id,
            hero.name,
            hero.max_hp,
            hero.attack_damage,
            hero.attack_cooldown_ms
        );
        self.events.push(CombatEvent::RunStarted {
            hero: UnitSnapshot::from(&hero),
        });
        self.hero = Some(hero);
        self.running = true;
        self.spawn_next(now);
    }

    /// Advance one frame. Returns whether another frame should be requested.
    pub fn tick(&mut self, now: u64) -> bool {
        if !self.running {
            return false;
        }

        for deferred in self.deferred.take_due(now) {
            if !self.running || deferred.run_id != self.run_id {
                log::debug!("Dropping stale callback {:?}", deferred.action);
                continue;
            }
            match deferred.action {
                DeferredAction::SpawnNext => {
                    if self.state == DirectorState::Spawning && self.foe.is_none() {
                        self.spawn_next(now);
                    }
                }
                DeferredAction::EndHitPulse(side) => {
                    self.events.push(CombatEvent::HitPulse {
                        side,
                        active: false,
                    });
                }
            }
        }

        if self.state == DirectorState::Active {
            self.process_combat(now);
        }
        self.running
    }

    /// Halt the run and drop pending callbacks. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Finale run {} stopped", self.run_id);
        }
        self.running = false;
        self.deferred.cancel_all();
    }

    fn spawn_next(&mut self, now: u64) {
        self.state = DirectorState::Spawning;
        let per_boss = self.config.enemies_per_boss.max(1);

        let (mut unit, kind) = if self.wave > 0 && self.wave % per_boss == 0 {
            if self.boss_slot > self.config.total_bosses {
                self.finish(EncounterOutcome::Victory);
                return;
            }
            let slot = self.boss_slot;
            let profile = self.bestiary.boss(slot);
            let unit = CombatUnit::boss(profile.name, slot, &self.tuning.base, &self.tuning.bosses);
            self.boss_slot += 1;
            (
                unit,
                FoeKind::Boss {
                    slot,
                    quote: profile.quote,
                },
            )
        } else {
            let name = self.bestiary.random_enemy_name(&mut self.rng).to_string();
            let unit = CombatUnit::wave(name, self.wave, &self.tuning.base, &self.tuning.waves);
            (unit, FoeKind::Wave { index: self.wave })
        };

        unit.last_attack_at = now;
        if let Some(hero) = self.hero.as_mut() {
            hero.last_attack_at = now;
        }

        log::debug!(
            "Spawned {} ({:?}, {} hp, {} dmg)",
            unit.name,
            kind,
            unit.max_hp,
            unit.attack_damage
        );
        self.events.push(CombatEvent::Spawned {
            foe: UnitSnapshot::from(&unit),
            kind: kind.clone(),
        });
        self.foe = Some(ActiveFoe { unit, kind });
        self.state = DirectorState::Active;
    }

    fn process_combat(&mut self, now: u64) {
        let (Some(hero), Some(foe)) = (self.hero.as_mut(), self.foe.as_mut()) else {
            return;
        };
        let foe = &mut foe.unit;
        if foe.is_down() {
            self.on_foe_defeated(now);
            return;
        }
        if hero.is_down() {
            self.on_hero_defeated();
            return;
        }

        if hero.ready_to_attack(now) {
            hero.last_attack_at = now;
            let outcome = strike(hero, foe, &mut self.rng);
            log::debug!("{} -> {}: {:?}", hero.name, foe.name, outcome);
            self.events.push(CombatEvent::AttackResolved {
                attacker: Side::Hero,
                defender: Side::Foe,
                outcome,
                defender_hp: foe.hp,
            });
            if outcome.is_hit() {
                self.events.push(CombatEvent::HitPulse {
                    side: Side::Foe,
                    active: true,
                });
                self.deferred.schedule(
                    now + self.config.hit_pulse_ms,
                    self.run_id,
                    DeferredAction::EndHitPulse(Side::Foe),
                );
            }

            let healed = hero.apply_heal(hero.regen_per_attack);
            if healed > 0 {
                self.events.push(CombatEvent::Healed {
                    side: Side::Hero,
                    amount: healed,
                });
            }

            if foe.is_down() {
                self.on_foe_defeated(now);
                return;
            }
        }

        if foe.ready_to_attack(now) {
            foe.last_attack_at = now;
            let outcome = strike(foe, hero, &mut self.rng);
            log::debug!("{} -> {}: {:?}", foe.name, hero.name, outcome);
            self.events.push(CombatEvent::AttackResolved {
                attacker: Side::Foe,
                defender: Side::Hero,
                outcome,
                defender_hp: hero.hp,
            });
            if outcome.is_hit() {
                self.events.push(CombatEvent::HitPulse {
                    side: Side::Hero,
                    active: true,
                });
                self.deferred.schedule(
                    now + self.config.hit_pulse_ms,
                    self.run_id,
                    DeferredAction::EndHitPulse(Side::Hero),
                );
            }

            if hero.is_down() {
                self.on_hero_defeated();
            }
        }
    }

    fn on_hero_defeated(&mut self) {
        let name = self.hero.as_ref().map(|h| h.name.clone()).unwrap_or_default();
        self.events.push(CombatEvent::Defeated {
            side: Side::Hero,
            name,
        });
        self.finish(EncounterOutcome::Defeat);
    }

    fn on_foe_defeated(&mut self, now: u64) {
        let Some(foe) = self.foe.take() else {
            return;
        };
        self.events.push(CombatEvent::Defeated {
            side: Side::Foe,
            name: foe.unit.name,
        });
        self.wave += 1;

        if foe.kind.is_boss() {
            self.bosses_defeated += 1;
            if self.boss_slot > self.config.total_bosses {
                self.finish(EncounterOutcome::Victory);
                return;
            }
        } else {
            self.waves_cleared += 1;
        }

        self.state = DirectorState::Spawning;
        self.deferred.schedule(
            now + self.config.settle_delay_ms,
            self.run_id,
            DeferredAction::SpawnNext,
        );
    }

    fn finish(&mut self, outcome: EncounterOutcome) {
        self.state = match outcome {
            EncounterOutcome::Victory => DirectorState::Victory,
            EncounterOutcome::Defeat => DirectorState::Defeat,
        };
        self.outcome = Some(outcome);
        let score = self.score();
        log::info!(
            "Finale run {} ended: {:?} after {} waves and {} bosses, score {}",
            self.run_id,
            outcome,
            self.waves_cleared,
            self.bosses_defeated,
            score
        );
        self.events.push(CombatEvent::EncounterEnded { outcome, score });
        self.stop();
    }

    /// Score so far: points per foe plus the victory bonus once won.
    pub fn score(&self) -> u32 {
        let bonus = match self.outcome {
            Some(EncounterOutcome::Victory) => self.config.victory_bonus,
            _ => 0,
        };
        self.waves_cleared * self.config.points_per_enemy
            + self.bosses_defeated * self.config.points_per_boss
            + bonus
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            waves_cleared: self.waves_cleared,
            bosses_defeated: self.bosses_defeated,
            outcome: self.outcome,
            score: self.score(),
        }
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> DirectorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn hero(&self) -> Option<&CombatUnit> {
        self.hero.as_ref()
    }

    pub fn foe(&self) -> Option<&CombatUnit> {
        self.foe.as_ref().map(|f| &f.unit)
    }

    pub fn foe_kind(&self) -> Option<&FoeKind> {
        self.foe.as_ref().map(|f| &f.kind)
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn boss_slot(&self) -> u32 {
        self.boss_slot
    }

    pub fn pending_callbacks(&self) -> usize {
        self.deferred.len()
    }

    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use terrain_logic::tuning::{BaseStats, HeroTuning};

    struct Trained(u8);

    impl PlayerProgress for Trained {
        fn stat_level(&self, _character_id: &str) -> u8 {
            self.0
        }

        fn completed_missions(&self) -> BTreeSet<String> {
            BTreeSet::new()
        }

        fn pseudo(&self) -> &str {
            "ABC"
        }
    }

    /// Hero that one-shots everything before any foe can act.
    fn overpowered() -> GameConfig {
        let mut config = GameConfig::default();
        config.tuning.base = BaseStats {
            max_hp: 1_000_000,
            damage: 1_000_000,
            cooldown_ms: 100,
            crit_chance: 0.0,
            dodge_chance: 0.0,
            precision: 1.0,
        };
        config.tuning.hero.min_cooldown_ms = 0;
        config
    }

    /// Hero that cannot survive one hit.
    fn fragile() -> GameConfig {
        let mut config = GameConfig::default();
        config.tuning.base = BaseStats {
            max_hp: 1,
            damage: 1,
            cooldown_ms: 10_000,
            crit_chance: 0.0,
            dodge_chance: 0.0,
            precision: 1.0,
        };
        config
    }

    /// Sure hits, no crits, no dodges, no per-level bonuses except regen.
    fn duel(hero_damage: u32, hero_cooldown_ms: u64, regen_per_level: u32) -> GameConfig {
        let mut config = GameConfig::default();
        config.tuning.base = BaseStats {
            max_hp: 1000,
            damage: hero_damage,
            cooldown_ms: hero_cooldown_ms,
            crit_chance: 0.0,
            dodge_chance: 0.0,
            precision: 1.0,
        };
        config.tuning.hero = HeroTuning {
            damage_per_level: 0,
            cooldown_per_level_ms: 0,
            min_cooldown_ms: 0,
            crit_per_level: 0.0,
            dodge_per_level: 0.0,
            precision_per_level: 0.0,
            defense_per_level: 0,
            regen_per_level,
            hp_per_level: 0,
        };
        config
    }

    fn run_to_end(director: &mut EncounterDirector, mut now: u64) -> (u64, Vec<CombatEvent>) {
        let mut events = director.drain_events();
        for _ in 0..10_000 {
            now += 50;
            let more = director.tick(now);
            events.extend(director.drain_events());
            if !more {
                break;
            }
        }
        (now, events)
    }

    fn spawned_kinds(events: &[CombatEvent]) -> Vec<FoeKind> {
        events
            .iter()
            .filter_map(|e| match e {
                CombatEvent::Spawned { kind, .. } => Some(kind.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_spawns_first_wave() {
        let mut director = EncounterDirector::with_seed(GameConfig::default(), Bestiary::default(), 1);
        assert_eq!(director.state(), DirectorState::Idle);

        director.start(0, &Trained(0));
        assert_eq!(director.state(), DirectorState::Active);
        assert!(director.is_running());
        assert_eq!(director.foe_kind(), Some(&FoeKind::Wave { index: 0 }));
        assert_eq!(director.foe().unwrap().max_hp, 50);
        assert_eq!(director.hero().unwrap().name, "ABC");

        let events = director.drain_events();
        assert!(matches!(events[0], CombatEvent::RunStarted { .. }));
        assert!(matches!(events[1], CombatEvent::Spawned { .. }));
    }

    #[test]
    fn test_boss_after_two_waves() {
        let mut director = EncounterDirector::with_seed(overpowered(), Bestiary::default(), 3);
        director.start(0, &Trained(0));

        let mut now = 0;
        let mut kinds = Vec::new();
        while kinds.len() < 3 {
            now += 50;
            assert!(director.tick(now));
            kinds.extend(spawned_kinds(&director.drain_events()));
        }
        assert_eq!(director.wave(), 2);
        assert_eq!(
            kinds[2],
            FoeKind::Boss {
                slot: 1,
                quote: String::new()
            }
        );
        assert_eq!(director.boss_slot(), 2);
        assert_eq!(director.foe().unwrap().max_hp, 400);
    }

    #[test]
    fn test_full_run_victory() {
        let mut director = EncounterDirector::with_seed(overpowered(), Bestiary::default(), 5);
        director.start(0, &Trained(3));
        let (_, events) = run_to_end(&mut director, 0);

        assert_eq!(director.state(), DirectorState::Victory);
        assert!(!director.is_running());
        assert_eq!(director.pending_callbacks(), 0);

        let kinds = spawned_kinds(&events);
        assert_eq!(kinds.len(), 17);
        let boss_slots: Vec<u32> = kinds
            .iter()
            .filter_map(|k| match k {
                FoeKind::Boss { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect();
        assert_eq!(boss_slots, (1..=8).collect::<Vec<_>>());

        let summary = director.summary();
        assert_eq!(summary.waves_cleared, 9);
        assert_eq!(summary.bosses_defeated, 8);
        assert_eq!(summary.score, 9 * 100 + 8 * 500 + 1000);
        assert_eq!(
            events.last(),
            Some(&CombatEvent::EncounterEnded {
                outcome: EncounterOutcome::Victory,
                score: summary.score
            })
        );
    }

    #[test]
    fn test_hero_defeat() {
        let mut director = EncounterDirector::with_seed(fragile(), Bestiary::default(), 9);
        director.start(0, &Trained(0));
        let (_, events) = run_to_end(&mut director, 0);

        assert_eq!(director.state(), DirectorState::Defeat);
        assert!(!director.is_running());
        assert_eq!(director.score(), 0);
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::Defeated {
                side: Side::Hero,
                ..
            }
        )));
        assert!(matches!(
            events.last(),
            Some(CombatEvent::EncounterEnded {
                outcome: EncounterOutcome::Defeat,
                score: 0
            })
        ));
    }

    #[test]
    fn test_zero_hp_config_still_terminates() {
        let mut config = GameConfig::default();
        config.tuning.base.max_hp = 0;
        config.tuning.waves.base_hp = 0;
        config.tuning.waves.hp_per_index = 0;

        let mut director = EncounterDirector::with_seed(config, Bestiary::default(), 11);
        director.start(0, &Trained(0));
        assert_eq!(director.hero().unwrap().max_hp, 1);
        assert_eq!(director.foe().unwrap().max_hp, 1);

        run_to_end(&mut director, 0);
        assert!(director.state().is_terminal());
        assert!(!director.is_running());
    }

    #[test]
    fn test_regen_after_hero_attack_capped() {
        // Wave 0 hits for 5 at t=2500, the hero strikes and regenerates at t=3000
        let mut director = EncounterDirector::with_seed(duel(1, 3000, 20), Bestiary::default(), 8);
        director.start(0, &Trained(1));
        director.drain_events();

        director.tick(2500);
        let hero = director.hero().unwrap();
        assert_eq!(hero.max_hp - hero.hp, 5);
        assert!(!director
            .drain_events()
            .iter()
            .any(|e| matches!(e, CombatEvent::Healed { .. })));

        director.tick(3000);
        let events = director.drain_events();
        let attack = events
            .iter()
            .position(|e| matches!(e, CombatEvent::AttackResolved { attacker: Side::Hero, .. }))
            .unwrap();
        let healed = events
            .iter()
            .position(|e| {
                *e == CombatEvent::Healed {
                    side: Side::Hero,
                    amount: 5,
                }
            })
            .unwrap();
        assert!(attack < healed);
        let hero = director.hero().unwrap();
        assert_eq!(hero.hp, hero.max_hp);
    }

    #[test]
    fn test_foe_killed_in_shared_tick_does_not_strike() {
        // Hero and wave 0 share a 2500 ms cooldown; the hero acts first
        let mut director =
            EncounterDirector::with_seed(duel(1_000_000, 2500, 0), Bestiary::default(), 10);
        director.start(0, &Trained(0));
        director.drain_events();

        director.tick(2500);
        let events = director.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::Defeated { side: Side::Foe, .. })));
        assert!(!events
            .iter()
            .any(|e| matches!(e, CombatEvent::AttackResolved { attacker: Side::Foe, .. })));
        let hero = director.hero().unwrap();
        assert_eq!(hero.hp, hero.max_hp);
        assert_eq!(director.state(), DirectorState::Spawning);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut director = EncounterDirector::with_seed(GameConfig::default(), Bestiary::default(), 1);
        director.stop();
        director.start(0, &Trained(1));
        director.stop();
        director.stop();

        assert!(!director.is_running());
        assert_eq!(director.pending_callbacks(), 0);
        assert!(!director.tick(5_000));
    }

    #[test]
    fn test_settle_callback_after_stop_is_dropped() {
        let mut director = EncounterDirector::with_seed(overpowered(), Bestiary::default(), 2);
        director.start(0, &Trained(0));
        director.drain_events();

        // First foe falls at t=100; next spawn is due at t=1600
        assert!(director.tick(100));
        assert_eq!(director.state(), DirectorState::Spawning);
        assert!(director.pending_callbacks() > 0);

        director.stop();
        assert!(!director.tick(2_000));
        assert!(spawned_kinds(&director.drain_events()).is_empty());
        assert!(director.foe().is_none());
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut director = EncounterDirector::with_seed(overpowered(), Bestiary::default(), 4);
        director.start(0, &Trained(3));
        run_to_end(&mut director, 0);
        assert_eq!(director.state(), DirectorState::Victory);

        director.start(1_000_000, &Trained(3));
        assert_eq!(director.state(), DirectorState::Active);
        assert_eq!(director.wave(), 0);
        assert_eq!(director.boss_slot(), 1);
        assert_eq!(director.summary().outcome, None);
        assert_eq!(director.score(), 0);
    }

    #[test]
    fn test_hit_pulse_ends() {
        let mut director = EncounterDirector::with_seed(overpowered(), Bestiary::default(), 6);
        director.start(0, &Trained(0));
        director.tick(100);
        let events = director.drain_events();
        assert!(events.contains(&CombatEvent::HitPulse {
            side: Side::Foe,
            active: true
        }));

        director.tick(400);
        assert!(director.drain_events().contains(&CombatEvent::HitPulse {
            side: Side::Foe,
            active: false
        }));
    }
}
