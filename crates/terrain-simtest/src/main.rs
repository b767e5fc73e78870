//! Le Terrain Headless Harness
//!
//! Validates the game resource and pure logic, then plays a full finale
//! against a fake clock. Runs entirely in-process: no UI, no browser storage.
//!
//! Usage:
//!   cargo run -p terrain-simtest
//!   cargo run -p terrain-simtest -- --verbose --seed 42
//!   cargo run -p terrain-simtest -- --data path/to/leTerrain.properties --config finale.json

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use terrain_core::config::GameConfig;
use terrain_core::engine::{DirectorState, EncounterDirector};
use terrain_core::events::{CombatEvent, FoeKind};
use terrain_core::game_data::GameData;
use terrain_core::persistence::{MemoryStore, SaveManager, StorageError, LEADERBOARD_SIZE};
use terrain_logic::catalog::ProgressionCatalog;
use terrain_logic::combat::{strike, AttackOutcome, CombatUnit};
use terrain_logic::progress::{PlayerProgress, StatLevels};
use terrain_logic::resource::ResourceStore;
use terrain_logic::roster::{MAX_STAT_LEVEL, ROSTER};
use terrain_logic::tuning::CombatTuning;

// ── Game resource (same text the game ships) ────────────────────────────
const RESOURCE_TEXT: &str = include_str!("../../../data/leTerrain.properties");

/// Frame step of the fake clock, ~60 FPS
const FRAME_MS: u64 = 16;
/// Hard cap on simulated frames for one finale
const MAX_FRAMES: usize = 200_000;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    data: Option<String>,
    config: Option<String>,
    seed: u64,
}

impl Options {
    fn from_args() -> Self {
        let mut options = Options {
            verbose: false,
            data: None,
            config: None,
            seed: 42,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--verbose" => options.verbose = true,
                "--data" => options.data = args.next(),
                "--config" => options.config = args.next(),
                "--seed" => match args.next().map(|s| s.parse()) {
                    Some(Ok(seed)) => options.seed = seed,
                    _ => log::warn!("--seed expects an integer, keeping {}", options.seed),
                },
                other => log::warn!("Ignoring unknown argument {other}"),
            }
        }
        options
    }
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let options = Options::from_args();
    println!("=== Le Terrain Harness ===\n");

    let mut data = GameData::new();
    let loaded = match &options.data {
        Some(path) => data.load_from_path(path),
        None => data.load_from_str(RESOURCE_TEXT),
    };
    if !loaded {
        println!("=== RESULT: resource could not be loaded ===");
        std::process::exit(1);
    }

    let config = match &options.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    let mut results = Vec::new();

    // 1. Resource parsing & nesting
    results.extend(validate_resource(&options));

    // 2. Missions, powers and unlocks
    results.extend(validate_catalog(data.catalog(), options.verbose));

    // 3. Combat rolls
    results.extend(validate_combat(&config.tuning, options.seed));

    // 4. Save & leaderboard
    results.extend(validate_persistence());

    // 5. Full finale on a fake clock
    results.extend(simulate_finale(&data, &config, &options));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Resource ─────────────────────────────────────────────────────────

fn validate_resource(options: &Options) -> Vec<TestResult> {
    println!("--- Resource ---");
    let mut results = Vec::new();

    let text = match &options.data {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                results.push(TestResult {
                    name: "resource_read".into(),
                    passed: false,
                    detail: format!("{}: {}", path, e),
                });
                return results;
            }
        },
        None => RESOURCE_TEXT.to_string(),
    };

    let store = ResourceStore::parse(&text);
    results.push(TestResult {
        name: "resource_not_empty".into(),
        passed: !store.is_empty(),
        detail: format!("{} entries", store.len()),
    });

    let tree = store.nest();
    let lost: Vec<&str> = store
        .entries()
        .filter(|(key, value)| {
            let path: Vec<&str> = key.split('.').collect();
            tree.leaf_at(&path) != Some(*value)
        })
        .map(|(key, _)| key)
        .collect();
    results.push(TestResult {
        name: "resource_nests_without_loss".into(),
        passed: lost.is_empty(),
        detail: if lost.is_empty() {
            format!("{} leaves", tree.leaf_count())
        } else {
            format!("{} keys shadowed, first: {}", lost.len(), lost[0])
        },
    });

    results
}

// ── 2. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(catalog: &ProgressionCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();

    for character in &ROSTER {
        let missions = catalog.missions_for(character.id);
        let powers = catalog.powers_for(character.id, &BTreeSet::new());
        if verbose {
            println!(
                "  {:<9} {} missions, {} powers",
                character.display_name,
                missions.len(),
                powers.len()
            );
        }

        let bases = powers.iter().filter(|p| p.is_base).count();
        results.push(TestResult {
            name: format!("{}_single_base_power", character.id),
            passed: bases <= 1 && (powers.is_empty() || bases == 1),
            detail: format!("{} base of {} powers", bases, powers.len()),
        });

        let targets: Vec<_> = missions
            .iter()
            .filter_map(|m| m.unlocks_power_id.as_deref())
            .collect();
        let unique: BTreeSet<_> = targets.iter().collect();
        results.push(TestResult {
            name: format!("{}_unlocks_unique", character.id),
            passed: unique.len() == targets.len(),
            detail: format!("{} missions unlock {} powers", missions.len(), targets.len()),
        });

        let all_done: BTreeSet<String> = missions
            .iter()
            .map(|m| m.id.clone())
            .collect();
        let unlocked = catalog
            .powers_for(character.id, &all_done)
            .iter()
            .filter(|p| p.is_unlocked)
            .count();
        let expected = bases + targets.len();
        results.push(TestResult {
            name: format!("{}_unlock_all", character.id),
            passed: unlocked >= expected.min(powers.len()),
            detail: format!("{} of {} unlocked after all missions", unlocked, powers.len()),
        });

        results.push(TestResult {
            name: format!("{}_profile", character.id),
            passed: catalog.character_profile(character.id).is_some(),
            detail: "profile resolved".into(),
        });
    }

    let named_bosses = (1..=8)
        .map(|slot| catalog.boss(slot))
        .filter(|b| !b.name.starts_with("Boss "))
        .count();
    results.push(TestResult {
        name: "boss_names".into(),
        passed: named_bosses == 8,
        detail: format!("{}/8 bosses named", named_bosses),
    });

    results
}

// ── 3. Combat ───────────────────────────────────────────────────────────

fn validate_combat(tuning: &CombatTuning, seed: u64) -> Vec<TestResult> {
    println!("--- Combat ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    let untrained = CombatUnit::hero("Héros", &StatLevels::new(), &tuning.base, &tuning.hero);
    let maxed = CombatUnit::hero(
        "Héros",
        &StatLevels::uniform(MAX_STAT_LEVEL),
        &tuning.base,
        &tuning.hero,
    );
    results.push(TestResult {
        name: "training_strengthens_hero".into(),
        passed: maxed.max_hp > untrained.max_hp
            && maxed.attack_damage > untrained.attack_damage
            && maxed.attack_cooldown_ms <= untrained.attack_cooldown_ms,
        detail: format!(
            "hp {}→{}, dmg {}→{}, cooldown {}→{} ms",
            untrained.max_hp,
            maxed.max_hp,
            untrained.attack_damage,
            maxed.attack_damage,
            untrained.attack_cooldown_ms,
            maxed.attack_cooldown_ms
        ),
    });

    let chances_ok = [maxed.crit_chance, maxed.dodge_chance, maxed.precision]
        .iter()
        .all(|c| (0.0..=1.0).contains(c));
    results.push(TestResult {
        name: "chances_clamped".into(),
        passed: chances_ok,
        detail: format!(
            "crit {:.2}, dodge {:.2}, precision {:.2}",
            maxed.crit_chance, maxed.dodge_chance, maxed.precision
        ),
    });

    // Boss 8 strikes the maxed hero many times; damage must respect the floor
    let boss = CombatUnit::boss("Boss 8", 8, &tuning.base, &tuning.bosses);
    let (mut hits, mut misses, mut dodges, mut crits) = (0, 0, 0, 0);
    let mut bad_damage = 0;
    for _ in 0..2000 {
        let mut target = maxed.clone();
        match strike(&boss, &mut target, &mut rng) {
            AttackOutcome::Missed => misses += 1,
            AttackOutcome::Dodged => dodges += 1,
            AttackOutcome::Hit {
                amount, critical, ..
            } => {
                hits += 1;
                if critical {
                    crits += 1;
                }
                if amount == 0 || target.hp != maxed.max_hp.saturating_sub(amount) {
                    bad_damage += 1;
                }
            }
        }
    }
    results.push(TestResult {
        name: "strike_accounting".into(),
        passed: bad_damage == 0 && hits > 0 && dodges > 0,
        detail: format!(
            "{} hits ({} crits), {} misses, {} dodges",
            hits, crits, misses, dodges
        ),
    });

    results
}

// ── 4. Persistence ──────────────────────────────────────────────────────

fn validate_persistence() -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();
    let mut save = SaveManager::load(MemoryStore::new());

    results.push(TestResult {
        name: "leaderboard_seeded".into(),
        passed: save.leaderboard().len() == LEADERBOARD_SIZE,
        detail: format!("{} entries", save.leaderboard().len()),
    });

    let writes = train_everyone(&mut save);
    results.push(TestResult {
        name: "save_writes".into(),
        passed: writes.is_ok(),
        detail: match &writes {
            Ok(()) => "all writes succeeded".into(),
            Err(e) => e.to_string(),
        },
    });

    results.push(TestResult {
        name: "final_unlocked_after_training".into(),
        passed: save.is_final_unlocked() && save.pseudo() == "ZIN",
        detail: format!("pseudo {}", save.pseudo()),
    });

    let sorted = save
        .leaderboard()
        .windows(2)
        .all(|w| w[0].score >= w[1].score);
    results.push(TestResult {
        name: "leaderboard_sorted".into(),
        passed: sorted && save.leaderboard()[0].pseudo == "ZIN",
        detail: format!("top: {:?}", save.leaderboard()[0]),
    });

    results
}

fn train_everyone(save: &mut SaveManager<MemoryStore>) -> Result<(), StorageError> {
    save.set_pseudo("zinedine")?;
    for character in &ROSTER {
        save.record_training_win(character.id)?;
    }
    save.add_score("zin", 99_999)
}

// ── 5. Finale ───────────────────────────────────────────────────────────

fn simulate_finale(data: &GameData, config: &GameConfig, options: &Options) -> Vec<TestResult> {
    println!("--- Finale ---");
    let mut results = Vec::new();

    let mut save = SaveManager::load(MemoryStore::new());
    let trained: Result<(), _> = ROSTER
        .iter()
        .try_for_each(|c| save.update_stat(c.id, MAX_STAT_LEVEL).map(|_| ()));
    if let Err(e) = trained.and_then(|_| save.set_pseudo("sim")) {
        results.push(TestResult {
            name: "finale_setup".into(),
            passed: false,
            detail: e.to_string(),
        });
        return results;
    }

    let bestiary = data.bestiary(config.encounter.total_bosses);
    let mut director = EncounterDirector::with_seed(config.clone(), bestiary, options.seed);
    director.start(0, &save);

    let mut now = 0;
    let mut frames = 0;
    let mut events = director.drain_events();
    while frames < MAX_FRAMES {
        now += FRAME_MS;
        frames += 1;
        let more = director.tick(now);
        events.extend(director.drain_events());
        if !more {
            break;
        }
    }

    let summary = director.summary();
    results.push(TestResult {
        name: "finale_terminates".into(),
        passed: director.state().is_terminal() && !director.is_running(),
        detail: format!(
            "{:?} after {} frames ({:.1} s simulated)",
            director.state(),
            frames,
            now as f64 / 1000.0
        ),
    });

    results.push(TestResult {
        name: "finale_no_pending_callbacks".into(),
        passed: director.pending_callbacks() == 0,
        detail: format!("{} pending", director.pending_callbacks()),
    });

    let bosses_seen: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::Spawned {
                kind: FoeKind::Boss { slot, .. },
                ..
            } => Some(*slot),
            _ => None,
        })
        .collect();
    let in_order = bosses_seen.iter().enumerate().all(|(i, s)| *s == i as u32 + 1);
    results.push(TestResult {
        name: "finale_boss_order".into(),
        passed: in_order,
        detail: format!("bosses spawned: {:?}", bosses_seen),
    });

    let per_boss = config.encounter.enemies_per_boss.max(1);
    let expected_waves = summary.bosses_defeated * per_boss;
    results.push(TestResult {
        name: "finale_cadence".into(),
        passed: summary.waves_cleared >= expected_waves
            && summary.waves_cleared <= expected_waves + per_boss,
        detail: format!(
            "{} waves, {} bosses",
            summary.waves_cleared, summary.bosses_defeated
        ),
    });

    let ended = events.iter().rev().find_map(|e| match e {
        CombatEvent::EncounterEnded { score, .. } => Some(*score),
        _ => None,
    });
    results.push(TestResult {
        name: "finale_score_reported".into(),
        passed: ended == Some(summary.score),
        detail: format!("{:?}, score {}", summary.outcome, summary.score),
    });

    if options.verbose {
        for event in events.iter().filter(|e| !matches!(e, CombatEvent::HitPulse { .. })) {
            println!("  {:?}", event);
        }
        match serde_json::to_string(&summary) {
            Ok(json) => println!("  summary: {}", json),
            Err(e) => log::warn!("Cannot serialize run summary: {e}"),
        }
    }

    if director.state() == DirectorState::Victory {
        let pseudo = save.pseudo().to_string();
        let placed = save.add_score(&pseudo, summary.score);
        results.push(TestResult {
            name: "finale_score_saved".into(),
            passed: placed.is_ok(),
            detail: format!("top: {:?}", save.leaderboard().first()),
        });
    }

    results
}
