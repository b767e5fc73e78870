//! Save/Load system for player progress and the leaderboard
//!
//! Both documents are JSON strings stored under fixed keys in a
//! [`KeyValueStore`]. Reads never fail: a missing or corrupt document falls
//! back to its default (the leaderboard is seeded and written back). Writes
//! surface [`StorageError`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use terrain_logic::progress::PlayerProgress;
use terrain_logic::roster::{find_character, MAX_STAT_LEVEL, ROSTER};
use thiserror::Error;

pub const PLAYER_KEY: &str = "le_terrain_player";
pub const LEADERBOARD_KEY: &str = "le_terrain_leaderboard";

pub const LEADERBOARD_SIZE: usize = 10;
pub const PSEUDO_MAX_LEN: usize = 3;

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-keyed persistent storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Persisted player progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSave {
    pub pseudo: String,
    /// Character id → training level
    pub stats: BTreeMap<String, u8>,
    /// Composite mission ids in completion order, no duplicates
    pub completed_missions: Vec<String>,
    pub discovered_powers: Vec<String>,
    pub last_played: DateTime<Utc>,
}

impl Default for PlayerSave {
    fn default() -> Self {
        Self {
            pseudo: String::new(),
            stats: ROSTER.iter().map(|c| (c.id.to_string(), 0)).collect(),
            completed_missions: Vec::new(),
            discovered_powers: Vec::new(),
            last_played: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub pseudo: String,
    pub score: u32,
}

impl ScoreEntry {
    fn new(pseudo: &str, score: u32) -> Self {
        Self {
            pseudo: pseudo.to_string(),
            score,
        }
    }
}

pub fn default_leaderboard() -> Vec<ScoreEntry> {
    vec![
        ScoreEntry::new("YOU", 1500),
        ScoreEntry::new("AAA", 1400),
        ScoreEntry::new("BBB", 1300),
        ScoreEntry::new("CCC", 1200),
        ScoreEntry::new("DDD", 1100),
        ScoreEntry::new("EEE", 1000),
        ScoreEntry::new("FFF", 900),
        ScoreEntry::new("GGG", 800),
        ScoreEntry::new("HHH", 700),
        ScoreEntry::new("III", 600),
    ]
}

/// Uppercased, trimmed, at most [`PSEUDO_MAX_LEN`] characters.
pub fn normalize_pseudo(raw: &str) -> String {
    raw.trim().to_uppercase().chars().take(PSEUDO_MAX_LEN).collect()
}

/// Owns the player save and the leaderboard, writing through on every change.
#[derive(Debug)]
pub struct SaveManager<S: KeyValueStore> {
    store: S,
    player: PlayerSave,
    leaderboard: Vec<ScoreEntry>,
}

impl<S: KeyValueStore> SaveManager<S> {
    pub fn load(mut store: S) -> Self {
        let player = load_player(&store);
        let leaderboard = load_leaderboard(&mut store);
        Self {
            store,
            player,
            leaderboard,
        }
    }

    pub fn player(&self) -> &PlayerSave {
        &self.player
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn set_pseudo(&mut self, pseudo: &str) -> Result<(), StorageError> {
        self.player.pseudo = normalize_pseudo(pseudo);
        self.save_player()
    }

    /// Registration form: accepts 1 to 3 characters after trimming.
    /// Returns false (and saves nothing) for anything else.
    pub fn register_pseudo(&mut self, input: &str) -> Result<bool, StorageError> {
        let len = input.trim().chars().count();
        if len == 0 || len > PSEUDO_MAX_LEN {
            return Ok(false);
        }
        self.set_pseudo(input)?;
        Ok(true)
    }

    pub fn stat(&self, character_id: &str) -> u8 {
        self.player.stats.get(character_id).copied().unwrap_or(0)
    }

    /// Set a character's training level, clamped to the max. Unknown ids are
    /// ignored and return false.
    pub fn update_stat(&mut self, character_id: &str, level: u8) -> Result<bool, StorageError> {
        if find_character(character_id).is_none() {
            log::warn!("Ignoring stat update for unknown character {character_id}");
            return Ok(false);
        }
        self.player
            .stats
            .insert(character_id.to_string(), level.min(MAX_STAT_LEVEL));
        self.save_player()?;
        Ok(true)
    }

    /// A won mini-game raises the character's level by one. Returns the new
    /// level.
    pub fn record_training_win(&mut self, character_id: &str) -> Result<u8, StorageError> {
        let next = self.stat(character_id).saturating_add(1);
        self.update_stat(character_id, next)?;
        Ok(self.stat(character_id))
    }

    /// Returns whether the mission was newly completed.
    pub fn complete_mission(&mut self, mission_id: &str) -> Result<bool, StorageError> {
        if self.is_mission_completed(mission_id) {
            return Ok(false);
        }
        self.player.completed_missions.push(mission_id.to_string());
        self.save_player()?;
        Ok(true)
    }

    pub fn is_mission_completed(&self, mission_id: &str) -> bool {
        self.player.completed_missions.iter().any(|m| m == mission_id)
    }

    pub fn discover_power(&mut self, power_id: &str) -> Result<bool, StorageError> {
        if self.player.discovered_powers.iter().any(|p| p == power_id) {
            return Ok(false);
        }
        self.player.discovered_powers.push(power_id.to_string());
        self.save_player()?;
        Ok(true)
    }

    /// Insert a score, keep the best [`LEADERBOARD_SIZE`]. Ties keep their
    /// insertion order.
    pub fn add_score(&mut self, pseudo: &str, score: u32) -> Result<(), StorageError> {
        self.leaderboard.push(ScoreEntry {
            pseudo: normalize_pseudo(pseudo),
            score,
        });
        rank_scores(&mut self.leaderboard);
        let json = serde_json::to_string(&self.leaderboard)?;
        self.store.set(LEADERBOARD_KEY, &json)
    }

    pub fn leaderboard(&self) -> &[ScoreEntry] {
        &self.leaderboard
    }

    /// Wipe the player save. The leaderboard is kept.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.store.remove(PLAYER_KEY)?;
        self.player = PlayerSave::default();
        log::info!("Player save reset");
        Ok(())
    }

    fn save_player(&mut self) -> Result<(), StorageError> {
        self.player.last_played = Utc::now();
        let json = serde_json::to_string(&self.player)?;
        self.store.set(PLAYER_KEY, &json)
    }
}

impl<S: KeyValueStore> PlayerProgress for SaveManager<S> {
    fn stat_level(&self, character_id: &str) -> u8 {
        self.stat(character_id)
    }

    fn completed_missions(&self) -> BTreeSet<String> {
        self.player.completed_missions.iter().cloned().collect()
    }

    fn pseudo(&self) -> &str {
        &self.player.pseudo
    }
}

fn load_player(store: &impl KeyValueStore) -> PlayerSave {
    let text = match store.get(PLAYER_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return PlayerSave::default(),
        Err(e) => {
            log::error!("Failed to read player save: {e}");
            return PlayerSave::default();
        }
    };

    match serde_json::from_str::<PlayerSave>(&text) {
        Ok(mut save) => {
            for level in save.stats.values_mut() {
                *level = (*level).min(MAX_STAT_LEVEL);
            }
            for character in &ROSTER {
                save.stats.entry(character.id.to_string()).or_insert(0);
            }
            let mut seen = BTreeSet::new();
            save.completed_missions.retain(|m| seen.insert(m.clone()));
            save
        }
        Err(e) => {
            log::warn!("Corrupt player save, starting fresh: {e}");
            PlayerSave::default()
        }
    }
}

/// Best first, ties in stored order, capped at [`LEADERBOARD_SIZE`].
fn rank_scores(entries: &mut Vec<ScoreEntry>) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(LEADERBOARD_SIZE);
}

fn load_leaderboard(store: &mut impl KeyValueStore) -> Vec<ScoreEntry> {
    match store.get(LEADERBOARD_KEY) {
        Ok(Some(text)) => match serde_json::from_str::<Vec<ScoreEntry>>(&text) {
            Ok(mut entries) => {
                rank_scores(&mut entries);
                return entries;
            }
            Err(e) => log::warn!("Corrupt leaderboard, reseeding: {e}"),
        },
        Ok(None) => {}
        Err(e) => {
            log::error!("Failed to read leaderboard: {e}");
            return default_leaderboard();
        }
    }

    let seeded = default_leaderboard();
    let written = serde_json::to_string(&seeded)
        .map_err(StorageError::from)
        .and_then(|json| store.set(LEADERBOARD_KEY, &json));
    if let Err(e) = written {
        log::error!("Failed to seed leaderboard: {e}");
    }
    seeded
}
