//! Le Terrain Core - finale engine, resource loading and save persistence
//!
//! Builds on the pure logic in `terrain_logic` and adds everything that holds
//! state across frames or sessions.
//!
//! # Architecture
//!
//! - **GameData**: loads the text resource once and exposes the catalog
//! - **SaveManager**: player save and leaderboard over a key-value store
//! - **EncounterDirector**: the boss-rush finale, driven one frame at a time
//!   by an external scheduler, emitting [`events::CombatEvent`]s for the UI
//!
//! # Example
//!
//! ```rust,no_run
//! use terrain_core::prelude::*;
//!
//! let mut data = GameData::new();
//! if !data.load_from_path("data/leTerrain.properties") {
//!     return;
//! }
//! let save = SaveManager::load(MemoryStore::default());
//!
//! let config = GameConfig::default();
//! let bestiary = data.bestiary(config.encounter.total_bosses);
//! let mut director = EncounterDirector::new(config, bestiary);
//! director.start(0, &save);
//!
//! let mut now = 0;
//! while director.tick(now) {
//!     for event in director.drain_events() {
//!         println!("{:?}", event);
//!     }
//!     now += 16; // ~60 FPS
//! }
//! ```

pub mod bestiary;
pub mod config;
pub mod engine;
pub mod events;
pub mod game_data;
pub mod persistence;
pub mod schedule;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::bestiary::Bestiary;
    pub use crate::config::{EncounterConfig, GameConfig};
    pub use crate::engine::{DirectorState, EncounterDirector, RunSummary};
    pub use crate::events::{CombatEvent, EncounterOutcome, FoeKind, Side};
    pub use crate::game_data::GameData;
    pub use crate::persistence::{FileStore, KeyValueStore, MemoryStore, SaveManager};
    pub use terrain_logic::progress::PlayerProgress;
}
