//! Pure game logic for Le Terrain.
//!
//! This crate contains all game logic that is independent of storage,
//! rendering, or the frame scheduler. Functions take plain data and return
//! results, making them unit-testable and usable from both the engine crate
//! and the headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`resource`] | `key=value` resource parsing, ordered entries, nested tree view |
//! | [`roster`] | The eight playable characters and the stat each one trains |
//! | [`catalog`] | Missions, powers, unlock inference, bosses and enemy names |
//! | [`icons`] | Keyword → glyph rule table for missions and powers |
//! | [`power_type`] | `(Label Scope)` tag parsing for power names |
//! | [`progress`] | Read-only player progression seam and stat levels |
//! | [`tuning`] | Per-stat and per-wave combat coefficients |
//! | [`combat`] | Combat units, dodge/defense resolution, attack rolls |

pub mod catalog;
pub mod combat;
pub mod icons;
pub mod power_type;
pub mod progress;
pub mod resource;
pub mod roster;
pub mod tuning;
