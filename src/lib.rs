//! Dice Roller - an incremental dice game
//!
//! Core modules:
//! - `catalog`: Fixed shop items (dice upgrades, multiplier overlays)
//! - `game`: State engine (rules, rolling, purchases, observation)
//! - `shop`: Read-only shop listing for the presentation layer
//! - `persistence`: Flat key-value save/load with background writes
//! - `settings`: Engine configuration

pub mod catalog;
pub mod game;
pub mod persistence;
pub mod settings;
pub mod shop;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use catalog::{Catalog, CatalogItem, ItemKind};
pub use game::{GameEngine, GameState, RollOutcome, ShopError, Subscription};
pub use persistence::SaveMode;
pub use settings::Settings;
pub use shop::{ItemStatus, ShopEntry};
