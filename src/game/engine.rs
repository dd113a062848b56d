//! Game engine
//!
//! Sole writer of `GameState`. Every mutation runs under one writer lock:
//! read the current snapshot, build the next one, publish it, queue a save.
//! Rejected shop calls change nothing and save nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::dice::{DiceRoller, SeededRoller};
use super::error::{self, ShopError};
use super::observe::{Snapshot, StateCell, Subscription};
use super::rules::multiplier_for;
use super::state::GameState;
use crate::catalog::{Catalog, CatalogItem, ItemKind};
use crate::persistence::{self, KeyValueStore, SaveMode, SaveWorker};
use crate::settings::Settings;
use crate::shop::{self, ShopEntry};

/// Result of a single roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    /// Faces in draw order
    pub values: Vec<u8>,
    pub sum: u64,
    pub multiplier: u32,
    pub points_gained: u64,
}

pub struct GameEngine {
    catalog: Catalog,
    state: StateCell,
    /// Writer lock; the roller lives here because only writers draw dice
    writer: Mutex<Box<dyn DiceRoller>>,
    saver: SaveWorker,
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("state", &self.state.get())
            .field("saver", &self.saver)
            .finish_non_exhaustive()
    }
}

impl GameEngine {
    /// Load the saved game (or defaults) and take ownership of it
    pub fn new(
        catalog: Catalog,
        store: Arc<dyn KeyValueStore>,
        roller: Box<dyn DiceRoller>,
        save_mode: SaveMode,
    ) -> Self {
        let record = store.load().unwrap_or_else(|e| {
            log::warn!("Could not read save, starting fresh: {e}");
            persistence::Record::new()
        });
        let state = persistence::decode(&record, &catalog);
        log::info!(
            "Loaded game: {} points, {} dice, x{} multiplier, {} items owned",
            state.total_points,
            state.number_of_dice,
            state.active_multiplier,
            state.purchased_item_ids.len()
        );

        Self {
            catalog,
            state: StateCell::new(state),
            writer: Mutex::new(roller),
            saver: SaveWorker::new(store, save_mode),
        }
    }

    /// Wire the platform store and roller described by `settings`
    pub fn from_settings(settings: &Settings) -> Self {
        let roller = match settings.rng_seed {
            Some(seed) => SeededRoller::new(seed),
            None => SeededRoller::from_entropy(),
        };
        Self::new(
            Catalog::builtin(),
            settings.open_store(),
            Box::new(roller),
            settings.save_mode,
        )
    }

    /// Current snapshot; never mutates, never saves
    pub fn current_state(&self) -> Snapshot {
        self.state.get()
    }

    /// Current snapshot first, then every change in order
    pub fn subscribe(&self) -> Subscription {
        self.state.subscribe()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Catalog items in display order
    pub fn list_catalog(&self) -> &[CatalogItem] {
        self.catalog.items()
    }

    /// Shop listing with per-item status for the current state
    pub fn shop(&self) -> Vec<ShopEntry<'_>> {
        shop::entries(&self.catalog, &self.state.get())
    }

    /// Image of the equipped overlay, if any
    pub fn overlay_image(&self) -> Option<String> {
        let state = self.state.get();
        let id = state.equipped_overlay_id.as_deref()?;
        self.catalog.find_by_id(id).map(|item| item.image_ref.clone())
    }

    /// Roll every die and bank `sum * multiplier` points
    pub fn roll_dice(&self) -> RollOutcome {
        let mut roller = self.lock_writer();
        let current = self.state.get();

        let values = roller.roll(current.number_of_dice);
        let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
        let multiplier = current.active_multiplier;
        let points_gained = sum.saturating_mul(u64::from(multiplier));

        let mut next = (*current).clone();
        next.total_points = next.total_points.saturating_add(points_gained);
        next.last_roll_values = values.clone();
        self.commit(next);

        log::debug!("Rolled {values:?} x{multiplier} = +{points_gained}");
        RollOutcome {
            values,
            sum,
            multiplier,
            points_gained,
        }
    }

    /// Buy an item. On error nothing changes and nothing is saved.
    pub fn purchase(&self, item_id: &str) -> error::Result<()> {
        let _writer = self.lock_writer();
        let item = self.find(item_id)?;
        let current = self.state.get();

        if current.is_purchased(item_id) {
            return Err(ShopError::AlreadyPurchased(item_id.to_string()));
        }
        if current.total_points < item.cost {
            return Err(ShopError::InsufficientPoints {
                cost: item.cost,
                available: current.total_points,
            });
        }

        let mut next = (*current).clone();
        next.total_points -= item.cost;
        next.purchased_item_ids.insert(item.id.clone());
        if item.kind == ItemKind::DiceUpgrade {
            next.number_of_dice += 1;
        }
        self.commit(next);

        log::info!("Purchased {} for {} points", item.id, item.cost);
        Ok(())
    }

    /// Toggle a purchased multiplier overlay on or off
    pub fn equip(&self, item_id: &str) -> error::Result<()> {
        let _writer = self.lock_writer();
        let item = self.find(item_id)?;
        let current = self.state.get();

        if !current.is_purchased(item_id) {
            return Err(ShopError::NotPurchased(item_id.to_string()));
        }
        if !item.kind.is_equippable() {
            return Err(ShopError::NotEquippable(item_id.to_string()));
        }

        let mut next = (*current).clone();
        next.equipped_overlay_id = if current.is_equipped(item_id) {
            None
        } else {
            Some(item.id.clone())
        };
        next.active_multiplier = multiplier_for(next.equipped_overlay_id.as_deref());
        self.commit(next);

        match &self.state.get().equipped_overlay_id {
            Some(id) => log::info!("Equipped {id}"),
            None => log::info!("Unequipped {item_id}"),
        }
        Ok(())
    }

    /// Wipe the saved game and return to the default state
    pub fn reset_game(&self) {
        let _writer = self.lock_writer();
        self.saver.clear();
        self.state.publish(GameState::default());
        log::info!("Game reset");
    }

    /// Wait for queued saves to reach storage
    pub fn flush(&self) {
        self.saver.flush();
    }

    fn find(&self, item_id: &str) -> error::Result<&CatalogItem> {
        self.catalog
            .find_by_id(item_id)
            .ok_or_else(|| ShopError::UnknownItem(item_id.to_string()))
    }

    fn commit(&self, next: GameState) {
        let published = self.state.publish(next);
        self.saver.write(persistence::encode(&published));
    }

    fn lock_writer(&self) -> MutexGuard<'_, Box<dyn DiceRoller>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
