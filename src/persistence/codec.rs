//! Flat key-value encoding of `GameState`
//!
//! | key               | encoding                  | default |
//! |-------------------|---------------------------|---------|
//! | total_points      | decimal                   | 0       |
//! | last_roll_values  | comma-separated faces     | "6"     |
//! | number_of_dice    | decimal                   | 1       |
//! | active_multiplier | decimal                   | 1       |
//! | purchased_items   | JSON array of ids         | []      |
//! | equipped_overlay  | id, absent when none      | absent  |
//!
//! Every key falls back to its default on its own. Derived fields are
//! recomputed on decode, so a loaded state always satisfies the game
//! invariants even if the stored record does not.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Catalog, ItemKind};
use crate::game::rules::{DEFAULT_FACE, is_valid_face, multiplier_for};
use crate::game::state::GameState;

pub const KEY_TOTAL_POINTS: &str = "total_points";
pub const KEY_LAST_ROLL_VALUES: &str = "last_roll_values";
pub const KEY_NUMBER_OF_DICE: &str = "number_of_dice";
pub const KEY_ACTIVE_MULTIPLIER: &str = "active_multiplier";
pub const KEY_PURCHASED_ITEMS: &str = "purchased_items";
pub const KEY_EQUIPPED_OVERLAY: &str = "equipped_overlay";

/// Every key the layout uses
pub const ALL_KEYS: [&str; 6] = [
    KEY_TOTAL_POINTS,
    KEY_LAST_ROLL_VALUES,
    KEY_NUMBER_OF_DICE,
    KEY_ACTIVE_MULTIPLIER,
    KEY_PURCHASED_ITEMS,
    KEY_EQUIPPED_OVERLAY,
];

/// One saved game, key -> encoded value
pub type Record = BTreeMap<String, String>;

/// Flatten a state into a record
pub fn encode(state: &GameState) -> Record {
    let mut record = Record::new();
    record.insert(KEY_TOTAL_POINTS.into(), state.total_points.to_string());
    record.insert(
        KEY_LAST_ROLL_VALUES.into(),
        state
            .last_roll_values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(","),
    );
    record.insert(KEY_NUMBER_OF_DICE.into(), state.number_of_dice.to_string());
    record.insert(
        KEY_ACTIVE_MULTIPLIER.into(),
        state.active_multiplier.to_string(),
    );
    // BTreeSet serializes to a sorted array; this can't fail for strings
    let purchased =
        serde_json::to_string(&state.purchased_item_ids).unwrap_or_else(|_| "[]".into());
    record.insert(KEY_PURCHASED_ITEMS.into(), purchased);
    if let Some(id) = &state.equipped_overlay_id {
        record.insert(KEY_EQUIPPED_OVERLAY.into(), id.clone());
    }
    record
}

/// Rebuild a state from a record, falling back and repairing as needed
pub fn decode(record: &Record, catalog: &Catalog) -> GameState {
    let defaults = GameState::default();

    let total_points = parse_number(record, KEY_TOTAL_POINTS).unwrap_or(defaults.total_points);
    let last_roll_values = record
        .get(KEY_LAST_ROLL_VALUES)
        .map(|raw| parse_faces(raw))
        .unwrap_or_default();
    let last_roll_values = if last_roll_values.is_empty() {
        vec![DEFAULT_FACE]
    } else {
        last_roll_values
    };

    let mut purchased_item_ids = parse_purchased(record);
    let unknown: Vec<String> = purchased_item_ids
        .iter()
        .filter(|id| catalog.find_by_id(id).is_none())
        .cloned()
        .collect();
    for id in unknown {
        log::warn!("Dropping unknown purchased item {id}");
        purchased_item_ids.remove(&id);
    }

    let equipped_overlay_id = record.get(KEY_EQUIPPED_OVERLAY).cloned().filter(|id| {
        let valid = purchased_item_ids.contains(id)
            && catalog.kind_of(id) == Some(ItemKind::Multiplier);
        if !valid {
            log::warn!("Dropping invalid equipped overlay {id}");
        }
        valid
    });

    let mut state = GameState {
        total_points,
        last_roll_values,
        number_of_dice: defaults.number_of_dice,
        active_multiplier: multiplier_for(equipped_overlay_id.as_deref()),
        purchased_item_ids,
        equipped_overlay_id,
    };
    state.number_of_dice = state.expected_dice(catalog);

    if let Some(stored) = parse_number::<u32>(record, KEY_NUMBER_OF_DICE)
        && stored != state.number_of_dice
    {
        log::warn!(
            "Stored number_of_dice {stored} disagrees with purchases, using {}",
            state.number_of_dice
        );
    }
    if let Some(stored) = parse_number::<u32>(record, KEY_ACTIVE_MULTIPLIER)
        && stored != state.active_multiplier
    {
        log::warn!(
            "Stored active_multiplier {stored} disagrees with equipped overlay, using {}",
            state.active_multiplier
        );
    }

    state
}

fn parse_number<T: std::str::FromStr>(record: &Record, key: &str) -> Option<T> {
    let raw = record.get(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparseable {key}: {raw:?}");
            None
        }
    }
}

/// Comma-separated faces; junk and out-of-range entries are skipped
fn parse_faces(raw: &str) -> Vec<u8> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<u8>().ok())
        .filter(|&face| is_valid_face(face))
        .collect()
}

fn parse_purchased(record: &Record) -> BTreeSet<String> {
    let Some(raw) = record.get(KEY_PURCHASED_ITEMS) else {
        return BTreeSet::new();
    };
    match serde_json::from_str(raw) {
        Ok(ids) => ids,
        Err(e) => {
            log::warn!("Ignoring corrupt purchased_items: {e}");
            BTreeSet::new()
        }
    }
}
