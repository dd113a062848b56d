//! Game state snapshot
//!
//! A `GameState` is never edited in place once published. The engine builds
//! the next snapshot from the current one and swaps it in whole.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::rules::{BASE_DICE, BASE_MULTIPLIER, DEFAULT_FACE, multiplier_for};
use crate::catalog::{Catalog, ItemKind};

/// Complete persisted game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Spendable points
    pub total_points: u64,
    /// Faces from the most recent roll, in draw order
    pub last_roll_values: Vec<u8>,
    /// Dice rolled per turn
    pub number_of_dice: u32,
    /// Derived from `equipped_overlay_id`, never set on its own
    pub active_multiplier: u32,
    /// Every item ever bought
    pub purchased_item_ids: BTreeSet<String>,
    /// Currently equipped multiplier overlay
    pub equipped_overlay_id: Option<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            total_points: 0,
            last_roll_values: vec![DEFAULT_FACE],
            number_of_dice: BASE_DICE,
            active_multiplier: BASE_MULTIPLIER,
            purchased_item_ids: BTreeSet::new(),
            equipped_overlay_id: None,
        }
    }
}

impl GameState {
    pub fn is_purchased(&self, id: &str) -> bool {
        self.purchased_item_ids.contains(id)
    }

    pub fn is_equipped(&self, id: &str) -> bool {
        self.equipped_overlay_id.as_deref() == Some(id)
    }

    /// Dice count implied by the purchases
    pub fn expected_dice(&self, catalog: &Catalog) -> u32 {
        let upgrades = self
            .purchased_item_ids
            .iter()
            .filter(|id| catalog.kind_of(id) == Some(ItemKind::DiceUpgrade))
            .count() as u32;
        BASE_DICE + upgrades
    }

    /// Describe every broken invariant (empty when consistent)
    pub fn violations(&self, catalog: &Catalog) -> Vec<String> {
        let mut problems = Vec::new();

        if self.active_multiplier != multiplier_for(self.equipped_overlay_id.as_deref()) {
            problems.push(format!(
                "multiplier {} does not match equipped overlay {:?}",
                self.active_multiplier, self.equipped_overlay_id
            ));
        }

        if let Some(id) = &self.equipped_overlay_id {
            if !self.is_purchased(id) {
                problems.push(format!("equipped overlay {id} was never purchased"));
            }
            if catalog.kind_of(id) != Some(ItemKind::Multiplier) {
                problems.push(format!("equipped overlay {id} is not a multiplier item"));
            }
        }

        let expected = self.expected_dice(catalog);
        if self.number_of_dice != expected {
            problems.push(format!(
                "number_of_dice {} but purchases imply {}",
                self.number_of_dice, expected
            ));
        }

        problems
    }

    pub fn is_consistent(&self, catalog: &Catalog) -> bool {
        self.violations(catalog).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = GameState::default();
        assert_eq!(state.total_points, 0);
        assert_eq!(state.last_roll_values, vec![6]);
        assert_eq!(state.number_of_dice, 1);
        assert_eq!(state.active_multiplier, 1);
        assert!(state.purchased_item_ids.is_empty());
        assert!(state.equipped_overlay_id.is_none());
        assert!(state.is_consistent(&Catalog::builtin()));
    }

    #[test]
    fn test_violations_reported() {
        let catalog = Catalog::builtin();
        let state = GameState {
            active_multiplier: 3,
            equipped_overlay_id: Some("add_dice_red".into()),
            number_of_dice: 2,
            ..Default::default()
        };
        let problems = state.violations(&catalog);
        // multiplier mismatch, not purchased, not a multiplier, dice count
        assert_eq!(problems.len(), 4, "{problems:?}");
    }
}
