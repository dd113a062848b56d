//! Shop listing
//!
//! Read-only view combining the catalog with a state snapshot, so a shop
//! screen can pick the right button for each item without game logic.

use serde::Serialize;

use crate::catalog::{Catalog, CatalogItem, ItemKind};
use crate::game::GameState;

/// What the shop can offer for an item right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemStatus {
    /// Not owned yet
    ForSale { affordable: bool },
    /// Dice upgrade already applied, nothing left to do
    Purchased,
    /// Multiplier owned but not active
    Owned,
    /// Multiplier currently active (selecting it again unequips)
    Equipped,
}

impl ItemStatus {
    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::ForSale { .. } => "Buy",
            ItemStatus::Purchased => "Purchased",
            ItemStatus::Owned => "Equip",
            ItemStatus::Equipped => "Equipped",
        }
    }

    /// Whether the button does anything
    pub fn is_actionable(&self) -> bool {
        match self {
            ItemStatus::ForSale { affordable } => *affordable,
            ItemStatus::Purchased => false,
            ItemStatus::Owned | ItemStatus::Equipped => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopEntry<'a> {
    pub item: &'a CatalogItem,
    pub status: ItemStatus,
}

/// Status of a single item for the given state
pub fn status_of(item: &CatalogItem, state: &GameState) -> ItemStatus {
    if !state.is_purchased(&item.id) {
        return ItemStatus::ForSale {
            affordable: state.total_points >= item.cost,
        };
    }
    match item.kind {
        ItemKind::DiceUpgrade => ItemStatus::Purchased,
        ItemKind::Multiplier if state.is_equipped(&item.id) => ItemStatus::Equipped,
        ItemKind::Multiplier => ItemStatus::Owned,
    }
}

/// Every catalog item, in catalog order, with its status
pub fn entries<'a>(catalog: &'a Catalog, state: &GameState) -> Vec<ShopEntry<'a>> {
    catalog
        .items()
        .iter()
        .map(|item| ShopEntry {
            item,
            status: status_of(item, state),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(state: &GameState) -> Vec<ItemStatus> {
        entries(&Catalog::builtin(), state)
            .into_iter()
            .map(|e| e.status)
            .collect()
    }

    #[test]
    fn test_fresh_game_nothing_affordable() {
        let all_locked = vec![ItemStatus::ForSale { affordable: false }; 4];
        assert_eq!(statuses(&GameState::default()), all_locked);
    }

    #[test]
    fn test_affordability_boundary() {
        let state = GameState {
            total_points: 250,
            ..Default::default()
        };
        assert_eq!(
            statuses(&state),
            vec![
                ItemStatus::ForSale { affordable: true },
                ItemStatus::ForSale { affordable: false },
                ItemStatus::ForSale { affordable: true },
                ItemStatus::ForSale { affordable: false },
            ]
        );
    }

    #[test]
    fn test_owned_items() {
        let state = GameState {
            number_of_dice: 2,
            active_multiplier: 3,
            purchased_item_ids: ["add_dice_red", "overlay_party_hat", "overlay_sunglasses"]
                .into_iter()
                .map(String::from)
                .collect(),
            equipped_overlay_id: Some("overlay_sunglasses".into()),
            ..Default::default()
        };
        let got = statuses(&state);
        assert_eq!(
            got,
            vec![
                ItemStatus::Purchased,
                ItemStatus::ForSale { affordable: false },
                ItemStatus::Owned,
                ItemStatus::Equipped,
            ]
        );
        let labels: Vec<&str> = got.iter().map(|s| s.label()).collect();
        assert_eq!(labels, ["Purchased", "Buy", "Equip", "Equipped"]);
        assert!(!got[0].is_actionable());
        assert!(!got[1].is_actionable());
        assert!(got[3].is_actionable());
    }
}
