//! Shop catalog
//!
//! Fixed, ordered list of purchasable items. Built once at startup and never
//! mutated; the engine only ever looks items up by id.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What buying (and equipping) an item does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Permanent extra die, applied on purchase
    DiceUpgrade,
    /// Equippable overlay that scales points per roll
    Multiplier,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::DiceUpgrade => "DiceUpgrade",
            ItemKind::Multiplier => "Multiplier",
        }
    }

    /// Whether `equip` has any meaning for this kind
    pub fn is_equippable(&self) -> bool {
        matches!(self, ItemKind::Multiplier)
    }
}

/// A single shop entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable identifier, also the persistence key
    pub id: String,
    /// Display label
    pub name: String,
    /// Price in points (always > 0)
    pub cost: u64,
    /// Opaque asset reference resolved by the presentation layer
    pub image_ref: String,
    pub kind: ItemKind,
}

impl CatalogItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cost: u64,
        image_ref: impl Into<String>,
        kind: ItemKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            image_ref: image_ref.into(),
            kind,
        }
    }
}

/// Catalog construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog must contain at least one item")]
    Empty,

    #[error("duplicate catalog id: {0}")]
    DuplicateId(String),

    #[error("item {0} has zero cost")]
    ZeroCost(String),
}

/// Immutable, ordered item list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists, duplicate ids and free items
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, item) in items.iter().enumerate() {
            if item.cost == 0 {
                return Err(CatalogError::ZeroCost(item.id.clone()));
            }
            if items[..i].iter().any(|other| other.id == item.id) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// The shipped shop: two dice upgrades, two multiplier overlays
    pub fn builtin() -> Self {
        Self {
            items: vec![
                CatalogItem::new(
                    "add_dice_red",
                    "Add a Second Die",
                    100,
                    "red_dice6",
                    ItemKind::DiceUpgrade,
                ),
                CatalogItem::new(
                    "add_dice_blue",
                    "Add a Third Die",
                    500,
                    "blue_dice6",
                    ItemKind::DiceUpgrade,
                ),
                CatalogItem::new(
                    "overlay_party_hat",
                    "Party Hat (x2 Multiplier)",
                    250,
                    "party_hat",
                    ItemKind::Multiplier,
                ),
                CatalogItem::new(
                    "overlay_sunglasses",
                    "Sunglasses (x3 Multiplier)",
                    800,
                    "sunglasses",
                    ItemKind::Multiplier,
                ),
            ],
        }
    }

    /// All items in display order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Exact-match lookup
    pub fn find_by_id(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Kind of the item with this id, if it exists
    pub fn kind_of(&self, id: &str) -> Option<ItemKind> {
        self.find_by_id(id).map(|item| item.kind)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rules::multiplier_for;

    #[test]
    fn test_builtin_is_valid() {
        let builtin = Catalog::builtin();
        let rebuilt = Catalog::new(builtin.items().to_vec()).unwrap();
        assert_eq!(rebuilt, builtin);
        assert_eq!(builtin.len(), 4);
    }

    #[test]
    fn test_find_by_id_exact_match_only() {
        let catalog = Catalog::builtin();
        let hat = catalog.find_by_id("overlay_party_hat").unwrap();
        assert_eq!(hat.cost, 250);
        assert_eq!(hat.kind, ItemKind::Multiplier);

        assert!(catalog.find_by_id("overlay_party").is_none());
        assert!(catalog.find_by_id("OVERLAY_PARTY_HAT").is_none());
        assert!(catalog.find_by_id("").is_none());
    }

    #[test]
    fn test_order_is_stable() {
        let catalog = Catalog::builtin();
        let ids: Vec<&str> = catalog.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            ["add_dice_red", "add_dice_blue", "overlay_party_hat", "overlay_sunglasses"]
        );
        let again: Vec<&str> = catalog.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, again);
    }

    #[test]
    fn test_rejects_invalid_catalogs() {
        assert_eq!(Catalog::new(Vec::new()), Err(CatalogError::Empty));

        let dup = vec![
            CatalogItem::new("a", "A", 10, "a", ItemKind::DiceUpgrade),
            CatalogItem::new("a", "A again", 20, "a", ItemKind::Multiplier),
        ];
        assert_eq!(Catalog::new(dup), Err(CatalogError::DuplicateId("a".into())));

        let free = vec![CatalogItem::new("free", "Free", 0, "f", ItemKind::DiceUpgrade)];
        assert_eq!(Catalog::new(free), Err(CatalogError::ZeroCost("free".into())));
    }

    #[test]
    fn test_every_multiplier_item_has_a_table_entry() {
        for item in Catalog::builtin().items() {
            let value = multiplier_for(Some(&item.id));
            match item.kind {
                ItemKind::Multiplier => assert!(value > 1, "{} has no multiplier", item.id),
                ItemKind::DiceUpgrade => assert_eq!(value, 1),
            }
        }
    }
}
