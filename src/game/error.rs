//! Shop operation errors
//!
//! A rejected purchase or equip leaves the state untouched and saves nothing;
//! the error only tells the caller why.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("no catalog item with id {0}")]
    UnknownItem(String),

    #[error("insufficient points: item costs {cost}, have {available}")]
    InsufficientPoints { cost: u64, available: u64 },

    #[error("item {0} is already purchased")]
    AlreadyPurchased(String),

    #[error("item {0} has not been purchased")]
    NotPurchased(String),

    #[error("item {0} cannot be equipped")]
    NotEquippable(String),
}

impl ShopError {
    /// Lookup miss, as opposed to a failed precondition
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShopError::UnknownItem(_))
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
