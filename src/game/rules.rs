//! Fixed game rules
//!
//! The multiplier table is code, not catalog data. Every `Multiplier` item in
//! the catalog needs a row here.

/// Faces on a die
pub const DIE_FACES: u8 = 6;

/// Face shown before the first roll
pub const DEFAULT_FACE: u8 = 6;

/// Dice owned before any upgrade
pub const BASE_DICE: u32 = 1;

/// Multiplier with nothing equipped
pub const BASE_MULTIPLIER: u32 = 1;

/// Multiplier granted by an equipped overlay
pub fn multiplier_for(equipped: Option<&str>) -> u32 {
    match equipped {
        Some("overlay_party_hat") => 2,
        Some("overlay_sunglasses") => 3,
        _ => BASE_MULTIPLIER,
    }
}

/// True for a value a six-sided die can show
#[inline]
pub fn is_valid_face(value: u8) -> bool {
    (1..=DIE_FACES).contains(&value)
}
