//! Game state engine
//!
//! All game rules live here. This module owns the only mutable game state:
//! - Single writer, snapshots replaced wholesale
//! - Every accepted mutation is saved
//! - Rejected shop calls are no-ops
//! - No rendering or platform dependencies

pub mod dice;
pub mod engine;
pub mod error;
pub mod observe;
pub mod rules;
pub mod state;

pub use dice::{DiceRoller, ScriptedRoller, SeededRoller};
pub use engine::{GameEngine, RollOutcome};
pub use error::ShopError;
pub use observe::{Snapshot, StateCell, Subscription};
pub use rules::multiplier_for;
pub use state::GameState;
