//! Dice Roller entry point
//!
//! Native: headless session against the file save. Web: the page drives
//! `dice_roller::web::DiceGame`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Dice Roller starting...");
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dice_roller::{GameEngine, Settings};

    env_logger::init();
    log::info!("Dice Roller (native) starting...");

    let settings = Settings::load();
    let engine = GameEngine::from_settings(&settings);
    log::info!("Save file: {}", settings.save_path().display());

    for entry in engine.shop() {
        log::info!(
            "  {:<28} {:>5} pts  [{}]",
            entry.item.name,
            entry.item.cost,
            entry.status.label()
        );
    }

    let outcome = engine.roll_dice();
    let state = engine.current_state();
    println!(
        "Rolled {:?} (x{}) for {} points, total {}",
        outcome.values, outcome.multiplier, outcome.points_gained, state.total_points
    );

    engine.flush();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
