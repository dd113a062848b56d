//! Browser bindings
//!
//! Thin `wasm_bindgen` facade over `GameEngine` for a JS presentation layer.
//! Snapshots cross the boundary as JSON strings.

use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::game::GameEngine;
use crate::settings::Settings;

#[wasm_bindgen]
pub struct DiceGame {
    engine: GameEngine,
    listeners: Vec<Function>,
}

#[wasm_bindgen]
impl DiceGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> DiceGame {
        let settings = Settings::load();
        DiceGame {
            engine: GameEngine::from_settings(&settings),
            listeners: Vec::new(),
        }
    }

    /// Current state as JSON
    pub fn state(&self) -> String {
        serde_json::to_string(&*self.engine.current_state()).unwrap_or_default()
    }

    /// Catalog items as a JSON array
    pub fn catalog(&self) -> String {
        serde_json::to_string(self.engine.list_catalog()).unwrap_or_default()
    }

    /// Shop entries with statuses as a JSON array
    pub fn shop(&self) -> String {
        serde_json::to_string(&self.engine.shop()).unwrap_or_default()
    }

    #[wasm_bindgen(js_name = overlayImage)]
    pub fn overlay_image(&self) -> Option<String> {
        self.engine.overlay_image()
    }

    /// Register a callback taking the state JSON; it fires now and on every change
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: Function) {
        call_listener(&callback, &JsValue::from_str(&self.state()));
        self.listeners.push(callback);
    }

    /// Roll and return the outcome as JSON
    pub fn roll(&mut self) -> String {
        let outcome = self.engine.roll_dice();
        self.notify();
        serde_json::to_string(&outcome).unwrap_or_default()
    }

    /// Returns an error message, or `None` on success
    pub fn purchase(&mut self, item_id: &str) -> Option<String> {
        let result = self.engine.purchase(item_id);
        if result.is_ok() {
            self.notify();
        }
        result.err().map(|e| e.to_string())
    }

    /// Returns an error message, or `None` on success
    pub fn equip(&mut self, item_id: &str) -> Option<String> {
        let result = self.engine.equip(item_id);
        if result.is_ok() {
            self.notify();
        }
        result.err().map(|e| e.to_string())
    }

    pub fn reset(&mut self) {
        self.engine.reset_game();
        self.notify();
    }

    fn notify(&self) {
        let state = JsValue::from_str(&self.state());
        for listener in &self.listeners {
            call_listener(listener, &state);
        }
    }
}

fn call_listener(listener: &Function, state: &JsValue) {
    if let Err(e) = listener.call1(&JsValue::NULL, state) {
        log::warn!("State listener threw: {e:?}");
    }
}

impl Default for DiceGame {
    fn default() -> Self {
        Self::new()
    }
}
