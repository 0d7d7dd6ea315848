//! JavaScript bindings for a browser presentation layer.
//!
//! Colors cross the boundary as `u8`: 0 empty, 1 first, 2 second.

use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::game::Game;
use crate::types::Color;

#[wasm_bindgen(js_name = wasmReady)]
pub fn wasm_ready() -> bool {
    true
}

#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    #[wasm_bindgen(constructor)]
    pub fn new(size: usize) -> Result<WasmGame, JsValue> {
        Game::new(size).map(|inner| Self { inner }).map_err(to_js_error)
    }

    /// Builds a game from a `{ size }` config object; missing fields use defaults.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config: JsValue) -> Result<WasmGame, JsValue> {
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Game::with_config(&config)
            .map(|inner| Self { inner })
            .map_err(to_js_error)
    }

    pub fn size(&self) -> usize {
        self.inner.size()
    }

    #[wasm_bindgen(js_name = currentPlayer)]
    pub fn current_player(&self) -> u8 {
        self.inner.current_player() as u8
    }

    #[wasm_bindgen(js_name = nNextMoves)]
    pub fn n_next_moves(&self) -> usize {
        self.inner.n_next_moves()
    }

    pub fn ended(&self) -> bool {
        self.inner.ended()
    }

    /// Cell color, 0 when off the board.
    pub fn cell(&self, row: usize, col: usize) -> u8 {
        self.inner.cell(row, col).unwrap_or_default() as u8
    }

    #[wasm_bindgen(js_name = isValidMove)]
    pub fn is_valid_move(&self, row: usize, col: usize, color: u8) -> bool {
        Color::from_u8(color).is_some_and(|color| self.inner.is_valid_move(row, col, color))
    }

    /// `[first, second]` piece counts.
    #[wasm_bindgen(js_name = chessCount)]
    pub fn chess_count(&self) -> Vec<u32> {
        let count = self.inner.piece_count();
        vec![count.first, count.second]
    }

    pub fn play(&mut self, row: usize, col: usize) -> bool {
        self.inner.play(row, col)
    }

    #[wasm_bindgen(js_name = skipPlay)]
    pub fn skip_play(&mut self) -> bool {
        self.inner.skip_play()
    }

    /// Snapshot as a plain JS object.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.state())?)
    }

    /// Board rendered one row per line.
    #[wasm_bindgen(js_name = toString)]
    pub fn render(&self) -> String {
        self.inner.board().to_string()
    }

    /// `callback(color)` on every future change of the cell.
    #[wasm_bindgen(js_name = addChessCallback)]
    pub fn add_chess_callback(&mut self, row: usize, col: usize, callback: Function) -> bool {
        self.inner
            .add_cell_listener(row, col, move |color| {
                call_with(&callback, JsValue::from(*color as u8))
            })
            .is_some()
    }

    /// `callback(valid)` on every future legal/illegal transition.
    #[wasm_bindgen(js_name = addValidCallback)]
    pub fn add_valid_callback(
        &mut self,
        row: usize,
        col: usize,
        color: u8,
        callback: Function,
    ) -> bool {
        let Some(color) = Color::from_u8(color) else {
            return false;
        };
        self.inner
            .add_validity_listener(row, col, color, move |valid| {
                call_with(&callback, JsValue::from(*valid))
            })
            .is_some()
    }

    #[wasm_bindgen(js_name = addCurrentPlayerCallback)]
    pub fn add_current_player_callback(&mut self, callback: Function) {
        self.inner.add_turn_listener(move |color| {
            call_with(&callback, JsValue::from(*color as u8))
        });
    }

    /// `callback([first, second])` after every successful play.
    #[wasm_bindgen(js_name = addCountCallback)]
    pub fn add_count_callback(&mut self, callback: Function) {
        self.inner.add_count_listener(move |count| {
            let counts = js_sys::Array::of2(&count.first.into(), &count.second.into());
            call_with(&callback, counts.into())
        });
    }
}

fn call_with(callback: &Function, value: JsValue) {
    if let Err(err) = callback.call1(&JsValue::NULL, &value) {
        tracing::warn!(?err, "javascript callback threw");
    }
}

fn to_js_error(err: crate::error::GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
