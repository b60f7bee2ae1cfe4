use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::ai::search::SearchConfig;
use crate::error::GameError;
use crate::game::{EngineSelector, GameInstance};
use crate::player::{Player, Strategy};
use crate::types::Side;

const DEFAULT_TIME_BUDGET_MS: u64 = 3_000;

static GAME: Lazy<Mutex<Option<GameInstance>>> = Lazy::new(|| Mutex::new(None));

/// Per-side settings accepted by `new_game`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PlayerOptions {
    pub computer: bool,
    pub strategy: Strategy,
}

/// Options accepted by `new_game`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    /// 65-token preset; standard opening when absent.
    pub preset: Option<String>,
    pub dark: PlayerOptions,
    pub light: PlayerOptions,
    pub time_budget_ms: u64,
    pub search: SearchConfig,
    /// Fixed seed for reproducible computer play.
    pub seed: Option<u64>,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            preset: None,
            dark: PlayerOptions::default(),
            light: PlayerOptions {
                computer: true,
                strategy: Strategy::Dynamic,
            },
            time_budget_ms: DEFAULT_TIME_BUDGET_MS,
            search: SearchConfig::default(),
            seed: None,
        }
    }
}

impl GameOptions {
    pub fn build(&self) -> Result<GameInstance, GameError> {
        let budget = Duration::from_millis(self.time_budget_ms);
        let selector = match self.seed {
            Some(seed) => EngineSelector::seeded(budget, self.search, seed),
            None => EngineSelector::from_entropy(budget, self.search),
        };
        let dark = player(Side::Dark, self.dark);
        let light = player(Side::Light, self.light);

        match &self.preset {
            Some(preset) => GameInstance::from_preset(preset, dark, light, Box::new(selector)),
            None => Ok(GameInstance::standard(dark, light, Box::new(selector))),
        }
    }
}

fn player(side: Side, options: PlayerOptions) -> Player {
    if options.computer {
        Player::computer(side, options.strategy)
    } else {
        Player::human(side)
    }
}

/// Routes `log` records to the browser console.
#[wasm_bindgen]
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = console_log::init_with_level(log::Level::Debug);
    }
}

/// Starts a new game, replacing any game in progress. Returns the initial `GameState`.
#[wasm_bindgen]
pub fn new_game(options: JsValue) -> Result<JsValue, JsValue> {
    let options: GameOptions = if options.is_undefined() || options.is_null() {
        GameOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)?
    };

    let game = options.build().map_err(to_js_error)?;
    let state = game.to_game_state();
    *lock_game()? = Some(game);
    to_js(&state)
}

#[wasm_bindgen]
pub fn get_state() -> Result<JsValue, JsValue> {
    with_game(|game| Ok(game.to_game_state()))
}

#[wasm_bindgen]
pub fn get_legal_moves() -> Result<JsValue, JsValue> {
    with_game(|game| Ok(game.get_legal_moves()))
}

#[wasm_bindgen]
pub fn place(row: u8, col: u8) -> Result<JsValue, JsValue> {
    with_game(|game| {
        game.place(row, col)?;
        Ok(game.to_game_state())
    })
}

#[wasm_bindgen]
pub fn pass_turn() -> Result<JsValue, JsValue> {
    with_game(|game| {
        game.pass()?;
        Ok(game.to_game_state())
    })
}

#[wasm_bindgen]
pub fn ai_move() -> Result<JsValue, JsValue> {
    with_game(|game| {
        game.do_ai_move()?;
        Ok(game.to_game_state())
    })
}

#[wasm_bindgen]
pub fn get_result() -> Result<JsValue, JsValue> {
    with_game(|game| Ok(game.to_game_result()))
}

fn with_game<T: Serialize>(
    f: impl FnOnce(&mut GameInstance) -> Result<T, GameError>,
) -> Result<JsValue, JsValue> {
    let mut slot = lock_game()?;
    let game = slot.as_mut().ok_or_else(|| to_js_error(GameError::NoGame))?;
    let value = f(game).map_err(to_js_error)?;
    to_js(&value)
}

fn lock_game() -> Result<MutexGuard<'static, Option<GameInstance>>, JsValue> {
    GAME.lock()
        .map_err(|_| JsValue::from_str("game state lock poisoned"))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn to_js_error(err: GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
