use serde::Deserialize;

use crate::ai::table::PositionalTable;
use crate::types::Side;

/// How a computer player scores positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Strategy {
    /// Sum of the positional weights under the player's own pieces.
    Static {
        #[serde(default)]
        table: PositionalTable,
    },
    /// Phase-weighted corners, corner-adjacent danger, mobility and piece count.
    #[default]
    Dynamic,
    /// Uniform random legal move; no search.
    Random,
}

/// A participant in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub side: Side,
    pub computer: bool,
    pub strategy: Strategy,
}

impl Player {
    pub fn human(side: Side) -> Self {
        Self {
            side,
            computer: false,
            strategy: Strategy::Dynamic,
        }
    }

    pub fn computer(side: Side, strategy: Strategy) -> Self {
        Self {
            side,
            computer: true,
            strategy,
        }
    }
}
