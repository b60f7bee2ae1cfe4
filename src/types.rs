use serde::Serialize;

/// Contents of a single square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Dark,
    Light,
}

impl Cell {
    /// Preset / wire code: 0=empty, 1=dark, 2=light.
    pub fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Dark => 1,
            Self::Light => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::Dark),
            2 => Some(Self::Light),
            _ => None,
        }
    }
}

/// One of the two colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Dark,
    Light,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn cell(self) -> Cell {
        match self {
            Self::Dark => Cell::Dark,
            Self::Light => Cell::Light,
        }
    }

    pub fn code(self) -> u8 {
        self.cell().code()
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Dark),
            2 => Some(Self::Light),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Dark => 0,
            Self::Light => 1,
        }
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Row-major square index (0..=63).
    pub fn index(self) -> usize {
        self.row as usize * 8 + self.col as usize
    }
}

/// Stage of the game, derived from the number of pieces on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Early,
    Mid,
    Late,
}

/// Final outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Side),
    Draw,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub board: Vec<u8>,
    pub current_player: u8,
    pub dark_count: u8,
    pub light_count: u8,
    pub is_game_over: bool,
    /// Contract:
    /// - `true` when the previous action was a pass.
    /// - `false` when the previous action was a normal move.
    pub is_pass: bool,
    /// Contract:
    /// - Normal move: placed square followed by flipped squares (0..=63).
    /// - Pass: must be an empty list.
    pub flipped: Vec<u8>,
}

/// Final result after game over. `winner` is 0 on a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub winner: u8,
    pub dark_count: u8,
    pub light_count: u8,
}
