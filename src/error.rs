use thiserror::Error;

/// Errors raised while parsing a board preset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresetError {
    #[error("preset too short: expected 65 tokens, got {0}")]
    TooShort(usize),
    #[error("preset has trailing tokens after the side-to-move indicator")]
    TrailingTokens,
    #[error("preset token #{index} is not an integer: {token:?}")]
    InvalidToken { index: usize, token: String },
    #[error("preset cell #{index} has invalid code {code} (expected 0, 1 or 2)")]
    InvalidCell { index: usize, code: u8 },
    #[error("preset side-to-move has invalid code {0} (expected 1 or 2)")]
    InvalidSide(u8),
}

/// Errors raised while loading a positional weight table blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("table data too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("invalid table magic (expected RVPT)")]
    BadMagic,
    #[error("unsupported table version: expected {expected}, got {actual}")]
    UnsupportedVersion { expected: u32, actual: u32 },
    #[error("CRC32 mismatch: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch { expected: u32, actual: u32 },
    #[error("table payload must be {expected} bytes, got {actual}")]
    PayloadLength { expected: usize, actual: usize },
}

/// Errors raised by the turn driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("game is already over")]
    GameOver,
    #[error("it is not a human player's turn")]
    NotHumanTurn,
    #[error("it is not a computer player's turn")]
    NotComputerTurn,
    #[error("row/col out of range")]
    OutOfRange,
    #[error("illegal move")]
    IllegalMove,
    #[error("cannot pass while legal moves exist")]
    PassNotAllowed,
    #[error("computer has no legal moves")]
    NoLegalMoves,
    #[error("computer selected an out-of-range move index {0}")]
    BadSelection(usize),
    #[error("no game in progress")]
    NoGame,
    #[error(transparent)]
    Preset(#[from] PresetError),
}
