use crate::ai::table::PositionalTable;
use crate::board::Board;
use crate::types::{Cell, Phase, Position, Side};

pub type Score = i32;

/// Terminal win for the searching player. No heuristic score reaches it.
pub const SCORE_MAX: Score = i32::MAX;
/// Terminal loss for the searching player.
pub const SCORE_MIN: Score = i32::MIN;

const CORNERS: [Position; 4] = [
    Position::new(0, 0),
    Position::new(0, 7),
    Position::new(7, 0),
    Position::new(7, 7),
];
/// Squares touching each corner, in `CORNERS` order.
const CORNER_NEIGHBORS: [[Position; 3]; 4] = [
    [Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)],
    [Position::new(0, 6), Position::new(1, 6), Position::new(1, 7)],
    [Position::new(6, 0), Position::new(6, 1), Position::new(7, 1)],
    [Position::new(6, 6), Position::new(6, 7), Position::new(7, 6)],
];

/// Scores a position from a fixed player's perspective.
pub trait Evaluator {
    fn evaluate(&self, board: &Board, side: Side) -> Score;
}

/// Sums the positional weights under `side`'s pieces. The opponent is ignored.
#[derive(Debug, Clone, Copy)]
pub struct StaticEvaluator {
    table: PositionalTable,
}

impl StaticEvaluator {
    pub fn new(table: PositionalTable) -> Self {
        Self { table }
    }
}

impl Evaluator for StaticEvaluator {
    fn evaluate(&self, board: &Board, side: Side) -> Score {
        let sum = board
            .pieces(side)
            .iter()
            .fold(0i32, |acc, &pos| acc.saturating_add(self.table.weight(pos)));
        sum.clamp(SCORE_MIN + 1, SCORE_MAX - 1)
    }
}

/// Feature coefficients for one game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWeights {
    pub corner: i32,
    pub stability: i32,
    pub mobility: i32,
    pub piece_diff: i32,
}

/// Phase-dependent linear combination of four normalized features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicEvaluator {
    pub early: PhaseWeights,
    pub mid: PhaseWeights,
    pub late: PhaseWeights,
}

impl DynamicEvaluator {
    pub fn weights(&self, phase: Phase) -> PhaseWeights {
        match phase {
            Phase::Early => self.early,
            Phase::Mid => self.mid,
            Phase::Late => self.late,
        }
    }
}

impl Default for DynamicEvaluator {
    fn default() -> Self {
        Self {
            // Piece count is a liability while the board is still open.
            early: PhaseWeights {
                corner: 20,
                stability: 5,
                mobility: 6,
                piece_diff: -1,
            },
            mid: PhaseWeights {
                corner: 20,
                stability: 5,
                mobility: 6,
                piece_diff: 0,
            },
            late: PhaseWeights {
                corner: 20,
                stability: 5,
                mobility: 4,
                piece_diff: 10,
            },
        }
    }
}

impl Evaluator for DynamicEvaluator {
    fn evaluate(&self, board: &Board, side: Side) -> Score {
        let w = self.weights(board.game_phase());
        let mut score = w.corner * corner_score(board, side)
            + w.stability * stability_score(board, side)
            + w.mobility * mobility_score(board, side);
        if w.piece_diff != 0 {
            score += w.piece_diff * piece_diff_score(board, side);
        }
        score
    }
}

/// Corners owned by `side` versus the opponent.
pub fn corner_score(board: &Board, side: Side) -> i32 {
    let (mine, opp) = tally(board, side, CORNERS.iter().copied());
    normalize(mine, opp)
}

/// Pieces next to still-empty corners, negated: owning them hands the corner away.
pub fn stability_score(board: &Board, side: Side) -> i32 {
    let squares = CORNERS
        .iter()
        .zip(CORNER_NEIGHBORS.iter())
        .filter(|(corner, _)| board.cell(**corner) == Cell::Empty)
        .flat_map(|(_, neighbors)| neighbors.iter().copied());
    let (mine, opp) = tally(board, side, squares);
    -normalize(mine, opp)
}

/// Legal move count of `side` versus the opponent.
pub fn mobility_score(board: &Board, side: Side) -> i32 {
    let mine = board.find_legal_moves(side).len() as i32;
    let opp = board.find_legal_moves(side.opponent()).len() as i32;
    normalize(mine, opp)
}

/// Piece count differential. Zero on an empty board.
pub fn piece_diff_score(board: &Board, side: Side) -> i32 {
    let mine = board.pieces(side).len() as i32;
    let opp = board.pieces(side.opponent()).len() as i32;
    (100 * (mine - opp)).checked_div(mine + opp).unwrap_or(0)
}

fn tally(board: &Board, side: Side, squares: impl Iterator<Item = Position>) -> (i32, i32) {
    let own = side.cell();
    let theirs = side.opponent().cell();
    squares.fold((0, 0), |(mine, opp), pos| match board.cell(pos) {
        cell if cell == own => (mine + 1, opp),
        cell if cell == theirs => (mine, opp + 1),
        _ => (mine, opp),
    })
}

fn normalize(mine: i32, opp: i32) -> i32 {
    100 * (mine - opp) / (mine + opp + 1)
}
