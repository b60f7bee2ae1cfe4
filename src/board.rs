use crate::error::PresetError;
use crate::types::{Cell, Outcome, Phase, Position, Side};

const BOARD_SIZE: usize = 8;
const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
const PRESET_TOKENS: usize = NUM_SQUARES + 1;
const EARLY_GAME_PIECES: usize = 20;
const MID_GAME_PIECES: usize = 50;
/// Neighbor offsets. The order is part of the move-ordering contract.
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A legal move: the placed square followed by every square it captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    flips: Vec<Position>,
}

impl Move {
    /// Square the new piece is placed on.
    pub fn position(&self) -> Position {
        self.flips[0]
    }

    /// Origin first, then captured squares in direction order.
    pub fn flip_set(&self) -> &[Position] {
        &self.flips
    }
}

/// Reversi board state: the grid plus per-color piece lists derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Cell; BOARD_SIZE]; BOARD_SIZE],
    dark: Vec<Position>,
    light: Vec<Position>,
}

impl Board {
    /// Creates the initial board:
    /// d4=light, e4=dark, d5=dark, e5=light.
    pub fn new() -> Self {
        let mut squares = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
        squares[3][3] = Cell::Light;
        squares[4][4] = Cell::Light;
        squares[3][4] = Cell::Dark;
        squares[4][3] = Cell::Dark;
        Self::from_squares(squares)
    }

    /// Builds a board from row-major cells.
    pub fn from_cells(cells: [Cell; NUM_SQUARES]) -> Self {
        let mut squares = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
        for (idx, cell) in cells.into_iter().enumerate() {
            squares[idx / BOARD_SIZE][idx % BOARD_SIZE] = cell;
        }
        Self::from_squares(squares)
    }

    /// Parses a preset: 64 cell codes in row-major order followed by the side to move.
    pub fn from_preset(text: &str) -> Result<(Self, Side), PresetError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < PRESET_TOKENS {
            return Err(PresetError::TooShort(tokens.len()));
        }
        if tokens.len() > PRESET_TOKENS {
            return Err(PresetError::TrailingTokens);
        }

        let mut codes = [0u8; PRESET_TOKENS];
        for (index, (token, code)) in tokens.iter().zip(codes.iter_mut()).enumerate() {
            *code = token.parse().map_err(|_| PresetError::InvalidToken {
                index,
                token: token.to_string(),
            })?;
        }

        let mut cells = [Cell::Empty; NUM_SQUARES];
        for (index, cell) in cells.iter_mut().enumerate() {
            *cell = Cell::from_code(codes[index]).ok_or(PresetError::InvalidCell {
                index,
                code: codes[index],
            })?;
        }
        let side = Side::from_code(codes[NUM_SQUARES])
            .ok_or(PresetError::InvalidSide(codes[NUM_SQUARES]))?;

        Ok((Self::from_cells(cells), side))
    }

    pub fn cell(&self, pos: Position) -> Cell {
        self.squares[pos.row as usize][pos.col as usize]
    }

    /// Pieces of `side` in row-major order.
    pub fn pieces(&self, side: Side) -> &[Position] {
        match side {
            Side::Dark => &self.dark,
            Side::Light => &self.light,
        }
    }

    /// Returns every square that becomes `side` if it plays at `origin`.
    /// The first element is always `origin`; a length of 1 means the move captures nothing.
    pub fn compute_flip_set(&self, origin: Position, side: Side) -> Vec<Position> {
        let own = side.cell();
        let opp = side.opponent().cell();
        let mut flips = vec![origin];
        let mut line = Vec::with_capacity(BOARD_SIZE);

        for (dr, dc) in DIRECTIONS {
            line.clear();
            let mut r = origin.row as i32 + dr;
            let mut c = origin.col as i32 + dc;

            while in_bounds(r, c) {
                let square = self.squares[r as usize][c as usize];
                if square == opp {
                    line.push(Position::new(r as u8, c as u8));
                } else {
                    if square == own {
                        flips.extend_from_slice(&line);
                    }
                    break;
                }

                r += dr;
                c += dc;
            }
        }

        flips
    }

    /// Returns the legal move of `side` at `pos`, if any.
    pub fn legal_move(&self, pos: Position, side: Side) -> Option<Move> {
        if pos.row as usize >= BOARD_SIZE
            || pos.col as usize >= BOARD_SIZE
            || self.cell(pos) != Cell::Empty
        {
            return None;
        }
        let flips = self.compute_flip_set(pos, side);
        (flips.len() > 1).then_some(Move { flips })
    }

    /// Returns legal moves for `side` in canonical order: opponent pieces in
    /// row-major order, then their empty neighbors in direction order.
    pub fn find_legal_moves(&self, side: Side) -> Vec<Move> {
        let mut checked = 0u64;
        let mut moves = Vec::new();

        for &piece in self.pieces(side.opponent()) {
            for (dr, dc) in DIRECTIONS {
                let r = piece.row as i32 + dr;
                let c = piece.col as i32 + dc;
                if !in_bounds(r, c) {
                    continue;
                }

                let candidate = Position::new(r as u8, c as u8);
                let mask = 1u64 << candidate.index();
                if (checked & mask) != 0 || self.cell(candidate) != Cell::Empty {
                    continue;
                }
                checked |= mask;

                let flips = self.compute_flip_set(candidate, side);
                if flips.len() > 1 {
                    moves.push(Move { flips });
                }
            }
        }

        moves
    }

    /// Sets every square in `flips` to `side` and refreshes the piece lists.
    pub fn place(&mut self, flips: &[Position], side: Side) {
        let own = side.cell();
        for pos in flips {
            self.squares[pos.row as usize][pos.col as usize] = own;
        }
        self.refresh();
    }

    pub fn apply(&mut self, mv: &Move, side: Side) {
        self.place(mv.flip_set(), side);
    }

    /// Reverts `apply(mv, side)`: empties the origin and hands the captures back.
    pub fn undo(&mut self, mv: &Move, side: Side) {
        let (origin, captured) = mv.flips.split_at(1);
        let opp = side.opponent().cell();
        for pos in captured {
            self.squares[pos.row as usize][pos.col as usize] = opp;
        }
        self.squares[origin[0].row as usize][origin[0].col as usize] = Cell::Empty;
        self.refresh();
    }

    /// Returns the outcome once neither side has a legal move.
    pub fn check_game_over(&self) -> Option<Outcome> {
        if !self.find_legal_moves(Side::Dark).is_empty()
            || !self.find_legal_moves(Side::Light).is_empty()
        {
            return None;
        }
        Some(self.outcome())
    }

    /// Majority color, regardless of whether play could continue.
    pub fn outcome(&self) -> Outcome {
        match self.dark.len().cmp(&self.light.len()) {
            std::cmp::Ordering::Greater => Outcome::Winner(Side::Dark),
            std::cmp::Ordering::Less => Outcome::Winner(Side::Light),
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    pub fn game_phase(&self) -> Phase {
        let total = self.dark.len() + self.light.len();
        if total < EARLY_GAME_PIECES {
            Phase::Early
        } else if total < MID_GAME_PIECES {
            Phase::Mid
        } else {
            Phase::Late
        }
    }

    /// Returns `(dark_count, light_count)`.
    pub fn count(&self) -> (u8, u8) {
        (self.dark.len() as u8, self.light.len() as u8)
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        (NUM_SQUARES - self.dark.len() - self.light.len()) as u8
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=dark, 2=light.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (pos, cell) in board.iter_mut().enumerate() {
            *cell = self.squares[pos / BOARD_SIZE][pos % BOARD_SIZE].code();
        }
        board
    }

    fn from_squares(squares: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        let mut board = Self {
            squares,
            dark: Vec::new(),
            light: Vec::new(),
        };
        board.refresh();
        board
    }

    fn refresh(&mut self) {
        self.dark.clear();
        self.light.clear();
        for (r, row) in self.squares.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let pos = Position::new(r as u8, c as u8);
                match cell {
                    Cell::Dark => self.dark.push(pos),
                    Cell::Light => self.light.push(pos),
                    Cell::Empty => {}
                }
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn board_with(dark: &[(u8, u8)], light: &[(u8, u8)]) -> Board {
        let mut cells = [Cell::Empty; NUM_SQUARES];
        for &(r, c) in dark {
            cells[pos(r, c).index()] = Cell::Dark;
        }
        for &(r, c) in light {
            cells[pos(r, c).index()] = Cell::Light;
        }
        Board::from_cells(cells)
    }

    #[test]
    fn initial_dark_legal_moves_are_four_single_captures() {
        let board = Board::new();

        let moves = board.find_legal_moves(Side::Dark);
        let squares: Vec<Position> = moves.iter().map(Move::position).collect();

        assert_eq!(squares, vec![pos(2, 3), pos(3, 2), pos(4, 5), pos(5, 4)]);
        assert!(moves.iter().all(|mv| mv.flip_set().len() == 2));
    }

    #[test]
    fn light_reply_after_opening_has_three_single_captures() {
        let mut board = Board::new();
        let opening = board.find_legal_moves(Side::Dark);
        board.apply(&opening[0], Side::Dark);

        let replies = board.find_legal_moves(Side::Light);
        let squares: Vec<Position> = replies.iter().map(Move::position).collect();

        assert_eq!(squares, vec![pos(2, 2), pos(2, 4), pos(4, 2)]);
        assert!(replies.iter().all(|mv| mv.flip_set().len() == 2));
    }

    #[test]
    fn flip_set_collects_bracketed_run_along_a_row() {
        let board = board_with(&[(4, 3)], &[(4, 4), (4, 5)]);

        let flips = board.compute_flip_set(pos(4, 6), Side::Dark);

        assert_eq!(flips, vec![pos(4, 6), pos(4, 5), pos(4, 4)]);
    }

    #[test]
    fn flip_set_discards_runs_ending_at_edge_or_empty() {
        let edge = board_with(&[], &[(0, 1), (0, 2)]);
        assert_eq!(edge.compute_flip_set(pos(0, 0), Side::Dark), vec![pos(0, 0)]);

        let gap = board_with(&[(0, 4)], &[(0, 1), (0, 2)]);
        assert_eq!(gap.compute_flip_set(pos(0, 0), Side::Dark), vec![pos(0, 0)]);
        assert!(gap.legal_move(pos(0, 0), Side::Dark).is_none());
    }

    #[test]
    fn flip_set_starts_with_origin_for_every_square() {
        let board = Board::new();
        for idx in 0..NUM_SQUARES {
            let origin = pos((idx / BOARD_SIZE) as u8, (idx % BOARD_SIZE) as u8);
            for side in [Side::Dark, Side::Light] {
                let flips = board.compute_flip_set(origin, side);
                assert_eq!(flips[0], origin);
                let legal = board.cell(origin) == Cell::Empty
                    && board
                        .find_legal_moves(side)
                        .iter()
                        .any(|mv| mv.position() == origin);
                if board.cell(origin) == Cell::Empty {
                    assert_eq!(flips.len() > 1, legal);
                }
            }
        }
    }

    #[test]
    fn place_flips_captured_pieces_and_refreshes_lists() {
        let mut board = Board::new();
        let mv = board.legal_move(pos(2, 3), Side::Dark).unwrap();

        board.apply(&mv, Side::Dark);

        assert_eq!(board.count(), (4, 1));
        assert_eq!(board.empty_count(), 59);
        assert_eq!(
            board.pieces(Side::Dark),
            &[pos(2, 3), pos(3, 3), pos(3, 4), pos(4, 3)]
        );
        assert_eq!(board.pieces(Side::Light), &[pos(4, 4)]);
        let cells = board.to_array();
        assert_eq!(cells[pos(3, 3).index()], 1);
        assert_eq!(cells[pos(4, 4).index()], 2);
    }

    #[test]
    fn undo_restores_the_exact_prior_board() {
        let mut board = board_with(&[(4, 3), (2, 6)], &[(4, 4), (4, 5), (3, 6)]);
        let before = board.clone();
        let mv = board.legal_move(pos(4, 6), Side::Dark).unwrap();
        assert_eq!(mv.flip_set().len(), 4);

        board.apply(&mv, Side::Dark);
        assert_ne!(board, before);
        board.undo(&mv, Side::Dark);

        assert_eq!(board, before);
    }

    #[test]
    fn piece_count_grows_by_one_per_move_over_a_random_game() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut board = Board::new();
        let mut side = Side::Dark;

        while board.check_game_over().is_none() {
            let moves = board.find_legal_moves(side);
            if let Some(mv) = moves.choose(&mut rng) {
                let (d, l) = board.count();
                board.apply(mv, side);
                let (nd, nl) = board.count();
                assert_eq!(nd as usize + nl as usize, d as usize + l as usize + 1);
                for s in [Side::Dark, Side::Light] {
                    let pieces = board.pieces(s);
                    assert!(pieces.iter().all(|&p| board.cell(p) == s.cell()));
                    assert!(pieces.windows(2).all(|w| w[0].index() < w[1].index()));
                }
            }
            side = side.opponent();
        }
        let (d, l) = board.count();
        assert!(d as usize + l as usize <= NUM_SQUARES);
    }

    #[test]
    fn empty_board_preset_is_a_finished_draw() {
        let preset = format!("{} 2", vec!["0"; 64].join(" "));

        let (board, side) = Board::from_preset(&preset).unwrap();

        assert_eq!(side, Side::Light);
        assert!(board.find_legal_moves(Side::Dark).is_empty());
        assert!(board.find_legal_moves(Side::Light).is_empty());
        assert_eq!(board.check_game_over(), Some(Outcome::Draw));
    }

    #[test]
    fn blocked_board_reports_majority_winner() {
        let board = board_with(&[(0, 0), (0, 1)], &[(7, 7)]);

        assert_eq!(board.check_game_over(), Some(Outcome::Winner(Side::Dark)));
        assert_eq!(Board::new().check_game_over(), None);
    }

    #[test]
    fn preset_parses_cells_and_side_to_move() {
        let mut tokens = vec!["0"; 64];
        tokens[27] = "2";
        tokens[28] = "1";
        let preset = format!("{}\n1\n", tokens.join(" "));

        let (board, side) = Board::from_preset(&preset).unwrap();

        assert_eq!(side, Side::Dark);
        assert_eq!(board.cell(pos(3, 3)), Cell::Light);
        assert_eq!(board.cell(pos(3, 4)), Cell::Dark);
        assert_eq!(board.count(), (1, 1));
    }

    #[test]
    fn preset_rejects_malformed_input() {
        let zeros = vec!["0"; 64].join(" ");

        assert_eq!(Board::from_preset(&zeros), Err(PresetError::TooShort(64)));
        assert_eq!(
            Board::from_preset(&format!("{zeros} 1 1")),
            Err(PresetError::TrailingTokens)
        );
        assert_eq!(
            Board::from_preset(&format!("{zeros} 3")),
            Err(PresetError::InvalidSide(3))
        );
        assert!(matches!(
            Board::from_preset(&format!("x {} 1", vec!["0"; 63].join(" "))),
            Err(PresetError::InvalidToken { index: 0, .. })
        ));
        assert_eq!(
            Board::from_preset(&format!("5 {} 1", vec!["0"; 63].join(" "))),
            Err(PresetError::InvalidCell { index: 0, code: 5 })
        );
    }

    #[test]
    fn game_phase_follows_piece_count_thresholds() {
        let mut cells = [Cell::Empty; NUM_SQUARES];
        for cell in cells.iter_mut().take(19) {
            *cell = Cell::Dark;
        }
        assert_eq!(Board::from_cells(cells).game_phase(), Phase::Early);
        cells[19] = Cell::Light;
        assert_eq!(Board::from_cells(cells).game_phase(), Phase::Mid);
        for cell in cells.iter_mut().take(50).skip(20) {
            *cell = Cell::Light;
        }
        assert_eq!(Board::from_cells(cells).game_phase(), Phase::Late);
    }
}
