use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::ai::search::{SearchConfig, SearchResult};
use crate::ai::{Selection, select_move};
use crate::board::{Board, Move};
use crate::error::GameError;
use crate::player::Player;
use crate::types::{GameResult, GameState, Outcome, Position, Side};

const BOARD_WIDTH: u8 = 8;

/// Chooses a computer move as an index into the canonical legal move list.
pub trait MoveSelector: Send {
    fn select_move(&mut self, board: &Board, player: &Player, moves: &[Move]) -> Option<usize>;
}

/// Selector backed by the time-budgeted search.
pub struct EngineSelector {
    budget: Duration,
    config: SearchConfig,
    rng: SmallRng,
    last_search: Option<SearchResult>,
}

impl EngineSelector {
    pub fn new(budget: Duration, config: SearchConfig, rng: SmallRng) -> Self {
        Self {
            budget,
            config,
            rng,
            last_search: None,
        }
    }

    pub fn seeded(budget: Duration, config: SearchConfig, seed: u64) -> Self {
        Self::new(budget, config, SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy(budget: Duration, config: SearchConfig) -> Self {
        Self::new(budget, config, SmallRng::from_entropy())
    }

    /// Search behind the most recent selection; `None` when no search ran.
    pub fn last_search(&self) -> Option<&SearchResult> {
        self.last_search.as_ref()
    }
}

impl MoveSelector for EngineSelector {
    fn select_move(&mut self, board: &Board, player: &Player, moves: &[Move]) -> Option<usize> {
        let Selection { index, search } =
            select_move(board, player, moves, self.budget, self.config, &mut self.rng)?;
        self.last_search = search;
        Some(index)
    }
}

/// Authoritative game: board, side to move, both players and the last action.
pub struct GameInstance {
    board: Board,
    pub current_player: Side,
    players: [Player; 2],
    pub is_game_over: bool,
    pub is_pass: bool,
    pub flipped: Vec<u8>,
    selector: Box<dyn MoveSelector>,
}

impl GameInstance {
    pub fn new(
        board: Board,
        current_player: Side,
        dark: Player,
        light: Player,
        selector: Box<dyn MoveSelector>,
    ) -> Self {
        let is_game_over = board.check_game_over().is_some();
        Self {
            board,
            current_player,
            players: [
                Player { side: Side::Dark, ..dark },
                Player { side: Side::Light, ..light },
            ],
            is_game_over,
            is_pass: false,
            flipped: Vec::new(),
            selector,
        }
    }

    /// Standard opening, dark to move.
    pub fn standard(dark: Player, light: Player, selector: Box<dyn MoveSelector>) -> Self {
        Self::new(Board::new(), Side::Dark, dark, light, selector)
    }

    pub fn from_preset(
        preset: &str,
        dark: Player,
        light: Player,
        selector: Box<dyn MoveSelector>,
    ) -> Result<Self, GameError> {
        let (board, side) = Board::from_preset(preset)?;
        Ok(Self::new(board, side, dark, light, selector))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    /// Human move for the side to move.
    pub fn place(&mut self, row: u8, col: u8) -> Result<(), GameError> {
        if self.is_game_over {
            return Err(GameError::GameOver);
        }
        if self.player(self.current_player).computer {
            return Err(GameError::NotHumanTurn);
        }
        if row >= BOARD_WIDTH || col >= BOARD_WIDTH {
            return Err(GameError::OutOfRange);
        }

        let mv = self
            .board
            .legal_move(Position::new(row, col), self.current_player)
            .ok_or(GameError::IllegalMove)?;
        self.apply_move(&mv);
        Ok(())
    }

    /// Computer move for the side to move.
    pub fn do_ai_move(&mut self) -> Result<(), GameError> {
        if self.is_game_over {
            return Err(GameError::GameOver);
        }
        let player = *self.player(self.current_player);
        if !player.computer {
            return Err(GameError::NotComputerTurn);
        }

        let moves = self.board.find_legal_moves(player.side);
        if moves.is_empty() {
            return Err(GameError::NoLegalMoves);
        }

        let selected = self
            .selector
            .select_move(&self.board, &player, &moves)
            .ok_or(GameError::NoLegalMoves)?;
        let mv = moves.get(selected).ok_or(GameError::BadSelection(selected))?;

        log::info!("{:?} plays {:?}", player.side, mv.position());
        self.apply_move(mv);
        Ok(())
    }

    pub fn has_legal_moves_for_current(&self) -> bool {
        !self.board.find_legal_moves(self.current_player).is_empty()
    }

    /// Hands the move over when the side to move is blocked.
    pub fn pass(&mut self) -> Result<(), GameError> {
        if self.is_game_over {
            return Err(GameError::GameOver);
        }
        if self.has_legal_moves_for_current() {
            return Err(GameError::PassNotAllowed);
        }

        log::info!("{:?} has no legal moves and passes", self.current_player);
        self.is_pass = true;
        self.flipped.clear();
        self.current_player = self.current_player.opponent();
        Ok(())
    }

    pub fn get_legal_moves(&self) -> Vec<Position> {
        self.board
            .find_legal_moves(self.current_player)
            .iter()
            .map(Move::position)
            .collect()
    }

    pub fn to_game_state(&self) -> GameState {
        let (dark_count, light_count) = self.board.count();
        GameState {
            board: self.board.to_array().to_vec(),
            current_player: self.current_player.code(),
            dark_count,
            light_count,
            is_game_over: self.is_game_over,
            is_pass: self.is_pass,
            flipped: self.flipped.clone(),
        }
    }

    pub fn to_game_result(&self) -> GameResult {
        let (dark_count, light_count) = self.board.count();
        GameResult {
            winner: match self.board.outcome() {
                Outcome::Winner(side) => side.code(),
                Outcome::Draw => 0,
            },
            dark_count,
            light_count,
        }
    }

    fn apply_move(&mut self, mv: &Move) {
        self.board.apply(mv, self.current_player);

        self.is_pass = false;
        self.flipped = mv.flip_set().iter().map(|pos| pos.index() as u8).collect();
        self.current_player = self.current_player.opponent();

        if let Some(outcome) = self.board.check_game_over() {
            let (dark, light) = self.board.count();
            log::info!("game over: {outcome:?} ({dark}-{light})");
            self.is_game_over = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Strategy;
    use crate::types::Cell;

    struct FixedMoveSelector {
        mv: usize,
    }

    impl MoveSelector for FixedMoveSelector {
        fn select_move(&mut self, _board: &Board, _player: &Player, _moves: &[Move]) -> Option<usize> {
            Some(self.mv)
        }
    }

    fn idx(row: u8, col: u8) -> usize {
        Position::new(row, col).index()
    }

    fn human_vs_computer(selector: Box<dyn MoveSelector>) -> GameInstance {
        GameInstance::standard(
            Player::human(Side::Dark),
            Player::computer(Side::Light, Strategy::Dynamic),
            selector,
        )
    }

    fn preset(cells: &[Cell; 64], side: Side) -> String {
        let codes: Vec<String> = cells.iter().map(|c| c.code().to_string()).collect();
        format!("{} {}", codes.join(" "), side.code())
    }

    #[test]
    fn initial_state_is_correct() {
        let game = human_vs_computer(Box::new(FixedMoveSelector { mv: 0 }));
        let state = game.to_game_state();

        assert_eq!(state.current_player, 1);
        assert_eq!(state.dark_count, 2);
        assert_eq!(state.light_count, 2);
        assert!(!state.is_game_over);
        assert!(!state.is_pass);
        assert!(state.flipped.is_empty());
        assert_eq!(game.get_legal_moves().len(), 4);
    }

    #[test]
    fn illegal_player_move_returns_error() {
        let mut game = human_vs_computer(Box::new(FixedMoveSelector { mv: 0 }));

        assert_eq!(game.place(0, 0), Err(GameError::IllegalMove));
        assert_eq!(game.place(8, 0), Err(GameError::OutOfRange));
        assert_eq!(game.do_ai_move(), Err(GameError::NotComputerTurn));
    }

    #[test]
    fn human_then_computer_move_alternates_turns() {
        let mut game = human_vs_computer(Box::new(FixedMoveSelector { mv: 1 }));

        game.place(2, 3).unwrap();
        assert_eq!(game.current_player, Side::Light);
        assert_eq!(game.flipped, vec![idx(2, 3) as u8, idx(3, 3) as u8]);
        assert_eq!(game.place(2, 2), Err(GameError::NotHumanTurn));

        game.do_ai_move().unwrap();
        // Light's replies are (2,2), (2,4), (4,2); index 1 is (2,4).
        assert_eq!(game.current_player, Side::Dark);
        assert_eq!(game.flipped, vec![idx(2, 4) as u8, idx(3, 4) as u8]);
        assert_eq!(game.board().count(), (3, 3));
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut game = GameInstance::standard(
            Player::computer(Side::Dark, Strategy::Dynamic),
            Player::computer(Side::Light, Strategy::Dynamic),
            Box::new(FixedMoveSelector { mv: 9 }),
        );

        assert_eq!(game.do_ai_move(), Err(GameError::BadSelection(9)));
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn blocked_side_passes_and_turn_switches() {
        let mut cells = [Cell::Light; 64];
        cells[idx(0, 0)] = Cell::Empty;
        cells[idx(0, 1)] = Cell::Dark;
        let mut game = GameInstance::from_preset(
            &preset(&cells, Side::Dark),
            Player::human(Side::Dark),
            Player::computer(Side::Light, Strategy::Dynamic),
            Box::new(FixedMoveSelector { mv: 0 }),
        )
        .unwrap();

        assert!(!game.is_game_over);
        assert!(!game.has_legal_moves_for_current());
        game.pass().unwrap();

        assert_eq!(game.current_player, Side::Light);
        assert!(game.is_pass);
        assert!(game.flipped.is_empty());
        assert!(game.has_legal_moves_for_current());
        assert_eq!(game.pass(), Err(GameError::PassNotAllowed));
    }

    #[test]
    fn filling_the_board_ends_the_game() {
        let mut cells = [Cell::Light; 64];
        cells[idx(0, 0)] = Cell::Empty;
        cells[idx(0, 1)] = Cell::Dark;
        let mut game = GameInstance::from_preset(
            &preset(&cells, Side::Light),
            Player::human(Side::Dark),
            Player::computer(Side::Light, Strategy::Dynamic),
            Box::new(FixedMoveSelector { mv: 0 }),
        )
        .unwrap();

        game.do_ai_move().unwrap();
        let state = game.to_game_state();

        assert!(state.is_game_over);
        assert_eq!(state.current_player, 1);
        assert_eq!(state.dark_count, 0);
        assert_eq!(state.light_count, 64);
        assert_eq!(state.flipped, vec![0, 1]);
        assert_eq!(game.to_game_result().winner, 2);
        assert_eq!(game.do_ai_move(), Err(GameError::GameOver));
    }

    #[test]
    fn finished_preset_starts_over() {
        let preset = format!("{} 1", vec!["0"; 64].join(" "));
        let game = GameInstance::from_preset(
            &preset,
            Player::human(Side::Dark),
            Player::human(Side::Light),
            Box::new(FixedMoveSelector { mv: 0 }),
        )
        .unwrap();

        assert!(game.is_game_over);
        assert_eq!(game.to_game_result().winner, 0);
    }

    #[test]
    fn invalid_preset_is_reported() {
        let result = GameInstance::from_preset(
            "1 2 3",
            Player::human(Side::Dark),
            Player::human(Side::Light),
            Box::new(FixedMoveSelector { mv: 0 }),
        );

        assert!(matches!(result, Err(GameError::Preset(_))));
    }

    #[test]
    fn engine_self_play_reaches_game_over() {
        let mut game = GameInstance::standard(
            Player::computer(Side::Dark, Strategy::Random),
            Player::computer(Side::Light, Strategy::Random),
            Box::new(EngineSelector::seeded(
                Duration::from_millis(10),
                SearchConfig::default(),
                99,
            )),
        );

        let mut turns = 0;
        while !game.is_game_over {
            if game.has_legal_moves_for_current() {
                game.do_ai_move().unwrap();
            } else {
                game.pass().unwrap();
            }
            turns += 1;
            assert!(turns < 200);
        }

        let result = game.to_game_result();
        assert!(result.dark_count as usize + result.light_count as usize <= 64);
        let expected = match result.dark_count.cmp(&result.light_count) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Less => 2,
            std::cmp::Ordering::Equal => 0,
        };
        assert_eq!(result.winner, expected);
    }

    #[test]
    fn engine_selector_records_the_search() {
        let mut selector =
            EngineSelector::seeded(Duration::from_millis(50), SearchConfig::default(), 5);
        let board = Board::new();
        let moves = board.find_legal_moves(Side::Dark);
        let player = Player::computer(Side::Dark, Strategy::Dynamic);

        let index = selector.select_move(&board, &player, &moves).unwrap();

        let search = selector.last_search().expect("search ran");
        assert!(search.depth >= 1);
        assert!(search.best_moves.contains(&index));
    }
}
