use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::ai::eval::{Evaluator, SCORE_MAX, SCORE_MIN, Score};
use crate::board::{Board, Move};
use crate::types::{Outcome, Side};

const DEFAULT_SAFETY_FACTOR: f64 = 1.4;
const DEFAULT_BUDGET_FRACTION: f64 = 0.8;

/// Time-budget projection knobs for iterative deepening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Multiplier applied to the previous depth's per-move time before starting a new depth.
    pub safety_factor: f64,
    /// Share of the time budget the projected finish must stay under.
    pub budget_fraction: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            safety_factor: DEFAULT_SAFETY_FACTOR,
            budget_fraction: DEFAULT_BUDGET_FRACTION,
        }
    }
}

/// Outcome of a root search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Indices into the root move list that share the best score, in move order.
    pub best_moves: Vec<usize>,
    pub best_score: Score,
    /// Deepest pass that finished for every root move.
    pub depth: u32,
    pub elapsed: Duration,
}

struct RootPass {
    best_moves: Vec<usize>,
    best_score: Score,
    complete: bool,
}

/// Iterative-deepening alpha-beta search on behalf of one side.
///
/// Scores are always from `side`'s point of view; the mover at each ply
/// either maximizes or minimizes that fixed score.
pub struct Searcher<'a, E: Evaluator> {
    evaluator: &'a E,
    side: Side,
    config: SearchConfig,
    start_time: Instant,
    nodes: u64,
}

impl<'a, E: Evaluator> Searcher<'a, E> {
    pub fn new(evaluator: &'a E, side: Side, config: SearchConfig) -> Self {
        Self {
            evaluator,
            side,
            config,
            start_time: Instant::now(),
            nodes: 0,
        }
    }

    /// Searches successively deeper until the budget projection says the next
    /// depth cannot finish, or the remaining game is fully covered.
    /// Caller contract: `moves` are `side`'s legal moves on `board` and are not empty.
    pub fn search(&mut self, board: &Board, moves: &[Move], budget: Duration) -> SearchResult {
        self.start_time = Instant::now();
        self.nodes = 0;
        debug_assert!(!moves.is_empty(), "search() requires at least one legal move");

        let target = budget.as_secs_f64() * self.config.budget_fraction;
        let max_depth = u32::from(board.empty_count());
        let mut scratch = board.clone();
        let mut last_move_time = 0.0f64;
        let mut best_moves = Vec::new();
        let mut best_score = SCORE_MIN;
        let mut completed = 0;

        while completed < max_depth {
            let depth = completed + 1;
            // Depth 1 always runs so there is a result to return.
            let deadline = (depth > 1).then_some(target);

            if deadline.is_some() {
                let projected = last_move_time * self.config.safety_factor * moves.len() as f64
                    + self.elapsed_secs();
                if projected > target {
                    log::debug!("skipping depth {depth}: projected {projected:.3}s over budget");
                    break;
                }
            }

            let pass = self.search_pass(&mut scratch, moves, depth, deadline, &mut last_move_time);
            if !pass.complete {
                log::debug!("time limit cut off search at depth {depth}");
                break;
            }

            log::debug!(
                "depth {depth} complete: best {:?} score {} ({} nodes, {:.3}s)",
                pass.best_moves,
                pass.best_score,
                self.nodes,
                self.elapsed_secs()
            );
            best_moves = pass.best_moves;
            best_score = pass.best_score;
            completed = depth;
        }

        SearchResult {
            best_moves,
            best_score,
            depth: completed,
            elapsed: self.start_time.elapsed(),
        }
    }

    /// Runs a single pass at `depth` with no time limit.
    pub fn search_to_depth(&mut self, board: &Board, moves: &[Move], depth: u32) -> SearchResult {
        self.start_time = Instant::now();
        self.nodes = 0;

        let mut scratch = board.clone();
        let mut last_move_time = 0.0;
        let pass = self.search_pass(&mut scratch, moves, depth, None, &mut last_move_time);

        SearchResult {
            best_moves: pass.best_moves,
            best_score: pass.best_score,
            depth,
            elapsed: self.start_time.elapsed(),
        }
    }

    fn search_pass(
        &mut self,
        board: &mut Board,
        moves: &[Move],
        depth: u32,
        deadline: Option<f64>,
        last_move_time: &mut f64,
    ) -> RootPass {
        let mut best_moves = Vec::new();
        let mut best_score = SCORE_MIN;

        for (idx, mv) in moves.iter().enumerate() {
            let started = Instant::now();

            board.apply(mv, self.side);
            let score = self.minimax(
                board,
                self.side.opponent(),
                SCORE_MIN,
                SCORE_MAX,
                0,
                depth,
                false,
            );
            board.undo(mv, self.side);

            if best_moves.is_empty() || score > best_score {
                best_moves.clear();
                best_moves.push(idx);
                best_score = score;
            } else if score == best_score {
                best_moves.push(idx);
            }

            *last_move_time = started.elapsed().as_secs_f64();

            if let Some(target) = deadline {
                let remaining = (moves.len() - (idx + 1)) as f64;
                if *last_move_time * remaining + self.elapsed_secs() > target {
                    return RootPass {
                        best_moves,
                        best_score,
                        complete: false,
                    };
                }
            }
        }

        RootPass {
            best_moves,
            best_score,
            complete: true,
        }
    }

    /// Fixed-perspective minimax with alpha-beta pruning.
    /// A forced pass hands the move over without consuming a ply.
    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &mut self,
        board: &mut Board,
        to_move: Side,
        mut alpha: Score,
        mut beta: Score,
        ply: u32,
        max_ply: u32,
        maximizing: bool,
    ) -> Score {
        self.nodes += 1;

        if ply > max_ply {
            return self.evaluator.evaluate(board, self.side);
        }

        let mut to_move = to_move;
        let mut maximizing = maximizing;
        let mut moves = board.find_legal_moves(to_move);

        if moves.is_empty() {
            let replies = board.find_legal_moves(to_move.opponent());
            if replies.is_empty() {
                return terminal_score(board.outcome(), self.side);
            }
            moves = replies;
            to_move = to_move.opponent();
            maximizing = !maximizing;
        }

        if maximizing {
            let mut best = SCORE_MIN;
            for mv in &moves {
                board.apply(mv, to_move);
                let score = self.minimax(
                    board,
                    to_move.opponent(),
                    alpha,
                    beta,
                    ply + 1,
                    max_ply,
                    false,
                );
                board.undo(mv, to_move);

                best = best.max(score);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = SCORE_MAX;
            for mv in &moves {
                board.apply(mv, to_move);
                let score = self.minimax(
                    board,
                    to_move.opponent(),
                    alpha,
                    beta,
                    ply + 1,
                    max_ply,
                    true,
                );
                board.undo(mv, to_move);

                best = best.min(score);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }

    fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

fn terminal_score(outcome: Outcome, side: Side) -> Score {
    match outcome {
        Outcome::Winner(winner) if winner == side => SCORE_MAX,
        Outcome::Winner(_) => SCORE_MIN,
        Outcome::Draw => 0,
    }
}
