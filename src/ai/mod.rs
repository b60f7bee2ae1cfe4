pub mod eval;
pub mod search;
pub mod table;

use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::ai::eval::{DynamicEvaluator, Evaluator, StaticEvaluator};
use crate::ai::search::{SearchConfig, SearchResult, Searcher};
use crate::board::{Board, Move};
use crate::player::{Player, Strategy};

/// A chosen root move, with the search that produced it when one ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub index: usize,
    pub search: Option<SearchResult>,
}

/// Picks an index into `moves` for `player`.
///
/// A single legal move is played without searching. Random players pick
/// uniformly; searching players pick uniformly among the tied best moves.
/// Returns `None` when `moves` is empty.
pub fn select_move<R: Rng>(
    board: &Board,
    player: &Player,
    moves: &[Move],
    budget: Duration,
    config: SearchConfig,
    rng: &mut R,
) -> Option<Selection> {
    if moves.len() <= 1 {
        return (!moves.is_empty()).then_some(Selection {
            index: 0,
            search: None,
        });
    }

    let result = match &player.strategy {
        Strategy::Random => {
            return Some(Selection {
                index: rng.gen_range(0..moves.len()),
                search: None,
            });
        }
        Strategy::Static { table } => {
            run_search(&StaticEvaluator::new(*table), board, player, moves, budget, config)
        }
        Strategy::Dynamic => run_search(
            &DynamicEvaluator::default(),
            board,
            player,
            moves,
            budget,
            config,
        ),
    };

    let index = *result.best_moves.choose(rng)?;
    log::info!(
        "{:?} searched depth {} to completion in {:.3}s, chose move {index}",
        player.side,
        result.depth,
        result.elapsed.as_secs_f64()
    );
    Some(Selection {
        index,
        search: Some(result),
    })
}

fn run_search<E: Evaluator>(
    evaluator: &E,
    board: &Board,
    player: &Player,
    moves: &[Move],
    budget: Duration,
    config: SearchConfig,
) -> SearchResult {
    Searcher::new(evaluator, player.side, config).search(board, moves, budget)
}
