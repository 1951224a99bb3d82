//! Evaluation and search: a negamax AI with alpha-beta pruning, tunable
//! via `Strategy`, and cancellable mid-search.
//!
//! Ratings are always from the perspective of the `color` passed in —
//! positive means good for that color. Each recursive call negates the
//! child's rating and scales it by `strategy.patience`, so a win found
//! deeper in the tree is worth slightly less than the same win found
//! sooner. This mirrors negamax's usual alpha-beta shape but applies the
//! patience discount at every return, not only at the leaves.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Game, Phase};
use crate::die::Color;
use crate::moves::Move;

/// Tunable parameters for the evaluator and search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub coeff_dice_ratio: f64,
    /// Discount applied to every recursive rating, in (0, 1].
    pub patience: f64,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy {
            name: "default".to_string(),
            coeff_dice_ratio: 1.0,
            patience: 0.95,
        }
    }
}

/// A rating paired with the move that earned it, if any (leaves and
/// stalled positions carry no move).
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub rating: f64,
    pub mv: Option<Move>,
}

const WIN_RATING: f64 = 100.0;
const DICE_RATIO_WEIGHT: f64 = 5.5;

/// Static evaluation of the current position from `color`'s perspective.
/// A decided winner dominates everything else; otherwise the position is
/// scored by its dice ratio alone (spec.md names this the one required
/// heuristic term).
pub fn rate(game: &Game, color: Color) -> f64 {
    match game.winner() {
        Color::None => rate_dice_ratio(game, color) * game.strategy.coeff_dice_ratio,
        winner if winner == color => WIN_RATING,
        _ => -WIN_RATING,
    }
}

/// +5.5 per enemy die killed, -5.5 per own die killed, from `color`'s view.
fn rate_dice_ratio(game: &Game, color: Color) -> f64 {
    let mut rating = 0.0;
    for die in &game.dice {
        if die.got_killed() {
            if die.color == color {
                rating -= DICE_RATIO_WEIGHT;
            } else {
                rating += DICE_RATIO_WEIGHT;
            }
        }
    }
    rating
}

/// Negamax search with alpha-beta pruning over `color`'s legal moves,
/// `depth` plies deep. `cancel` is checked before every move is tried;
/// once set, the search unwinds immediately and returns a neutral
/// `Evaluation { rating: 0.0, mv: None }` at every level, per spec.md §7
/// category 5 — cancellation is not an error. Every simulated move is
/// undone before the next candidate is tried, so a cancelled search
/// never leaves `game` mutated.
///
/// Only the outermost, root call (`is_root`) is a search a caller can
/// observe: it flips `game.phase` to `Evaluating` on entry and restores
/// it to `Idle` (or `Cancelled`, if `cancel` fired during the search) on
/// return, per the concurrency contract in spec.md §5. Nested recursive
/// calls leave `phase` alone — they are internal to the one search the
/// root call represents.
///
/// `is_root` also gates the random tie-break at the end of the search:
/// only the root call collects candidate moves and picks uniformly
/// among the top-rated ones via `rng`, which the caller must thread
/// through explicitly rather than relying on a global generator.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_moves(
    game: &mut Game,
    depth: u32,
    alpha: f64,
    beta: f64,
    color: Color,
    is_root: bool,
    cancel: &AtomicBool,
    rng: &mut StdRng,
) -> Evaluation {
    if is_root {
        game.phase = Phase::Evaluating;
    }

    let result = negamax(game, depth, alpha, beta, color, is_root, cancel, rng);

    if is_root {
        game.phase = if cancel.load(Ordering::Relaxed) {
            Phase::Cancelled
        } else {
            Phase::Idle
        };
    }

    result
}

/// The recursive search itself, isolated from `evaluate_moves`'s phase
/// bookkeeping so that bookkeeping only ever happens once per search,
/// at the root.
///
/// Candidate collection at the root mirrors the reference engine's
/// `Game::_evaluateMoves` literally: a move is only added to the
/// candidate list when its rating is *strictly* greater than the
/// current `alpha` (which is then raised to that rating). Since `alpha`
/// only ever increases and a later move must beat it to be added, the
/// candidate list holds strictly increasing ratings — so in practice
/// the final "top-rated" set is always the single most recently added
/// candidate. This is the source engine's actual behavior, not a
/// simplification of it; the `top`/`winners` computation below is kept
/// general (as spec.md §4.H's algorithm states it) rather than special-
/// cased to a single best move.
#[allow(clippy::too_many_arguments)]
fn negamax(
    game: &mut Game,
    depth: u32,
    mut alpha: f64,
    beta: f64,
    color: Color,
    is_root: bool,
    cancel: &AtomicBool,
    rng: &mut StdRng,
) -> Evaluation {
    if cancel.load(Ordering::Relaxed) {
        return Evaluation {
            rating: 0.0,
            mv: None,
        };
    }

    if depth == 0 || game.winner() != Color::None {
        return Evaluation {
            rating: rate(game, color),
            mv: None,
        };
    }

    let moves = game.legal_moves_for_color(color);
    let mut candidates: Vec<(f64, Move)> = Vec::new();

    for mv in &moves {
        if cancel.load(Ordering::Relaxed) {
            return Evaluation {
                rating: 0.0,
                mv: None,
            };
        }

        let victim = match game.make_move(mv, false) {
            Ok(v) => v,
            Err(_) => continue,
        };
        let child = negamax(
            game,
            depth - 1,
            -beta,
            -alpha,
            color.inverse(),
            false,
            cancel,
            rng,
        );
        game.undo_unrecorded(mv, victim);

        let rating = -game.strategy.patience * child.rating;

        if rating >= beta {
            return Evaluation {
                rating,
                mv: None,
            };
        }

        if rating > alpha {
            alpha = rating;
            if is_root {
                candidates.push((rating, *mv));
            }
        }
    }

    if is_root {
        if let Some(top) = candidates
            .iter()
            .map(|&(rating, _)| rating)
            .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |a| a.max(r))))
        {
            let winners: Vec<Move> = candidates
                .iter()
                .filter(|&&(rating, _)| rating >= top)
                .map(|&(_, mv)| mv)
                .collect();
            let index = rng.gen_range(0..winners.len());
            return Evaluation {
                rating: top,
                mv: Some(winners[index]),
            };
        }
    }

    Evaluation {
        rating: alpha,
        mv: None,
    }
}

/// Search for the best move for `game.next_player` at `game.ai_depth`
/// plies, using `game.strategy`. A thin, AI-turn-aware wrapper around
/// `evaluate_moves`.
pub fn pick_move(game: &mut Game, cancel: &AtomicBool, rng: &mut StdRng) -> Evaluation {
    let color = game.next_player;
    let depth = game.ai_depth.max(1);
    evaluate_moves(
        game,
        depth,
        f64::NEG_INFINITY,
        f64::INFINITY,
        color,
        true,
        cancel,
        rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PlayMode, KING_BLACK, KING_WHITE};
    use crate::die::Die;
    use rand::SeedableRng;

    fn empty_game() -> Game {
        let mut g = Game::new(PlayMode::HumanHuman, 2, Strategy::default());
        g.grid = [[None; 9]; 9];
        for d in g.dice.iter_mut() {
            *d = Die::new(0, 0, Color::None, 25);
        }
        g
    }

    fn place(g: &mut Game, index: usize, x: i32, y: i32, color: Color, orientation: u8) {
        g.dice[index] = Die::new(x, y, color, orientation);
        g.grid[x as usize][y as usize] = Some(index);
    }

    #[test]
    fn rate_reflects_decided_winner() {
        let mut g = Game::default();
        g.dice[KING_BLACK].kill();
        assert_eq!(rate(&g, Color::White), WIN_RATING);
        assert_eq!(rate(&g, Color::Black), -WIN_RATING);
    }

    #[test]
    fn rate_dice_ratio_counts_deaths_relative_to_color() {
        let mut g = Game::default();
        g.dice[0].kill(); // a white die dies
        g.dice[9].kill(); // a black die dies
        // one dead on each side cancels out
        assert_eq!(rate(&g, Color::White), 0.0);
        assert_eq!(rate(&g, Color::Black), 0.0);

        g.dice[1].kill(); // a second white die dies
        assert!(rate(&g, Color::White) < 0.0);
        assert!(rate(&g, Color::Black) > 0.0);
    }

    #[test]
    fn evaluate_moves_does_not_mutate_board_after_search() {
        let mut g = Game::default();
        let before = g.clone();
        let cancel = AtomicBool::new(false);
        let mut rng = StdRng::seed_from_u64(42);
        evaluate_moves(
            &mut g,
            2,
            f64::NEG_INFINITY,
            f64::INFINITY,
            Color::White,
            true,
            &cancel,
            &mut rng,
        );
        assert_eq!(g.grid, before.grid);
        for (a, b) in g.dice.iter().zip(before.dice.iter()) {
            assert_eq!(a, b);
        }
        assert_eq!(g.next_player, before.next_player);
        assert_eq!(g.phase, Phase::Idle);
    }

    #[test]
    fn cancellation_returns_neutral_evaluation_immediately() {
        let mut g = Game::default();
        let before = g.clone();
        let cancel = AtomicBool::new(true);
        let mut rng = StdRng::seed_from_u64(1);
        let result = evaluate_moves(
            &mut g,
            3,
            f64::NEG_INFINITY,
            f64::INFINITY,
            Color::White,
            true,
            &cancel,
            &mut rng,
        );
        assert_eq!(result.rating, 0.0);
        assert!(result.mv.is_none());
        assert_eq!(g.grid, before.grid);
        assert_eq!(g.phase, Phase::Cancelled);
    }

    #[test]
    fn phase_is_idle_before_and_after_an_uncancelled_search() {
        let mut g = Game::default();
        assert_eq!(g.phase, Phase::Idle);
        let cancel = AtomicBool::new(false);
        let mut rng = StdRng::seed_from_u64(5);
        pick_move(&mut g, &cancel, &mut rng);
        assert_eq!(g.phase, Phase::Idle);
    }

    #[test]
    fn same_seed_picks_same_move() {
        let mut g1 = Game::default();
        let mut g2 = Game::default();
        let cancel = AtomicBool::new(false);
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);

        let r1 = evaluate_moves(
            &mut g1,
            2,
            f64::NEG_INFINITY,
            f64::INFINITY,
            Color::White,
            true,
            &cancel,
            &mut rng1,
        );
        let r2 = evaluate_moves(
            &mut g2,
            2,
            f64::NEG_INFINITY,
            f64::INFINITY,
            Color::White,
            true,
            &cancel,
            &mut rng2,
        );
        assert_eq!(r1.rating, r2.rating);
        assert_eq!(r1.mv, r2.mv);
    }

    #[test]
    fn patience_discounts_deeper_wins() {
        let mut g = empty_game();
        place(&mut g, KING_WHITE, 4, 6, Color::White, 24);
        place(&mut g, KING_BLACK, 4, 4, Color::Black, 24);
        place(&mut g, 0, 4, 5, Color::White, 0); // value 1, can capture king next move
        g.next_player = Color::White;

        let cancel = AtomicBool::new(false);

        let mut patient_strategy = Strategy::default();
        patient_strategy.patience = 1.0;
        let mut g_patient = g.clone();
        g_patient.strategy = patient_strategy;
        let mut rng = StdRng::seed_from_u64(3);
        let full_patience = evaluate_moves(
            &mut g_patient,
            2,
            f64::NEG_INFINITY,
            f64::INFINITY,
            Color::White,
            true,
            &cancel,
            &mut rng,
        );

        let mut impatient_strategy = Strategy::default();
        impatient_strategy.patience = 0.5;
        let mut g_impatient = g.clone();
        g_impatient.strategy = impatient_strategy;
        let mut rng2 = StdRng::seed_from_u64(3);
        let half_patience = evaluate_moves(
            &mut g_impatient,
            2,
            f64::NEG_INFINITY,
            f64::INFINITY,
            Color::White,
            true,
            &cancel,
            &mut rng2,
        );

        assert!(full_patience.rating > 0.0);
        assert!(half_patience.rating > 0.0);
        assert!(half_patience.rating < full_patience.rating);
    }

    #[test]
    fn pick_move_searches_for_next_player() {
        let mut g = Game::default();
        let cancel = AtomicBool::new(false);
        let mut rng = StdRng::seed_from_u64(9);
        let result = pick_move(&mut g, &cancel, &mut rng);
        assert!(result.mv.is_some());
        assert_eq!(result.mv.unwrap().die_index < 9, true);
    }
}
