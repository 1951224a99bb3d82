use std::sync::atomic::AtomicBool;

use kbx::board::{Game, PlayMode};
use kbx::die::Color;
use kbx::engine::{pick_move, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;

const MAX_MOVES: u32 = 150;
const GAMES_PER_MATCHUP: usize = 10;
const SIM_DEPTH: u32 = 2;

#[derive(Debug)]
struct MatchResult {
    white_wins: u32,
    black_wins: u32,
    undecided: u32,
}

fn play_game(white_strategy: &Strategy, black_strategy: &Strategy, seed: u64) -> Color {
    let mut game = Game::new(PlayMode::AiHuman, SIM_DEPTH, white_strategy.clone());
    let cancel = AtomicBool::new(false);
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..MAX_MOVES {
        if game.winner() != Color::None {
            break;
        }
        game.strategy = match game.next_player {
            Color::White => white_strategy.clone(),
            _ => black_strategy.clone(),
        };
        match pick_move(&mut game, &cancel, &mut rng).mv {
            Some(mv) => {
                game.make_move(&mv, true).expect("search produced an illegal move");
            }
            None => break,
        }
    }
    game.winner()
}

fn run_matchup(a: &Strategy, b: &Strategy) -> MatchResult {
    let label_a = &a.name;
    let label_b = &b.name;
    let mut result = MatchResult {
        white_wins: 0,
        black_wins: 0,
        undecided: 0,
    };

    // A as white, B as black
    for i in 0..GAMES_PER_MATCHUP / 2 {
        match play_game(a, b, i as u64) {
            Color::White => result.white_wins += 1,
            Color::Black => result.black_wins += 1,
            Color::None => result.undecided += 1,
        }
    }
    let a_white_wins = result.white_wins;
    let b_black_wins = result.black_wins;

    // B as white, A as black
    let mut white_wins_2 = 0;
    let mut black_wins_2 = 0;
    for i in 0..GAMES_PER_MATCHUP / 2 {
        match play_game(b, a, 1000 + i as u64) {
            Color::White => white_wins_2 += 1,
            Color::Black => black_wins_2 += 1,
            Color::None => result.undecided += 1,
        }
    }

    let a_total = a_white_wins + black_wins_2;
    let b_total = b_black_wins + white_wins_2;

    println!(
        "  {label_a} vs {label_b}: {label_a} wins {a_total}, {label_b} wins {b_total}, undecided {} (out of {GAMES_PER_MATCHUP})",
        result.undecided
    );

    MatchResult {
        white_wins: a_total,
        black_wins: b_total,
        undecided: result.undecided,
    }
}

fn main() {
    println!("=== Strategy parameter sweep ===");
    println!("Games per matchup: {GAMES_PER_MATCHUP}, max moves per game: {MAX_MOVES}, depth: {SIM_DEPTH}\n");

    let baseline = Strategy {
        name: "baseline".to_string(),
        ..Strategy::default()
    };

    let variations: Vec<Strategy> = vec![
        Strategy {
            name: "coeffDR=0.5".to_string(),
            coeff_dice_ratio: 0.5,
            ..baseline.clone()
        },
        Strategy {
            name: "coeffDR=1.5".to_string(),
            coeff_dice_ratio: 1.5,
            ..baseline.clone()
        },
        Strategy {
            name: "coeffDR=2.0".to_string(),
            coeff_dice_ratio: 2.0,
            ..baseline.clone()
        },
        Strategy {
            name: "patience=0.8".to_string(),
            patience: 0.8,
            ..baseline.clone()
        },
        Strategy {
            name: "patience=1.0".to_string(),
            patience: 1.0,
            ..baseline.clone()
        },
    ];

    println!("--- Each variation vs baseline ---\n");
    let mut scores: Vec<(String, i32)> = Vec::new();
    for strategy in &variations {
        let result = run_matchup(strategy, &baseline);
        let net = result.white_wins as i32 - result.black_wins as i32;
        scores.push((strategy.name.clone(), net));
    }

    scores.sort_by(|a, b| b.1.cmp(&a.1));

    println!("\n--- Rankings (net wins vs baseline) ---\n");
    for (label, net) in &scores {
        println!("  {net:+4}  {label}");
    }
}
