use std::sync::atomic::AtomicBool;

use kbx::board::{Game, PlayMode};
use kbx::die::Color;
use kbx::engine::{pick_move, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;

const MAX_MOVES: u32 = 200;

fn main() {
    let strategy = Strategy::default();
    eprintln!("playing both sides with strategy {:?}", strategy.name);
    let mut game = Game::new(PlayMode::AiHuman, 2, strategy);
    let cancel = AtomicBool::new(false);
    let mut rng = StdRng::seed_from_u64(0);

    let mut move_count = 0;
    while game.winner() == Color::None && move_count < MAX_MOVES {
        let result = pick_move(&mut game, &cancel, &mut rng);
        match result.mv {
            Some(mv) => {
                game.make_move(&mv, true).expect("search produced an illegal move");
                move_count += 1;
            }
            None => break,
        }
    }

    if game.winner() != Color::None {
        game.set_finished();
    }

    match game.winner() {
        Color::White => eprintln!("White wins after {move_count} moves"),
        Color::Black => eprintln!("Black wins after {move_count} moves"),
        Color::None => eprintln!("No winner after {move_count} moves (move limit or stalled search)"),
    }
}
