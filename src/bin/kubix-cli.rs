//! Command-line front end: loads or creates a game, optionally runs a
//! short REPL, and autosaves on exit.

use std::fs;
use std::io::{self, Write};
use std::sync::atomic::AtomicBool;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use kbx::board::{Game, PlayMode};
use kbx::die::Color;
use kbx::engine::{pick_move, Strategy};
use kbx::serialize::{deserialize_game, serialize_game};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

const AUTOSAVE_PATH: &str = ".autosave.kbx";

#[derive(Parser, Debug)]
#[command(name = "kubix-cli", about = "Play or drive the dice-army board game from a terminal")]
struct Args {
    /// Initialize the game and exit immediately, without entering the REPL.
    #[arg(short = 'q', long = "quit-after-init")]
    quit_after_init: bool,

    /// Load a saved game from FILE. Falls back to .autosave.kbx if omitted.
    #[arg(long = "load-game", value_name = "FILE")]
    load_game: Option<String>,

    /// Seed the random number generator used for AI move tie-breaks.
    #[arg(long = "random-seed", value_name = "N")]
    random_seed: Option<u64>,
}

fn load_or_new(args: &Args) -> Game {
    let path = args
        .load_game
        .clone()
        .unwrap_or_else(|| AUTOSAVE_PATH.to_string());

    match fs::read_to_string(&path) {
        Ok(text) => match deserialize_game(&text) {
            Ok(game) => {
                info!("loaded game from {path}");
                game
            }
            Err(e) => {
                warn!("failed to parse {path}: {e}; starting a new game");
                Game::new(PlayMode::HumanHuman, 2, Strategy::default())
            }
        },
        Err(_) => {
            info!("no save file at {path}; starting a new game");
            Game::new(PlayMode::HumanHuman, 2, Strategy::default())
        }
    }
}

fn seed_from_wall_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn autosave(game: &Game) {
    let text = serialize_game(game);
    if let Err(e) = fs::write(AUTOSAVE_PATH, text) {
        warn!("failed to autosave to {AUTOSAVE_PATH}: {e}");
    }
}

fn print_board(game: &Game) {
    for y in (0..9).rev() {
        for x in 0..9 {
            match game.grid[x][y] {
                Some(idx) => {
                    let die = &game.dice[idx];
                    let c = match die.color {
                        Color::White => 'w',
                        Color::Black => 'b',
                        Color::None => '.',
                    };
                    print!("{c}{} ", die.value());
                }
                None => print!(".. "),
            }
        }
        println!();
    }
}

fn main() {
    env_logger::init();
    info!("kubix-cli build {}", env!("BUILD_TIMESTAMP"));
    let args = Args::parse();

    let seed = args.random_seed.unwrap_or_else(seed_from_wall_clock);
    let mut rng = StdRng::seed_from_u64(seed);
    let cancel = AtomicBool::new(false);

    let mut game = load_or_new(&args);

    if args.quit_after_init {
        autosave(&game);
        return;
    }

    print_board(&game);
    println!("Commands: move <die> <dx> <dy> <firstX:0|1> | undo | redo | ai | quit");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let parts: Vec<&str> = line.trim().split_whitespace().collect();
        match parts.as_slice() {
            ["quit"] => break,
            ["undo"] => {
                if game.undo_move().is_none() {
                    println!("nothing to undo");
                }
            }
            ["redo"] => {
                if game.redo_move().is_none() {
                    println!("nothing to redo");
                }
            }
            ["ai"] => {
                let result = pick_move(&mut game, &cancel, &mut rng);
                match result.mv {
                    Some(mv) => {
                        game.make_move(&mv, true).expect("search produced an illegal move");
                        print_board(&game);
                    }
                    None => println!("no legal moves"),
                }
            }
            ["move", die, dx, dy, first_x] => {
                let parsed = die
                    .parse::<usize>()
                    .and_then(|d| Ok((d, dx.parse::<i32>()?, dy.parse::<i32>()?, first_x.parse::<u8>()?)));
                match parsed {
                    Ok((die_index, dx, dy, fx)) => {
                        let rel = kbx::moves::RelativeMove::new(dx, dy, fx != 0);
                        if game.is_legal(die_index, &rel) {
                            let mv = kbx::moves::Move::new(die_index, rel);
                            game.make_move(&mv, true).expect("validated move should apply");
                            print_board(&game);
                        } else {
                            println!("illegal move");
                        }
                    }
                    Err(_) => println!("could not parse move arguments"),
                }
            }
            _ => println!("unrecognized command"),
        }

        if game.winner() != Color::None {
            game.set_finished();
            println!("{:?} wins", game.winner());
            break;
        }
    }

    autosave(&game);
}
