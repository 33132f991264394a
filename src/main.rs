//! Seeded simulation runner: plays full 24 deal games between the built-in
//! strategies and reports wins and timing. Usage:
//!
//!   joker-sim [games] [seed] [--dump-last]

use std::collections::HashMap;
use std::env;
use std::time::Instant;

use joker_rs::sequence::SEATS;
use joker_rs::strategy::{run_bot_turn, HeuristicStrategy, RandomStrategy, Strategy};
use joker_rs::Game;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let games: u64 = args.get(1).and_then(|a| a.parse().ok()).unwrap_or(100);
    let seed: u64 = args.get(2).and_then(|a| a.parse().ok()).unwrap_or(42);
    let dump_last = args.iter().any(|a| a == "--dump-last");

    let mut wins: HashMap<String, usize> = HashMap::new();
    let mut last_game = None;
    let start = Instant::now();
    for index in 0..games {
        let mut strategies: [Box<dyn Strategy>; SEATS] = [
            Box::new(HeuristicStrategy::new()),
            Box::new(RandomStrategy::new(seed ^ index)),
            Box::new(HeuristicStrategy::new()),
            Box::new(RandomStrategy::new((seed ^ index).wrapping_add(1))),
        ];
        let mut game = Game::new(seed.wrapping_add(index));
        while game.winner.is_none() {
            let seat = game.current_player;
            run_bot_turn(&mut game, strategies[seat].as_mut())
                .expect("fallback actions are always legal");
        }
        let winner = game.winner.expect("finished game has a winner");
        *wins.entry(strategies[winner].name().to_owned()).or_insert(0) += 1;
        last_game = Some(game);
    }
    let duration = start.elapsed();

    println!("played {games} games in {duration:?}");
    println!("wins: {wins:?}");
    if dump_last {
        if let Some(game) = last_game {
            println!(
                "{}",
                serde_json::to_string_pretty(&game.history).expect("history serializes")
            );
        }
    }
}
