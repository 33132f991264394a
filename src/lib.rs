//! Rules engine for the four-seat Georgian Joker card game: a 36 card deck
//! with two jokers, a fixed 24 deal sequence, dealer-constrained bidding,
//! joker high/low trick play, and the non-linear score table with the
//! khisht penalty.

pub mod cards;
pub mod error;
pub mod game;
pub mod rules;
pub mod scoring;
pub mod sequence;
pub mod strategy;

pub use cards::{build_deck, Card, Rank, Suit};
pub use error::GameError;
pub use game::{Action, DealResult, Game, State};
pub use rules::{winner_of, JokerCall, Play, Trick};
pub use scoring::{score_for, Bid, NineCardTrumpPolicy, RulesConfig};
pub use sequence::{full_sequence, DealSpec};
pub use strategy::{run_bot_turn, HeuristicStrategy, PlayChoice, RandomStrategy, Strategy};
