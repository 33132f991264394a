//! Pluggable bot seats. A strategy only proposes actions; the engine runs
//! every proposal through the same validation as a human action and falls
//! back to the first legal alternative when a proposal is rejected, so a
//! misbehaving strategy can never corrupt the game.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::cards::{Card, Rank, Suit};
use crate::error::GameError;
use crate::game::{Action, Game, State};
use crate::rules::JokerCall;
use crate::scoring::Bid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayChoice {
    pub card_id: i32,
    pub joker_call: Option<JokerCall>,
    pub declared_suit: Option<Suit>,
}

pub trait Strategy {
    fn bid(&mut self, game: &Game, seat: usize) -> Bid;
    fn pick_trump(&mut self, game: &Game, seat: usize) -> Option<Suit>;
    fn choose_play(&mut self, game: &Game, seat: usize) -> PlayChoice;
    fn name(&self) -> &str;
}

/// Drive one bot turn through the engine. The strategy's answer is
/// validated exactly like a human submission; an illegal answer is logged
/// and replaced with the first legal action instead of being applied.
pub fn run_bot_turn(game: &mut Game, strategy: &mut dyn Strategy) -> Result<(), GameError> {
    let seat = game.current_player;
    let action = match game.state {
        State::Bidding => Action::Bid {
            seat,
            bid: strategy.bid(game, seat),
        },
        State::PickingTrump => Action::PickTrump {
            seat,
            trump: strategy.pick_trump(game, seat),
        },
        State::Play => {
            let choice = strategy.choose_play(game, seat);
            Action::Play {
                seat,
                card_id: choice.card_id,
                joker_call: choice.joker_call,
                declared_suit: choice.declared_suit,
            }
        }
    };
    match game.apply(action) {
        Ok(next) => {
            *game = next;
            Ok(())
        }
        Err(err) => {
            debug!(strategy = strategy.name(), seat, %err, "illegal strategy answer, using fallback");
            let fallback = fallback_action(game, seat);
            *game = game.apply(fallback)?;
            Ok(())
        }
    }
}

fn fallback_action(game: &Game, seat: usize) -> Action {
    match game.state {
        State::Bidding => Action::Bid {
            seat,
            bid: *game
                .legal_bids(seat)
                .first()
                .expect("at least one bid is always legal"),
        },
        State::PickingTrump => Action::PickTrump { seat, trump: None },
        State::Play => {
            let card_id = *game
                .playable_cards()
                .first()
                .expect("a seat to act always holds a card");
            let is_joker = game.hands[seat]
                .iter()
                .any(|c| c.id == card_id && c.is_joker);
            Action::Play {
                seat,
                card_id,
                joker_call: is_joker.then_some(JokerCall::Low),
                declared_suit: None,
            }
        }
    }
}

/// Uniform random legal actions; useful for playthrough tests.
pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        RandomStrategy {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomStrategy {
    fn bid(&mut self, game: &Game, seat: usize) -> Bid {
        *game
            .legal_bids(seat)
            .choose(&mut self.rng)
            .expect("at least one bid is always legal")
    }

    fn pick_trump(&mut self, game: &Game, seat: usize) -> Option<Suit> {
        let _ = (game, seat);
        match self.rng.gen_range(0..5) {
            0 => None,
            1 => Some(Suit::Clubs),
            2 => Some(Suit::Diamonds),
            3 => Some(Suit::Hearts),
            _ => Some(Suit::Spades),
        }
    }

    fn choose_play(&mut self, game: &Game, seat: usize) -> PlayChoice {
        let card_id = *game
            .playable_cards()
            .choose(&mut self.rng)
            .expect("a seat to act always holds a card");
        let card = game.hands[seat]
            .iter()
            .find(|c| c.id == card_id)
            .expect("playable card is in hand");
        PlayChoice {
            card_id,
            joker_call: card.is_joker.then(|| {
                if self.rng.gen_bool(0.5) {
                    JokerCall::High
                } else {
                    JokerCall::Low
                }
            }),
            declared_suit: None,
        }
    }

    fn name(&self) -> &str {
        "random"
    }
}

// Crude per-rank win likelihoods for the expected-tricks estimator.
fn rank_estimate(rank: Rank) -> f64 {
    match rank {
        Rank::Ace => 1.0,
        Rank::King => 0.8,
        Rank::Queen => 0.6,
        Rank::Jack => 0.5,
        Rank::Ten => 0.4,
        Rank::Nine => 0.3,
        Rank::Eight => 0.2,
        Rank::Seven => 0.12,
        Rank::Six => 0.06,
    }
}

fn expected_tricks(hand: &[Card], trump: Option<Suit>) -> f64 {
    hand.iter()
        .map(|c| {
            if c.is_joker {
                0.9
            } else if Some(c.suit) == trump {
                rank_estimate(c.rank) * 1.2
            } else {
                rank_estimate(c.rank) * 0.8
            }
        })
        .sum()
}

/// The hand-strength bot: bids its expected tricks, calls trump from suit
/// density, ducks when its bid is already safe and pushes when it is short.
pub struct HeuristicStrategy;

impl HeuristicStrategy {
    pub fn new() -> Self {
        HeuristicStrategy
    }

    fn needs_to_win(&self, game: &Game, seat: usize) -> bool {
        let bid = game.bids[seat].unwrap_or(Bid::Pass);
        match bid {
            Bid::Pass => false,
            Bid::Number(value) => {
                let remaining = game.hands[seat].len() as i32;
                let need = (value as i32 - game.taken[seat]).max(0);
                need * 2 >= remaining
            }
        }
    }
}

impl Default for HeuristicStrategy {
    fn default() -> Self {
        HeuristicStrategy::new()
    }
}

impl Strategy for HeuristicStrategy {
    fn bid(&mut self, game: &Game, seat: usize) -> Bid {
        let estimate = expected_tricks(&game.hands[seat], game.trump).round() as i64;
        let value = estimate.clamp(0, game.hand_size as i64) as u8;
        let wanted = if value == 0 { Bid::Pass } else { Bid::Number(value) };
        let legal = game.legal_bids(seat);
        if legal.contains(&wanted) {
            return wanted;
        }
        // Dealer squeezed by the forbidden total: bid the nearest legal value
        legal
            .iter()
            .copied()
            .min_by_key(|b| (b.value() as i32 - value as i32).abs())
            .unwrap_or(Bid::Pass)
    }

    fn pick_trump(&mut self, game: &Game, seat: usize) -> Option<Suit> {
        let hand = &game.hands[seat];
        let mut totals: Vec<(Suit, f64)> = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
            .into_iter()
            .map(|suit| {
                let total = hand
                    .iter()
                    .filter(|c| !c.is_joker && c.suit == suit)
                    .map(|c| rank_estimate(c.rank))
                    .sum();
                (suit, total)
            })
            .collect();
        totals.sort_by(|a, b| b.1.partial_cmp(&a.1).expect("totals are finite"));
        // A balanced hand prefers no-trump
        if totals[0].1 - totals[1].1 < 0.3 {
            return None;
        }
        Some(totals[0].0)
    }

    fn choose_play(&mut self, game: &Game, seat: usize) -> PlayChoice {
        let hand = &game.hands[seat];
        let playable = game.playable_cards();
        let score_of = |id: &i32| {
            let card = hand
                .iter()
                .find(|c| c.id == *id)
                .expect("playable card is in hand");
            if card.is_joker {
                100
            } else {
                card.rank.weight()
            }
        };
        let need_to_win = self.needs_to_win(game, seat);
        let card_id = if need_to_win {
            *playable.iter().max_by_key(|id| score_of(id)).expect("hand is not empty")
        } else {
            *playable.iter().min_by_key(|id| score_of(id)).expect("hand is not empty")
        };
        let card = hand
            .iter()
            .find(|c| c.id == card_id)
            .expect("playable card is in hand");
        PlayChoice {
            card_id,
            joker_call: card.is_joker.then_some(if need_to_win {
                JokerCall::High
            } else {
                JokerCall::Low
            }),
            // Leave the suit call to the engine's default policy
            declared_suit: None,
        }
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
