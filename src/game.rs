//! The Joker game state machine: deal setup, the bidding round with the
//! dealer's forbidden-total rule, trick play, and scoring across the fixed
//! 24 deal sequence.
//!
//! Transitions are pure: `apply` maps the current state and an action to a
//! fresh state or an error, never mutating in place. The `submit_bid` /
//! `pick_trump` / `play_card` wrappers replace the state only on success,
//! so a rejected action is a strict no-op.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::{build_deck, Card, Suit};
use crate::error::GameError;
use crate::rules::{
    default_declared_suit, playable_card_ids, winner_of, JokerCall, Play, Trick,
};
use crate::scoring::{score_for, Bid, NineCardTrumpPolicy, RulesConfig, DEFAULT_RULES};
use crate::sequence::{full_sequence, DealSpec, SEATS, TOTAL_DEALS};

/// What the engine is waiting for.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum State {
    #[default]
    Bidding,
    // The seat left of the dealer declares trump from its first 3 cards
    // before the rest of a 9 card deal goes out
    PickingTrump,
    // Trick taking
    Play,
}

/// One mutating entry point per kind of turn. Bot and human seats submit
/// the same actions through the same validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Bid {
        seat: usize,
        bid: Bid,
    },
    PickTrump {
        seat: usize,
        trump: Option<Suit>,
    },
    Play {
        seat: usize,
        card_id: i32,
        joker_call: Option<JokerCall>,
        declared_suit: Option<Suit>,
    },
}

/// Sealed outcome of one deal, appended to history exactly once and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DealResult {
    pub bids: [Bid; SEATS],
    pub taken: [i32; SEATS],
    pub scores: [i32; SEATS],
    pub khisht_applied: [bool; SEATS],
    pub trump: Option<Suit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub config: RulesConfig,
    /// Master seed; each deal's deck seed is derived from it.
    pub seed: u64,
    /// Index into the 24 deal sequence.
    pub round: usize,
    pub dealer: usize,
    pub phase: u8,
    pub hand_size: u8,
    pub state: State,
    /// Sole turn token: the seat whose action is accepted next.
    pub current_player: usize,
    pub trump: Option<Suit>,
    /// Only set during the 9 card two-stage deal.
    pub trump_decider: Option<usize>,
    /// Undealt cards held back between the two stages of a 9 card deal.
    pub stock: Vec<Card>,
    pub hands: [Vec<Card>; SEATS],
    pub bids: [Option<Bid>; SEATS],
    pub taken: [i32; SEATS],
    pub scores: [i32; SEATS],
    pub current_trick: Trick,
    pub history: Vec<DealResult>,
    pub winner: Option<usize>,
}

/// Unique-but-deterministic deck seed per deal so any single deal can be
/// replayed from the game seed alone.
fn derive_deck_seed(game_seed: u64, round: usize) -> u64 {
    game_seed.wrapping_add((round as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

impl Game {
    pub fn new(seed: u64) -> Game {
        Game::new_with_config(seed, DEFAULT_RULES.clone())
    }

    pub fn new_with_config(seed: u64, config: RulesConfig) -> Game {
        let mut game = Game {
            config,
            seed,
            round: 0,
            // Seat 3 deals first so seat 0 opens the bidding.
            dealer: 3,
            phase: 1,
            hand_size: 1,
            state: State::Bidding,
            current_player: 0,
            trump: None,
            trump_decider: None,
            stock: vec![],
            hands: Default::default(),
            bids: [None; SEATS],
            taken: [0; SEATS],
            scores: [0; SEATS],
            current_trick: Trick::default(),
            history: vec![],
            winner: None,
        };
        game.deal().expect("the fixed sequence only holds valid specs");
        game
    }

    /// Pure transition: the same state and action always produce the same
    /// result, and an error leaves the caller's state untouched.
    pub fn apply(&self, action: Action) -> Result<Game, GameError> {
        let mut next = self.clone();
        match action {
            Action::Bid { seat, bid } => next.handle_bid(seat, bid)?,
            Action::PickTrump { seat, trump } => next.handle_pick_trump(seat, trump)?,
            Action::Play {
                seat,
                card_id,
                joker_call,
                declared_suit,
            } => next.handle_play(seat, card_id, joker_call, declared_suit)?,
        }
        Ok(next)
    }

    pub fn submit_bid(&mut self, seat: usize, bid: Bid) -> Result<(), GameError> {
        *self = self.apply(Action::Bid { seat, bid })?;
        Ok(())
    }

    pub fn pick_trump(&mut self, seat: usize, trump: Option<Suit>) -> Result<(), GameError> {
        *self = self.apply(Action::PickTrump { seat, trump })?;
        Ok(())
    }

    pub fn play_card(
        &mut self,
        seat: usize,
        card_id: i32,
        joker_call: Option<JokerCall>,
        declared_suit: Option<Suit>,
    ) -> Result<(), GameError> {
        *self = self.apply(Action::Play {
            seat,
            card_id,
            joker_call,
            declared_suit,
        })?;
        Ok(())
    }

    /// Bids the acting seat may legally make. Only the dealer, bidding
    /// last, is constrained: no value may bring the total to the hand size.
    pub fn legal_bids(&self, seat: usize) -> Vec<Bid> {
        if self.state != State::Bidding || seat != self.current_player {
            return vec![];
        }
        let mut bids = vec![Bid::Pass];
        bids.extend((0..=self.hand_size).map(Bid::Number));
        if seat == self.dealer {
            let others: u8 = self
                .bids
                .iter()
                .flatten()
                .map(|b| b.value())
                .sum();
            bids.retain(|b| others + b.value() != self.hand_size);
        }
        bids
    }

    /// Card ids the acting seat may legally play right now.
    pub fn playable_cards(&self) -> Vec<i32> {
        if self.state != State::Play {
            return vec![];
        }
        playable_card_ids(
            &self.hands[self.current_player],
            self.current_trick.lead_suit(),
        )
    }

    fn left_of_dealer(&self) -> usize {
        (self.dealer + 1) % SEATS
    }

    // Start of a deal: fresh deck, fresh counters, trump per phase policy.
    fn deal(&mut self) -> Result<(), GameError> {
        let sequence = full_sequence();
        let spec: DealSpec = *sequence.get(self.round).ok_or(GameError::GameOver)?;
        spec.validate()?;
        self.phase = spec.phase;
        self.hand_size = spec.hand_size;
        self.trump = None;
        self.trump_decider = None;
        self.bids = [None; SEATS];
        self.taken = [0; SEATS];
        self.hands = Default::default();
        self.current_trick = Trick::default();

        let mut deck = build_deck(derive_deck_seed(self.seed, self.round));
        if spec.hand_size == 9 && self.config.nine_card_trump == NineCardTrumpPolicy::DeciderPick {
            // Two-stage deal: 3 cards each, a trump call, then the rest.
            self.deal_cards(&mut deck, 3);
            self.stock = deck;
            self.trump_decider = Some(self.left_of_dealer());
            self.current_player = self.left_of_dealer();
            self.state = State::PickingTrump;
        } else {
            self.deal_cards(&mut deck, spec.hand_size as usize);
            self.trump = if spec.hand_size == 9 {
                // Dealer's last dealt card under the alternate policy
                self.hands[self.dealer]
                    .last()
                    .filter(|c| !c.is_joker)
                    .map(|c| c.suit)
            } else {
                // The card that would have been dealt next
                deck.pop().filter(|c| !c.is_joker).map(|c| c.suit)
            };
            self.stock = vec![];
            self.current_player = self.left_of_dealer();
            self.state = State::Bidding;
        }
        debug!(
            round = self.round,
            phase = self.phase,
            hand_size = self.hand_size,
            dealer = self.dealer,
            trump = ?self.trump,
            "deal start"
        );
        Ok(())
    }

    // Deals clockwise from the left of the dealer, one card at a time.
    fn deal_cards(&mut self, deck: &mut Vec<Card>, count: usize) {
        for _ in 0..count {
            for offset in 0..SEATS {
                let seat = (self.dealer + 1 + offset) % SEATS;
                let card = deck.pop().expect("spec was validated against the deck");
                self.hands[seat].push(card);
            }
        }
    }

    fn check_turn(&self, seat: usize, state: State) -> Result<(), GameError> {
        if self.state != state {
            return Err(GameError::PhaseMismatch);
        }
        if seat != self.current_player {
            return Err(GameError::OutOfTurn {
                seat,
                expected: self.current_player,
            });
        }
        Ok(())
    }

    fn handle_bid(&mut self, seat: usize, bid: Bid) -> Result<(), GameError> {
        self.check_turn(seat, State::Bidding)?;
        if bid.value() > self.hand_size {
            return Err(GameError::BidOutOfRange {
                value: bid.value(),
                hand_size: self.hand_size,
            });
        }
        if seat == self.dealer {
            let others: u8 = self.bids.iter().flatten().map(|b| b.value()).sum();
            if others + bid.value() == self.hand_size {
                return Err(GameError::ForbiddenBidTotal {
                    hand_size: self.hand_size,
                });
            }
        }
        self.bids[seat] = Some(bid);
        self.current_player = (seat + 1) % SEATS;
        if self.bids.iter().all(|b| b.is_some()) {
            // Dealer bid last: play starts left of the dealer
            let leader = self.left_of_dealer();
            self.current_trick = Trick::new(leader);
            self.current_player = leader;
            self.state = State::Play;
        }
        Ok(())
    }

    fn handle_pick_trump(&mut self, seat: usize, trump: Option<Suit>) -> Result<(), GameError> {
        self.check_turn(seat, State::PickingTrump)?;
        self.trump = trump;
        // Second stage: the remaining 6 cards each
        let mut stock = std::mem::take(&mut self.stock);
        self.deal_cards(&mut stock, (self.hand_size as usize) - 3);
        self.current_player = self.left_of_dealer();
        self.state = State::Bidding;
        Ok(())
    }

    fn handle_play(
        &mut self,
        seat: usize,
        card_id: i32,
        joker_call: Option<JokerCall>,
        declared_suit: Option<Suit>,
    ) -> Result<(), GameError> {
        self.check_turn(seat, State::Play)?;
        let card: Card = *self.hands[seat]
            .iter()
            .find(|c| c.id == card_id)
            .ok_or(GameError::CardNotInHand { seat, card_id })?;
        if card.is_joker && joker_call.is_none() {
            return Err(GameError::MissingJokerCall);
        }
        if let Some(lead) = self.current_trick.lead_suit() {
            let must_follow = self.hands[seat]
                .iter()
                .any(|c| !c.is_joker && c.suit == lead);
            if must_follow && !card.is_joker && card.suit != lead {
                return Err(GameError::MustFollowSuit { lead_suit: lead });
            }
        }

        if self.current_trick.plays.is_empty() && card.is_joker {
            // A joker lead calls the suit the table must follow; left
            // undeclared, the default policy fills it in.
            let declared = declared_suit
                .unwrap_or_else(|| default_declared_suit(&self.hands[seat], self.trump));
            self.current_trick.declared_lead_suit = Some(declared);
        }

        self.hands[seat].retain(|c| c.id != card_id);
        self.current_trick.plays.push(Play {
            seat,
            card,
            joker_call: if card.is_joker { joker_call } else { None },
        });
        self.current_player = (seat + 1) % SEATS;

        if self.current_trick.is_complete() {
            let trick_winner = winner_of(&self.current_trick, self.trump);
            self.current_trick.winner = Some(trick_winner);
            self.taken[trick_winner] += 1;
            if self.hands.iter().all(|h| h.is_empty()) {
                self.finish_deal()?;
            } else {
                // Winner of the trick leads the next one
                self.current_trick = Trick::new(trick_winner);
                self.current_player = trick_winner;
            }
        }
        Ok(())
    }

    fn finish_deal(&mut self) -> Result<(), GameError> {
        let bids = self.bids.map(|b| b.expect("all seats bid before play"));
        let mut deal_scores = [0; SEATS];
        let mut khisht_applied = [false; SEATS];
        for seat in 0..SEATS {
            let (score, khisht) = score_for(&self.config, bids[seat], self.taken[seat], self.phase);
            deal_scores[seat] = score;
            khisht_applied[seat] = khisht;
            self.scores[seat] += score;
        }
        debug!(
            round = self.round,
            scores = ?deal_scores,
            taken = ?self.taken,
            "deal scored"
        );
        self.history.push(DealResult {
            bids,
            taken: self.taken,
            scores: deal_scores,
            khisht_applied,
            trump: self.trump,
        });
        self.dealer = (self.dealer + 1) % SEATS;
        self.round += 1;
        if self.round >= TOTAL_DEALS {
            // First seat among the tied maximums wins, favoring the human
            let max_score = *self.scores.iter().max().expect("four scores");
            self.winner = self.scores.iter().position(|s| *s == max_score);
            return Ok(());
        }
        self.deal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Rank;

    fn bare_game() -> Game {
        Game::new(11)
    }

    #[test]
    fn test_new_game_starts_the_sequence() {
        let game = bare_game();
        assert_eq!(game.round, 0);
        assert_eq!(game.phase, 1);
        assert_eq!(game.hand_size, 1);
        assert_eq!(game.dealer, 3);
        assert_eq!(game.current_player, 0);
        assert_eq!(game.state, State::Bidding);
        for hand in &game.hands {
            assert_eq!(hand.len(), 1);
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        assert_eq!(Game::new(99), Game::new(99));
    }

    #[test]
    fn test_bidding_rejects_out_of_turn() {
        let mut game = bare_game();
        let before = game.clone();
        let err = game.submit_bid(2, Bid::Pass).unwrap_err();
        assert_eq!(err, GameError::OutOfTurn { seat: 2, expected: 0 });
        // rejected call left the state untouched
        assert_eq!(game, before);
    }

    #[test]
    fn test_bidding_rejects_out_of_range() {
        let mut game = bare_game();
        assert_eq!(
            game.submit_bid(0, Bid::Number(2)),
            Err(GameError::BidOutOfRange {
                value: 2,
                hand_size: 1
            })
        );
    }

    #[test]
    fn test_dealer_forbidden_total() {
        let mut game = bare_game();
        game.submit_bid(0, Bid::Number(1)).unwrap();
        game.submit_bid(1, Bid::Pass).unwrap();
        game.submit_bid(2, Bid::Pass).unwrap();
        // Total already sits at the hand size: the dealer may not pass or
        // bid zero, only push the total past it.
        assert_eq!(
            game.submit_bid(3, Bid::Pass),
            Err(GameError::ForbiddenBidTotal { hand_size: 1 })
        );
        assert_eq!(
            game.submit_bid(3, Bid::Number(0)),
            Err(GameError::ForbiddenBidTotal { hand_size: 1 })
        );
        assert_eq!(game.legal_bids(3), vec![Bid::Number(1)]);
        game.submit_bid(3, Bid::Number(1)).unwrap();
        assert_eq!(game.state, State::Play);
        let total: u8 = game.bids.iter().flatten().map(|b| b.value()).sum();
        assert_ne!(total, game.hand_size);
    }

    #[test]
    fn test_non_dealer_may_tie_the_total() {
        let mut game = bare_game();
        // Seat 0 alone may bring the running total to the hand size.
        game.submit_bid(0, Bid::Number(1)).unwrap();
        assert_eq!(game.bids[0], Some(Bid::Number(1)));
    }

    #[test]
    fn test_bidding_order_is_clockwise_from_left_of_dealer() {
        let mut game = bare_game();
        for seat in 0..3 {
            assert_eq!(game.current_player, seat);
            game.submit_bid(seat, Bid::Pass).unwrap();
        }
        assert_eq!(game.current_player, 3);
    }

    #[test]
    fn test_play_rejects_card_not_in_hand() {
        let mut game = bare_game();
        for seat in 0..3 {
            game.submit_bid(seat, Bid::Pass).unwrap();
        }
        game.submit_bid(3, Bid::Number(1)).unwrap();
        let err = game.play_card(0, 999, None, None).unwrap_err();
        assert_eq!(
            err,
            GameError::CardNotInHand {
                seat: 0,
                card_id: 999
            }
        );
    }

    #[test]
    fn test_joker_play_requires_call() {
        let mut game = bare_game();
        for seat in 0..3 {
            game.submit_bid(seat, Bid::Pass).unwrap();
        }
        game.submit_bid(3, Bid::Number(1)).unwrap();
        // Force a joker into the leader's hand.
        game.hands[0] = vec![Card {
            id: 500,
            suit: Suit::Spades,
            rank: Rank::Six,
            is_joker: true,
        }];
        assert_eq!(
            game.play_card(0, 500, None, None),
            Err(GameError::MissingJokerCall)
        );
        game.play_card(0, 500, Some(JokerCall::High), Some(Suit::Hearts))
            .unwrap();
        assert_eq!(game.current_trick.declared_lead_suit, Some(Suit::Hearts));
    }

    #[test]
    fn test_must_follow_suit() {
        let mut game = bare_game();
        for seat in 0..3 {
            game.submit_bid(seat, Bid::Pass).unwrap();
        }
        game.submit_bid(3, Bid::Number(1)).unwrap();
        game.hands[0] = vec![Card {
            id: 100,
            suit: Suit::Hearts,
            rank: Rank::Ace,
            is_joker: false,
        }];
        game.hands[1] = vec![
            Card {
                id: 101,
                suit: Suit::Hearts,
                rank: Rank::Six,
                is_joker: false,
            },
            Card {
                id: 102,
                suit: Suit::Clubs,
                rank: Rank::Ace,
                is_joker: false,
            },
        ];
        game.play_card(0, 100, None, None).unwrap();
        assert_eq!(
            game.play_card(1, 102, None, None),
            Err(GameError::MustFollowSuit {
                lead_suit: Suit::Hearts
            })
        );
        game.play_card(1, 101, None, None).unwrap();
    }

    // The end-to-end single-card deal from the scoring table: one trick,
    // one winner, per-seat deltas straight from the table.
    #[test]
    fn test_single_card_deal_end_to_end() {
        let mut game = bare_game();
        game.submit_bid(0, Bid::Number(1)).unwrap();
        game.submit_bid(1, Bid::Pass).unwrap();
        game.submit_bid(2, Bid::Pass).unwrap();
        game.submit_bid(3, Bid::Number(1)).unwrap();
        assert_eq!(game.state, State::Play);
        for _ in 0..SEATS {
            let seat = game.current_player;
            let card = game.hands[seat][0];
            let call = card.is_joker.then_some(JokerCall::High);
            game.play_card(seat, card.id, call, None).unwrap();
        }
        assert_eq!(game.history.len(), 1);
        let result = &game.history[0];
        assert_eq!(result.taken.iter().sum::<i32>(), 1);
        let winner = (0..SEATS).find(|s| result.taken[*s] == 1).unwrap();
        for seat in 0..SEATS {
            let expected = match (result.bids[seat], result.taken[seat]) {
                (Bid::Pass, 0) => 50,
                (Bid::Pass, n) => -10 * n,
                (Bid::Number(1), 0) => -200,
                (Bid::Number(1), 1) => 100,
                _ => unreachable!(),
            };
            assert_eq!(result.scores[seat], expected, "seat {seat}");
            assert_eq!(
                result.khisht_applied[seat],
                result.bids[seat] == Bid::Number(1) && seat != winner
            );
        }
        // Next deal is already set up with the button moved on.
        assert_eq!(game.round, 1);
        assert_eq!(game.hand_size, 2);
        assert_eq!(game.dealer, 0);
    }

    #[test]
    fn test_nine_card_deal_uses_trump_pick() {
        let mut game = bare_game();
        game.round = 8;
        game.deal().unwrap();
        assert_eq!(game.phase, 2);
        assert_eq!(game.state, State::PickingTrump);
        assert_eq!(game.trump_decider, Some(game.left_of_dealer()));
        for hand in &game.hands {
            assert_eq!(hand.len(), 3);
        }
        let decider = game.trump_decider.unwrap();
        assert_eq!(
            game.pick_trump((decider + 1) % SEATS, Some(Suit::Hearts)),
            Err(GameError::OutOfTurn {
                seat: (decider + 1) % SEATS,
                expected: decider
            })
        );
        game.pick_trump(decider, Some(Suit::Hearts)).unwrap();
        assert_eq!(game.trump, Some(Suit::Hearts));
        assert_eq!(game.state, State::Bidding);
        for hand in &game.hands {
            assert_eq!(hand.len(), 9);
        }
        assert!(game.stock.is_empty());
    }

    #[test]
    fn test_nine_card_deal_dealer_last_card_policy() {
        let config = RulesConfig {
            nine_card_trump: NineCardTrumpPolicy::DealerLastCard,
            ..RulesConfig::default()
        };
        let mut game = Game::new_with_config(11, config);
        game.round = 8;
        game.deal().unwrap();
        assert_eq!(game.state, State::Bidding);
        for hand in &game.hands {
            assert_eq!(hand.len(), 9);
        }
        let last = game.hands[game.dealer].last().unwrap();
        if last.is_joker {
            assert_eq!(game.trump, None);
        } else {
            assert_eq!(game.trump, Some(last.suit));
        }
    }

    #[test]
    fn test_small_deal_trump_comes_from_next_card() {
        // Replay the deal by hand from the derived seed and check the flip.
        let game = bare_game();
        let deck = build_deck(derive_deck_seed(game.seed, 0));
        let flip = deck[deck.len() - 1 - SEATS];
        if flip.is_joker {
            assert_eq!(game.trump, None);
        } else {
            assert_eq!(game.trump, Some(flip.suit));
        }
    }

    #[test]
    fn test_bid_during_play_is_phase_mismatch() {
        let mut game = bare_game();
        for seat in 0..3 {
            game.submit_bid(seat, Bid::Pass).unwrap();
        }
        game.submit_bid(3, Bid::Number(1)).unwrap();
        assert_eq!(game.submit_bid(0, Bid::Pass), Err(GameError::PhaseMismatch));
        assert_eq!(game.play_card(2, 0, None, None).unwrap_err(),
            GameError::OutOfTurn { seat: 2, expected: 0 });
    }

    #[test]
    fn test_apply_is_pure() {
        let game = bare_game();
        let next = game
            .apply(Action::Bid {
                seat: 0,
                bid: Bid::Pass,
            })
            .unwrap();
        assert_eq!(game.bids[0], None);
        assert_eq!(next.bids[0], Some(Bid::Pass));
    }
}
