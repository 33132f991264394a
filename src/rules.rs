//! Trick legality and winner resolution, including the joker override
//! rules: a joker is played with a high or low call, is never blocked by
//! the follow-suit obligation, and when led declares the suit the rest of
//! the table must follow.

use std::cmp::Ordering;

use enum_iterator::all;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit};
use crate::sequence::SEATS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum JokerCall {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    pub seat: usize,
    pub card: Card,
    pub joker_call: Option<JokerCall>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Trick {
    pub leader: usize,
    pub plays: Vec<Play>,
    /// Set when the leader opens with a joker and calls a suit.
    pub declared_lead_suit: Option<Suit>,
    pub winner: Option<usize>,
}

impl Trick {
    pub fn new(leader: usize) -> Self {
        Trick {
            leader,
            plays: Vec::with_capacity(SEATS),
            declared_lead_suit: None,
            winner: None,
        }
    }

    /// The suit followers are held to: the first non-joker play's suit, or
    /// the suit the leader declared when opening with a joker.
    pub fn lead_suit(&self) -> Option<Suit> {
        match self.plays.first() {
            Some(play) if play.card.is_joker => self.declared_lead_suit,
            Some(play) => Some(play.card.suit),
            None => None,
        }
    }

    /// Seat whose turn it is, clockwise from the leader.
    pub fn seat_to_act(&self) -> usize {
        (self.leader + self.plays.len()) % SEATS
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == SEATS
    }
}

/// Ids of the cards `hand` may legally play against `lead_suit`. Jokers are
/// always legal; everyone else must follow the lead when they can.
pub fn playable_card_ids(hand: &[Card], lead_suit: Option<Suit>) -> Vec<i32> {
    if let Some(lead) = lead_suit {
        let can_follow = hand.iter().any(|c| !c.is_joker && c.suit == lead);
        if can_follow {
            return hand
                .iter()
                .filter(|c| c.is_joker || c.suit == lead)
                .map(|c| c.id)
                .collect();
        }
    }
    hand.iter().map(|c| c.id).collect()
}

/// Default suit call when a joker is led without a declaration: trump if
/// one is in force, otherwise the suit with the highest weighted rank total
/// in the leader's remaining hand.
pub fn default_declared_suit(hand: &[Card], trump: Option<Suit>) -> Suit {
    if let Some(trump) = trump {
        return trump;
    }
    let mut best = Suit::Clubs;
    let mut best_total = -1;
    for suit in all::<Suit>() {
        let total: i32 = hand
            .iter()
            .filter(|c| !c.is_joker && c.suit == suit)
            .map(|c| c.rank.weight())
            .sum();
        if total > best_total {
            best = suit;
            best_total = total;
        }
    }
    best
}

/// Total-order strength of a play within its trick. Play order breaks all
/// joker-vs-joker ties (later wins) and orders the cards that cannot win.
fn play_strength(play: &Play, order: usize, lead_suit: Option<Suit>, trump: Option<Suit>) -> i32 {
    let base = if play.card.is_joker {
        match play.joker_call {
            // A high joker loses only to trump when the lead suit is a
            // non-trump suit.
            Some(JokerCall::High) => match (trump, lead_suit) {
                (Some(t), Some(lead)) if lead != t => 150,
                _ => 1000,
            },
            // A low joker loses to every regular card.
            Some(JokerCall::Low) | None => -1,
        }
    } else {
        let mut value = play.card.rank.weight();
        if Some(play.card.suit) == lead_suit {
            value += 100;
        }
        if Some(play.card.suit) == trump {
            value += 200;
        }
        value
    };
    base * SEATS as i32 + order as i32
}

/// Strict total order over two plays of the same trick.
pub fn compare_plays(
    a: (&Play, usize),
    b: (&Play, usize),
    lead_suit: Option<Suit>,
    trump: Option<Suit>,
) -> Ordering {
    play_strength(a.0, a.1, lead_suit, trump).cmp(&play_strength(b.0, b.1, lead_suit, trump))
}

/// The seat holding the greatest play under `compare_plays`.
pub fn winner_of(trick: &Trick, trump: Option<Suit>) -> usize {
    let lead_suit = trick.lead_suit();
    trick
        .plays
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| compare_plays((a, *ia), (b, *ib), lead_suit, trump))
        .map(|(_, play)| play.seat)
        .expect("a completed trick has plays")
}
