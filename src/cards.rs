//! The 36 card deck: four suits, ranks six through ace, with the six of
//! spades and six of clubs flagged as jokers. The deck is built from a seed
//! so the same seed always produces the same shuffled order.

use enum_iterator::{all, Sequence};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub const DECK_SIZE: usize = 36;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Sequence,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "camelCase")]
pub enum Suit {
    #[default]
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub fn letter(&self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Sequence,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
)]
#[serde(rename_all = "camelCase")]
pub enum Rank {
    #[default]
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Fixed comparison weight: A=9 down to 6=1.
    pub fn weight(&self) -> i32 {
        match self {
            Rank::Six => 1,
            Rank::Seven => 2,
            Rank::Eight => 3,
            Rank::Nine => 4,
            Rank::Ten => 5,
            Rank::Jack => 6,
            Rank::Queen => 7,
            Rank::King => 8,
            Rank::Ace => 9,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique within a single deal, used for removal-from-hand identity.
    pub id: i32,
    pub suit: Suit,
    pub rank: Rank,
    /// Jokers keep their printed suit and rank for display; neither is
    /// consulted for comparison or follow-suit once this flag is set.
    pub is_joker: bool,
}

impl Card {
    /// Asset lookup key for the presentation layer ("AS.svg" style).
    pub fn display_key(&self) -> String {
        format!("{}{}.svg", self.rank.letter(), self.suit.letter())
    }
}

/// Build the shuffled 36 card deck for one deal. Deterministic: the same
/// seed always yields the same order.
pub fn build_deck(seed: u64) -> Vec<Card> {
    let mut deck: Vec<Card> = Vec::with_capacity(DECK_SIZE);
    let mut id = 0;
    for suit in all::<Suit>() {
        for rank in all::<Rank>() {
            let is_joker = rank == Rank::Six && (suit == Suit::Spades || suit == Suit::Clubs);
            deck.push(Card {
                id,
                suit,
                rank,
                is_joker,
            });
            id += 1;
        }
    }
    let mut rng = StdRng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
    deck
}
