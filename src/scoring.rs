//! Bids and the non-linear score table. The khisht penalty (bid at least
//! one, take zero) and the exact-bid rewards are configuration, not
//! literals, so variant rule sets can be selected without touching the
//! engine.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Bid {
    Pass,
    Number(u8),
}

impl Bid {
    /// Numeric value used for the dealer's forbidden-total check.
    pub fn value(&self) -> u8 {
        match self {
            Bid::Pass => 0,
            Bid::Number(v) => *v,
        }
    }
}

/// How trump is determined for the four 9 card deals. Historical rule sets
/// disagree; the decider pick is the canonical choice here.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NineCardTrumpPolicy {
    /// Deal 3 cards to each seat, the seat left of the dealer declares a
    /// suit or no-trump, then the remaining 6 cards go out.
    #[default]
    DeciderPick,
    /// The dealer's last dealt card sets trump (no-trump on a joker).
    DealerLastCard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RulesConfig {
    pub nine_card_trump: NineCardTrumpPolicy,
    /// Khisht magnitude for the ascending/descending 1..8 phases.
    pub khisht_regular: i32,
    /// Khisht magnitude for the four 9 card phases.
    pub khisht_nines: i32,
    /// Reward for taking exactly the bid number, indexed by bid 1..=9.
    pub exact_rewards: [i32; 9],
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            nine_card_trump: NineCardTrumpPolicy::DeciderPick,
            khisht_regular: 200,
            khisht_nines: 500,
            exact_rewards: [100, 150, 200, 250, 300, 350, 400, 450, 900],
        }
    }
}

pub static DEFAULT_RULES: Lazy<RulesConfig> = Lazy::new(RulesConfig::default);

impl RulesConfig {
    pub fn khisht_penalty(&self, phase: u8) -> i32 {
        if phase == 2 || phase == 4 {
            self.khisht_nines
        } else {
            self.khisht_regular
        }
    }

    pub fn exact_reward(&self, bid_value: u8) -> i32 {
        match bid_value {
            1..=9 => self.exact_rewards[bid_value as usize - 1],
            _ => 0,
        }
    }
}

/// Score one seat's deal. Returns the score delta and whether the khisht
/// penalty applied.
pub fn score_for(config: &RulesConfig, bid: Bid, taken: i32, phase: u8) -> (i32, bool) {
    match bid {
        Bid::Pass => {
            if taken == 0 {
                (50, false)
            } else {
                (-10 * taken, false)
            }
        }
        Bid::Number(value) => {
            if taken == 0 && value >= 1 {
                return (-config.khisht_penalty(phase), true);
            }
            if taken == value as i32 {
                return (config.exact_reward(value), false);
            }
            (-10 * taken, false)
        }
    }
}
