//! The fixed 24 deal schedule: hand sizes climb 1..8, four 9 card deals,
//! descend 8..1, then four more 9 card deals. The dealer button moves one
//! seat clockwise after every deal and never resets between phases.

use serde::{Deserialize, Serialize};

use crate::cards::DECK_SIZE;
use crate::error::GameError;

pub const SEATS: usize = 4;
pub const TOTAL_DEALS: usize = 24;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DealSpec {
    pub phase: u8,
    pub hand_size: u8,
}

impl DealSpec {
    /// A malformed spec is rejected before any card is dealt.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.hand_size == 0 || SEATS * self.hand_size as usize > DECK_SIZE {
            return Err(GameError::InvalidDealSpec {
                hand_size: self.hand_size,
            });
        }
        Ok(())
    }
}

pub fn full_sequence() -> Vec<DealSpec> {
    let mut sequence = Vec::with_capacity(TOTAL_DEALS);
    for hand_size in 1..=8 {
        sequence.push(DealSpec { phase: 1, hand_size });
    }
    for _ in 0..4 {
        sequence.push(DealSpec {
            phase: 2,
            hand_size: 9,
        });
    }
    for hand_size in (1..=8).rev() {
        sequence.push(DealSpec { phase: 3, hand_size });
    }
    for _ in 0..4 {
        sequence.push(DealSpec {
            phase: 4,
            hand_size: 9,
        });
    }
    sequence
}
