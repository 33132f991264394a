use thiserror::Error;

use crate::cards::Suit;

/// Everything the engine can reject. A rejected action is a no-op: the
/// caller gets the error back and the game state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("bid of {value} is out of range for a {hand_size} card hand")]
    BidOutOfRange { value: u8, hand_size: u8 },
    #[error("dealer may not bring the bid total to {hand_size}")]
    ForbiddenBidTotal { hand_size: u8 },
    #[error("seat {seat} acted but seat {expected} is to act")]
    OutOfTurn { seat: usize, expected: usize },
    #[error("card {card_id} is not in seat {seat}'s hand")]
    CardNotInHand { seat: usize, card_id: i32 },
    #[error("must follow the {lead_suit:?} lead")]
    MustFollowSuit { lead_suit: Suit },
    #[error("a joker play needs a high or low call")]
    MissingJokerCall,
    #[error("action does not match the current phase")]
    PhaseMismatch,
    #[error("deal of {hand_size} cards per seat would overrun the deck")]
    InvalidDealSpec { hand_size: u8 },
    #[error("the deal sequence is exhausted")]
    GameOver,
}
