//! Playing card value type.
//!
//! A card is a `(rank, suit)` pair.  Ranks run 1..=13 where 1 is the Ace and
//! 11/12/13 are Jack/Queen/King.  Suits are encoded on the wire as 0..=3.

use std::fmt;

use thiserror::Error;

/// Lowest valid rank (Ace).
pub const MIN_RANK: u8 = 1;
/// Highest valid rank (King).
pub const MAX_RANK: u8 = 13;

/// Errors produced when constructing a [`Card`] from raw values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("card rank out of range: {0} (expected 1..=13)")]
    InvalidRank(u16),
    #[error("card suit out of range: {0} (expected 0..=3)")]
    InvalidSuit(u8),
}

/// Card suit, with its wire encoding as the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
}

impl Suit {
    /// All suits in wire order.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn name(self) -> &'static str {
        match self {
            Suit::Hearts => "Hearts",
            Suit::Diamonds => "Diamonds",
            Suit::Clubs => "Clubs",
            Suit::Spades => "Spades",
        }
    }
}

impl TryFrom<u8> for Suit {
    type Error = CardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Suit::Hearts),
            1 => Ok(Suit::Diamonds),
            2 => Ok(Suit::Clubs),
            3 => Ok(Suit::Spades),
            other => Err(CardError::InvalidSuit(other)),
        }
    }
}

/// A single playing card.
///
/// Fields are private so a `Card` can only exist with a valid rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    rank: u8,
    suit: Suit,
}

impl Card {
    /// Creates a card, validating the rank.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::InvalidRank`] if `rank` is outside 1..=13.
    pub fn new(rank: u8, suit: Suit) -> Result<Self, CardError> {
        if !(MIN_RANK..=MAX_RANK).contains(&rank) {
            return Err(CardError::InvalidRank(u16::from(rank)));
        }
        Ok(Self { rank, suit })
    }

    /// Builds a card from its raw wire fields (2-byte rank, 1-byte suit).
    ///
    /// # Errors
    ///
    /// Returns [`CardError`] if either field is out of range.
    pub fn from_wire(rank: u16, suit: u8) -> Result<Self, CardError> {
        let rank = u8::try_from(rank).map_err(|_| CardError::InvalidRank(rank))?;
        Card::new(rank, Suit::try_from(suit)?)
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn is_ace(&self) -> bool {
        self.rank == 1
    }

    /// Blackjack points before soft-ace reduction: Ace 11, ten and faces 10.
    pub fn points(&self) -> u8 {
        match self.rank {
            1 => 11,
            10..=13 => 10,
            n => n,
        }
    }

    fn rank_name(&self) -> String {
        match self.rank {
            1 => "Ace".to_string(),
            11 => "Jack".to_string(),
            12 => "Queen".to_string(),
            13 => "King".to_string(),
            n => n.to_string(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.rank_name(), self.suit.name())
    }
}
