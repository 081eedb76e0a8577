//! The 52-card deck used for a single round.
//!
//! A fresh deck is built and shuffled at the start of every round and is owned
//! by that round only.  Cards are drawn by popping from the end of the
//! underlying vector.  A round never legitimately draws more than ~20 cards,
//! but drawing from an empty deck is still reported as an error rather than a
//! panic so the caller can abort the round cleanly.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::trace;

use super::card::{Card, Suit, MAX_RANK, MIN_RANK};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Errors that can occur while drawing from a [`Deck`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    /// Every card has already been drawn.
    #[error("deck exhausted after {drawn} cards")]
    Exhausted { drawn: usize },
}

/// An ordered pile of cards.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    drawn: usize,
}

impl Deck {
    /// Returns the 52 cards in suit-major order (unshuffled).
    pub fn ordered() -> Self {
        let cards = Suit::ALL
            .iter()
            .flat_map(|&suit| {
                (MIN_RANK..=MAX_RANK).filter_map(move |rank| Card::new(rank, suit).ok())
            })
            .collect();
        Self { cards, drawn: 0 }
    }

    /// Returns a full deck shuffled with the thread-local RNG.
    pub fn shuffled() -> Self {
        Self::shuffled_with(&mut rand::thread_rng())
    }

    /// Returns a full deck shuffled with the supplied RNG.
    pub fn shuffled_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.cards.shuffle(rng);
        trace!("shuffled a fresh {DECK_SIZE}-card deck");
        deck
    }

    /// Builds a deck that deals `draw_order` front to back.
    ///
    /// The first card yielded by the iterator is the first card drawn.  Used to
    /// script rounds in tests.
    pub fn stacked(draw_order: impl IntoIterator<Item = Card>) -> Self {
        let mut cards: Vec<Card> = draw_order.into_iter().collect();
        cards.reverse();
        Self { cards, drawn: 0 }
    }

    /// Removes and returns the top card.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Exhausted`] when no cards remain.
    pub fn draw(&mut self) -> Result<Card, DeckError> {
        let card = self
            .cards
            .pop()
            .ok_or(DeckError::Exhausted { drawn: self.drawn })?;
        self.drawn += 1;
        Ok(card)
    }

    /// Number of cards still available.
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Number of cards drawn so far.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}
