//! Blackjack scoring and settlement rules.
//!
//! [`hand_value`] is the only place in the workspace that turns cards into a
//! number.  The server uses it to decide busts and outcomes, the client uses
//! it to show running totals, so both ends always agree on a hand's value.
//!
//! # Soft aces
//!
//! Every Ace is first counted as 11.  While the total is over 21 and at least
//! one Ace is still counted as 11, one of them is demoted to 1 (total -= 10).
//! The reduction is applied across the whole hand, never per card.

use super::card::Card;
use crate::protocol::messages::RoundResult;

/// The best possible hand value; anything above is a bust.
pub const BLACKJACK: u8 = 21;

/// The dealer stands on this value or higher (no soft-17 exception).
pub const DEALER_STAND_VALUE: u8 = 17;

/// Returns the blackjack value of `cards` with soft-ace reduction.
///
/// Pure function of the card sequence; an empty hand is worth 0.
///
/// ```rust
/// use blackjack_core::{hand_value, Card, Suit};
///
/// let ace = Card::new(1, Suit::Hearts).unwrap();
/// let king = Card::new(13, Suit::Spades).unwrap();
/// assert_eq!(hand_value(&[ace, king]), 21);
/// assert_eq!(hand_value(&[ace, ace]), 12);
/// ```
pub fn hand_value(cards: &[Card]) -> u8 {
    let mut total: u32 = 0;
    let mut soft_aces = 0u32;

    for card in cards {
        total += u32::from(card.points());
        if card.is_ace() {
            soft_aces += 1;
        }
    }

    while total > u32::from(BLACKJACK) && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }

    u8::try_from(total).unwrap_or(u8::MAX)
}

/// Returns `true` when `value` exceeds 21.
pub fn is_bust(value: u8) -> bool {
    value > BLACKJACK
}

/// Returns `true` while the dealer is required to take another card.
pub fn dealer_must_draw(dealer_value: u8) -> bool {
    dealer_value < DEALER_STAND_VALUE
}

/// Decides a finished round.
///
/// Precedence: player bust, then dealer bust, then the higher total; equal
/// totals tie.
pub fn settle(player_value: u8, dealer_value: u8) -> RoundResult {
    if is_bust(player_value) {
        RoundResult::DealerWin
    } else if is_bust(dealer_value) {
        RoundResult::ClientWin
    } else if player_value > dealer_value {
        RoundResult::ClientWin
    } else if dealer_value > player_value {
        RoundResult::DealerWin
    } else {
        RoundResult::Tie
    }
}

/// The result carried by a Server Update sent during the dealer's turn.
///
/// `Active` while the dealer still has to draw, otherwise the settled outcome.
pub fn provisional_result(player_value: u8, dealer_value: u8) -> RoundResult {
    if is_bust(player_value) || is_bust(dealer_value) || !dealer_must_draw(dealer_value) {
        settle(player_value, dealer_value)
    } else {
        RoundResult::Active
    }
}
