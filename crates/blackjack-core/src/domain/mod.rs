//! Game domain: cards, the deck, and the rules that score and settle a round.
//!
//! Nothing in here performs I/O.  The server's round engine and the client's
//! table controller both call into these modules, so a hand is always valued
//! the same way on both ends of the connection.

pub mod card;
pub mod deck;
pub mod rules;
