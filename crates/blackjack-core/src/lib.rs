//! # blackjack-core
//!
//! Shared library for Blackjack-LAN containing the binary wire protocol, the
//! card/deck/hand domain, and the blackjack rules used to score and settle a
//! round.
//!
//! This crate is used by both the server and client applications.
//! It has zero dependencies on sockets, consoles, or the file system.
//!
//! # Architecture overview
//!
//! A Blackjack-LAN server advertises itself with a UDP broadcast (`Offer`).
//! A client hears the offer, opens a TCP connection, sends a `Request` for a
//! number of rounds, and then the two sides exchange fixed-size messages in
//! lockstep: the server deals cards as `ServerUpdate`s and the client answers
//! with `Hittt`/`Stand` decisions.
//!
//! - **`protocol`** – How bytes travel over the network.  Four fixed-size
//!   messages, each prefixed by a 4-byte magic cookie and a type byte.
//!
//! - **`domain`** – Pure game logic: cards, the 52-card deck, hand scoring with
//!   soft aces, the dealer drawing rule, and round settlement.  Both ends score
//!   hands with the same function so they always agree.

pub mod domain;
pub mod protocol;

pub use domain::card::{Card, CardError, Suit};
pub use domain::deck::{Deck, DeckError};
pub use domain::rules::{
    dealer_must_draw, hand_value, is_bust, provisional_result, settle, BLACKJACK,
    DEALER_STAND_VALUE,
};
pub use protocol::codec::{decode_message, encode_message, ProtocolError, WireMessage};
pub use protocol::messages::{
    Decision, DecisionMessage, OfferMessage, RequestMessage, RoundResult, ServerUpdateMessage,
};
