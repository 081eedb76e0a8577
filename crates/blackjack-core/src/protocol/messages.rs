//! All Blackjack-LAN protocol message types and wire constants.
//!
//! # Result code mapping
//!
//! Earlier drafts of this protocol disagreed on the numbering of the round
//! result byte (one swapped the win/loss codes).  The mapping below is the
//! only one used anywhere in this workspace:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | round still active |
//! | 1 | tie |
//! | 2 | dealer (server) wins |
//! | 3 | client (player) wins |

use std::fmt;

use crate::domain::card::Card;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Magic cookie prefixed to every message; anything else on the port is ignored.
pub const MAGIC_COOKIE: u32 = 0xABCD_DCBA;

/// Cookie (4) + message type (1).
pub const HEADER_SIZE: usize = 5;

/// UDP port on which servers broadcast offers and clients listen for them.
pub const DISCOVERY_PORT: u16 = 13117;

/// Width of the zero-padded server/team name fields.
pub const NAME_FIELD_LEN: usize = 32;

/// Width of the zero-padded decision field.
pub const DECISION_FIELD_LEN: usize = 5;

pub const OFFER_SIZE: usize = HEADER_SIZE + 2 + NAME_FIELD_LEN;
pub const REQUEST_SIZE: usize = HEADER_SIZE + 1 + NAME_FIELD_LEN;
pub const DECISION_SIZE: usize = HEADER_SIZE + DECISION_FIELD_LEN;
pub const SERVER_UPDATE_SIZE: usize = HEADER_SIZE + 1 + 2 + 1;

// ── Message type codes ────────────────────────────────────────────────────────

/// Message type byte following the cookie.
///
/// Client decisions and server updates share `Payload`; they are told apart
/// by direction and fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Offer = 0x02,
    Request = 0x03,
    Payload = 0x04,
}

// ── Round result ──────────────────────────────────────────────────────────────

/// Round status carried by every Server Update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoundResult {
    Active = 0,
    Tie = 1,
    DealerWin = 2,
    ClientWin = 3,
}

impl RoundResult {
    /// `true` once the round has an outcome.
    pub fn is_final(self) -> bool {
        self != RoundResult::Active
    }
}

impl TryFrom<u8> for RoundResult {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(RoundResult::Active),
            1 => Ok(RoundResult::Tie),
            2 => Ok(RoundResult::DealerWin),
            3 => Ok(RoundResult::ClientWin),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundResult::Active => "active",
            RoundResult::Tie => "tie",
            RoundResult::DealerWin => "dealer wins",
            RoundResult::ClientWin => "client wins",
        };
        f.write_str(s)
    }
}

// ── Player decision ───────────────────────────────────────────────────────────

/// The player's choice during their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Hit,
    Stand,
}

impl Decision {
    /// The exact 5-byte ASCII token used on the wire.
    pub fn wire_token(self) -> &'static str {
        match self {
            Decision::Hit => "Hittt",
            Decision::Stand => "Stand",
        }
    }

    /// Parses a wire token; anything other than the two known tokens is `None`.
    pub fn from_wire_token(token: &str) -> Option<Self> {
        match token {
            "Hittt" => Some(Decision::Hit),
            "Stand" => Some(Decision::Stand),
            _ => None,
        }
    }
}

// ── Per-message payload structs ───────────────────────────────────────────────

/// OFFER (UDP, server → client): advertises a server and its TCP port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferMessage {
    /// TCP port the server accepts game connections on.
    pub tcp_port: u16,
    /// Display name, at most 32 bytes of UTF-8 on the wire.
    pub server_name: String,
}

/// REQUEST (TCP, client → server): opens a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    /// Number of rounds to play.
    pub rounds: u8,
    /// Team identifier, at most 32 bytes of UTF-8 on the wire.
    pub team_name: String,
}

/// PAYLOAD (TCP, client → server): a Hit/Stand decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionMessage {
    pub decision: Decision,
}

/// PAYLOAD (TCP, server → client): one dealt card and the round status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerUpdateMessage {
    pub result: RoundResult,
    pub card: Card,
}
