//! Binary codec for encoding and decoding Blackjack-LAN protocol messages.
//!
//! Wire format:
//! ```text
//! [cookie:4][msg_type:1][body:N]
//! ```
//! Every message has a fixed total size.  All multi-byte integers are
//! big-endian.  Name fields are UTF-8, truncated on a character boundary and
//! zero-padded to their fixed width.
//!
//! Result codes follow the table in [`crate::protocol::messages`]:
//! `Active = 0, Tie = 1, DealerWin = 2, ClientWin = 3`.
//!
//! Decoding never panics.  A wrong length, a foreign cookie, or a type byte
//! that does not belong to the decode path all return a [`ProtocolError`].

use crate::domain::card::Card;
use crate::protocol::messages::{
    Decision, DecisionMessage, MessageType, OfferMessage, RequestMessage, RoundResult,
    ServerUpdateMessage, DECISION_FIELD_LEN, DECISION_SIZE, HEADER_SIZE, MAGIC_COOKIE,
    NAME_FIELD_LEN, OFFER_SIZE, REQUEST_SIZE, SERVER_UPDATE_SIZE,
};
use thiserror::Error;

/// Errors that can occur during message decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The buffer is not exactly the fixed size of the expected message.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The leading cookie does not identify this protocol.
    #[error("bad magic cookie: 0x{0:08X}")]
    BadCookie(u32),

    /// The type byte is not the one expected on this decode path.
    #[error("unexpected message type: expected 0x{expected:02X}, got 0x{actual:02X}")]
    UnexpectedMessageType { expected: u8, actual: u8 },

    /// A field could not be parsed (bad UTF-8, out-of-range value, etc.).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The client sent a decision token other than `Hittt` or `Stand`.
    #[error("unknown decision: {0:?}")]
    UnknownDecision(String),
}

/// A message with a fixed wire layout.
///
/// The shared header (cookie + type byte) is handled by [`encode_message`] and
/// [`decode_message`]; implementors only deal with the body.
pub trait WireMessage: Sized {
    /// Type byte written after the cookie.
    const MESSAGE_TYPE: MessageType;
    /// Total encoded size including the header.
    const WIRE_SIZE: usize;

    /// Appends exactly `WIRE_SIZE - HEADER_SIZE` bytes to `buf`.
    fn encode_body(&self, buf: &mut Vec<u8>);

    /// Parses a body of exactly `WIRE_SIZE - HEADER_SIZE` bytes.
    fn decode_body(body: &[u8]) -> Result<Self, ProtocolError>;
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a message into exactly `M::WIRE_SIZE` bytes.
///
/// # Examples
///
/// ```rust
/// use blackjack_core::protocol::{decode_message, encode_message, OfferMessage, OFFER_SIZE};
///
/// let msg = OfferMessage { tcp_port: 8888, server_name: "MysticDealer".to_string() };
/// let bytes = encode_message(&msg);
/// assert_eq!(bytes.len(), OFFER_SIZE);
/// assert_eq!(decode_message::<OfferMessage>(&bytes).unwrap(), msg);
/// ```
pub fn encode_message<M: WireMessage>(msg: &M) -> Vec<u8> {
    let mut buf = Vec::with_capacity(M::WIRE_SIZE);
    buf.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
    buf.push(M::MESSAGE_TYPE as u8);
    msg.encode_body(&mut buf);
    debug_assert_eq!(buf.len(), M::WIRE_SIZE);
    buf
}

/// Decodes one message of type `M` from `bytes`.
///
/// # Errors
///
/// Returns [`ProtocolError`] when `bytes` is not exactly `M::WIRE_SIZE` long,
/// the cookie or type byte do not match, or a field is invalid.
pub fn decode_message<M: WireMessage>(bytes: &[u8]) -> Result<M, ProtocolError> {
    if bytes.len() != M::WIRE_SIZE {
        return Err(ProtocolError::InvalidLength {
            expected: M::WIRE_SIZE,
            actual: bytes.len(),
        });
    }

    let cookie = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if cookie != MAGIC_COOKIE {
        return Err(ProtocolError::BadCookie(cookie));
    }

    let msg_type = bytes[4];
    if msg_type != M::MESSAGE_TYPE as u8 {
        return Err(ProtocolError::UnexpectedMessageType {
            expected: M::MESSAGE_TYPE as u8,
            actual: msg_type,
        });
    }

    M::decode_body(&bytes[HEADER_SIZE..])
}

// ── Per-message codecs ────────────────────────────────────────────────────────

impl WireMessage for OfferMessage {
    const MESSAGE_TYPE: MessageType = MessageType::Offer;
    const WIRE_SIZE: usize = OFFER_SIZE;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.tcp_port.to_be_bytes());
        write_padded_string(buf, &self.server_name, NAME_FIELD_LEN);
    }

    fn decode_body(p: &[u8]) -> Result<Self, ProtocolError> {
        let tcp_port = u16::from_be_bytes([p[0], p[1]]);
        let server_name = read_padded_string(&p[2..2 + NAME_FIELD_LEN], "Offer.server_name")?;
        Ok(OfferMessage {
            tcp_port,
            server_name,
        })
    }
}

impl WireMessage for RequestMessage {
    const MESSAGE_TYPE: MessageType = MessageType::Request;
    const WIRE_SIZE: usize = REQUEST_SIZE;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        buf.push(self.rounds);
        write_padded_string(buf, &self.team_name, NAME_FIELD_LEN);
    }

    fn decode_body(p: &[u8]) -> Result<Self, ProtocolError> {
        let rounds = p[0];
        let team_name = read_padded_string(&p[1..1 + NAME_FIELD_LEN], "Request.team_name")?;
        Ok(RequestMessage { rounds, team_name })
    }
}

impl WireMessage for DecisionMessage {
    const MESSAGE_TYPE: MessageType = MessageType::Payload;
    const WIRE_SIZE: usize = DECISION_SIZE;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        write_padded_string(buf, self.decision.wire_token(), DECISION_FIELD_LEN);
    }

    fn decode_body(p: &[u8]) -> Result<Self, ProtocolError> {
        let token = read_padded_string(&p[..DECISION_FIELD_LEN], "Decision")?;
        let decision =
            Decision::from_wire_token(&token).ok_or(ProtocolError::UnknownDecision(token))?;
        Ok(DecisionMessage { decision })
    }
}

impl WireMessage for ServerUpdateMessage {
    const MESSAGE_TYPE: MessageType = MessageType::Payload;
    const WIRE_SIZE: usize = SERVER_UPDATE_SIZE;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        buf.push(self.result as u8);
        buf.extend_from_slice(&u16::from(self.card.rank()).to_be_bytes());
        buf.push(self.card.suit() as u8);
    }

    fn decode_body(p: &[u8]) -> Result<Self, ProtocolError> {
        let result = RoundResult::try_from(p[0]).map_err(|_| {
            ProtocolError::MalformedPayload(format!("unknown result code: {}", p[0]))
        })?;
        let rank = u16::from_be_bytes([p[1], p[2]]);
        let card = Card::from_wire(rank, p[3])
            .map_err(|e| ProtocolError::MalformedPayload(e.to_string()))?;
        Ok(ServerUpdateMessage { result, card })
    }
}

// ── Field helpers ─────────────────────────────────────────────────────────────

/// Writes `s` into a `width`-byte field: truncated on a char boundary, zero-padded.
fn write_padded_string(buf: &mut Vec<u8>, s: &str, width: usize) {
    let mut end = s.len().min(width);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    buf.extend_from_slice(&s.as_bytes()[..end]);
    buf.resize(buf.len() + (width - end), 0x00);
}

/// Reads a zero-padded UTF-8 field, dropping trailing NUL bytes.
fn read_padded_string(field: &[u8], context: &str) -> Result<String, ProtocolError> {
    let end = field
        .iter()
        .rposition(|&b| b != 0x00)
        .map_or(0, |last| last + 1);
    std::str::from_utf8(&field[..end])
        .map(str::to_owned)
        .map_err(|e| ProtocolError::MalformedPayload(format!("{context}: invalid UTF-8: {e}")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
