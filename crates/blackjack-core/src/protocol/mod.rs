//! Protocol module containing message types and the fixed-layout binary codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_message, encode_message, ProtocolError, WireMessage};
pub use messages::*;
