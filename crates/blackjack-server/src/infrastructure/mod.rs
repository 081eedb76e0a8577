//! Infrastructure layer for the dealer: sockets and the config file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `blackjack_core`, but MUST NOT be imported by the `application` layer.

pub mod network;
pub mod storage;
