//! Infrastructure layer for the player: sockets, console and config file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `blackjack_core`, but MUST NOT be imported by the `application` layer.

pub mod console;
pub mod network;
pub mod storage;
