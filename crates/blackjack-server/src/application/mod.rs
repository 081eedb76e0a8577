//! Application layer use cases for the dealer.
//!
//! Nothing in here touches a socket.  Use cases talk to the player through the
//! [`play_round::PlayerLink`] trait so they can be driven by in-memory doubles
//! in tests and by a TCP stream in production.
//!
//! - **`play_round`** – the per-round state machine: deal, player turn,
//!   dealer turn, settle.
//! - **`run_session`** – reads the Request and plays the requested rounds on
//!   one connection.

pub mod play_round;
pub mod run_session;
