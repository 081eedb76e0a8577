//! Blackjack-LAN dealer.
//!
//! `application` holds the round and session logic behind the `PlayerLink`
//! trait; `infrastructure` holds the UDP publisher, the TCP accept loop and
//! the config file.  The `blackjack-server` binary wires them together.

pub mod application;
pub mod infrastructure;
