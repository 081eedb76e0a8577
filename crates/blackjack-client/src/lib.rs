//! Blackjack-LAN player.
//!
//! `application` follows a session through the `DealerLink` and `Operator`
//! traits; `infrastructure` provides the UDP offer listener, the TCP link,
//! the console and the config file.

pub mod application;
pub mod infrastructure;
