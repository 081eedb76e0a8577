//! Network infrastructure for the dealer.
//!
//! - **`discovery`** – broadcasts Offer datagrams on the discovery port.
//! - **`player_link`** – frames fixed-size messages over a TCP stream and
//!   implements the application's `PlayerLink`.
//! - **`session_listener`** – the TCP accept loop; one task per player.

pub mod discovery;
pub mod player_link;
pub mod session_listener;
