//! Network infrastructure for the player.
//!
//! - **`discovery`** – waits for an Offer on the shared discovery port.
//! - **`dealer_link`** – the TCP session, implementing `DealerLink`.

pub mod dealer_link;
pub mod discovery;
