//! Application layer use cases for the player.
//!
//! - **`play_table`** – sends the Request, follows each round from the
//!   dealer's updates and asks the operator for Hit/Stand.

pub mod play_table;
