//! Storage infrastructure: the player's TOML config file.

pub mod config;
