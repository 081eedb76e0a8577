//! Storage infrastructure: the dealer's TOML config file.

pub mod config;
