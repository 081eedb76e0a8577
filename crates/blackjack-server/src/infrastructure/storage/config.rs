//! TOML configuration for the dealer.
//!
//! Read from the platform config directory unless a path is given explicitly:
//! - Windows:  `%APPDATA%\Blackjack\server.toml`
//! - Linux:    `~/.config/blackjack/server.toml`
//! - macOS:    `~/Library/Application Support/Blackjack/server.toml`
//!
//! ```toml
//! [server]
//! name = "MysticDealer"
//! tcp_port = 8888
//! bind_address = "0.0.0.0"
//! log_level = "info"
//!
//! [discovery]
//! udp_port = 13117
//! broadcast_address = "255.255.255.255"
//! interval_ms = 1000
//! ```
//!
//! Every field has a serde default, so a missing file, a missing table, or a
//! missing key all fall back to the values above.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use blackjack_core::protocol::messages::DISCOVERY_PORT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "server.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// An address field is not a valid IP address.
    #[error("invalid address {value:?} in [{table}]: {source}")]
    InvalidAddress {
        table: &'static str,
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: DealerConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Dealer identity and TCP settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DealerConfig {
    /// Advertised in every Offer; truncated to 32 bytes on the wire.
    #[serde(default = "default_name")]
    pub name: String,
    /// TCP port for sessions.  0 lets the OS pick one.
    #[serde(default = "default_tcp_port")]
    pub tcp_port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Offer broadcast settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryConfig {
    #[serde(default = "default_udp_port")]
    pub udp_port: u16,
    #[serde(default = "default_broadcast_address")]
    pub broadcast_address: String,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_name() -> String {
    "MysticDealer".to_string()
}
fn default_tcp_port() -> u16 {
    8888
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_udp_port() -> u16 {
    DISCOVERY_PORT
}
fn default_broadcast_address() -> String {
    "255.255.255.255".to_string()
}
fn default_interval_ms() -> u64 {
    1000
}

impl Default for DealerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            tcp_port: default_tcp_port(),
            bind_address: default_bind_address(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            udp_port: default_udp_port(),
            broadcast_address: default_broadcast_address(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl ServerConfig {
    /// Address the session listener binds.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = parse_ip("server", &self.server.bind_address)?;
        Ok(SocketAddr::new(ip, self.server.tcp_port))
    }

    /// Destination of every Offer datagram.
    pub fn broadcast_target(&self) -> Result<SocketAddr, ConfigError> {
        let ip = parse_ip("discovery", &self.discovery.broadcast_address)?;
        Ok(SocketAddr::new(ip, self.discovery.udp_port))
    }

    /// Time between Offers; clamped to at least one millisecond.
    pub fn offer_interval(&self) -> Duration {
        Duration::from_millis(self.discovery.interval_ms.max(1))
    }
}

fn parse_ip(table: &'static str, value: &str) -> Result<IpAddr, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidAddress {
            table,
            value: value.to_string(),
            source,
        })
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default path of the server config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config from `path`, or from the platform path when `None`.
///
/// A file that does not exist yields [`ServerConfig::default`].
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Resolves the platform config base directory plus the `Blackjack` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Blackjack"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("blackjack"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Blackjack")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
