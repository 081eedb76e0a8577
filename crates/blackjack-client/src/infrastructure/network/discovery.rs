//! Listening for dealer Offers.
//!
//! The socket is bound with address reuse so several players on one host can
//! listen on the discovery port at once.  Anything that does not decode as an
//! Offer (other traffic on the port, foreign cookies, truncated datagrams) is
//! dropped and listening continues.

use std::net::{Ipv4Addr, SocketAddr};

use blackjack_core::{decode_message, OfferMessage};
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info};

/// Error type for offer discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to bind discovery socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("recv error: {0}")]
    Recv(#[source] std::io::Error),
}

/// A dealer found on the LAN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredServer {
    pub name: String,
    /// Source IP of the Offer with the advertised TCP port.
    pub address: SocketAddr,
}

pub struct OfferListener {
    socket: UdpSocket,
}

impl OfferListener {
    /// Binds `0.0.0.0:port` with `SO_REUSEADDR` (and `SO_REUSEPORT` on Unix).
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::BindFailed`] if any socket step fails.
    pub fn bind(port: u16) -> Result<Self, DiscoveryError> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let socket = reusable_udp_socket(addr)
            .map_err(|source| DiscoveryError::BindFailed { addr, source })?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Waits for the first decodable Offer.
    pub async fn next_offer(&self) -> Result<DiscoveredServer, DiscoveryError> {
        let mut buf = [0u8; 1024];
        loop {
            let (len, src) = self
                .socket
                .recv_from(&mut buf)
                .await
                .map_err(DiscoveryError::Recv)?;

            match decode_message::<OfferMessage>(&buf[..len]) {
                Ok(offer) => {
                    info!("offer from {src}: {} on port {}", offer.server_name, offer.tcp_port);
                    return Ok(DiscoveredServer {
                        name: offer.server_name,
                        address: SocketAddr::new(src.ip(), offer.tcp_port),
                    });
                }
                Err(e) => debug!("ignoring datagram from {src}: {e}"),
            }
        }
    }
}

fn reusable_udp_socket(addr: SocketAddr) -> std::io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    UdpSocket::from_std(socket.into())
}
