//! UDP offer broadcasting.
//!
//! The dealer advertises itself by sending the same 39-byte Offer datagram to
//! the LAN broadcast address once per interval.  Clients listening on the
//! discovery port pick up the first Offer they can decode and connect to the
//! source IP on the advertised TCP port.
//!
//! Offers are fire-and-forget: a failed send is logged and the next tick tries
//! again.  The loop runs until the shared [`CancellationToken`] is cancelled.

use std::net::SocketAddr;
use std::time::Duration;

use blackjack_core::{encode_message, OfferMessage};
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Error type for the offer publisher.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The UDP socket could not be bound.
    #[error("failed to bind discovery socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// Broadcast could not be enabled on the socket.
    #[error("failed to enable broadcast: {0}")]
    Broadcast(#[source] std::io::Error),
}

/// Periodically broadcasts a pre-encoded Offer.
pub struct OfferPublisher {
    socket: UdpSocket,
    datagram: Vec<u8>,
    target: SocketAddr,
    interval: Duration,
}

impl OfferPublisher {
    /// Binds an ephemeral UDP socket with `SO_BROADCAST` set.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::BindFailed`] if the socket cannot be bound and
    /// [`DiscoveryError::Broadcast`] if broadcasting cannot be enabled.
    pub async fn bind(
        offer: &OfferMessage,
        target: SocketAddr,
        interval: Duration,
    ) -> Result<Self, DiscoveryError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], 0));
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| DiscoveryError::BindFailed { addr, source })?;
        socket.set_broadcast(true).map_err(DiscoveryError::Broadcast)?;

        Ok(Self {
            socket,
            datagram: encode_message(offer),
            target,
            interval,
        })
    }

    /// Sends one Offer per interval until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "broadcasting offers to {} every {:?}",
            self.target, self.interval
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.socket.send_to(&self.datagram, self.target).await {
                        Ok(sent) => debug!("offer sent ({sent} bytes) to {}", self.target),
                        Err(e) => warn!("failed to send offer to {}: {e}", self.target),
                    }
                }
            }
        }

        info!("offer publisher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack_core::decode_message;

    #[tokio::test]
    async fn test_publisher_sends_decodable_offers_until_cancelled() {
        // Arrange: a loopback receiver stands in for the broadcast address.
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = receiver.local_addr().unwrap();
        let offer = OfferMessage {
            tcp_port: 8888,
            server_name: "MysticDealer".to_string(),
        };
        let publisher = OfferPublisher::bind(&offer, target, Duration::from_millis(10))
            .await
            .unwrap();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(publisher.run(cancel.clone()));

        // Act
        let mut buf = [0u8; 64];
        let mut received = Vec::new();
        for _ in 0..2 {
            let (len, _) = time::timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
                .await
                .unwrap()
                .unwrap();
            received.push(decode_message::<OfferMessage>(&buf[..len]).unwrap());
        }
        cancel.cancel();

        // Assert
        assert!(received.iter().all(|o| *o == offer));
        time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_publisher_keeps_running_when_every_send_fails() {
        // Arrange: an IPv6 target is unreachable from the IPv4 socket.
        let offer = OfferMessage {
            tcp_port: 8888,
            server_name: "MysticDealer".to_string(),
        };
        let target: SocketAddr = "[::1]:9".parse().unwrap();
        let publisher = OfferPublisher::bind(&offer, target, Duration::from_millis(5))
            .await
            .unwrap();
        let cancel = CancellationToken::new();

        // Act
        let task = tokio::spawn(publisher.run(cancel.clone()));
        time::sleep(Duration::from_millis(100)).await;

        // Assert
        assert!(!task.is_finished(), "a failed send must not stop the publisher");
        cancel.cancel();
        time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
    }
}
