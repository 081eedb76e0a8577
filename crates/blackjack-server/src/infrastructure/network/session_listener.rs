//! TCP accept loop.
//!
//! Each accepted connection gets its own task, its own session id and its own
//! [`SessionCoordinator`].  Sessions share nothing, so one failing never
//! affects another.
//!
//! Cancellation stops accepting; sessions already running are tracked and
//! awaited, so `run` returns only once every player has been served.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::player_link::StreamPlayerLink;
use crate::application::run_session::{DeckSource, SessionCoordinator, ShuffledDecks};

/// Pause after a failed `accept` (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct SessionListener {
    listener: TcpListener,
}

impl SessionListener {
    /// Binds the dealer's TCP port.  Port 0 lets the OS choose.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// The address actually bound; this is the port advertised in Offers.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts players with freshly shuffled decks until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        self.run_with_decks(cancel, || ShuffledDecks).await;
    }

    /// Accepts players, giving each session the deck source built by `decks`.
    ///
    /// After `cancel` fires, waits for the sessions in flight to finish.
    pub async fn run_with_decks<F, D>(self, cancel: CancellationToken, decks: F)
    where
        F: Fn() -> D,
        D: DeckSource + 'static,
    {
        match self.listener.local_addr() {
            Ok(addr) => info!("accepting players on {addr}"),
            Err(e) => warn!("accepting players on unknown address: {e}"),
        }

        let sessions = TaskTracker::new();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        sessions.spawn(serve_player(stream, peer, decks()));
                    }
                    Err(e) => {
                        error!("accept failed: {e}");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }

        sessions.close();
        if !sessions.is_empty() {
            info!("waiting for {} running sessions", sessions.len());
        }
        sessions.wait().await;
        info!("session listener stopped");
    }
}

async fn serve_player<D: DeckSource>(stream: TcpStream, peer: SocketAddr, decks: D) {
    let session_id = Uuid::new_v4();
    let span = info_span!("session", id = %session_id, %peer);

    async move {
        info!("player connected");
        let mut link = StreamPlayerLink::new(stream);
        let mut coordinator = SessionCoordinator::new(decks);

        match coordinator.run(session_id, &mut link).await {
            Ok(report) => info!(
                "session complete: {} won {}/{}",
                report.team_name, report.wins, report.rounds_played
            ),
            Err(e) => warn!("session ended early: {e}"),
        }

        if let Err(e) = link.close().await {
            debug!("shutdown after session failed: {e}");
        }
        info!("player disconnected");
    }
    .instrument(span)
    .await
}
