//! RunSession: one TCP connection's worth of blackjack.
//!
//! A session starts by reading exactly one Request.  It then plays the
//! requested number of rounds back to back on the same link, each with a fresh
//! deck, and counts the rounds the player won.  Any failure ends the session;
//! there is no retry and no partial-round recovery.

use blackjack_core::{Deck, RoundResult};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::play_round::{LinkError, PlayerLink, RoundEngine, RoundError};

/// Supplies the deck for each round.
#[cfg_attr(test, mockall::automock)]
pub trait DeckSource: Send {
    fn next_deck(&mut self) -> Deck;
}

/// Production deck source: a freshly shuffled 52-card deck per round.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShuffledDecks;

impl DeckSource for ShuffledDecks {
    fn next_deck(&mut self) -> Deck {
        Deck::shuffled()
    }
}

/// Error type for a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The opening Request could not be read or decoded.
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] LinkError),
    /// A round failed; the remaining rounds are abandoned.
    #[error("round {round} aborted: {source}")]
    RoundAborted {
        round: u16,
        #[source]
        source: RoundError,
    },
}

/// Outcome of one finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub team_name: String,
    pub rounds_requested: u8,
    pub rounds_played: u8,
    /// Rounds whose terminal result was [`RoundResult::ClientWin`].
    pub wins: u8,
}

/// Runs sessions against a [`PlayerLink`].
pub struct SessionCoordinator<D: DeckSource> {
    decks: D,
}

impl<D: DeckSource> SessionCoordinator<D> {
    pub fn new(decks: D) -> Self {
        Self { decks }
    }

    /// Reads the Request and plays every requested round sequentially.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidRequest`] if the Request is malformed or
    /// the player hangs up first, and [`SessionError::RoundAborted`] for the
    /// first round that fails.
    pub async fn run<L: PlayerLink + ?Sized>(
        &mut self,
        session_id: Uuid,
        link: &mut L,
    ) -> Result<SessionReport, SessionError> {
        let request = link
            .receive_request()
            .await
            .map_err(SessionError::InvalidRequest)?;

        info!(
            "team {} wants to play {} rounds",
            request.team_name, request.rounds
        );

        let mut session = SessionReport {
            session_id,
            team_name: request.team_name,
            rounds_requested: request.rounds,
            rounds_played: 0,
            wins: 0,
        };

        for round in 1..=u16::from(session.rounds_requested) {
            let deck = self.decks.next_deck();
            let summary = RoundEngine::new(&mut *link, deck)
                .play()
                .await
                .map_err(|source| {
                    warn!("round {round} for {} aborted: {source}", session.team_name);
                    SessionError::RoundAborted { round, source }
                })?;

            session.rounds_played += 1;
            if summary.result == RoundResult::ClientWin {
                session.wins += 1;
            }
            info!(
                "round {round} result for {}: {} (player: {}, dealer: {})",
                session.team_name, summary.result, summary.player_value, summary.dealer_value
            );
        }

        info!(
            "finished playing with {}: {} wins in {} rounds",
            session.team_name, session.wins, session.rounds_played
        );
        Ok(session)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
