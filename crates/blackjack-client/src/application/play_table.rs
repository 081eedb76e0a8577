//! PlayTable: the player's side of a session.
//!
//! The client mirrors the dealer's state machine from the updates it receives:
//!
//! 1. Three updates open every round: player card, player card, dealer up card.
//! 2. While the latest result is `Active`, the operator chooses.  `Hit` is
//!    answered by exactly one update (the new player card).
//! 3. After `Stand`, updates are dealer cards until one carries a final result.
//!
//! Hands are rebuilt locally only for display; the dealer's `result` field is
//! the sole authority on how a round ended.

use async_trait::async_trait;
use blackjack_core::{hand_value, Card, Decision, ProtocolError, RoundResult, ServerUpdateMessage};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by a [`DealerLink`].
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The dealer closed the connection before the session was over.
    #[error("connection closed by dealer")]
    Closed,
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Error type for a table session.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("dealer link failed during round {round}: {source}")]
    Link {
        round: u8,
        #[source]
        source: LinkError,
    },
    #[error("could not send request: {0}")]
    Request(#[source] LinkError),
}

/// Transport to the dealer.
#[async_trait]
pub trait DealerLink: Send {
    async fn send_request(&mut self, rounds: u8, team_name: &str) -> Result<(), LinkError>;
    async fn send_decision(&mut self, decision: Decision) -> Result<(), LinkError>;
    async fn receive_update(&mut self) -> Result<ServerUpdateMessage, LinkError>;
}

/// Something the operator should be told about.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    RoundStarted { round: u8 },
    PlayerCard { card: Card, total: u8 },
    DealerUpCard { card: Card },
    DealerHoleCard { card: Card, total: u8 },
    DealerDraw { card: Card, total: u8 },
    RoundOver { round: u8, result: RoundResult },
    Finished(TableSummary),
}

/// The human (or script) at the table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Operator: Send {
    /// How many rounds to request.  `None` means the operator is done.
    async fn ask_rounds(&mut self) -> Option<u8>;

    /// Hit or stand with the given hand total.
    async fn ask_decision(&mut self, player_total: u8) -> Decision;

    fn report(&mut self, event: &TableEvent);
}

/// Tally of a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSummary {
    pub rounds: u8,
    pub wins: u8,
    pub ties: u8,
    pub losses: u8,
}

impl TableSummary {
    /// Wins divided by rounds played; 0.0 when nothing was played.
    pub fn win_rate(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.rounds)
        }
    }

    fn record(&mut self, result: RoundResult) {
        self.rounds += 1;
        match result {
            RoundResult::ClientWin => self.wins += 1,
            RoundResult::Tie => self.ties += 1,
            RoundResult::DealerWin => self.losses += 1,
            RoundResult::Active => {}
        }
    }
}

/// Drives one session over a [`DealerLink`], asking an [`Operator`] for choices.
pub struct TableController<'a, L: ?Sized, O: ?Sized> {
    link: &'a mut L,
    operator: &'a mut O,
    team_name: String,
}

impl<'a, L, O> TableController<'a, L, O>
where
    L: DealerLink + ?Sized,
    O: Operator + ?Sized,
{
    pub fn new(link: &'a mut L, operator: &'a mut O, team_name: impl Into<String>) -> Self {
        Self {
            link,
            operator,
            team_name: team_name.into(),
        }
    }

    /// Sends the Request and plays `rounds` rounds.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the link fails; rounds already finished are
    /// lost with it.
    pub async fn play(mut self, rounds: u8) -> Result<TableSummary, TableError> {
        self.link
            .send_request(rounds, &self.team_name)
            .await
            .map_err(TableError::Request)?;
        info!("requested {rounds} rounds as {}", self.team_name);

        let mut summary = TableSummary::default();
        for round in 1..=rounds {
            self.operator.report(&TableEvent::RoundStarted { round });
            let result = self
                .play_round()
                .await
                .map_err(|source| TableError::Link { round, source })?;
            summary.record(result);
            self.operator.report(&TableEvent::RoundOver { round, result });
        }

        info!(
            "session over: {} wins, {} ties, {} losses",
            summary.wins, summary.ties, summary.losses
        );
        self.operator.report(&TableEvent::Finished(summary));
        Ok(summary)
    }

    async fn play_round(&mut self) -> Result<RoundResult, LinkError> {
        let mut player: Vec<Card> = Vec::new();
        let mut dealer: Vec<Card> = Vec::new();
        let mut result = RoundResult::Active;

        // The opening three are always sent, even when the first already settles.
        for slot in 0..3 {
            let update = self.link.receive_update().await?;
            result = update.result;
            if slot < 2 {
                player.push(update.card);
                self.operator.report(&TableEvent::PlayerCard {
                    card: update.card,
                    total: hand_value(&player),
                });
            } else {
                dealer.push(update.card);
                self.operator
                    .report(&TableEvent::DealerUpCard { card: update.card });
            }
        }

        let mut standing = false;
        while !result.is_final() {
            if !standing {
                let decision = self.operator.ask_decision(hand_value(&player)).await;
                self.link.send_decision(decision).await?;
                debug!(?decision, "decision sent");
                if decision == Decision::Stand {
                    standing = true;
                    continue;
                }

                let update = self.link.receive_update().await?;
                result = update.result;
                player.push(update.card);
                self.operator.report(&TableEvent::PlayerCard {
                    card: update.card,
                    total: hand_value(&player),
                });
            } else {
                let update = self.link.receive_update().await?;
                result = update.result;
                dealer.push(update.card);
                let total = hand_value(&dealer);
                let event = if dealer.len() == 2 {
                    TableEvent::DealerHoleCard {
                        card: update.card,
                        total,
                    }
                } else {
                    TableEvent::DealerDraw {
                        card: update.card,
                        total,
                    }
                };
                self.operator.report(&event);
            }
        }

        Ok(result)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
