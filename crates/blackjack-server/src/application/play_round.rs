//! PlayRound: the server-side state machine for one round of blackjack.
//!
//! ```text
//! Dealing ──► PlayerTurn ──► DealerTurn ──► Settled
//!    │             │                           ▲
//!    └─ natural ───┴─ bust ────────────────────┘
//! ```
//!
//! - `Dealing`: two cards to the player, two to the dealer.  The player's two
//!   cards and the dealer's up card are sent as three Server Updates.
//! - `PlayerTurn`: block on the next decision.  `Hit` deals one card and sends
//!   it; a bust settles the round at once.  `Stand` hands over to the dealer.
//! - `DealerTurn`: reveal the hole card, then draw while below 17.  Every
//!   update carries [`provisional_result`], so the last one sent is the outcome.
//! - `Settled`: nothing more is sent; the terminal update already carried it.
//!
//! The engine talks to the player only through [`PlayerLink`], so it can be
//! driven by a TCP stream in production and by a scripted double in tests.

use async_trait::async_trait;
use blackjack_core::{
    dealer_must_draw, hand_value, is_bust, provisional_result, Card, Decision, Deck, DeckError,
    ProtocolError, RequestMessage, RoundResult, ServerUpdateMessage,
};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised by a [`PlayerLink`].
#[derive(Debug, Error)]
pub enum LinkError {
    /// The socket failed mid-exchange (reset, short write, ...).
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The player closed the connection.
    #[error("connection closed by player")]
    Closed,
    /// The player sent bytes that do not decode as the expected message.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Error type for a single round.
///
/// Deck exhaustion is kept apart from link failures so the two show up as
/// different kinds in the logs.
#[derive(Debug, Error)]
pub enum RoundError {
    #[error("player link failed: {0}")]
    Link(#[from] LinkError),
    #[error("internal error: {0}")]
    DeckExhausted(#[from] DeckError),
}

/// Transport seen by the round engine and session coordinator.
///
/// The infrastructure implementation frames fixed-size messages over a TCP
/// stream; tests use recording doubles.
#[async_trait]
pub trait PlayerLink: Send {
    /// Reads the opening Request of a session.
    async fn receive_request(&mut self) -> Result<RequestMessage, LinkError>;

    /// Blocks until the player sends a Hit/Stand decision.
    async fn receive_decision(&mut self) -> Result<Decision, LinkError>;

    /// Sends one dealt card and the current round status.
    async fn send_update(&mut self, update: ServerUpdateMessage) -> Result<(), LinkError>;
}

/// Phases of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Dealing,
    PlayerTurn,
    DealerTurn,
    Settled(RoundResult),
}

/// What a finished round looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub result: RoundResult,
    pub player_hand: Vec<Card>,
    pub dealer_hand: Vec<Card>,
    pub player_value: u8,
    pub dealer_value: u8,
    /// Number of Server Updates written for this round.
    pub updates_sent: usize,
}

/// Executes one round against a player.
pub struct RoundEngine<'a, L: PlayerLink + ?Sized> {
    link: &'a mut L,
    deck: Deck,
    player: Vec<Card>,
    dealer: Vec<Card>,
    updates_sent: usize,
}

impl<'a, L: PlayerLink + ?Sized> RoundEngine<'a, L> {
    /// Creates an engine that deals from `deck`, which it owns for the round.
    pub fn new(link: &'a mut L, deck: Deck) -> Self {
        Self {
            link,
            deck,
            player: Vec::with_capacity(8),
            dealer: Vec::with_capacity(8),
            updates_sent: 0,
        }
    }

    /// Runs the state machine to completion.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError::Link`] if the player disconnects or violates the
    /// protocol, and [`RoundError::DeckExhausted`] if the deck runs dry.
    pub async fn play(mut self) -> Result<RoundSummary, RoundError> {
        let mut state = RoundState::Dealing;
        loop {
            trace!(?state, "round state");
            state = match state {
                RoundState::Dealing => self.deal().await?,
                RoundState::PlayerTurn => self.player_turn().await?,
                RoundState::DealerTurn => self.dealer_turn().await?,
                RoundState::Settled(result) => return Ok(self.summary(result)),
            };
        }
    }

    async fn deal(&mut self) -> Result<RoundState, RoundError> {
        self.player.push(self.deck.draw()?);
        self.player.push(self.deck.draw()?);
        self.dealer.push(self.deck.draw()?);
        self.dealer.push(self.deck.draw()?);

        // Two cards can never exceed 21 with soft aces, but the check keeps
        // the three initial updates consistent with the outcome if it did.
        let natural_bust = is_bust(hand_value(&self.player));
        let result = if natural_bust {
            RoundResult::DealerWin
        } else {
            RoundResult::Active
        };

        let visible = [self.player[0], self.player[1], self.dealer[0]];
        for card in visible {
            self.send(result, card).await?;
        }

        Ok(if natural_bust {
            RoundState::Settled(result)
        } else {
            RoundState::PlayerTurn
        })
    }

    async fn player_turn(&mut self) -> Result<RoundState, RoundError> {
        loop {
            match self.link.receive_decision().await? {
                Decision::Hit => {
                    let card = self.deck.draw()?;
                    self.player.push(card);
                    let value = hand_value(&self.player);
                    debug!(%card, value, "player hits");

                    if is_bust(value) {
                        self.send(RoundResult::DealerWin, card).await?;
                        return Ok(RoundState::Settled(RoundResult::DealerWin));
                    }
                    self.send(RoundResult::Active, card).await?;
                }
                Decision::Stand => {
                    debug!(value = hand_value(&self.player), "player stands");
                    return Ok(RoundState::DealerTurn);
                }
            }
        }
    }

    async fn dealer_turn(&mut self) -> Result<RoundState, RoundError> {
        let player_value = hand_value(&self.player);
        let mut dealer_value = hand_value(&self.dealer);

        let mut result = provisional_result(player_value, dealer_value);
        self.send(result, self.dealer[1]).await?;

        while dealer_must_draw(dealer_value) {
            let card = self.deck.draw()?;
            self.dealer.push(card);
            dealer_value = hand_value(&self.dealer);
            debug!(%card, dealer_value, "dealer draws");

            result = provisional_result(player_value, dealer_value);
            self.send(result, card).await?;
        }

        Ok(RoundState::Settled(result))
    }

    async fn send(&mut self, result: RoundResult, card: Card) -> Result<(), RoundError> {
        self.link
            .send_update(ServerUpdateMessage { result, card })
            .await?;
        self.updates_sent += 1;
        Ok(())
    }

    fn summary(self, result: RoundResult) -> RoundSummary {
        RoundSummary {
            result,
            player_value: hand_value(&self.player),
            dealer_value: hand_value(&self.dealer),
            player_hand: self.player,
            dealer_hand: self.dealer,
            updates_sent: self.updates_sent,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack_core::Suit;
    use std::collections::VecDeque;

    // ── Test doubles ──────────────────────────────────────────────────────────

    /// Replays scripted decisions and records every update sent.
    #[derive(Default)]
    struct ScriptedPlayer {
        decisions: VecDeque<Result<Decision, ProtocolError>>,
        sent: Vec<ServerUpdateMessage>,
    }

    impl ScriptedPlayer {
        fn deciding(decisions: impl IntoIterator<Item = Decision>) -> Self {
            Self {
                decisions: decisions.into_iter().map(Ok).collect(),
                sent: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl PlayerLink for ScriptedPlayer {
        async fn receive_request(&mut self) -> Result<RequestMessage, LinkError> {
            Err(LinkError::Closed)
        }

        async fn receive_decision(&mut self) -> Result<Decision, LinkError> {
            match self.decisions.pop_front() {
                Some(Ok(decision)) => Ok(decision),
                Some(Err(e)) => Err(LinkError::Protocol(e)),
                None => Err(LinkError::Closed),
            }
        }

        async fn send_update(&mut self, update: ServerUpdateMessage) -> Result<(), LinkError> {
            self.sent.push(update);
            Ok(())
        }
    }

    fn c(rank: u8) -> Card {
        Card::new(rank, Suit::Clubs).unwrap()
    }

    /// Deck dealing player, player, dealer, dealer, then `rest` in order.
    fn deck(player: [u8; 2], dealer: [u8; 2], rest: &[u8]) -> Deck {
        let mut order = vec![c(player[0]), c(player[1]), c(dealer[0]), c(dealer[1])];
        order.extend(rest.iter().map(|&r| c(r)));
        Deck::stacked(order)
    }

    fn results(player: &ScriptedPlayer) -> Vec<RoundResult> {
        player.sent.iter().map(|u| u.result).collect()
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_natural_21_against_dealer_drawing_to_21_is_a_tie() {
        // Arrange: player A,K (21); dealer 7,9 (16) must draw the 5 -> 21.
        let mut player = ScriptedPlayer::deciding([Decision::Stand]);
        let deck = deck([1, 13], [7, 9], &[5]);

        // Act
        let summary = RoundEngine::new(&mut player, deck).play().await.unwrap();

        // Assert: 3 initial + reveal + one dealer hit.
        assert_eq!(summary.result, RoundResult::Tie);
        assert_eq!(summary.updates_sent, 5);
        assert_eq!(
            results(&player),
            vec![
                RoundResult::Active,
                RoundResult::Active,
                RoundResult::Active,
                RoundResult::Active,
                RoundResult::Tie,
            ]
        );
        let ranks: Vec<u8> = player.sent.iter().map(|u| u.card.rank()).collect();
        assert_eq!(ranks, vec![1, 13, 7, 9, 5]);
        assert_eq!((summary.player_value, summary.dealer_value), (21, 21));
    }

    #[tokio::test]
    async fn test_bust_on_hit_ends_round_without_further_decisions() {
        // Arrange: player 10,9 (19) hits a 5 -> 24.  A trailing Stand must remain unread.
        let mut player = ScriptedPlayer::deciding([Decision::Hit, Decision::Stand]);
        let deck = deck([10, 9], [8, 8], &[5]);

        // Act
        let summary = RoundEngine::new(&mut player, deck).play().await.unwrap();

        // Assert
        assert_eq!(summary.result, RoundResult::DealerWin);
        assert_eq!(summary.updates_sent, 4);
        assert_eq!(player.sent[3].card, c(5));
        assert_eq!(player.sent[3].result, RoundResult::DealerWin);
        assert_eq!(player.decisions.len(), 1, "no decision is read after a bust");
        assert_eq!(summary.dealer_hand.len(), 2, "dealer does not play after a player bust");
    }

    #[tokio::test]
    async fn test_reveal_settles_when_dealer_already_stands() {
        // Player 10,8 (18); dealer 10,9 (19) stands on the reveal.
        let mut player = ScriptedPlayer::deciding([Decision::Stand]);
        let deck = deck([10, 8], [10, 9], &[]);

        let summary = RoundEngine::new(&mut player, deck).play().await.unwrap();

        assert_eq!(summary.result, RoundResult::DealerWin);
        assert_eq!(summary.updates_sent, 4);
        assert_eq!(player.sent[3].result, RoundResult::DealerWin);
    }

    #[tokio::test]
    async fn test_dealer_bust_gives_client_win() {
        // Player 10,7 (17); dealer 10,6 (16) draws a King -> 26.
        let mut player = ScriptedPlayer::deciding([Decision::Stand]);
        let deck = deck([10, 7], [10, 6], &[13]);

        let summary = RoundEngine::new(&mut player, deck).play().await.unwrap();

        assert_eq!(summary.result, RoundResult::ClientWin);
        assert_eq!(results(&player).last(), Some(&RoundResult::ClientWin));
    }

    #[tokio::test]
    async fn test_dealer_keeps_drawing_below_17_with_active_updates() {
        // Dealer 2,3 (5) draws 2 (7), 4 (11), 6 (17) and stands.
        let mut player = ScriptedPlayer::deciding([Decision::Stand]);
        let deck = deck([10, 10], [2, 3], &[2, 4, 6, 9]);

        let summary = RoundEngine::new(&mut player, deck).play().await.unwrap();

        assert_eq!(summary.dealer_value, 17);
        assert_eq!(summary.dealer_hand.len(), 5);
        assert_eq!(
            results(&player)[3..],
            [
                RoundResult::Active,
                RoundResult::Active,
                RoundResult::Active,
                RoundResult::ClientWin,
            ]
        );
    }

    #[tokio::test]
    async fn test_dealer_soft_ace_is_reduced_before_standing() {
        // Dealer A,5 (soft 16) draws a 10 -> hard 16, must draw again: 3 -> 19.
        let mut player = ScriptedPlayer::deciding([Decision::Stand]);
        let deck = deck([10, 8], [1, 5], &[10, 3]);

        let summary = RoundEngine::new(&mut player, deck).play().await.unwrap();

        assert_eq!(summary.dealer_value, 19);
        assert_eq!(summary.result, RoundResult::DealerWin);
    }

    #[tokio::test]
    async fn test_player_may_keep_hitting_at_21() {
        // Player 10,A (21) hits anyway; the ace drops to 1 and the 5 makes 16.
        let mut player = ScriptedPlayer::deciding([Decision::Hit, Decision::Stand]);
        let deck = deck([10, 1], [10, 7], &[5]);

        let summary = RoundEngine::new(&mut player, deck).play().await.unwrap();

        assert_eq!(summary.player_value, 16);
        assert_eq!(summary.result, RoundResult::DealerWin);
    }

    #[tokio::test]
    async fn test_protocol_violation_aborts_round() {
        let mut player = ScriptedPlayer::default();
        player
            .decisions
            .push_back(Err(ProtocolError::UnknownDecision("Split".to_string())));
        let deck = deck([10, 2], [10, 7], &[]);

        let result = RoundEngine::new(&mut player, deck).play().await;

        assert!(matches!(
            result,
            Err(RoundError::Link(LinkError::Protocol(ProtocolError::UnknownDecision(_))))
        ));
        assert_eq!(player.sent.len(), 3);
    }

    #[tokio::test]
    async fn test_disconnect_during_player_turn_aborts_round() {
        let mut player = ScriptedPlayer::default();
        let deck = deck([10, 2], [10, 7], &[]);

        let result = RoundEngine::new(&mut player, deck).play().await;

        assert!(matches!(result, Err(RoundError::Link(LinkError::Closed))));
    }

    #[tokio::test]
    async fn test_deck_exhaustion_is_reported_as_its_own_error() {
        // Only three cards: the fourth deal fails before anything is sent.
        let mut player = ScriptedPlayer::default();
        let deck = Deck::stacked([c(2), c(3), c(4)]);

        let result = RoundEngine::new(&mut player, deck).play().await;

        assert!(matches!(
            result,
            Err(RoundError::DeckExhausted(DeckError::Exhausted { drawn: 3 }))
        ));
        assert!(player.sent.is_empty());
    }

    #[tokio::test]
    async fn test_deck_exhaustion_mid_dealer_turn() {
        // Dealer 2,2 must draw but the deck is empty after the deal.
        let mut player = ScriptedPlayer::deciding([Decision::Stand]);
        let deck = deck([10, 10], [2, 2], &[]);

        let result = RoundEngine::new(&mut player, deck).play().await;

        assert!(matches!(result, Err(RoundError::DeckExhausted(_))));
        assert_eq!(player.sent.len(), 4, "reveal was sent before the failed draw");
    }

    #[tokio::test]
    async fn test_dealer_never_stops_below_17_over_many_shuffles() {
        for _ in 0..200 {
            let mut player = ScriptedPlayer::deciding([Decision::Stand]);
            let summary = RoundEngine::new(&mut player, Deck::shuffled())
                .play()
                .await
                .unwrap();

            // The dealer stopped at 17+ and the card before the last left it below 17.
            assert!(!dealer_must_draw(summary.dealer_value));
            if summary.dealer_hand.len() > 2 {
                let before_last = &summary.dealer_hand[..summary.dealer_hand.len() - 1];
                assert!(dealer_must_draw(hand_value(before_last)));
            }
            assert!(summary.result.is_final());
            assert_eq!(results(&player).last(), Some(&summary.result));
        }
    }
}
