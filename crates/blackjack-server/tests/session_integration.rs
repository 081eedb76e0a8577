//! End-to-end sessions over a real loopback TCP connection.
//!
//! The test plays the client by hand: it writes encoded Requests and Decisions
//! and checks every Server Update the dealer sends back.

use std::collections::VecDeque;
use std::time::Duration;

use blackjack_core::{
    decode_message, encode_message, protocol::messages::SERVER_UPDATE_SIZE, Card, Decision,
    DecisionMessage, Deck, RequestMessage, RoundResult, ServerUpdateMessage, Suit,
};
use blackjack_server::application::run_session::DeckSource;
use blackjack_server::infrastructure::network::session_listener::SessionListener;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

/// Hands out pre-arranged decks in order.
struct StackedDecks(VecDeque<Deck>);

impl DeckSource for StackedDecks {
    fn next_deck(&mut self) -> Deck {
        self.0.pop_front().unwrap_or_else(Deck::shuffled)
    }
}

fn deck(ranks: &[u8]) -> Deck {
    Deck::stacked(ranks.iter().map(|&r| Card::new(r, Suit::Hearts).unwrap()))
}

/// Starts a dealer on an ephemeral port whose sessions draw from `decks`.
async fn start_dealer(decks: Vec<Vec<u8>>) -> (std::net::SocketAddr, CancellationToken) {
    let listener = SessionListener::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        listener
            .run_with_decks(token, move || {
                StackedDecks(decks.iter().map(|d| deck(d)).collect())
            })
            .await;
    });
    (addr, cancel)
}

async fn send_request(stream: &mut TcpStream, rounds: u8) {
    let bytes = encode_message(&RequestMessage {
        rounds,
        team_name: "X".to_string(),
    });
    stream.write_all(&bytes).await.unwrap();
}

async fn send_decision(stream: &mut TcpStream, decision: Decision) {
    stream
        .write_all(&encode_message(&DecisionMessage { decision }))
        .await
        .unwrap();
}

async fn read_update(stream: &mut TcpStream) -> ServerUpdateMessage {
    let mut buf = [0u8; SERVER_UPDATE_SIZE];
    timeout(WAIT, stream.read_exact(&mut buf))
        .await
        .unwrap()
        .unwrap();
    decode_message(&buf).unwrap()
}

async fn assert_closed(stream: &mut TcpStream) {
    let mut buf = [0u8; 1];
    let n = timeout(WAIT, stream.read(&mut buf)).await.unwrap().unwrap();
    assert_eq!(n, 0, "dealer should close the connection");
}

#[tokio::test]
async fn test_tie_round_sends_five_updates_then_closes() {
    // Arrange: player A,K; dealer 7,9 draws a 5.
    let (addr, cancel) = start_dealer(vec![vec![1, 13, 7, 9, 5]]).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    // Act
    send_request(&mut stream, 1).await;
    let mut updates = Vec::new();
    for _ in 0..3 {
        updates.push(read_update(&mut stream).await);
    }
    send_decision(&mut stream, Decision::Stand).await;
    for _ in 0..2 {
        updates.push(read_update(&mut stream).await);
    }

    // Assert
    let ranks: Vec<u8> = updates.iter().map(|u| u.card.rank()).collect();
    assert_eq!(ranks, vec![1, 13, 7, 9, 5]);
    assert!(updates[..4].iter().all(|u| u.result == RoundResult::Active));
    assert_eq!(updates[4].result, RoundResult::Tie);
    assert_closed(&mut stream).await;
    cancel.cancel();
}

#[tokio::test]
async fn test_bust_on_hit_ends_round_with_dealer_win() {
    let (addr, cancel) = start_dealer(vec![vec![10, 9, 8, 8, 5]]).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    send_request(&mut stream, 1).await;
    for _ in 0..3 {
        assert_eq!(read_update(&mut stream).await.result, RoundResult::Active);
    }
    send_decision(&mut stream, Decision::Hit).await;
    let bust = read_update(&mut stream).await;

    assert_eq!(bust.card.rank(), 5);
    assert_eq!(bust.result, RoundResult::DealerWin);
    assert_closed(&mut stream).await;
    cancel.cancel();
}

#[tokio::test]
async fn test_multi_round_session_reuses_connection() {
    // Round 1: 20 vs 18 (client win).  Round 2: 17 vs 20 (dealer win).
    let (addr, cancel) = start_dealer(vec![vec![10, 10, 10, 8], vec![10, 7, 10, 10]]).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    send_request(&mut stream, 2).await;

    let mut finals = Vec::new();
    for _ in 0..2 {
        for _ in 0..3 {
            read_update(&mut stream).await;
        }
        send_decision(&mut stream, Decision::Stand).await;
        finals.push(read_update(&mut stream).await.result);
    }

    assert_eq!(finals, vec![RoundResult::ClientWin, RoundResult::DealerWin]);
    assert_closed(&mut stream).await;
    cancel.cancel();
}

#[tokio::test]
async fn test_malformed_request_closes_connection_without_updates() {
    let (addr, cancel) = start_dealer(vec![]).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream.write_all(&[0u8; 38]).await.unwrap();

    assert_closed(&mut stream).await;
    cancel.cancel();
}

#[tokio::test]
async fn test_one_failed_session_does_not_affect_another() {
    let (addr, cancel) = start_dealer(vec![vec![10, 10, 10, 8]]).await;

    let mut broken = TcpStream::connect(addr).await.unwrap();
    broken.write_all(b"garbage").await.unwrap();
    drop(broken);

    let mut stream = TcpStream::connect(addr).await.unwrap();
    send_request(&mut stream, 1).await;
    for _ in 0..3 {
        read_update(&mut stream).await;
    }
    send_decision(&mut stream, Decision::Stand).await;

    assert_eq!(read_update(&mut stream).await.result, RoundResult::ClientWin);
    cancel.cancel();
}

#[tokio::test]
async fn test_cancel_waits_for_running_session_to_finish() {
    // Arrange: a listener whose task handle we keep.
    let listener = SessionListener::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let task = tokio::spawn(listener.run_with_decks(cancel.clone(), || {
        StackedDecks(VecDeque::from([deck(&[1, 13, 7, 9, 5])]))
    }));
    let mut stream = TcpStream::connect(addr).await.unwrap();
    send_request(&mut stream, 1).await;
    for _ in 0..3 {
        read_update(&mut stream).await;
    }

    // Act: cancel mid-round.
    cancel.cancel();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Assert: the listener holds on until the round completes.
    assert!(!task.is_finished(), "listener returned with a session in flight");
    send_decision(&mut stream, Decision::Stand).await;
    read_update(&mut stream).await;
    assert_eq!(read_update(&mut stream).await.result, RoundResult::Tie);
    assert_closed(&mut stream).await;
    timeout(WAIT, task).await.unwrap().unwrap();
}
