//! Console operator: prompts on stdout, answers from a line reader.
//!
//! The reader is generic so tests can feed answers from a byte slice; the
//! binary uses [`ConsoleOperator::stdin`].

use async_trait::async_trait;
use blackjack_core::{Decision, RoundResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use crate::application::play_table::{Operator, TableEvent};

pub struct ConsoleOperator<R> {
    lines: Lines<R>,
}

impl ConsoleOperator<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> ConsoleOperator<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Next input line; `None` on EOF or a read error.
    async fn read_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to read from console: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Operator for ConsoleOperator<R> {
    async fn ask_rounds(&mut self) -> Option<u8> {
        println!("How many rounds do you want to play? ");
        let answer = self.read_line().await?;
        let rounds = parse_rounds(&answer);
        if answer.trim().parse::<u8>().ok() != Some(rounds) {
            println!("Invalid number, playing {rounds} round");
        }
        Some(rounds)
    }

    async fn ask_decision(&mut self, player_total: u8) -> Decision {
        println!("Your total is {player_total}. Hit or stand? (h/s) ");
        match self.read_line().await {
            Some(answer) => parse_decision(&answer),
            None => Decision::Stand,
        }
    }

    fn report(&mut self, event: &TableEvent) {
        println!("{}", describe(event));
    }
}

/// A round count in `1..=255`; anything else falls back to 1.
pub fn parse_rounds(answer: &str) -> u8 {
    match answer.trim().parse::<u8>() {
        Ok(n) if n >= 1 => n,
        _ => 1,
    }
}

/// `h`/`H` at the start means hit; everything else stands.
pub fn parse_decision(answer: &str) -> Decision {
    match answer.trim_start().chars().next() {
        Some(c) if c.eq_ignore_ascii_case(&'h') => Decision::Hit,
        _ => Decision::Stand,
    }
}

/// The console line for an event.
pub fn describe(event: &TableEvent) -> String {
    match event {
        TableEvent::RoundStarted { round } => format!("--- Round {round} ---"),
        TableEvent::PlayerCard { card, total } => format!("You got {card} (sum: {total})"),
        TableEvent::DealerUpCard { card } => format!("Dealer's visible card: {card}"),
        TableEvent::DealerHoleCard { card, total } => {
            format!("Dealer reveals hidden card: {card} (sum: {total})")
        }
        TableEvent::DealerDraw { card, total } => format!("Dealer draws {card} (sum: {total})"),
        TableEvent::RoundOver { result, .. } => match result {
            RoundResult::ClientWin => "You win!".to_string(),
            RoundResult::DealerWin => "Dealer wins!".to_string(),
            RoundResult::Tie => "It's a tie!".to_string(),
            RoundResult::Active => "Round still in progress".to_string(),
        },
        TableEvent::Finished(summary) => format!(
            "Finished playing {} rounds, win rate: {:.2}",
            summary.rounds,
            summary.win_rate()
        ),
    }
}
