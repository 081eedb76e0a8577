//! Stream-backed [`DealerLink`].

use std::io::ErrorKind;
use std::net::SocketAddr;

use async_trait::async_trait;
use blackjack_core::{
    decode_message, encode_message, protocol::messages::SERVER_UPDATE_SIZE, Decision,
    DecisionMessage, RequestMessage, ServerUpdateMessage,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{info, trace};

use crate::application::play_table::{DealerLink, LinkError};

pub struct StreamDealerLink<S> {
    stream: S,
}

impl StreamDealerLink<TcpStream> {
    /// Opens the TCP session with the dealer.
    pub async fn connect(addr: SocketAddr) -> Result<Self, LinkError> {
        let stream = TcpStream::connect(addr).await?;
        info!("connected to dealer at {addr}");
        Ok(Self::new(stream))
    }
}

impl<S> StreamDealerLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    async fn write_frame(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        trace!("sent {} byte frame", bytes.len());
        Ok(())
    }
}

#[async_trait]
impl<S> DealerLink for StreamDealerLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_request(&mut self, rounds: u8, team_name: &str) -> Result<(), LinkError> {
        let bytes = encode_message(&RequestMessage {
            rounds,
            team_name: team_name.to_string(),
        });
        self.write_frame(&bytes).await
    }

    async fn send_decision(&mut self, decision: Decision) -> Result<(), LinkError> {
        let bytes = encode_message(&DecisionMessage { decision });
        self.write_frame(&bytes).await
    }

    async fn receive_update(&mut self) -> Result<ServerUpdateMessage, LinkError> {
        let mut buf = [0u8; SERVER_UPDATE_SIZE];
        match self.stream.read_exact(&mut buf).await {
            Ok(_) => Ok(decode_message(&buf)?),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(LinkError::Closed),
            Err(e) => Err(LinkError::Io(e)),
        }
    }
}
