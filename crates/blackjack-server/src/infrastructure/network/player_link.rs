//! Stream-backed [`PlayerLink`].
//!
//! Every client-to-server message has a fixed wire size, so framing is just
//! `read_exact` of that many bytes followed by [`decode_message`].  An EOF in
//! the middle of a frame means the player hung up.

use std::io::ErrorKind;

use async_trait::async_trait;
use blackjack_core::{
    decode_message, encode_message, Decision, DecisionMessage, RequestMessage,
    ServerUpdateMessage, WireMessage,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::application::play_round::{LinkError, PlayerLink};

/// Frames protocol messages over any byte stream (a `TcpStream` in production).
pub struct StreamPlayerLink<S> {
    stream: S,
}

impl<S> StreamPlayerLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Flushes and shuts down the write side; the player sees EOF.
    pub async fn close(mut self) -> Result<(), LinkError> {
        self.stream.shutdown().await?;
        Ok(())
    }

    async fn read_frame<M: WireMessage>(&mut self) -> Result<M, LinkError> {
        let mut buf = vec![0u8; M::WIRE_SIZE];
        match self.stream.read_exact(&mut buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(LinkError::Closed),
            Err(e) => return Err(LinkError::Io(e)),
        }
        trace!("received {} byte frame", buf.len());
        Ok(decode_message::<M>(&buf)?)
    }
}

#[async_trait]
impl<S> PlayerLink for StreamPlayerLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn receive_request(&mut self) -> Result<RequestMessage, LinkError> {
        self.read_frame::<RequestMessage>().await
    }

    async fn receive_decision(&mut self) -> Result<Decision, LinkError> {
        let msg = self.read_frame::<DecisionMessage>().await?;
        Ok(msg.decision)
    }

    async fn send_update(&mut self, update: ServerUpdateMessage) -> Result<(), LinkError> {
        let bytes = encode_message(&update);
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
