//! Message consumer.
//!
//! The bus is a newline-delimited TCP feed: each line is one order message.
//! Every connection gets its own task and every message is handled in a task
//! of its own, so messages are processed concurrently with each other and
//! with HTTP lookups. There is no acknowledgement, redelivery or admission
//! control; a dropped or failed message is logged and forgotten.

use std::net::SocketAddr;
use std::sync::Arc;

use orderflow_core::repository::OrderSaver;
use orderflow_orders::application::command_handlers::{self, IngestOutcome};
use orderflow_orders::domain::commands::IngestOrderMessage;
use orderflow_orders::domain::normalizer::TimestampPolicy;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Listens for order messages and feeds them to an `OrderSaver`.
pub struct IngestServer {
    listener: TcpListener,
    saver: Arc<dyn OrderSaver>,
    policy: TimestampPolicy,
}

impl IngestServer {
    /// Binds the message feed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the address cannot be bound.
    pub async fn bind(
        addr: impl ToSocketAddrs,
        saver: Arc<dyn OrderSaver>,
        policy: TimestampPolicy,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            saver,
            policy,
        })
    }

    /// The bound address.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the underlying socket.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts publishers until the task is dropped or aborted.
    pub async fn run(self) {
        match self.listener.local_addr() {
            Ok(addr) => info!(%addr, "order message consumer started"),
            Err(e) => warn!(error = %e, "order message consumer started on unknown address"),
        }
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "publisher connected");
                    tokio::spawn(consume(stream, peer, Arc::clone(&self.saver), self.policy));
                }
                Err(e) => warn!(error = %e, "accept failed"),
            }
        }
    }
}

async fn consume(
    stream: TcpStream,
    peer: SocketAddr,
    saver: Arc<dyn OrderSaver>,
    policy: TimestampPolicy,
) {
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let payload = trim_frame(&line);
                if payload.is_empty() {
                    continue;
                }
                let command = IngestOrderMessage {
                    correlation_id: Uuid::new_v4(),
                    payload: payload.to_vec(),
                };
                tokio::spawn(dispatch(command, policy, Arc::clone(&saver)));
            }
            Err(e) => {
                warn!(%peer, error = %e, "publisher connection failed");
                break;
            }
        }
    }
    debug!(%peer, "publisher disconnected");
}

async fn dispatch(command: IngestOrderMessage, policy: TimestampPolicy, saver: Arc<dyn OrderSaver>) {
    match command_handlers::handle_ingest_order_message(&command, policy, saver.as_ref()).await {
        Ok(IngestOutcome::Persisted { .. } | IngestOutcome::Dropped(_)) => {}
        Err(e) => error!(
            correlation_id = %command.correlation_id,
            error = %e,
            "order message not persisted"
        ),
    }
}

fn trim_frame(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &line[..end]
}

/// Sends one message to a consumer at `addr`.
///
/// Line breaks inside `payload` are replaced by spaces so the message stays a
/// single frame; JSON strings cannot contain raw line breaks, so a JSON
/// document keeps its meaning.
///
/// # Errors
///
/// Returns the I/O error if the connection or write fails.
pub async fn publish(addr: impl ToSocketAddrs, payload: &[u8]) -> std::io::Result<()> {
    let mut frame: Vec<u8> = payload
        .iter()
        .map(|&b| if b == b'\n' || b == b'\r' { b' ' } else { b })
        .collect();
    frame.push(b'\n');

    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(&frame).await?;
    stream.shutdown().await
}
