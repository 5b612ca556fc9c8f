//! Connection manager for a single endpoint connection

use crate::transport::TransportConnector;
use anyhow::{anyhow, Result};
use sensor_node_shared::{
    codec::{encode_frame, CodecError, FrameDecoder},
    Envelope,
};
use std::collections::VecDeque;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Decoded envelopes held while the event queue is full; reading pauses beyond this
const MAX_PENDING_INBOUND: usize = 64;

/// Events emitted by the connection manager
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    /// Connected to the endpoint
    Connected { endpoint: String },
    /// Received an envelope from the endpoint
    Received(Envelope),
    /// The connection ended; no further events follow
    Disconnected { reason: String },
    /// The connection could not be established; no further events follow
    ConnectionFailed { reason: String },
}

/// Owns the connection task and its channels
pub struct ConnectionManager {
    /// Channel to send envelopes to the endpoint
    outbound_tx: mpsc::Sender<Envelope>,
    event_rx: mpsc::Receiver<ConnectionEvent>,
}

impl ConnectionManager {
    /// Spawn the connection task.
    ///
    /// `queue_depth` bounds both the outbound queue and the event queue.
    pub fn start<C>(connector: C, queue_depth: usize) -> Self
    where
        C: TransportConnector + 'static,
    {
        let (outbound_tx, outbound_rx) = mpsc::channel::<Envelope>(queue_depth);
        let (event_tx, event_rx) = mpsc::channel::<ConnectionEvent>(queue_depth);

        tokio::spawn(async move {
            connection_task(connector, outbound_rx, event_tx).await;
        });

        Self {
            outbound_tx,
            event_rx,
        }
    }

    /// Get a clone of the sender for outbound messages
    pub fn get_sender(&self) -> mpsc::Sender<Envelope> {
        self.outbound_tx.clone()
    }

    /// Receive the next connection event; `None` once the task has ended
    pub async fn recv(&mut self) -> Option<ConnectionEvent> {
        self.event_rx.recv().await
    }
}

async fn connection_task<C: TransportConnector>(
    connector: C,
    mut outbound_rx: mpsc::Receiver<Envelope>,
    event_tx: mpsc::Sender<ConnectionEvent>,
) {
    let endpoint = connector.endpoint();
    let stream = match connector.connect().await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Connection to {} failed: {:#}", endpoint, e);
            let _ = event_tx
                .send(ConnectionEvent::ConnectionFailed {
                    reason: format!("{:#}", e),
                })
                .await;
            return;
        }
    };

    info!("Connected to {}", endpoint);
    let _ = event_tx.send(ConnectionEvent::Connected { endpoint }).await;

    let reason = match handle_connection(stream, &mut outbound_rx, &event_tx).await {
        Ok(()) => "Outbound channel closed".to_string(),
        Err(e) => e.to_string(),
    };

    warn!("Disconnected: {}", reason);
    let _ = event_tx.send(ConnectionEvent::Disconnected { reason }).await;
}

/// Pump frames both ways until either side closes.
///
/// Inbound envelopes wait in `pending` until the event queue has room, so the
/// outbound queue keeps draining while the event consumer is busy sending.
async fn handle_connection<S>(
    mut stream: S,
    outbound_rx: &mut mpsc::Receiver<Envelope>,
    event_tx: &mpsc::Sender<ConnectionEvent>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut decoder = FrameDecoder::new();
    let mut read_buf = vec![0u8; 4096];
    let mut pending: VecDeque<Envelope> = VecDeque::new();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(envelope) = outbound else {
                    let _ = stream.shutdown().await;
                    return Ok(());
                };
                let frame = encode_frame(&envelope)?;
                stream.write_all(&frame).await?;
            }

            permit = event_tx.reserve(), if !pending.is_empty() => {
                let permit = permit.map_err(|_| anyhow!("Event receiver dropped"))?;
                if let Some(envelope) = pending.pop_front() {
                    permit.send(ConnectionEvent::Received(envelope));
                }
            }

            result = stream.read(&mut read_buf), if pending.len() < MAX_PENDING_INBOUND => {
                let n = result.map_err(|e| anyhow!("Read error: {}", e))?;
                if n == 0 {
                    return Err(anyhow!("Endpoint closed connection"));
                }

                decoder.extend(&read_buf[..n]);
                loop {
                    match decoder.decode_next() {
                        Ok(Some(envelope)) => pending.push_back(envelope),
                        Ok(None) => break,
                        // The frame was consumed; the stream is still aligned
                        Err(CodecError::Decode(e)) => warn!("Dropping undecodable frame: {}", e),
                        Err(e) => return Err(e.into()),
                    }
                }
                debug!("{} inbound envelopes pending", pending.len());
            }
        }
    }
}
