//! How the connection task reaches the endpoint

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// Opens the byte stream that envelopes are framed over.
///
/// The connection task calls `connect` once; there is no reconnect.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Send + Unpin + 'static;

    async fn connect(&self) -> Result<Self::Stream>;

    /// Where this connector leads, as `scheme://address`; used in logs and events
    fn endpoint(&self) -> String;
}
