//! TCP transport

use crate::config::EndpointConfig;
use crate::transport::traits::TransportConnector;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// Connects to a fixed `host:port`
#[derive(Debug, Clone)]
pub struct TcpConnector {
    address: String,
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(address: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            address: address.into(),
            connect_timeout,
        }
    }

    pub fn from_config(config: &EndpointConfig) -> Self {
        Self::new(
            config.address.clone(),
            Duration::from_secs(config.connect_timeout_secs),
        )
    }
}

#[async_trait]
impl TransportConnector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self) -> Result<Self::Stream> {
        debug!("Connecting to {} (timeout {:?})", self.address, self.connect_timeout);

        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.address))
            .await
            .with_context(|| format!("Timed out connecting to {}", self.address))?
            .with_context(|| format!("Failed to connect to {}", self.address))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    fn endpoint(&self) -> String {
        format!("tcp://{}", self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connects_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let connector = TcpConnector::new(address, Duration::from_secs(1));
        let stream = connector.connect().await.unwrap();
        let (server_side, _) = listener.accept().await.unwrap();

        assert_eq!(stream.peer_addr().unwrap(), server_side.local_addr().unwrap());
        assert!(stream.nodelay().unwrap());
    }

    #[tokio::test]
    async fn test_refused_connection_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let connector = TcpConnector::new(address.clone(), Duration::from_secs(1));
        let err = connector.connect().await.unwrap_err();
        assert!(format!("{:#}", err).contains(&address));
    }

    #[test]
    fn test_endpoint_from_config() {
        let connector = TcpConnector::from_config(&EndpointConfig::default());
        assert_eq!(connector.endpoint(), "tcp://127.0.0.1:8883");
    }
}
