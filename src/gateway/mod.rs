//! Publish gateway: the outbound boundary of the node
//!
//! Everything the core sends (telemetry, reported properties, writable
//! property acknowledgments, command responses) goes through
//! [`PublishGateway`]. Delivery and retries belong to the implementation.

mod envelope;

pub use envelope::EnvelopeGateway;

use crate::property::PropertyValue;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The message was not sent; later messages may be
    #[error("Transient publish failure: {0}")]
    Transient(String),

    /// The transport is gone for good
    #[error("Publish gateway closed")]
    Closed,
}

/// Outbound message sink
#[async_trait]
pub trait PublishGateway: Send + Sync {
    /// Send one encoded telemetry message of the given group
    async fn publish_telemetry(&self, group: usize, body: Bytes) -> Result<(), GatewayError>;

    /// Report a property value; `component` is `None` for root properties
    async fn publish_property(
        &self,
        component: Option<&str>,
        name: &str,
        value: &PropertyValue,
    ) -> Result<(), GatewayError>;

    /// Acknowledge an accepted desired property
    async fn publish_writable_property_ack(
        &self,
        name: &str,
        value: &PropertyValue,
        status: u32,
        version: u64,
    ) -> Result<(), GatewayError>;

    /// Answer a command request
    async fn respond_to_command(
        &self,
        request_id: &str,
        status: u32,
        body: Bytes,
    ) -> Result<(), GatewayError>;
}
