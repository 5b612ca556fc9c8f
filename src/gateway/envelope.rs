//! Gateway that queues envelopes on the connection's outbound channel

use super::{GatewayError, PublishGateway};
use crate::property::PropertyValue;
use async_trait::async_trait;
use bytes::Bytes;
use sensor_node_shared::{
    envelope::Payload, CommandResponse, Envelope, Header, MessageType, ReportedProperty, Telemetry,
    WritablePropertyAck,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Stamps headers and hands envelopes to the connection task.
///
/// Telemetry never waits for queue space: a full queue drops the message as a
/// transient failure. Everything else waits.
pub struct EnvelopeGateway {
    device_id: String,
    sequence_id: Arc<AtomicU64>,
    outbound: mpsc::Sender<Envelope>,
}

impl EnvelopeGateway {
    pub fn new(device_id: impl Into<String>, outbound: mpsc::Sender<Envelope>) -> Self {
        Self {
            device_id: device_id.into(),
            sequence_id: Arc::new(AtomicU64::new(0)),
            outbound,
        }
    }

    fn envelope(&self, msg_type: MessageType, payload: Payload) -> Envelope {
        let seq = self.sequence_id.fetch_add(1, Ordering::SeqCst) + 1;
        Envelope::new(Header::new(&self.device_id, msg_type, seq), payload)
    }

    async fn send(&self, envelope: Envelope) -> Result<(), GatewayError> {
        self.outbound
            .send(envelope)
            .await
            .map_err(|_| GatewayError::Closed)
    }
}

#[async_trait]
impl PublishGateway for EnvelopeGateway {
    async fn publish_telemetry(&self, group: usize, body: Bytes) -> Result<(), GatewayError> {
        let envelope = self.envelope(
            MessageType::MsgTelemetry,
            Payload::Telemetry(Telemetry {
                group: group as u32,
                body,
            }),
        );

        match self.outbound.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                Err(GatewayError::Transient("outbound queue full".into()))
            }
            Err(TrySendError::Closed(_)) => Err(GatewayError::Closed),
        }
    }

    async fn publish_property(
        &self,
        component: Option<&str>,
        name: &str,
        value: &PropertyValue,
    ) -> Result<(), GatewayError> {
        let envelope = self.envelope(
            MessageType::MsgReportedProperty,
            Payload::ReportedProperty(ReportedProperty {
                component: component.unwrap_or_default().to_string(),
                name: name.to_string(),
                value: Some(value.into()),
            }),
        );
        self.send(envelope).await
    }

    async fn publish_writable_property_ack(
        &self,
        name: &str,
        value: &PropertyValue,
        status: u32,
        version: u64,
    ) -> Result<(), GatewayError> {
        let envelope = self.envelope(
            MessageType::MsgWritablePropertyAck,
            Payload::WritablePropertyAck(WritablePropertyAck {
                name: name.to_string(),
                value: Some(value.into()),
                status,
                version,
            }),
        );
        self.send(envelope).await
    }

    async fn respond_to_command(
        &self,
        request_id: &str,
        status: u32,
        body: Bytes,
    ) -> Result<(), GatewayError> {
        let envelope = self.envelope(
            MessageType::MsgCommandResponse,
            Payload::CommandResponse(CommandResponse {
                request_id: request_id.to_string(),
                status,
                body,
            }),
        );
        self.send(envelope).await
    }
}
