//! Routes inbound envelopes to the command dispatcher and property sync

use crate::command::CommandDispatcher;
use crate::gateway::{GatewayError, PublishGateway};
use crate::property::PropertySync;
use sensor_node_shared::{envelope::Payload, Envelope};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct InboundRouter {
    dispatcher: Arc<CommandDispatcher>,
    properties: PropertySync,
    gateway: Arc<dyn PublishGateway>,
}

impl InboundRouter {
    pub fn new(
        dispatcher: Arc<CommandDispatcher>,
        properties: PropertySync,
        gateway: Arc<dyn PublishGateway>,
    ) -> Self {
        Self {
            dispatcher,
            properties,
            gateway,
        }
    }

    /// Handle one envelope from the endpoint.
    ///
    /// Only a closed gateway is reported; everything else is logged.
    pub async fn handle(&self, envelope: Envelope) -> Result<(), GatewayError> {
        let Some(header) = envelope.header else {
            warn!("Dropping envelope without header");
            return Ok(());
        };
        debug!("Inbound {:?} seq={}", header.msg_type(), header.sequence_id);

        match envelope.payload {
            Some(Payload::CommandRequest(request)) => {
                let response = self
                    .dispatcher
                    .dispatch(&request.name, &request.payload)
                    .await;

                match self
                    .gateway
                    .respond_to_command(&request.request_id, response.status, response.body)
                    .await
                {
                    Ok(()) => {}
                    Err(GatewayError::Transient(reason)) => {
                        warn!("Failed to answer {}: {}", request.request_id, reason)
                    }
                    Err(GatewayError::Closed) => return Err(GatewayError::Closed),
                }
            }
            Some(Payload::DesiredProperties(desired)) => {
                match self.properties.on_desired_patch(&desired.body).await {
                    Ok(accepted) => info!("Desired patch applied: {} accepted", accepted),
                    Err(e) => warn!("Dropping desired patch: {}", e),
                }
            }
            Some(Payload::TwinDocument(twin)) => match self.properties.on_twin(&twin.body).await {
                Ok(accepted) => info!("Twin document applied: {} accepted", accepted),
                Err(e) => warn!("Dropping twin document: {}", e),
            },
            Some(other) => debug!("Ignoring unexpected inbound payload: {:?}", other),
            None => warn!("Dropping envelope without payload"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handlers::HandlerContext;
    use crate::property::{PropertyDef, PropertyStore, PropertyValue};
    use crate::scheduler::WakeSignal;
    use crate::testing::{Published, RecordingActuator, RecordingDisplay, RecordingGateway};
    use bytes::Bytes;
    use sensor_node_shared::{
        twin, CommandRequest, DesiredProperties, Header, MessageType, Telemetry, TwinDocument,
    };

    fn router() -> (InboundRouter, Arc<RecordingGateway>, PropertyStore) {
        let gateway = RecordingGateway::new();
        let store = PropertyStore::new(PropertyDef::catalogue(10));
        let properties = PropertySync::new(store.clone(), WakeSignal::new(), gateway.clone());
        let ctx = HandlerContext {
            properties: properties.clone(),
            actuator: Arc::new(RecordingActuator::default()),
            display: Arc::new(RecordingDisplay::default()),
            display_width: 19,
        };
        let dispatcher = Arc::new(CommandDispatcher::with_builtin_commands(ctx));
        (
            InboundRouter::new(dispatcher, properties, gateway.clone()),
            gateway,
            store,
        )
    }

    fn envelope(msg_type: MessageType, payload: Payload) -> Envelope {
        Envelope::new(Header::new("endpoint", msg_type, 1), payload)
    }

    #[tokio::test]
    async fn test_command_gets_response() {
        let (router, gateway, _store) = router();

        router
            .handle(envelope(
                MessageType::MsgCommandRequest,
                Payload::CommandRequest(CommandRequest {
                    request_id: "req-7".into(),
                    name: "reboot".into(),
                    payload: Bytes::new(),
                }),
            ))
            .await
            .unwrap();

        assert_eq!(
            gateway.events(),
            vec![Published::CommandResponse {
                request_id: "req-7".into(),
                status: 501,
                body: Bytes::new(),
            }]
        );
    }

    #[tokio::test]
    async fn test_desired_and_twin_reach_store() {
        let (router, _gateway, store) = router();

        router
            .handle(envelope(
                MessageType::MsgDesiredProperties,
                Payload::DesiredProperties(DesiredProperties {
                    body: Bytes::from_static(br#"{"telemetryInterval":4,"$version":2}"#),
                }),
            ))
            .await
            .unwrap();
        assert_eq!(
            store.value(twin::TELEMETRY_INTERVAL).await,
            Some(PropertyValue::Int(4))
        );

        router
            .handle(envelope(
                MessageType::MsgTwinDocument,
                Payload::TwinDocument(TwinDocument {
                    body: Bytes::from_static(
                        br#"{"desired":{"telemetryInterval":6,"$version":3},"reported":{}}"#,
                    ),
                }),
            ))
            .await
            .unwrap();
        assert_eq!(
            store.value(twin::TELEMETRY_INTERVAL).await,
            Some(PropertyValue::Int(6))
        );
    }

    #[tokio::test]
    async fn test_unroutable_envelopes_are_ignored() {
        let (router, gateway, _store) = router();

        router.handle(Envelope::default()).await.unwrap();
        router
            .handle(envelope(
                MessageType::MsgTelemetry,
                Payload::Telemetry(Telemetry {
                    group: 0,
                    body: Bytes::new(),
                }),
            ))
            .await
            .unwrap();
        router
            .handle(envelope(
                MessageType::MsgDesiredProperties,
                Payload::DesiredProperties(DesiredProperties {
                    body: Bytes::from_static(b"not json"),
                }),
            ))
            .await
            .unwrap();

        assert!(gateway.events().is_empty());
    }

    #[tokio::test]
    async fn test_closed_gateway_is_reported() {
        let (router, gateway, _store) = router();
        gateway.fail_with(GatewayError::Closed);

        let result = router
            .handle(envelope(
                MessageType::MsgCommandRequest,
                Payload::CommandRequest(CommandRequest {
                    request_id: "req-8".into(),
                    name: "displayText".into(),
                    payload: Bytes::from_static(b"\"hi\""),
                }),
            ))
            .await;
        assert_eq!(result, Err(GatewayError::Closed));
    }
}
