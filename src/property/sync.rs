//! Property synchronization with the remote endpoint
//!
//! Two inbound paths feed the store: desired-property pushes (a patch holding
//! only the changed keys) and full twin documents. Both go through the same
//! per-key version check and acknowledgment. Local changes made by commands
//! are reported back as reported properties.

use super::store::{PropertyStore, PropertyValue, RemoteUpdate, StoreError};
use crate::gateway::{GatewayError, PublishGateway};
use crate::scheduler::WakeSignal;
use sensor_node_shared::{status, twin};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why an inbound property document was dropped as a whole
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Property document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Property document is not a JSON object")]
    NotAnObject,

    #[error("Property document has no {} member", twin::VERSION_KEY)]
    MissingVersion,

    #[error("Twin document has no desired section")]
    MissingDesired,
}

/// Glue between the property store, the scheduler's wake signal and the gateway
#[derive(Clone)]
pub struct PropertySync {
    store: PropertyStore,
    wake: WakeSignal,
    gateway: Arc<dyn PublishGateway>,
}

impl PropertySync {
    pub fn new(store: PropertyStore, wake: WakeSignal, gateway: Arc<dyn PublishGateway>) -> Self {
        Self {
            store,
            wake,
            gateway,
        }
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    /// Handle one desired `(name, value, version)` from the remote endpoint.
    ///
    /// An accepted update wakes the scheduler (if it affects cadence) before
    /// the acknowledgment goes out.
    pub async fn on_desired(&self, name: &str, value: PropertyValue, version: u64) -> RemoteUpdate {
        let outcome = self.store.apply_remote(name, value, version).await;

        match &outcome {
            RemoteUpdate::Accepted(property) => {
                info!(
                    "Desired {} = {} accepted (version {})",
                    property.name, property.value, property.version
                );
                if property.affects_cadence {
                    self.wake.set();
                }

                match self
                    .gateway
                    .publish_writable_property_ack(
                        &property.name,
                        &property.value,
                        status::OK,
                        property.version,
                    )
                    .await
                {
                    Ok(()) => {
                        self.store
                            .mark_acknowledged(&property.name, property.version, &property.value)
                            .await;
                    }
                    Err(e) => warn!("Failed to acknowledge {}: {}", property.name, e),
                }
            }
            RemoteUpdate::Stale { stored_version } => {
                debug!(
                    "Dropping stale desired {} (version {} <= {})",
                    name, version, stored_version
                );
            }
            RemoteUpdate::Unknown | RemoteUpdate::NotWritable => {
                debug!("Ignoring desired update for {}", name);
            }
            RemoteUpdate::TypeMismatch { expected } => {
                warn!("Dropping malformed desired {}: expected {} value", name, expected);
            }
        }

        outcome
    }

    /// Handle a desired-property patch: `{"<name>": <value>, ..., "$version": N}`.
    ///
    /// Returns the number of accepted keys.
    pub async fn on_desired_patch(&self, body: &[u8]) -> Result<usize, PatchError> {
        let document: Value = serde_json::from_slice(body)?;
        let desired = document.as_object().ok_or(PatchError::NotAnObject)?;
        self.apply_desired_section(desired).await
    }

    /// Handle a full twin: `{"desired": {..., "$version": N}, "reported": {...}}`.
    ///
    /// Only recognized keys of the desired section are applied.
    pub async fn on_twin(&self, body: &[u8]) -> Result<usize, PatchError> {
        let document: Value = serde_json::from_slice(body)?;
        let desired = document
            .as_object()
            .ok_or(PatchError::NotAnObject)?
            .get("desired")
            .and_then(Value::as_object)
            .ok_or(PatchError::MissingDesired)?;
        self.apply_desired_section(desired).await
    }

    async fn apply_desired_section(&self, desired: &Map<String, Value>) -> Result<usize, PatchError> {
        let version = desired
            .get(twin::VERSION_KEY)
            .and_then(Value::as_u64)
            .ok_or(PatchError::MissingVersion)?;

        let mut accepted = 0;
        for (name, raw) in desired {
            if name.starts_with('$') {
                continue;
            }

            match PropertyValue::from_json(raw) {
                Some(value) => {
                    if let RemoteUpdate::Accepted(_) = self.on_desired(name, value, version).await {
                        accepted += 1;
                    }
                }
                None if self.store.get(name).await.is_some() => {
                    warn!("Dropping malformed desired {}: {}", name, raw);
                }
                None => debug!("Ignoring desired update for {}", name),
            }
        }

        Ok(accepted)
    }

    /// Change a property locally and report the new value
    pub async fn set_local(&self, name: &str, value: PropertyValue) -> Result<(), StoreError> {
        let property = self.store.set_local(name, value).await?;

        match self
            .gateway
            .publish_property(None, &property.name, &property.value)
            .await
        {
            Ok(()) => {
                self.store
                    .mark_acknowledged(&property.name, property.version, &property.value)
                    .await;
            }
            Err(e) => warn!("Failed to report {}: {}", property.name, e),
        }

        Ok(())
    }

    /// Report every property's current value (startup)
    pub async fn report_all(&self) -> Result<(), GatewayError> {
        for property in self.store.snapshot().await {
            match self
                .gateway
                .publish_property(None, &property.name, &property.value)
                .await
            {
                Ok(()) => {}
                Err(GatewayError::Transient(reason)) => {
                    warn!("Failed to report {}: {}", property.name, reason)
                }
                Err(GatewayError::Closed) => return Err(GatewayError::Closed),
            }
        }
        Ok(())
    }

    /// Report static facts as properties of `component`
    pub async fn report_component(
        &self,
        component: &str,
        properties: &[(&str, PropertyValue)],
    ) -> Result<(), GatewayError> {
        for (name, value) in properties {
            match self.gateway.publish_property(Some(component), name, value).await {
                Ok(()) => {}
                Err(GatewayError::Transient(reason)) => {
                    warn!("Failed to report {}/{}: {}", component, name, reason)
                }
                Err(GatewayError::Closed) => return Err(GatewayError::Closed),
            }
        }
        Ok(())
    }
}
