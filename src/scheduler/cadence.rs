//! Cadence scheduler - the sample/publish loop
//!
//! Each cycle waits for the current telemetry interval (or until a property
//! change wakes it), then samples, encodes and publishes the next telemetry
//! group in the rotation.

use super::wake::{WakeOutcome, WakeSignal};
use crate::config::TelemetryConfig;
use crate::gateway::{GatewayError, PublishGateway};
use crate::property::{PropertyStore, PropertyValue};
use crate::sensor::SensorSource;
use crate::telemetry::{TelemetryEncoder, TelemetryGroup};
use sensor_node_shared::twin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("No telemetry groups to publish")]
    NoGroups,

    #[error("Interval property {0} is missing or not an integer")]
    UnknownIntervalProperty(String),

    #[error("Publish gateway closed")]
    TransportClosed,
}

/// Scheduler tuning
#[derive(Debug, Clone)]
pub struct CadenceSettings {
    /// Integer property holding the interval in seconds
    pub interval_property: String,
    /// Shortest wait the scheduler will use
    pub tick: Duration,
    pub max_message_size: usize,
}

impl CadenceSettings {
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self {
            interval_property: twin::TELEMETRY_INTERVAL.to_string(),
            tick: Duration::from_millis(config.tick_ms.max(1)),
            max_message_size: config.max_message_size,
        }
    }
}

/// What one act phase did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActOutcome {
    /// Handed to the gateway
    Published { group: usize, bytes: usize },
    /// Encoding failed; nothing was sent this cycle
    Skipped { group: usize },
    /// The gateway refused the message
    Dropped { group: usize },
}

pub struct CadenceScheduler {
    groups: Vec<TelemetryGroup>,
    current_index: usize,
    source: Arc<dyn SensorSource>,
    encoder: TelemetryEncoder,
    store: PropertyStore,
    wake: WakeSignal,
    gateway: Arc<dyn PublishGateway>,
    settings: CadenceSettings,
}

impl CadenceScheduler {
    /// Fails before any cycle runs if there is nothing to publish or no
    /// interval property to read.
    pub async fn new(
        groups: Vec<TelemetryGroup>,
        source: Arc<dyn SensorSource>,
        store: PropertyStore,
        wake: WakeSignal,
        gateway: Arc<dyn PublishGateway>,
        settings: CadenceSettings,
    ) -> Result<Self, SchedulerError> {
        if groups.is_empty() {
            return Err(SchedulerError::NoGroups);
        }
        match store.value(&settings.interval_property).await {
            Some(PropertyValue::Int(_)) => {}
            _ => {
                return Err(SchedulerError::UnknownIntervalProperty(
                    settings.interval_property.clone(),
                ))
            }
        }

        Ok(Self {
            groups,
            current_index: 0,
            source,
            encoder: TelemetryEncoder::new(settings.max_message_size),
            store,
            wake,
            gateway,
            settings,
        })
    }

    /// Index of the group the next act phase publishes
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Current interval, never shorter than one tick
    pub async fn wait_duration(&self) -> Duration {
        let secs = self
            .store
            .value(&self.settings.interval_property)
            .await
            .and_then(|value| value.as_int())
            .unwrap_or(0);

        if secs <= 0 {
            return self.settings.tick;
        }
        Duration::from_secs(secs as u64).max(self.settings.tick)
    }

    /// Sample, encode and publish the current group, then move to the next.
    ///
    /// Only a closed gateway is an error.
    pub async fn act(&mut self) -> Result<ActOutcome, SchedulerError> {
        let index = self.current_index;
        self.current_index = (self.current_index + 1) % self.groups.len();
        let group = &self.groups[index];

        let sample = group.sample(self.source.as_ref());
        let body = match self.encoder.encode(&sample) {
            Ok(body) => body,
            Err(e) => {
                warn!("Skipping {} telemetry: {}", group.name, e);
                return Ok(ActOutcome::Skipped { group: index });
            }
        };

        let bytes = body.len();
        match self.gateway.publish_telemetry(group.index, body).await {
            Ok(()) => {
                debug!("Published {} telemetry ({} bytes)", group.name, bytes);
                Ok(ActOutcome::Published {
                    group: index,
                    bytes,
                })
            }
            Err(GatewayError::Transient(reason)) => {
                warn!("Dropped {} telemetry: {}", group.name, reason);
                Ok(ActOutcome::Dropped { group: index })
            }
            Err(GatewayError::Closed) => {
                error!("Publish gateway closed, stopping scheduler");
                Err(SchedulerError::TransportClosed)
            }
        }
    }

    /// Run wait/act cycles until the gateway closes
    pub async fn run(mut self) -> Result<(), SchedulerError> {
        info!(
            "Cadence scheduler started: {} groups, starting at {}",
            self.group_count(),
            self.groups[self.current_index()].name
        );

        loop {
            let timeout = self.wait_duration().await;
            if self.wake.wait(timeout).await == WakeOutcome::Signaled {
                debug!("Woken before {:?} elapsed", timeout);
            }
            self.act().await?;
        }
    }
}
