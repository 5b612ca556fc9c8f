//! In-memory collaborators for unit tests

use crate::gateway::{GatewayError, PublishGateway};
use crate::peripherals::{Actuator, TextDisplay};
use crate::property::PropertyValue;
use crate::sensor::{Quantity, SensorSource};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// One message handed to [`RecordingGateway`]
#[derive(Debug, Clone, PartialEq)]
pub enum Published {
    Telemetry {
        group: usize,
        body: String,
    },
    Property {
        component: Option<String>,
        name: String,
        value: PropertyValue,
    },
    Ack {
        name: String,
        value: PropertyValue,
        status: u32,
        version: u64,
    },
    CommandResponse {
        request_id: String,
        status: u32,
        body: Bytes,
    },
}

/// Gateway that records what it is given, or fails on demand
#[derive(Default)]
pub struct RecordingGateway {
    events: Mutex<Vec<Published>>,
    failure: Mutex<Option<GatewayError>>,
    telemetry_feed: Option<mpsc::UnboundedSender<(Instant, usize)>>,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Also reports each telemetry publish with the (possibly paused) time it happened
    pub fn with_telemetry_feed() -> (Arc<Self>, mpsc::UnboundedReceiver<(Instant, usize)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let gateway = Self {
            telemetry_feed: Some(tx),
            ..Self::default()
        };
        (Arc::new(gateway), rx)
    }

    /// Make every following publish fail with `error`
    pub fn fail_with(&self, error: GatewayError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn succeed(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn events(&self) -> Vec<Published> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn telemetry(&self) -> Vec<(usize, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Published::Telemetry { group, body } => Some((group, body)),
                _ => None,
            })
            .collect()
    }

    /// `(name, version)` of every acknowledgment
    pub fn acks(&self) -> Vec<(String, u64)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Published::Ack { name, version, .. } => Some((name, version)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Published) -> Result<(), GatewayError> {
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[async_trait]
impl PublishGateway for RecordingGateway {
    async fn publish_telemetry(&self, group: usize, body: Bytes) -> Result<(), GatewayError> {
        self.record(Published::Telemetry {
            group,
            body: String::from_utf8_lossy(&body).into_owned(),
        })?;
        if let Some(feed) = &self.telemetry_feed {
            let _ = feed.send((Instant::now(), group));
        }
        Ok(())
    }

    async fn publish_property(
        &self,
        component: Option<&str>,
        name: &str,
        value: &PropertyValue,
    ) -> Result<(), GatewayError> {
        self.record(Published::Property {
            component: component.map(str::to_string),
            name: name.to_string(),
            value: value.clone(),
        })
    }

    async fn publish_writable_property_ack(
        &self,
        name: &str,
        value: &PropertyValue,
        status: u32,
        version: u64,
    ) -> Result<(), GatewayError> {
        self.record(Published::Ack {
            name: name.to_string(),
            value: value.clone(),
            status,
            version,
        })
    }

    async fn respond_to_command(
        &self,
        request_id: &str,
        status: u32,
        body: Bytes,
    ) -> Result<(), GatewayError> {
        self.record(Published::CommandResponse {
            request_id: request_id.to_string(),
            status,
            body,
        })
    }
}

/// Sensor source with fixed readings; unlisted quantities read 0.0
pub struct FixedSensors {
    readings: HashMap<Quantity, f64>,
}

impl FixedSensors {
    pub fn new(readings: &[(Quantity, f64)]) -> Self {
        Self {
            readings: readings.iter().copied().collect(),
        }
    }
}

impl SensorSource for FixedSensors {
    fn read(&self, quantity: Quantity) -> f64 {
        self.readings.get(&quantity).copied().unwrap_or(0.0)
    }
}

#[derive(Default)]
pub struct RecordingActuator {
    states: Mutex<Vec<bool>>,
}

impl RecordingActuator {
    pub fn states(&self) -> Vec<bool> {
        self.states.lock().unwrap().clone()
    }
}

impl Actuator for RecordingActuator {
    fn set_led(&self, on: bool) {
        self.states.lock().unwrap().push(on);
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    lines: Mutex<Vec<String>>,
}

impl RecordingDisplay {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl TextDisplay for RecordingDisplay {
    fn show(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}
