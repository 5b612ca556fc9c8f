//! Sensor Node Shared Protocol Types
//!
//! This crate provides the wire protocol types and framing codec used between
//! a sensor node and the remote endpoint it reports to.

pub mod codec;
pub mod proto;

use std::time::{SystemTime, UNIX_EPOCH};

// Re-export commonly used types at crate root
pub use proto::*;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Compiled-in defaults for the device cadence and message sizes
pub mod defaults {
    /// Telemetry interval used until the remote endpoint says otherwise (seconds)
    pub const TELEMETRY_INTERVAL_SECS: i64 = 10;

    /// Byte budget of a single telemetry message
    pub const MAX_MESSAGE_SIZE: usize = 96;

    /// Scheduler tick in milliseconds (100 ticks per second)
    pub const SCHEDULER_TICK_MS: u64 = 10;

    /// Width of one display line in characters
    pub const DISPLAY_LINE_CHARS: usize = 19;
}

/// Status codes used in acknowledgments and command responses
pub mod status {
    pub const OK: u32 = 200;
    pub const BAD_REQUEST: u32 = 400;
    pub const INTERNAL_ERROR: u32 = 500;
    pub const NOT_IMPLEMENTED: u32 = 501;
}

/// Well-known property and component names of the device twin
pub mod twin {
    pub const TELEMETRY_INTERVAL: &str = "telemetryInterval";
    pub const LED_STATE: &str = "ledState";
    pub const DEVICE_INFO_COMPONENT: &str = "deviceInformation";

    /// Key carrying the document version in desired-property JSON
    pub const VERSION_KEY: &str = "$version";
}

impl Header {
    /// Create a new header with the given device ID and message type
    pub fn new(device_id: impl Into<String>, msg_type: MessageType, sequence_id: u64) -> Self {
        Self {
            device_id: device_id.into(),
            sequence_id,
            timestamp_ms: now_ms(),
            msg_type: msg_type.into(),
        }
    }
}

impl Envelope {
    /// Wrap a payload with a freshly stamped header
    pub fn new(header: Header, payload: envelope::Payload) -> Self {
        Self {
            header: Some(header),
            payload: Some(payload),
        }
    }
}

impl WireValue {
    pub fn int(value: i64) -> Self {
        Self {
            kind: Some(wire_value::Kind::IntValue(value)),
        }
    }

    pub fn bool(value: bool) -> Self {
        Self {
            kind: Some(wire_value::Kind::BoolValue(value)),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: Some(wire_value::Kind::TextValue(value.into())),
        }
    }
}
