//! Telemetry groups and their wire encoding

mod encoder;
mod groups;

pub use encoder::{format_reading, EncodeError, TelemetryEncoder};
pub use groups::{Reading, Sample, TelemetryField, TelemetryGroup, UnknownGroup};
