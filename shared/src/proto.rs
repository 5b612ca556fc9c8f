//! Protobuf messages exchanged between a sensor node and its endpoint.
//!
//! Declared with prost derives directly, so no protoc step is needed.

use bytes::Bytes;

/// Kind of message carried in an [`Envelope`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    MsgUnknown = 0,
    MsgTelemetry = 1,
    MsgReportedProperty = 2,
    MsgWritablePropertyAck = 3,
    MsgCommandResponse = 4,
    MsgCommandRequest = 5,
    MsgDesiredProperties = 6,
    MsgTwinDocument = 7,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    #[prost(string, tag = "1")]
    pub device_id: String,
    #[prost(uint64, tag = "2")]
    pub sequence_id: u64,
    #[prost(uint64, tag = "3")]
    pub timestamp_ms: u64,
    #[prost(enumeration = "MessageType", tag = "4")]
    pub msg_type: i32,
}

/// A property value as it travels on the wire
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireValue {
    #[prost(oneof = "wire_value::Kind", tags = "1, 2, 3")]
    pub kind: Option<wire_value::Kind>,
}

pub mod wire_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(int64, tag = "1")]
        IntValue(i64),
        #[prost(bool, tag = "2")]
        BoolValue(bool),
        #[prost(string, tag = "3")]
        TextValue(String),
    }
}

/// One encoded telemetry group
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Telemetry {
    #[prost(uint32, tag = "1")]
    pub group: u32,
    #[prost(bytes = "bytes", tag = "2")]
    pub body: Bytes,
}

/// A value the device reports about itself. Empty `component` means the root.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReportedProperty {
    #[prost(string, tag = "1")]
    pub component: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, optional, tag = "3")]
    pub value: Option<WireValue>,
}

/// Acknowledgment of an accepted desired property
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WritablePropertyAck {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub value: Option<WireValue>,
    #[prost(uint32, tag = "3")]
    pub status: u32,
    #[prost(uint64, tag = "4")]
    pub version: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandRequest {
    #[prost(string, tag = "1")]
    pub request_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(bytes = "bytes", tag = "3")]
    pub payload: Bytes,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandResponse {
    #[prost(string, tag = "1")]
    pub request_id: String,
    #[prost(uint32, tag = "2")]
    pub status: u32,
    #[prost(bytes = "bytes", tag = "3")]
    pub body: Bytes,
}

/// Desired-property patch (JSON object with a `$version` member)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DesiredProperties {
    #[prost(bytes = "bytes", tag = "1")]
    pub body: Bytes,
}

/// Full twin document (JSON with `desired` and `reported` sections)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TwinDocument {
    #[prost(bytes = "bytes", tag = "1")]
    pub body: Bytes,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Envelope {
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    #[prost(oneof = "envelope::Payload", tags = "2, 3, 4, 5, 6, 7, 8")]
    pub payload: Option<envelope::Payload>,
}

pub mod envelope {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "2")]
        Telemetry(super::Telemetry),
        #[prost(message, tag = "3")]
        ReportedProperty(super::ReportedProperty),
        #[prost(message, tag = "4")]
        WritablePropertyAck(super::WritablePropertyAck),
        #[prost(message, tag = "5")]
        CommandResponse(super::CommandResponse),
        #[prost(message, tag = "6")]
        CommandRequest(super::CommandRequest),
        #[prost(message, tag = "7")]
        DesiredProperties(super::DesiredProperties),
        #[prost(message, tag = "8")]
        TwinDocument(super::TwinDocument),
    }
}
