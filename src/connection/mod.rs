//! Connection to the remote endpoint
//!
//! This module handles:
//! - Connecting once through a pluggable transport
//! - Writing outbound envelopes as length-prefixed frames
//! - Forwarding decoded inbound envelopes as events

mod manager;

pub use manager::{ConnectionEvent, ConnectionManager};
