//! Inbound command handling
//!
//! This module handles:
//! - Mapping command names to handlers
//! - Running handlers against the property store and peripherals
//! - Turning handler results into status codes and response bodies

mod dispatcher;
pub mod handlers;

pub use dispatcher::{CommandDispatcher, CommandResponse};

use bytes::Bytes;

/// Result of command execution
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Command completed; `body` is sent back as-is
    Completed { body: Bytes },
    /// Command was valid but execution failed
    Failed { message: String },
    /// Command payload was not acceptable
    Rejected { message: String },
}

impl CommandResult {
    /// Success with an empty JSON object as body
    pub fn ok() -> Self {
        CommandResult::Completed {
            body: Bytes::from_static(b"{}"),
        }
    }
}
