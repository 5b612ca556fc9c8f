//! Command dispatcher - maps command names to handlers

use super::handlers::{CommandHandler, DisplayText, HandlerContext, SetLed};
use super::CommandResult;
use bytes::Bytes;
use sensor_node_shared::status;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Status code and body sent back for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub status: u32,
    pub body: Bytes,
}

/// Executes commands received from the remote endpoint
pub struct CommandDispatcher {
    ctx: HandlerContext,
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandDispatcher {
    /// Create a dispatcher with no commands
    pub fn new(ctx: HandlerContext) -> Self {
        Self {
            ctx,
            handlers: HashMap::new(),
        }
    }

    /// Create a dispatcher with turnOnLed, turnOffLed and displayText
    pub fn with_builtin_commands(ctx: HandlerContext) -> Self {
        let mut dispatcher = Self::new(ctx);
        dispatcher.register("turnOnLed", Arc::new(SetLed { on: true }));
        dispatcher.register("turnOffLed", Arc::new(SetLed { on: false }));
        dispatcher.register("displayText", Arc::new(DisplayText));
        dispatcher
    }

    /// Register `handler` under `name`, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Registered command names, sorted
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the handler for `name`; unknown names yield 501 with an empty body
    pub async fn dispatch(&self, name: &str, payload: &[u8]) -> CommandResponse {
        let Some(handler) = self.handlers.get(name) else {
            warn!("Unknown command: {}", name);
            return CommandResponse {
                status: status::NOT_IMPLEMENTED,
                body: Bytes::new(),
            };
        };

        info!("Executing command: {} ({} byte payload)", name, payload.len());

        match handler.handle(&self.ctx, payload).await {
            CommandResult::Completed { body } => {
                info!("  Command completed");
                CommandResponse {
                    status: status::OK,
                    body,
                }
            }
            CommandResult::Failed { message } => {
                warn!("  Command failed: {}", message);
                CommandResponse {
                    status: status::INTERNAL_ERROR,
                    body: error_body(&message),
                }
            }
            CommandResult::Rejected { message } => {
                warn!("  Command rejected: {}", message);
                CommandResponse {
                    status: status::BAD_REQUEST,
                    body: error_body(&message),
                }
            }
        }
    }
}

fn error_body(message: &str) -> Bytes {
    Bytes::from(serde_json::json!({ "message": message }).to_string())
}
