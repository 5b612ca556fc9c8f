//! Built-in command handlers

mod display;
mod led;

pub use display::{unquote, DisplayText};
pub use led::SetLed;

use super::CommandResult;
use crate::peripherals::{Actuator, TextDisplay};
use crate::property::PropertySync;
use async_trait::async_trait;
use std::sync::Arc;

/// What a handler may touch while executing
#[derive(Clone)]
pub struct HandlerContext {
    pub properties: PropertySync,
    pub actuator: Arc<dyn Actuator>,
    pub display: Arc<dyn TextDisplay>,
    /// Characters that fit on the display
    pub display_width: usize,
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &HandlerContext, payload: &[u8]) -> CommandResult;
}
