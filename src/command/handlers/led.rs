//! LED on/off command handler

use super::{CommandHandler, HandlerContext};
use crate::command::CommandResult;
use crate::property::PropertyValue;
use async_trait::async_trait;
use sensor_node_shared::twin;
use tracing::info;

/// Handle turnOnLed / turnOffLed
pub struct SetLed {
    pub on: bool,
}

#[async_trait]
impl CommandHandler for SetLed {
    async fn handle(&self, ctx: &HandlerContext, _payload: &[u8]) -> CommandResult {
        ctx.actuator.set_led(self.on);

        match ctx
            .properties
            .set_local(twin::LED_STATE, PropertyValue::Bool(self.on))
            .await
        {
            Ok(()) => {
                info!("[LED] {}", if self.on { "on" } else { "off" });
                CommandResult::ok()
            }
            Err(e) => CommandResult::Failed {
                message: e.to_string(),
            },
        }
    }
}
