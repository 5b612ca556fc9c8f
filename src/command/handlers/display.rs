//! Text display command handler

use super::{CommandHandler, HandlerContext};
use crate::command::CommandResult;
use async_trait::async_trait;
use tracing::info;

/// Handle displayText: the payload is a quoted string
pub struct DisplayText;

#[async_trait]
impl CommandHandler for DisplayText {
    async fn handle(&self, ctx: &HandlerContext, payload: &[u8]) -> CommandResult {
        let text: String = unquote(payload).chars().take(ctx.display_width).collect();

        info!("[DISPLAY] {:?}", text);
        ctx.display.show(&text);

        CommandResult::ok()
    }
}

/// Drop one leading and one trailing delimiter byte.
///
/// Payloads shorter than two bytes yield an empty string.
pub fn unquote(payload: &[u8]) -> String {
    if payload.len() < 2 {
        return String::new();
    }
    String::from_utf8_lossy(&payload[1..payload.len() - 1]).into_owned()
}
