use anyhow::Result;

use crate::consts::CHAT_TIMEOUT_MESSAGE;
use crate::context::BotContext;
use crate::executor::WaitError;

/// Forwards free-form text to the completion service.
pub struct ChatHandler;

impl ChatHandler {
    pub async fn handle(&self, ctx: &BotContext, text: &str) -> Result<String> {
        match ctx.complete_within_deadline(text.to_string()).await {
            Ok(reply) => Ok(reply),
            Err(WaitError::Timeout(_)) => Ok(CHAT_TIMEOUT_MESSAGE.to_string()),
            Err(e) => Err(e.into()),
        }
    }
}
