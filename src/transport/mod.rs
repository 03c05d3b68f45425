pub mod console;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::commands::InboundMessage;
use crate::store::ChatId;

/// Where messages come from and replies go. Could be a chat platform, a
/// terminal, or a test script.
#[async_trait]
pub trait Transport: Send {
    /// Next inbound message. `None` means there will be no more.
    async fn next_message(&mut self) -> Result<Option<InboundMessage>>;

    async fn send(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
