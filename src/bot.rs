//! The message loop: one inbound message at a time, in arrival order.

use anyhow::Result;
use std::time::Duration;

use crate::commands::{CommandRegistry, Dispatch, InboundMessage};
use crate::context::BotContext;
use crate::transport::Transport;

/// Pause before polling again after the transport failed to deliver.
const RECEIVE_RETRY_DELAY: Duration = Duration::from_secs(3);

pub struct Bot {
    registry: CommandRegistry,
    ctx: BotContext,
}

impl Bot {
    pub fn new(registry: CommandRegistry, ctx: BotContext) -> Self {
        Self { registry, ctx }
    }

    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    /// Handle one message. `None` means there is nothing to send back.
    pub async fn handle(&self, message: &InboundMessage) -> Option<String> {
        match self.registry.dispatch(&self.ctx, message).await {
            Dispatch::Reply(reply) => Some(reply),
            Dispatch::Ignored => None,
        }
    }

    /// Serve until the transport runs dry or Ctrl+C.
    pub async fn run<T: Transport>(&self, transport: &mut T) -> Result<()> {
        loop {
            let next = tokio::select! {
                next = transport.next_message() => next,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupted, shutting down");
                    break;
                }
            };

            let message = match next {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %format!("{e:#}"), "failed to receive messages");
                    tokio::time::sleep(RECEIVE_RETRY_DELAY).await;
                    continue;
                }
            };

            if let Some(reply) = self.handle(&message).await
                && let Err(e) = transport.send(message.chat_id, &reply).await
            {
                tracing::error!(
                    chat_id = message.chat_id,
                    error = %format!("{e:#}"),
                    "failed to send reply"
                );
            }
        }

        let stragglers = self.ctx.executor.in_flight();
        if stragglers > 0 {
            tracing::info!(stragglers, "leaving unfinished completion calls behind");
        }
        Ok(())
    }
}
