use anyhow::Result;
use async_trait::async_trait;

use super::{Command, CommandRegistry, Invocation};
use crate::context::BotContext;

pub struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "/help"
    }

    fn description(&self) -> &str {
        "Show this help message"
    }

    // The registry answers /help itself so plugin commands are listed too.
    // Run on its own, this lists the built-ins.
    async fn execute(&self, _ctx: &BotContext, _invocation: &Invocation) -> Result<String> {
        Ok(CommandRegistry::new().help_text())
    }
}
