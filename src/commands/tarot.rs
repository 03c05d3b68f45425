use anyhow::Result;
use async_trait::async_trait;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Command, Invocation};
use crate::consts::ANALYSIS_TIMEOUT_MESSAGE;
use crate::context::BotContext;
use crate::deck::{self, Card};
use crate::executor::WaitError;
use crate::store::{Document, TarotDrawRecord};

/// Draws a card, asks the model to read it, and stores the result as the
/// caller's current draw.
pub struct TarotCommand {
    pick: fn() -> &'static Card,
}

impl TarotCommand {
    pub fn new() -> Self {
        Self { pick: deck::draw }
    }

    /// Use a fixed way of picking cards instead of the random draw.
    pub fn with_picker(pick: fn() -> &'static Card) -> Self {
        Self { pick }
    }
}

impl Default for TarotCommand {
    fn default() -> Self {
        Self::new()
    }
}

pub fn analysis_prompt(result: &str) -> String {
    format!(
        "User draws tarot card: {result}. Please analyze the implications of this card \
         for the user's current situation and provide suggestions."
    )
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[async_trait]
impl Command for TarotCommand {
    fn name(&self) -> &str {
        "/tarot"
    }

    fn description(&self) -> &str {
        "Draw a tarot card and get analysis"
    }

    async fn execute(&self, ctx: &BotContext, invocation: &Invocation) -> Result<String> {
        let result = (self.pick)().render();

        let analysis = match ctx.complete_within_deadline(analysis_prompt(&result)).await {
            Ok(text) => text,
            Err(WaitError::Timeout(_)) => ANALYSIS_TIMEOUT_MESSAGE.to_string(),
            Err(e) => return Err(e.into()),
        };

        // Full overwrite: a new draw drops any contact value set by /match.
        let record = TarotDrawRecord::new(
            invocation.chat_id,
            result.clone(),
            analysis.clone(),
            unix_now(),
        );
        ctx.store.upsert(&Document::Tarot(record)).await?;

        Ok(format!("{result}\n\nTarot analysis:\n{analysis}"))
    }
}
