use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;

use super::{Command, Invocation};
use crate::consts::{DRAW_FIRST_MESSAGE, NO_MATCH_MESSAGE, SET_PHONE_MESSAGE};
use crate::context::BotContext;
use crate::store::{Document, Field, Filter, StoreError, tarot_key};

/// Pairs the caller with another user who drew the same card and shared a
/// contact value.
///
/// Without an argument this only reads. When several users match, the first
/// one the store yields wins.
pub struct MatchCommand;

#[async_trait]
impl Command for MatchCommand {
    fn name(&self) -> &str {
        "/match"
    }

    fn usage(&self) -> &str {
        "/match [phone]"
    }

    fn description(&self) -> &str {
        "Match with another user by tarot card"
    }

    async fn execute(&self, ctx: &BotContext, invocation: &Invocation) -> Result<String> {
        let key = tarot_key(invocation.chat_id);
        let mut record = match ctx.store.read(&key, &key).await {
            Ok(doc) => doc.into_tarot()?,
            Err(StoreError::NotFound(_)) => return Ok(DRAW_FIRST_MESSAGE.to_string()),
            Err(e) => return Err(e.into()),
        };

        if let Some(phone) = invocation.first_arg() {
            record.phone = Some(phone.to_string());
            ctx.store.upsert(&Document::Tarot(record.clone())).await?;
        } else if record.phone.is_none() {
            return Ok(SET_PHONE_MESSAGE.to_string());
        }

        let filter = Filter::new()
            .eq(Field::TarotResult, record.tarot_result.as_str())
            .not_eq(Field::Id, record.id.as_str())
            .defined(Field::Phone);
        let mut candidates = ctx.store.scan(&filter, true).await?;

        match candidates.next().await {
            Some(doc) => {
                let other = doc?.into_tarot()?;
                let phone = other.phone.unwrap_or_default();
                Ok(format!(
                    "Match successful, the other party's phone number is: {phone}"
                ))
            }
            None => Ok(NO_MATCH_MESSAGE.to_string()),
        }
    }
}
