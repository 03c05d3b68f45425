use anyhow::Result;
use async_trait::async_trait;

use super::{Command, Invocation};
use crate::consts::ADD_USAGE;
use crate::context::BotContext;
use crate::store::{Document, KeywordRecord, StoreError};

/// Counts how often each keyword has been added.
///
/// Read, then create or replace. The two steps are not atomic: concurrent
/// calls for the same keyword can read the same count and lose an increment,
/// and two first uses racing each other make the later create fail with
/// `AlreadyExists`.
pub struct AddCommand;

#[async_trait]
impl Command for AddCommand {
    fn name(&self) -> &str {
        "/add"
    }

    fn usage(&self) -> &str {
        "/add <keyword>"
    }

    fn description(&self) -> &str {
        "Count keyword usage"
    }

    async fn execute(&self, ctx: &BotContext, invocation: &Invocation) -> Result<String> {
        let Some(keyword) = invocation.first_arg() else {
            return Ok(ADD_USAGE.to_string());
        };

        let count = match ctx.store.read(keyword, keyword).await {
            Ok(doc) => {
                let mut record = doc.into_keyword()?;
                record.count += 1;
                let count = record.count;
                ctx.store.replace(&Document::Keyword(record)).await?;
                count
            }
            Err(StoreError::NotFound(_)) => {
                let record = KeywordRecord {
                    id: keyword.to_string(),
                    count: 1,
                };
                ctx.store.create(&Document::Keyword(record)).await?;
                1
            }
            Err(e) => return Err(e.into()),
        };

        Ok(format!("You have said {keyword} for {count} times."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_ctx;
    use crate::completion::mock::MockCompleter;

    #[tokio::test]
    async fn missing_keyword_shows_usage() {
        let ctx = test_ctx(MockCompleter::replies(&[]));
        let reply = AddCommand
            .execute(&ctx, &Invocation::new(1, &[]))
            .await
            .unwrap();
        assert_eq!(reply, "Usage: /add <keyword>");
    }

    #[tokio::test]
    async fn counts_up() {
        let ctx = test_ctx(MockCompleter::replies(&[]));
        let inv = Invocation::new(1, &["rust"]);
        assert_eq!(
            AddCommand.execute(&ctx, &inv).await.unwrap(),
            "You have said rust for 1 times."
        );
        assert_eq!(
            AddCommand.execute(&ctx, &inv).await.unwrap(),
            "You have said rust for 2 times."
        );
    }

    #[tokio::test]
    async fn keyword_colliding_with_tarot_record_fails() {
        let ctx = test_ctx(MockCompleter::replies(&[]));
        let record = crate::store::TarotDrawRecord::new(
            9,
            "You drew: The Fool".to_string(),
            "a".to_string(),
            0,
        );
        ctx.store.upsert(&Document::Tarot(record)).await.unwrap();

        let result = AddCommand
            .execute(&ctx, &Invocation::new(1, &["tarot_analysis:9"]))
            .await;
        assert!(result.is_err());
    }
}
