use anyhow::Result;
use async_trait::async_trait;

use super::{Command, Invocation};
use crate::context::BotContext;

pub struct HelloCommand;

#[async_trait]
impl Command for HelloCommand {
    fn name(&self) -> &str {
        "/hello"
    }

    fn usage(&self) -> &str {
        "/hello [name]"
    }

    fn description(&self) -> &str {
        "Greet user"
    }

    async fn execute(&self, _ctx: &BotContext, invocation: &Invocation) -> Result<String> {
        let name = invocation.first_arg().unwrap_or("there");
        Ok(format!("Good day, {name}!"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_ctx;
    use crate::completion::mock::MockCompleter;

    #[tokio::test]
    async fn defaults_to_there() {
        let ctx = test_ctx(MockCompleter::replies(&[]));
        let reply = HelloCommand
            .execute(&ctx, &Invocation::new(1, &[]))
            .await
            .unwrap();
        assert_eq!(reply, "Good day, there!");
    }

    #[tokio::test]
    async fn greets_by_first_arg() {
        let ctx = test_ctx(MockCompleter::replies(&[]));
        let reply = HelloCommand
            .execute(&ctx, &Invocation::new(1, &["Amy", "Smith"]))
            .await
            .unwrap();
        assert_eq!(reply, "Good day, Amy!");
    }
}
