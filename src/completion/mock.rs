use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::Completer;

/// One scripted response.
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(String),
    /// Sleep, then reply.
    Delayed(Duration, String),
    Fail(String),
    /// Never returns.
    Hang,
}

/// A scripted completer for tests. Returns pre-defined responses in order.
pub struct MockCompleter {
    script: Vec<Scripted>,
    index: AtomicUsize,
    finished: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockCompleter {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script,
            index: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a script of immediate replies.
    pub fn replies(replies: &[&str]) -> Self {
        Self::new(
            replies
                .iter()
                .map(|r| Scripted::Reply(r.to_string()))
                .collect(),
        )
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Calls that ran to the end, whether anyone was still waiting or not.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let i = self.index.fetch_add(1, Ordering::SeqCst);
        let Some(step) = self.script.get(i) else {
            bail!("MockCompleter: no more responses (called {} times)", i + 1);
        };

        let result = match step {
            Scripted::Reply(text) => Ok(text.clone()),
            Scripted::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            Scripted::Fail(message) => Err(anyhow::anyhow!("{message}")),
            Scripted::Hang => std::future::pending().await,
        };
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_then_runs_dry() {
        let mock = MockCompleter::replies(&["one", "two"]);
        assert_eq!(mock.complete("a").await.unwrap(), "one");
        assert_eq!(mock.complete("b").await.unwrap(), "two");
        assert!(mock.complete("c").await.is_err());
        assert_eq!(mock.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn scripted_failure() {
        let mock = MockCompleter::new(vec![Scripted::Fail("service down".to_string())]);
        let err = mock.complete("x").await.unwrap_err();
        assert!(err.to_string().contains("service down"));
        assert_eq!(mock.finished(), 1);
    }
}
