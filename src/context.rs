//! Everything a handler needs, built once at startup and passed to every
//! invocation.

use std::sync::Arc;
use std::time::Duration;

use crate::completion::Completer;
use crate::consts::DEFAULT_COMPLETION_TIMEOUT;
use crate::executor::{TaskExecutor, WaitError};
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct BotContext {
    pub store: Arc<dyn DocumentStore>,
    pub completer: Arc<dyn Completer>,
    pub executor: TaskExecutor,
    pub completion_timeout: Duration,
}

impl BotContext {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        completer: Arc<dyn Completer>,
        executor: TaskExecutor,
    ) -> Self {
        Self {
            store,
            completer,
            executor,
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }

    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    /// Run a completion on the executor and wait at most `completion_timeout`.
    pub async fn complete_within_deadline(&self, prompt: String) -> Result<String, WaitError> {
        let completer = Arc::clone(&self.completer);
        let result = self
            .executor
            .submit(async move { completer.complete(&prompt).await })
            .wait(self.completion_timeout)
            .await;

        if let Err(WaitError::Timeout(after)) = &result {
            tracing::warn!(
                timeout = ?after,
                in_flight = self.executor.in_flight(),
                "completion timed out, leaving it to finish in the background"
            );
        }
        result
    }
}
