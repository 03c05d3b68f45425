pub mod chat_api;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;

/// The language model behind free-form chat and tarot analysis.
/// May be slow, may hang, may fail.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
