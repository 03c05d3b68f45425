use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Completer;
use crate::config::CompletionConfig;

/// A completer that calls an Azure-style chat completions deployment.
pub struct ChatApiClient {
    client: reqwest::Client,
    url: String,
    access_token: String,
}

impl ChatApiClient {
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: build_url(config),
            access_token: config.access_token.clone(),
        }
    }
}

fn build_url(config: &CompletionConfig) -> String {
    format!(
        "{}/deployments/{}/chat/completions/?api-version={}",
        config.base_url.trim_end_matches('/'),
        config.model,
        config.api_version
    )
}

fn extract_content(resp: ApiResponse) -> Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.is_empty())
        .context("completion service returned no content")
}

#[async_trait]
impl Completer for ChatApiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ApiRequest {
            messages: &[Message {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .header("api-key", &self.access_token)
            .json(&body)
            .send()
            .await
            .context("completion request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("completion service error ({}): {}", status, text);
        }

        let api_resp: ApiResponse = resp.json().await?;
        extract_content(api_resp)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    messages: &'a [Message<'a>],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
