//! Process configuration, read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present, so
//! local runs don't need the variables exported.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::time::Duration;

use crate::consts::{DEFAULT_COMPLETION_TIMEOUT, DEFAULT_WORKERS, default_store_path};

/// Where and how to reach the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    pub base_url: String,
    pub model: String,
    pub api_version: String,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub telegram_token: Option<String>,
    pub store_path: PathBuf,
    pub completion: Option<CompletionConfig>,
    pub workers: usize,
    pub completion_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let completion = match (
            get("CHATGPT_BASICURL"),
            get("CHATGPT_MODELNAME"),
            get("CHATGPT_APIVERSION"),
            get("CHATGPT_ACCESS_TOKEN"),
        ) {
            (Some(base_url), Some(model), Some(api_version), Some(access_token)) => {
                Some(CompletionConfig {
                    base_url,
                    model,
                    api_version,
                    access_token,
                })
            }
            (None, None, None, None) => None,
            _ => bail!(
                "incomplete completion service config: set all of CHATGPT_BASICURL, \
                 CHATGPT_MODELNAME, CHATGPT_APIVERSION and CHATGPT_ACCESS_TOKEN"
            ),
        };

        let workers = match get("BOT_WORKERS") {
            Some(v) => v.parse().context("invalid BOT_WORKERS")?,
            None => DEFAULT_WORKERS,
        };
        if workers == 0 {
            bail!("BOT_WORKERS must be at least 1");
        }

        let completion_timeout = match get("BOT_COMPLETION_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(v.parse().context("invalid BOT_COMPLETION_TIMEOUT_SECS")?),
            None => DEFAULT_COMPLETION_TIMEOUT,
        };

        Ok(Self {
            telegram_token: get("TELEGRAM_ACCESS_TOKEN"),
            store_path: get("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_store_path),
            completion,
            workers,
            completion_timeout,
        })
    }
}
