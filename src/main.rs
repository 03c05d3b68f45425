use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tarotbot::bot::Bot;
use tarotbot::commands::CommandRegistry;
use tarotbot::completion::chat_api::ChatApiClient;
use tarotbot::config::Config;
use tarotbot::context::BotContext;
use tarotbot::executor::TaskExecutor;
use tarotbot::store::sqlite::SqliteStore;
use tarotbot::transport::console::ConsoleTransport;
use tarotbot::transport::telegram::TelegramTransport;

#[derive(Debug, Clone, ValueEnum)]
enum TransportKind {
    Telegram,
    Console,
}

#[derive(Parser)]
#[command(name = "tarotbot", version, about = "Draw a card, find your match.")]
struct Cli {
    /// Where messages come from
    #[arg(short, long, value_enum, default_value_t = TransportKind::Telegram)]
    transport: TransportKind,

    /// Chat id to act as with the console transport
    #[arg(long, default_value_t = 1)]
    chat_id: i64,

    /// SQLite store path, overrides STORE_PATH (use :memory: for ephemeral)
    #[arg(short, long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "tarotbot=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store_path = match cli.db {
        Some(path) => path,
        None => {
            if let Some(parent) = config.store_path.parent()
                && !parent.exists()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            config.store_path.to_string_lossy().into_owned()
        }
    };
    tracing::info!(path = %store_path, "opening document store");
    let store = SqliteStore::open(&store_path).context("failed to open document store")?;

    let completion = config.completion.as_ref().context(
        "completion service is not configured: set CHATGPT_BASICURL, CHATGPT_MODELNAME, \
         CHATGPT_APIVERSION and CHATGPT_ACCESS_TOKEN",
    )?;

    let ctx = BotContext::new(
        Arc::new(store),
        Arc::new(ChatApiClient::new(completion)),
        TaskExecutor::new(config.workers),
    )
    .with_completion_timeout(config.completion_timeout);

    tracing::info!(
        workers = config.workers,
        timeout = ?config.completion_timeout,
        "tarotbot starting"
    );

    match cli.transport {
        TransportKind::Telegram => {
            let token = config
                .telegram_token
                .as_deref()
                .context("TELEGRAM_ACCESS_TOKEN must be set for the telegram transport")?;
            let mut transport = TelegramTransport::new(token)?;
            let username = transport.username().await?;
            tracing::info!(%username, "connected to telegram");
            let bot = Bot::new(CommandRegistry::new().with_username(username), ctx);
            bot.run(&mut transport).await
        }
        TransportKind::Console => {
            let bot = Bot::new(CommandRegistry::new(), ctx);
            bot.run(&mut ConsoleTransport::new(cli.chat_id)).await
        }
    }
}
