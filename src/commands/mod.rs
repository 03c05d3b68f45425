//! Chat commands prefixed with `/`.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`]. The registry parses inbound text, routes it by command
//! name, and sends anything that isn't command syntax to the free-form
//! [`ChatHandler`]. Handler failures are logged and turned into a generic
//! reply here, so a user never gets silence for an infrastructure error.

mod add;
mod chat;
mod hello;
mod help;
mod matching;
mod tarot;

pub use add::AddCommand;
pub use chat::ChatHandler;
pub use hello::HelloCommand;
pub use help::HelpCommand;
pub use matching::MatchCommand;
pub use tarot::TarotCommand;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::consts::FAILURE_MESSAGE;
use crate::context::BotContext;
use crate::store::ChatId;

/// A message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub text: String,
}

impl InboundMessage {
    pub fn new(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
        }
    }
}

/// A parsed command call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub chat_id: ChatId,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(chat_id: ChatId, args: &[&str]) -> Self {
        Self {
            chat_id,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// What happened to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Send this back to the chat.
    Reply(String),
    /// Nothing handled it (unknown command, empty text).
    Ignored,
}

/// A chat command. Implement this trait to add new commands.
#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/add"`.
    fn name(&self) -> &str;

    /// Name plus arguments as shown in `/help`, e.g. `"/add <keyword>"`.
    fn usage(&self) -> &str {
        self.name()
    }

    /// One-line description for `/help`.
    fn description(&self) -> &str;

    /// Run the command and produce the reply text.
    async fn execute(&self, ctx: &BotContext, invocation: &Invocation) -> Result<String>;
}

/// Holds registered commands plus the free-form fallback.
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
    chat: ChatHandler,
    username: Option<String>,
}

impl CommandRegistry {
    /// Create a registry with all built-in commands.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(HelpCommand));
        registry.register(Arc::new(AddCommand));
        registry.register(Arc::new(HelloCommand));
        registry.register(Arc::new(TarotCommand::new()));
        registry.register(Arc::new(MatchCommand));
        registry
    }

    /// A registry with no commands; only free-form chat is routed.
    pub fn empty() -> Self {
        Self {
            commands: Vec::new(),
            chat: ChatHandler,
            username: None,
        }
    }

    /// The bot's own username. `/cmd@name` is only handled when `name`
    /// matches it.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    fn addressed_to_us(&self, addressee: Option<&str>) -> bool {
        match (addressee, self.username.as_deref()) {
            (None, _) => true,
            (Some(to), Some(us)) => to.eq_ignore_ascii_case(us),
            (Some(_), None) => false,
        }
    }

    /// Register a command. A later registration with the same name replaces
    /// the earlier one.
    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.retain(|c| c.name() != command.name());
        self.commands.push(command);
    }

    /// Route one message to exactly one handler.
    pub async fn dispatch(&self, ctx: &BotContext, message: &InboundMessage) -> Dispatch {
        let (label, result) = match parse_command(&message.text) {
            Some(ParsedCommand {
                name,
                addressee,
                args,
            }) => {
                if !self.addressed_to_us(addressee) {
                    tracing::debug!(
                        chat_id = message.chat_id,
                        command = name,
                        addressee,
                        "command addressed to another bot"
                    );
                    return Dispatch::Ignored;
                }
                let Some(command) = self.commands.iter().find(|c| c.name() == name) else {
                    tracing::debug!(chat_id = message.chat_id, command = name, "no handler for command");
                    return Dispatch::Ignored;
                };
                tracing::debug!(chat_id = message.chat_id, command = name, "dispatching command");

                // /help is special: it needs the registry to list all commands
                if command.name() == "/help" {
                    return Dispatch::Reply(self.help_text());
                }

                let invocation = Invocation::new(message.chat_id, &args);
                (name, command.execute(ctx, &invocation).await)
            }
            None => {
                if message.text.trim().is_empty() {
                    return Dispatch::Ignored;
                }
                tracing::debug!(chat_id = message.chat_id, "dispatching free-form chat");
                ("chat", self.chat.handle(ctx, &message.text).await)
            }
        };

        match result {
            Ok(reply) => Dispatch::Reply(reply),
            Err(e) => {
                tracing::error!(
                    chat_id = message.chat_id,
                    command = label,
                    error = %format!("{e:#}"),
                    "command failed"
                );
                Dispatch::Reply(FAILURE_MESSAGE.to_string())
            }
        }
    }

    /// Generate help text from all registered commands.
    pub fn help_text(&self) -> String {
        let mut out = String::from("Available commands:");
        for command in &self.commands {
            out.push_str(&format!("\n{} - {}", command.usage(), command.description()));
        }
        out
    }

    /// All registered command names (for testing).
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedCommand<'a> {
    name: &'a str,
    /// Bot named by a `/cmd@botname` suffix, as used in group chats.
    addressee: Option<&'a str>,
    args: Vec<&'a str>,
}

/// Split command syntax into name, addressee and arguments.
fn parse_command(text: &str) -> Option<ParsedCommand<'_>> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next()?;
    if !head.starts_with('/') || head.len() < 2 {
        return None;
    }
    let (name, addressee) = match head.split_once('@') {
        Some((name, to)) => (name, Some(to)),
        None => (head, None),
    };
    Some(ParsedCommand {
        name,
        addressee,
        args: tokens.collect(),
    })
}
