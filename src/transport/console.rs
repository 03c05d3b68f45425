use anyhow::Result;
use async_trait::async_trait;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::Transport;
use crate::commands::InboundMessage;
use crate::store::ChatId;

/// Talk to the bot from a terminal, as a single chat.
pub struct ConsoleTransport {
    chat_id: ChatId,
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleTransport {
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        loop {
            print!("\ntarot> ");
            io::stdout().flush()?;

            let Some(line) = self.lines.next_line().await? else {
                // Ctrl+D (EOF)
                println!();
                return Ok(None);
            };

            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            if text == "quit" || text == "exit" {
                return Ok(None);
            }
            return Ok(Some(InboundMessage::new(self.chat_id, text)));
        }
    }

    async fn send(&self, _chat_id: ChatId, text: &str) -> Result<()> {
        println!("\n=> {text}");
        Ok(())
    }
}
