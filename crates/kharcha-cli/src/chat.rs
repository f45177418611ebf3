//! Terminal chat adapter for the intake engine.
//!
//! Plays the role the WhatsApp webhook plays in production: it feeds each
//! typed line to the engine as an inbound message and prints the engine's
//! replies. `/photo <url>` simulates a receipt image arriving on the
//! channel.

use anyhow::Result;
use async_trait::async_trait;
use colored::Colorize;
use kharcha_core::AppCore;
use kharcha_core::channel::{ChannelSender, InboundMessage};
use kharcha_core::conversation::IntakeEngine;
use std::io::{BufRead, Write};
use std::sync::Arc;

const LOCAL_ADDRESS: &str = "terminal";

/// Prints engine replies to stdout
struct StdoutSender;

#[async_trait]
impl ChannelSender for StdoutSender {
    async fn send(&self, _to: &str, text: &str) -> Result<()> {
        println!("{}", text.green());
        Ok(())
    }
}

pub async fn run(core: AppCore, user: &str) -> Result<()> {
    let sweep = core.start_expiry_sweep();

    let engine = IntakeEngine::new(
        core.sessions.clone(),
        core.expenses.clone(),
        Arc::new(StdoutSender),
    );

    println!(
        "{}",
        "Kharcha chat - type a message (*help* for commands, /quit to exit)".bold()
    );

    let stdin = std::io::stdin();
    loop {
        print!("{} ", ">".dimmed());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }

        let msg = if let Some(url) = line.strip_prefix("/photo ") {
            InboundMessage {
                sender_address: LOCAL_ADDRESS.to_string(),
                text: None,
                image: Some(kharcha_core::channel::InboundImage {
                    url: url.trim().to_string(),
                    content_type: "image/jpeg".to_string(),
                }),
                timestamp: chrono::Utc::now().timestamp_millis(),
            }
        } else {
            InboundMessage::text(LOCAL_ADDRESS, line)
        };

        if let Err(e) = engine.handle_message(user, &msg).await {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
    }

    sweep.abort();
    Ok(())
}
