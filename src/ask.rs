//! `faq ask`: run the chat pipeline once from the command line.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::server::AppState;

pub async fn run_ask(config: &Config, message: &str) -> Result<()> {
    let message = message.trim();
    if message.is_empty() {
        bail!("Message is required");
    }

    let state = AppState::from_config(config);
    let reply = state.chat.respond(state.knowledge.records(), message).await;
    println!("{}", reply.text);
    Ok(())
}
