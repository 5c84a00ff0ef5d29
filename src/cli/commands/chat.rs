use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{header, hint, info, success};
use crate::utils::formatting::format_clock;
use ansi_term::Colour;

/// Show the list chat, or send a message to it.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Chat { send } = cmd {
        let store = super::open_session_store(cfg).await?;

        if let Some(text) = send {
            store.add_message(text).await?;
            success("Message sent");
            return Ok(());
        }

        let state = store.snapshot().await;
        let list_name = state
            .current_list
            .as_ref()
            .map(|l| l.name.as_str())
            .unwrap_or("(no list)");
        header(format!("chat — {list_name}"));

        if state.messages.is_empty() {
            info("no messages yet");
            hint("send one with: listinha chat --send <TEXT>");
            return Ok(());
        }

        for message in &state.messages {
            let mine = state
                .user
                .as_ref()
                .is_some_and(|u| u.id == message.sender_id);
            let colour = if mine { Colour::Green } else { Colour::Cyan };
            println!(
                "[{}] {}: {}",
                format_clock(&message.timestamp),
                colour.paint(message.sender_label()),
                message.text
            );
        }
    }
    Ok(())
}
