use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Toggle an item between pending and paid.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Toggle { item } = cmd {
        let store = super::open_session_store(cfg).await?;
        let state = store.snapshot().await;
        let id = super::resolve_item(&state.items, item)?;

        let completed = store.toggle_item(&id).await?;
        if completed {
            success(format!("'{item}' marked as paid"));
        } else {
            success(format!("'{item}' back to pending"));
        }
    }
    Ok(())
}
