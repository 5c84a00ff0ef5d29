use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Delete a single item. Applied locally first; a backend failure is
/// logged and does not undo the removal.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { item } = cmd {
        let store = super::open_session_store(cfg).await?;
        let state = store.snapshot().await;
        let id = super::resolve_item(&state.items, item)?;

        store.delete_item(&id).await?;
        success(format!("Removed '{item}'"));
    }
    Ok(())
}
