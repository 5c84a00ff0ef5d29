use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::ItemPatch;
use crate::ui::messages::{info, success};

/// Edit an item: any combination of name, price, category, link and note.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Edit {
        item,
        name,
        price,
        category,
        link,
        observation,
    } = cmd
    {
        let store = super::open_session_store(cfg).await?;
        let state = store.snapshot().await;
        let id = super::resolve_item(&state.items, item)?;
        let category_id = category
            .as_deref()
            .map(|c| super::resolve_category(&state.categories, c))
            .transpose()?;

        let patch = ItemPatch {
            name: name.clone(),
            price: price.clone(),
            category_id,
            link: link.clone(),
            observation: observation.clone(),
        };
        if patch.is_empty() {
            info("nothing to change");
            return Ok(());
        }

        store.update_item(&id, patch).await?;
        success(format!("Updated '{item}'"));
    }
    Ok(())
}
