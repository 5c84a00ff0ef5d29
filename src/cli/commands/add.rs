use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::format_money;

/// Add an item to the active list.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Add {
        name,
        price,
        category,
        link,
        observation,
    } = cmd
    {
        //
        // 1. Resolve the category against the hydrated state
        //
        let store = super::open_session_store(cfg).await?;
        let state = store.snapshot().await;
        let category_id = super::resolve_category(&state.categories, category)?;

        //
        // 2. Add optimistically; the raw price goes through the normalizer
        //
        let item = store
            .add_item(name, price, &category_id, link.clone(), observation.clone())
            .await?;

        let state = store.snapshot().await;
        success(format!(
            "Added '{}' at {}",
            item.name,
            format_money(item.price)
        ));
        info(format!(
            "list total: {}",
            format_money(state.stats.grand_total)
        ));
    }
    Ok(())
}
