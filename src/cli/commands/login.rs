use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Login { email, password } = cmd {
        let store = super::open_store(cfg)?;
        store.sign_in(email, password).await?;

        let state = store.snapshot().await;
        success(format!("Signed in as {email}"));
        if let Some(list) = state.current_list {
            info(format!(
                "list \"{}\": {} item(s) in {} categorie(s)",
                list.name,
                state.items.len(),
                state.categories.len()
            ));
        }
    }
    Ok(())
}
