use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{hint, success};

/// Create an account and sign in. The first sign-in also creates the
/// default shopping list.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Register { email, password } = cmd {
        let store = super::open_store(cfg)?;
        store.sign_up(email, password).await?;

        let state = store.snapshot().await;
        success(format!("Account created, signed in as {email}"));
        if let Some(list) = state.current_list {
            hint(format!("your shopping list \"{}\" is ready", list.name));
        }
    }
    Ok(())
}
