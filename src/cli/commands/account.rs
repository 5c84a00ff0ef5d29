use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::formatting::format_date;

/// Show the signed-in account, or change its password.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Account { new_password } = cmd {
        let store = super::open_session_store(cfg).await?;

        if let Some(password) = new_password {
            store.update_password(password).await?;
            success("Password updated");
            return Ok(());
        }

        let state = store.snapshot().await;
        if let Some(user) = &state.user {
            info(format!("Signed in as {} ({})", user.email, user.id));
            info(format!("member since {}", format_date(&user.created_at)));
        }
        if let Some(list) = &state.current_list {
            info(format!(
                "active list \"{}\": {} item(s), {} message(s)",
                list.name,
                state.items.len(),
                state.messages.len()
            ));
        }
    }
    Ok(())
}
