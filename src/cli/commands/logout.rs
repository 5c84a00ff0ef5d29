use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

/// Sign out and discard every piece of session state, local and cached.
pub async fn handle(cfg: &Config) -> AppResult<()> {
    let store = super::open_store(cfg)?;
    if !store.bootstrap().await? {
        info("nobody is signed in");
        return Ok(());
    }
    store.sign_out().await?;
    success("Signed out");
    Ok(())
}
