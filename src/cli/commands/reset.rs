use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{hint, info, success};

/// Issue a password recovery token.
///
/// A hosted backend would mail a reset link; the bundled backend hands
/// the token back so it can be redeemed directly on this machine.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::ResetPassword { email } = cmd {
        let backend = super::open_backend(cfg)?;
        let token = backend.issue_recovery_token(email).await?;

        success(format!("Recovery token issued for {email}"));
        info(format!("token: {token}"));
        hint("redeem it with: listinha recover --token <token> --new-password <password>");
    }
    Ok(())
}
