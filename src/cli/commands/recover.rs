use crate::backend::Backend;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{hint, success};

/// Redeem a recovery token. Redemption signs the account in, so the new
/// password can be set right away or later via `account --new-password`.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Recover {
        token,
        new_password,
    } = cmd
    {
        let backend = super::open_backend(cfg)?;
        let session = backend.redeem_recovery_token(token).await?;
        success(format!("Signed in as {}", session.user.email));

        match new_password {
            Some(password) => {
                backend
                    .update_password(password)
                    .await
                    .map_err(|e| AppError::Auth(e.to_string()))?;
                success("Password updated");
            }
            None => hint("set a new password with: listinha account --new-password <password>"),
        }
    }
    Ok(())
}
