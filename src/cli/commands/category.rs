use crate::cli::parser::{CategoryAction, Commands};
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use std::io::{self, Write};

/// Ask a yes/no confirmation from the user
fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Category { action } = cmd {
        let store = super::open_session_store(cfg).await?;

        match action {
            CategoryAction::Add { name } => {
                let category = store.add_category(name).await?;
                success(format!(
                    "Category '{}' created ({})",
                    category.name, category.id
                ));
            }

            CategoryAction::Rename { category, name } => {
                let state = store.snapshot().await;
                let id = super::resolve_category(&state.categories, category)?;
                store.rename_category(&id, name).await?;
                success(format!("Category renamed to '{name}'"));
            }

            CategoryAction::Del { category } => {
                let state = store.snapshot().await;
                let id = super::resolve_category(&state.categories, category)?;
                let item_count = state.items.iter().filter(|i| i.category_id == id).count();

                let prompt = format!(
                    "Delete category '{category}' and its {item_count} item(s)? This action is irreversible."
                );
                if !ask_confirmation(&prompt) {
                    info("Operation cancelled.");
                    return Ok(());
                }

                store.delete_category(&id).await?;
                success(format!(
                    "Category '{category}' and {item_count} item(s) deleted"
                ));
            }
        }
    }
    Ok(())
}
