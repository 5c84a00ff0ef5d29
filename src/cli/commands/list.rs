use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::{Category, Item};
use crate::ui::messages::{header, hint, info};
use crate::utils::colors::{
    GREEN, GREY, RESET, color_for_optional_field, color_for_paid, color_for_pending, strike,
};
use crate::utils::format_money;
use crate::utils::formatting::bold;
use crate::utils::table::{Column, Table};

/// Show the active list grouped by category, with per-category and
/// grand totals. The archived category stays hidden unless `--all`.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { all } = cmd {
        let store = super::open_session_store(cfg).await?;
        let state = store.snapshot().await;

        let list_name = state
            .current_list
            .as_ref()
            .map(|l| l.name.as_str())
            .unwrap_or("(no list)");
        header(list_name);

        let mut categories: Vec<&Category> = state
            .categories
            .iter()
            .filter(|c| *all || !c.is_archive())
            .collect();
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        if categories.is_empty() {
            info("no categories yet");
            hint("create one with: listinha category add <NAME>");
            return Ok(());
        }

        for category in categories {
            let items: Vec<&Item> = state
                .items
                .iter()
                .filter(|i| i.category_id == category.id)
                .collect();
            let stats = state.stats.category(&category.id);

            println!();
            println!("{}", bold(&category.name));

            if items.is_empty() {
                println!("{GREY}  (empty){RESET}");
                continue;
            }

            let mut table = Table::new(vec![
                Column::new("  "),
                Column::new("Item"),
                Column::money("Price"),
                Column::new("Notes"),
            ]);
            for item in items {
                let mark = if item.completed {
                    format!("{GREEN}✓{RESET}")
                } else {
                    " ".to_string()
                };
                let name = if item.completed {
                    format!("{GREY}{}{RESET}", strike(&item.name))
                } else {
                    item.name.clone()
                };
                let note = item
                    .observation
                    .clone()
                    .or_else(|| item.link.clone())
                    .unwrap_or_default();
                let note = format!(
                    "{}{}{}",
                    color_for_optional_field(Some(note.as_str())),
                    note,
                    RESET
                );
                table.add_row(vec![mark, name, format_money(item.price), note]);
            }
            print!("{}", table.render());

            println!(
                "  pending {}{}{}  paid {}{}{}",
                color_for_pending(stats.pending),
                format_money(stats.pending),
                RESET,
                color_for_paid(stats.paid),
                format_money(stats.paid),
                RESET
            );
        }

        println!();
        println!(
            "{}",
            bold(&format!(
                "Total: {}  paid: {}  pending: {}",
                format_money(state.stats.grand_total),
                format_money(state.stats.grand_paid),
                format_money(state.stats.grand_pending())
            ))
        );
    }
    Ok(())
}
