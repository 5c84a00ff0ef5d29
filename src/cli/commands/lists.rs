use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::simple_total;
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::format_money;
use crate::utils::formatting::format_date;
use crate::utils::table::{Column, Table};

/// Browse archived lists: everything older than the active one.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Lists { show } = cmd {
        let store = super::open_session_store(cfg).await?;
        let archived = store.fetch_archived_lists().await?;

        let Some(needle) = show else {
            header("archived lists");
            if archived.is_empty() {
                info("no archived lists");
                return Ok(());
            }
            let mut table = Table::new(vec![
                Column::new("List"),
                Column::new("Created"),
                Column::new("Id"),
            ]);
            for list in &archived {
                table.add_row(vec![
                    list.name.clone(),
                    format_date(&list.created_at),
                    list.id.to_string(),
                ]);
            }
            print!("{}", table.render());
            return Ok(());
        };

        let id = super::resolve_list(&archived, needle)?;
        let items = store.fetch_list_items(&id).await?;
        let name = archived
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.name.as_str())
            .unwrap_or("(unknown)");
        header(name);

        if items.is_empty() {
            info("this list has no items");
            return Ok(());
        }
        let mut table = Table::new(vec![Column::new("Item"), Column::money("Price")]);
        for item in &items {
            table.add_row(vec![item.name.clone(), format_money(item.price)]);
        }
        print!("{}", table.render());
        println!("Total: {}", format_money(simple_total(&items)));
    }
    Ok(())
}
