use crate::backend::SqliteBackend;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{hint, info, success};
use std::path::Path;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file
///  - the SQLite database with the full schema
pub async fn handle(cli: &Cli) -> AppResult<()> {
    //
    // 1. Prepare configuration (skips the config file in test mode)
    //
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    info(format!("Config file: {}", Config::config_file().display()));
    info(format!("Database:    {}", cfg.database));

    //
    // 2. Open the database; opening creates every table
    //
    SqliteBackend::open(Path::new(&cfg.database), None)?;

    success(format!("Database initialized at {}", cfg.database));
    hint("next: listinha register --email <e-mail> --password <password>");
    Ok(())
}
