//! listinha library root.
//! Exposes the CLI parser, the high-level run() function and the store,
//! backend and model internals used by embedders and the test suite.

pub mod backend;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub async fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli).await,
        Commands::Register { .. } => cli::commands::register::handle(&cli.command, cfg).await,
        Commands::Login { .. } => cli::commands::login::handle(&cli.command, cfg).await,
        Commands::Logout => cli::commands::logout::handle(cfg).await,
        Commands::ResetPassword { .. } => cli::commands::reset::handle(&cli.command, cfg).await,
        Commands::Recover { .. } => cli::commands::recover::handle(&cli.command, cfg).await,
        Commands::Account { .. } => cli::commands::account::handle(&cli.command, cfg).await,
        Commands::Category { .. } => cli::commands::category::handle(&cli.command, cfg).await,
        Commands::Add { .. } => cli::commands::add::handle(&cli.command, cfg).await,
        Commands::Edit { .. } => cli::commands::edit::handle(&cli.command, cfg).await,
        Commands::Toggle { .. } => cli::commands::toggle::handle(&cli.command, cfg).await,
        Commands::Del { .. } => cli::commands::del::handle(&cli.command, cfg).await,
        Commands::List { .. } => cli::commands::list::handle(&cli.command, cfg).await,
        Commands::Chat { .. } => cli::commands::chat::handle(&cli.command, cfg).await,
        Commands::Lists { .. } => cli::commands::lists::handle(&cli.command, cfg).await,
    }
}

/// Entry point used by main.rs
pub async fn run() -> AppResult<()> {
    // 1. parse CLI
    let cli = Cli::parse();

    // 2. load config once
    let mut cfg = Config::load()?;

    // 3. apply the database override; the session cache moves next to
    //    the database so ad-hoc databases never share a session
    if let Some(custom_db) = &cli.db {
        let db = utils::path::resolve_db_path(custom_db, &Config::config_dir());
        cfg.session_file = db.with_extension("session").to_string_lossy().to_string();
        cfg.database = db.to_string_lossy().to_string();
    }

    // 4. hand everything to the dispatcher
    dispatch(&cli, &cfg).await
}
