pub mod account;
pub mod add;
pub mod category;
pub mod chat;
pub mod del;
pub mod edit;
pub mod init;
pub mod list;
pub mod lists;
pub mod login;
pub mod logout;
pub mod recover;
pub mod register;
pub mod reset;
pub mod toggle;

use crate::backend::SqliteBackend;
use crate::config::Config;
use crate::core::Store;
use crate::errors::{AppError, AppResult};
use crate::models::{Category, Item, RecordId, ShoppingList};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Open the bundled backend configured in `cfg`.
pub(crate) fn open_backend(cfg: &Config) -> AppResult<Arc<SqliteBackend>> {
    let backend = SqliteBackend::open(
        Path::new(&cfg.database),
        Some(PathBuf::from(&cfg.session_file)),
    )?;
    Ok(Arc::new(backend))
}

pub(crate) fn open_store(cfg: &Config) -> AppResult<Store<SqliteBackend>> {
    let store = Store::new(open_backend(cfg)?)
        .with_default_list_name(cfg.default_list_name.as_str());
    Ok(store)
}

/// Open the store and restore the persisted session, hydrating the
/// list, categories, items and messages. Errors when nobody is signed in.
pub(crate) async fn open_session_store(cfg: &Config) -> AppResult<Store<SqliteBackend>> {
    let store = open_store(cfg)?;
    if !store.bootstrap().await? {
        return Err(not_signed_in());
    }
    Ok(store)
}

pub(crate) fn not_signed_in() -> AppError {
    AppError::Session(
        "not signed in. Run `listinha login --email <e-mail> --password <password>`".into(),
    )
}

/// Resolve a user-supplied reference against loaded state: exact id
/// first, then exact name (case-insensitive), then a unique name prefix.
fn resolve(needle: &str, entries: Vec<(&RecordId, &str)>, what: &str) -> AppResult<RecordId> {
    for (id, _) in &entries {
        if id.to_string() == needle {
            return Ok((*id).clone());
        }
    }

    let lowered = needle.to_lowercase();
    let exact: Vec<_> = entries
        .iter()
        .filter(|(_, name)| name.to_lowercase() == lowered)
        .collect();
    match exact.len() {
        1 => return Ok(exact[0].0.clone()),
        n if n > 1 => {
            return Err(AppError::Ambiguous(format!(
                "{what} '{needle}' matches {n} entries, use the id"
            )));
        }
        _ => {}
    }

    let prefixed: Vec<_> = entries
        .iter()
        .filter(|(_, name)| name.to_lowercase().starts_with(&lowered))
        .collect();
    match prefixed.len() {
        1 => Ok(prefixed[0].0.clone()),
        0 => Err(AppError::NotFound(format!("{what} '{needle}'"))),
        n => Err(AppError::Ambiguous(format!(
            "{what} '{needle}' matches {n} entries, use the id"
        ))),
    }
}

pub(crate) fn resolve_category(categories: &[Category], needle: &str) -> AppResult<RecordId> {
    let entries = categories
        .iter()
        .map(|c| (&c.id, c.name.as_str()))
        .collect();
    resolve(needle, entries, "category")
}

pub(crate) fn resolve_item(items: &[Item], needle: &str) -> AppResult<RecordId> {
    let entries = items.iter().map(|i| (&i.id, i.name.as_str())).collect();
    resolve(needle, entries, "item")
}

pub(crate) fn resolve_list(lists: &[ShoppingList], needle: &str) -> AppResult<RecordId> {
    let entries = lists.iter().map(|l| (&l.id, l.name.as_str())).collect();
    resolve(needle, entries, "list")
}
