#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn lst() -> Command {
    cargo_bin_cmd!("listinha")
}

/// Create a unique test DB path inside the system temp dir and remove any
/// leftovers of a previous run (database file and cached session).
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_listinha.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    fs::remove_file(path.with_extension("session")).ok();
    db_path
}

/// Initialize the database and register a signed-in account.
pub fn init_and_register(db_path: &str, email: &str) {
    lst()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    lst()
        .args([
            "--db", db_path, "--test", "register", "--email", email, "--password", "secret1",
        ])
        .assert()
        .success();
}

/// Create a category through the CLI; tests refer to it by name.
pub fn add_category(db_path: &str, name: &str) {
    lst()
        .args(["--db", db_path, "--test", "category", "add", name])
        .assert()
        .success();
}

/// Add an item through the CLI.
pub fn add_item(db_path: &str, name: &str, price: &str, category: &str) {
    lst()
        .args([
            "--db", db_path, "--test", "add", name, price, "--category", category,
        ])
        .assert()
        .success();
}
