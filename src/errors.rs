//! Unified application error type.
//! All modules (backend, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use crate::backend::BackendError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Backend-related
    // ---------------------------
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // ---------------------------
    // Auth & session
    // ---------------------------
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Session error: {0}")]
    Session(String),

    // ---------------------------
    // Mutation errors
    // ---------------------------
    #[error("Mutation failed: {0}")]
    Mutation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous reference: {0}")]
    Ambiguous(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
