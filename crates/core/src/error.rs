//! Workspace-level error type
//!
//! Each crate defines its own precise error enum; this type is the common
//! denominator used at the outermost seams (server handlers, bin entry).

use thiserror::Error;

/// Top-level error for the advisory service
#[derive(Error, Debug)]
pub enum Error {
    #[error("Generation error: {0}")]
    GenAi(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Live session error: {0}")]
    Live(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Workspace result alias
pub type Result<T> = std::result::Result<T, Error>;
