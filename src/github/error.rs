// src/github/error.rs
// Errors that stop a client operation before GitHub gets to answer it.
// HTTP status failures are not errors here: see ApiOutcome.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Local file {} not found", path.display())]
    LocalFileNotFound { path: PathBuf },

    #[error("{} is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API URL cannot be used as a base: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
