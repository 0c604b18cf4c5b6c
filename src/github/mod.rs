// src/github/mod.rs
// =============================================================================
// This module talks to GitHub's REST "contents" API.
//
// Submodules:
// - client: RepoClient, the five operations (access, folder, upload,
//           delete, list)
// - types:  JSON request/response shapes and the ApiOutcome result type
// - error:  ClientError for failures that happen before GitHub answers
// =============================================================================

mod client;
mod error;
mod types;

pub use client::RepoClient;
pub use error::ClientError;
pub use types::{ApiOutcome, FolderStatus};
