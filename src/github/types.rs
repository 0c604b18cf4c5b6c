// src/github/types.rs
// =============================================================================
// Data shapes exchanged with the GitHub contents API, plus the small result
// types our client hands back to callers.
//
// Only the fields we actually use are declared; serde ignores the rest of
// GitHub's (fairly large) JSON responses.
// =============================================================================

use serde::{Deserialize, Serialize};

/// A file (or directory) entry as returned by the contents API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    /// Size in bytes (0 for directories)
    #[serde(default)]
    pub size: u64,
    /// Revision tag, needed to update or delete the file
    pub sha: String,
    /// Public raw link; null for directories
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Outcome of a single API operation
///
/// Transport failures (DNS, TLS, broken JSON...) are not represented here;
/// those come back as `Err(ClientError)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    /// The operation did what it was asked
    Success(T),
    /// The remote file the operation needs does not exist
    NotFound,
    /// GitHub answered with an unexpected status
    Failed { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    AlreadyExists,
    Created,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Path inside the repository, e.g. "image/photo.png"
    pub remote_path: String,
    /// true when an existing file was overwritten
    pub replaced: bool,
    pub download_url: Option<String>,
}

// Body of PUT /repos/{owner}/{repo}/contents/{path}
//
// `sha` must be left out entirely when creating a file, and must be the
// current revision tag when updating one.
#[derive(Debug, Serialize)]
pub(crate) struct PutContentRequest<'a> {
    pub message: String,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

// Body of DELETE /repos/{owner}/{repo}/contents/{path}
#[derive(Debug, Serialize)]
pub(crate) struct DeleteContentRequest<'a> {
    pub message: String,
    pub sha: String,
    pub branch: &'a str,
}

// Response of a successful PUT: { "content": {...}, "commit": {...} }
#[derive(Debug, Deserialize)]
pub(crate) struct WriteResponse {
    pub content: RemoteFile,
}
