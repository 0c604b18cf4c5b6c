// src/config.rs
// =============================================================================
// Configuration for the repository client.
//
// Everything the client needs to know about *where* it works lives here:
// the API base URL, the repository (owner + name), the branch, the folder
// inside the repository, and the access token.
//
// The values are built once at startup (from CLI flags, env vars, or the
// built-in defaults below), validated, and then never changed. The client
// takes the Config by value, so tests can point it at a mock server.
// =============================================================================

use anyhow::{anyhow, bail, Result};
use std::fmt;
use url::Url;

/// Public GitHub REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OWNER: &str = "123wrer";
pub const DEFAULT_REPO: &str = "test";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_FOLDER: &str = "image";

// Empty marker file that forces an otherwise-empty folder to exist
// (git has no concept of an empty directory)
pub const PLACEHOLDER_FILE: &str = ".gitkeep";

#[derive(Clone)]
pub struct Config {
    pub api_url: Url,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub folder: String,
    pub token: String,
}

impl Config {
    /// Builds and validates a configuration.
    ///
    /// Rejects empty values, owner/repo names containing '/', and API URLs
    /// that can't have path segments appended (e.g. "mailto:...").
    /// Leading and trailing slashes are trimmed from the folder.
    pub fn new(
        api_url: &str,
        owner: &str,
        repo: &str,
        branch: &str,
        folder: &str,
        token: &str,
    ) -> Result<Self> {
        let api_url = Url::parse(api_url.trim())
            .map_err(|e| anyhow!("Invalid API URL '{}': {}", api_url, e))?;
        if api_url.cannot_be_a_base() {
            bail!("API URL cannot be used as a base: {}", api_url);
        }

        let owner = required("owner", owner)?;
        let repo = required("repository", repo)?;
        let branch = required("branch", branch)?;
        let folder = required("folder", folder.trim().trim_matches('/'))?;

        if owner.contains('/') {
            bail!("Owner must not contain '/': {}", owner);
        }
        if repo.contains('/') {
            bail!("Repository name must not contain '/': {}", repo);
        }

        Ok(Self {
            api_url,
            owner,
            repo,
            branch,
            folder,
            token: token.trim().to_string(),
        })
    }

    /// "owner/repo", for display
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Path of `name` inside the target folder
    pub fn remote_path(&self, name: &str) -> String {
        format!("{}/{}", self.folder, name)
    }

    pub fn placeholder_path(&self) -> String {
        self.remote_path(PLACEHOLDER_FILE)
    }
}

// Hand-written so the token never ends up in logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url.as_str())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("folder", &self.folder)
            .field("token", &if self.token.is_empty() { "" } else { "[REDACTED]" })
            .finish()
    }
}

fn required(what: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        bail!("The {} must not be empty", what);
    }
    Ok(value.to_string())
}
