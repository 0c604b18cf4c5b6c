// src/commands.rs
// =============================================================================
// Runs one repository operation and prints what happened.
//
// Both front ends (the interactive shell and the one-shot subcommands) go
// through these functions, so the console output is the same either way.
// Each function returns Ok(true) when the operation succeeded and Ok(false)
// when it failed in a way the user has already been told about. Err is only
// returned when writing to the console itself fails.
//
// Output goes to any `Write` (stdout in the real program, a Vec<u8> in
// tests).
// =============================================================================

use crate::github::{ApiOutcome, ClientError, FolderStatus, RepoClient};
use crate::shell::Command;

use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Prints the repository, branch and folder we are about to work on
pub fn print_banner<W: Write>(client: &RepoClient, out: &mut W) -> Result<()> {
    let config = client.config();
    writeln!(out, "🚀 GitHub File Manager")?;
    writeln!(out, "Repository: {}", config.full_name())?;
    writeln!(out, "Branch: {}", config.branch)?;
    writeln!(out, "Folder: {}", config.folder)?;
    Ok(())
}

/// Startup sequence: the repository must be reachable and the target
/// folder must exist before any file operation runs.
///
/// Returns Ok(false) when the program should stop with exit code 1.
pub async fn prepare<W: Write>(client: &RepoClient, out: &mut W) -> Result<bool> {
    if !client.check_access().await {
        writeln!(
            out,
            "❌ No access to the repository. Check the token and the repository name."
        )?;
        return Ok(false);
    }

    let folder = &client.config().folder;
    let ready = match client.ensure_folder().await {
        Ok(ApiOutcome::Success(FolderStatus::AlreadyExists)) => {
            writeln!(out, "✅ Folder {} already exists", folder)?;
            true
        }
        Ok(ApiOutcome::Success(FolderStatus::Created)) => {
            writeln!(out, "✅ Folder {} created", folder)?;
            true
        }
        Ok(ApiOutcome::NotFound) => {
            writeln!(out, "❌ Failed to create folder: not found")?;
            false
        }
        Ok(ApiOutcome::Failed { status, body }) => {
            print_failure(out, "Failed to create folder", status, &body)?;
            false
        }
        Err(e) => {
            print_error(out, &e)?;
            false
        }
    };

    if !ready {
        writeln!(out, "❌ Could not create folder {}", folder)?;
    }
    Ok(ready)
}

/// Dispatches a parsed shell command. `Help` and `Exit` are handled by
/// the shell itself and count as successes here.
pub async fn execute<W: Write>(client: &RepoClient, command: &Command, out: &mut W) -> Result<bool> {
    match command {
        Command::Upload(path) => upload(client, path, out).await,
        Command::Delete(name) => delete(client, name, out).await,
        Command::List => list(client, out).await,
        Command::Help | Command::Exit => Ok(true),
    }
}

pub async fn upload<W: Write>(client: &RepoClient, path: &Path, out: &mut W) -> Result<bool> {
    match client.upload(path).await {
        Ok(ApiOutcome::Success(report)) => {
            if report.replaced {
                writeln!(out, "🔄 Updated existing file: {}", report.remote_path)?;
            } else {
                writeln!(out, "📤 Uploaded new file: {}", report.remote_path)?;
            }
            writeln!(out, "✅ File uploaded successfully!")?;
            match report.download_url {
                Some(url) => writeln!(out, "🔗 Raw link: {}", url)?,
                None => writeln!(out, "🔗 Raw link: (not provided)")?,
            }
            Ok(true)
        }
        Ok(ApiOutcome::NotFound) => {
            writeln!(out, "❌ Upload failed: not found")?;
            Ok(false)
        }
        Ok(ApiOutcome::Failed { status, body }) => {
            print_failure(out, "Upload failed", status, &body)?;
            Ok(false)
        }
        Err(e) => {
            print_error(out, &e)?;
            Ok(false)
        }
    }
}

pub async fn delete<W: Write>(client: &RepoClient, name: &str, out: &mut W) -> Result<bool> {
    let remote_path = client.config().remote_path(name);
    match client.delete(name).await {
        Ok(ApiOutcome::Success(())) => {
            writeln!(out, "✅ File {} deleted successfully", remote_path)?;
            Ok(true)
        }
        Ok(ApiOutcome::NotFound) => {
            writeln!(out, "❌ File {} not found", remote_path)?;
            Ok(false)
        }
        Ok(ApiOutcome::Failed { status, body }) => {
            print_failure(out, "Delete failed", status, &body)?;
            Ok(false)
        }
        Err(e) => {
            print_error(out, &e)?;
            Ok(false)
        }
    }
}

pub async fn list<W: Write>(client: &RepoClient, out: &mut W) -> Result<bool> {
    match client.list().await {
        Ok(ApiOutcome::Success(files)) => {
            writeln!(out)?;
            writeln!(out, "📁 Files in folder {}:", client.config().folder)?;
            for file in &files {
                writeln!(out, "- {} ({} bytes)", file.name, file.size)?;
            }
            Ok(true)
        }
        Ok(ApiOutcome::NotFound) => {
            writeln!(out, "❌ Folder {} not found", client.config().folder)?;
            Ok(false)
        }
        Ok(ApiOutcome::Failed { status, body }) => {
            print_failure(out, "Failed to list files", status, &body)?;
            Ok(false)
        }
        Err(e) => {
            print_error(out, &e)?;
            Ok(false)
        }
    }
}

// GitHub's raw body goes out unchanged; it usually explains the failure
fn print_failure<W: Write>(out: &mut W, what: &str, status: u16, body: &str) -> Result<()> {
    writeln!(out, "❌ {}: {}", what, status)?;
    writeln!(out, "{}", body)?;
    Ok(())
}

fn print_error<W: Write>(out: &mut W, error: &ClientError) -> Result<()> {
    writeln!(out, "❌ {}", error)?;
    Ok(())
}
