// src/shell.rs
// =============================================================================
// The interactive command loop.
//
// The loop has one state, "waiting for a command":
//   upload <path>   upload a local file into the folder
//   delete <name>   delete a file from the folder
//   list            show the files in the folder
//   help            show the commands again
//   exit            leave (end of input does the same)
//
// Anything else prints an error and waits for the next line. Parsing never
// touches the network, so a typo costs nothing.
//
// Rust concepts:
// - Generic reader/writer: the loop reads from any AsyncBufRead and writes
//   to any Write, so tests can feed it a byte string instead of a terminal
// - thiserror: each parse failure is its own enum variant with a message
// =============================================================================

use crate::commands;
use crate::github::RepoClient;

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    Delete(String),
    List,
    Help,
    Exit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Specify the path to the file: upload <path>")]
    MissingPath,

    #[error("Specify the file name: delete <name>")]
    MissingName,

    #[error("Unknown command: {0}")]
    Unknown(String),
}

/// Parses one input line.
///
/// Returns Ok(None) for a blank line. The verb is case-insensitive; the
/// argument (a path or a file name) is kept exactly as typed, minus the
/// surrounding whitespace.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, argument) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match (verb.to_lowercase().as_str(), argument) {
        ("upload", "") => return Err(ParseError::MissingPath),
        ("upload", path) => Command::Upload(PathBuf::from(path)),
        ("delete", "") => return Err(ParseError::MissingName),
        ("delete", name) => Command::Delete(name.to_string()),
        ("list", "") => Command::List,
        ("help", "") => Command::Help,
        ("exit", "") => Command::Exit,
        _ => return Err(ParseError::Unknown(line.to_string())),
    };

    Ok(Some(command))
}

pub fn print_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Available commands:")?;
    writeln!(out, "1. upload <path_to_file> - upload a file")?;
    writeln!(out, "2. delete <file_name> - delete a file")?;
    writeln!(out, "3. list - show the files in the folder")?;
    writeln!(out, "4. exit - quit")?;
    Ok(())
}

/// Runs the loop until `exit` or end of input.
///
/// Failed operations are reported and the loop goes on; only a failure to
/// read input or write output ends it with an error.
pub async fn run<R, W>(client: &RepoClient, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    print_help(out)?;
    let mut lines = input.lines();

    loop {
        write!(out, "\nEnter a command: ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            // Ctrl-D: behave like `exit`
            writeln!(out)?;
            writeln!(out, "👋 Goodbye!")?;
            break;
        };

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(Command::Exit)) => {
                writeln!(out, "👋 Goodbye!")?;
                break;
            }
            Ok(Some(Command::Help)) => print_help(out)?,
            Ok(Some(command)) => {
                commands::execute(client, &command, out).await?;
            }
            Err(e) => writeln!(out, "❌ {}", e)?,
        }
    }

    Ok(())
}
