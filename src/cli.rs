// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Without a subcommand the program starts the interactive shell. The same
// operations are also available as one-shot subcommands, which is handy in
// scripts:
//
//   gh-folder                       interactive shell
//   gh-folder upload ./photo.png    upload one file and exit
//   gh-folder delete photo.png      delete one file and exit
//   gh-folder list                  list the folder and exit
//
// Which repository/folder we work on comes from the flags below; every flag
// has a built-in default, and the token can also come from GITHUB_TOKEN.
// =============================================================================

use crate::config::{
    Config, DEFAULT_API_URL, DEFAULT_BRANCH, DEFAULT_FOLDER, DEFAULT_OWNER, DEFAULT_REPO,
};

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gh-folder",
    version,
    about = "Upload, delete and list files in one folder of a GitHub repository",
    long_about = "gh-folder manages the files of a single folder in a GitHub repository \
                  through the GitHub contents API. Run it without a subcommand for an \
                  interactive shell."
)]
pub struct Cli {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// What to do (defaults to the interactive shell)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where the files live
#[derive(Args, Debug)]
pub struct RepoArgs {
    /// GitHub API base URL (change it for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Repository owner (user or organization)
    #[arg(long, default_value = DEFAULT_OWNER, global = true)]
    pub owner: String,

    /// Repository name
    #[arg(long, default_value = DEFAULT_REPO, global = true)]
    pub repo: String,

    /// Branch the commits go to
    #[arg(long, default_value = DEFAULT_BRANCH, global = true)]
    pub branch: String,

    /// Folder inside the repository
    #[arg(long, default_value = DEFAULT_FOLDER, global = true)]
    pub folder: String,

    /// Personal access token
    #[arg(long, env = "GITHUB_TOKEN", default_value = "", hide_env_values = true, hide_default_value = true, global = true)]
    pub token: String,
}

impl RepoArgs {
    pub fn to_config(&self) -> Result<Config> {
        Config::new(
            &self.api_url,
            &self.owner,
            &self.repo,
            &self.branch,
            &self.folder,
            &self.token,
        )
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive shell (the default)
    Shell,

    /// Upload a local file into the folder
    ///
    /// Example: gh-folder upload ./photo.png
    Upload {
        /// Local file; its file name becomes the name in the repository
        path: PathBuf,
    },

    /// Delete a file from the folder
    ///
    /// Example: gh-folder delete photo.png
    Delete {
        /// File name inside the folder
        filename: String,
    },

    /// List the files in the folder
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_shell() {
        let cli = Cli::try_parse_from(["gh-folder"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.repo.folder, DEFAULT_FOLDER);
        assert_eq!(cli.repo.branch, DEFAULT_BRANCH);
    }

    #[test]
    fn test_upload_subcommand_with_overrides() {
        let cli = Cli::try_parse_from([
            "gh-folder",
            "upload",
            "pics/cat.png",
            "--owner",
            "octo",
            "--repo",
            "site",
            "--folder",
            "assets",
            "-vv",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Commands::Upload {
                path: PathBuf::from("pics/cat.png")
            })
        );
        assert_eq!(cli.verbose, 2);

        let config = cli.repo.to_config().unwrap();
        assert_eq!(config.full_name(), "octo/site");
        assert_eq!(config.remote_path("cat.png"), "assets/cat.png");
    }

    #[test]
    fn test_delete_requires_a_name() {
        assert!(Cli::try_parse_from(["gh-folder", "delete"]).is_err());
        let cli = Cli::try_parse_from(["gh-folder", "delete", "cat.png"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Delete {
                filename: "cat.png".to_string()
            })
        );
    }

    #[test]
    fn test_list_takes_no_arguments() {
        assert!(Cli::try_parse_from(["gh-folder", "list", "extra"]).is_err());
        let cli = Cli::try_parse_from(["gh-folder", "list"]).unwrap();
        assert_eq!(cli.command, Some(Commands::List));
    }
}
