//! CLI argument parsing.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

/// Global CLI arguments shared by every subcommand.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = ".", global = true)]
    /// Repository root to operate on.
    pub repo: PathBuf,

    #[arg(long, global = true)]
    /// Configuration file. Defaults to release-prep.toml in the repository.
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Configuration path, resolved against the repository root.
    pub fn config_path(&self) -> PathBuf {
        match &self.config {
            Some(path) => path.clone(),
            None => self.repo.join(DEFAULT_CONFIG_FILE),
        }
    }
}

/// Release operation subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bump the version on a release branch, push it and open the release
    /// pull request. Dry-run unless --execute is given.
    Prepare {
        #[arg(
            default_value = "patch",
            value_parser = ["major", "minor", "patch"],
            ignore_case = true
        )]
        /// Release level.
        level: String,

        #[arg(long, default_value_t = false)]
        /// Apply changes instead of only reporting them.
        execute: bool,

        #[arg(long, default_value_t = false)]
        /// Print the result as JSON.
        json: bool,
    },

    /// Open a pull request from a release branch. Dry-run unless --execute
    /// is given.
    CreatePr {
        #[arg(long, default_value = "main")]
        /// Target branch.
        base: String,

        #[arg(long)]
        /// Release branch (release/vX.Y.Z).
        head: String,

        #[arg(long)]
        /// Pull request title (10 to 50 characters).
        title: String,

        #[arg(long, default_value = "")]
        /// Pull request body.
        body: String,

        #[arg(long, default_value_t = false)]
        /// Open the pull request instead of only reporting it.
        execute: bool,

        #[arg(long, default_value_t = false)]
        /// Print the result as JSON.
        json: bool,
    },
}

impl Command {
    pub fn json(&self) -> bool {
        match self {
            Command::Prepare { json, .. } | Command::CreatePr { json, .. } => {
                *json
            }
        }
    }
}
