// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command-line interface
//!
//! Argument definitions for the `gitstats` binary. Only parsing lives here;
//! `main` turns the parsed values into calls on [`crate::run::GitStats`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;
use crate::format::DEFAULT_FORMAT;
use crate::workspace::{self, CleanupPolicy};

/// gitstats - run shell tasks against every commit of a git repository
#[derive(Parser, Debug, Clone)]
#[command(name = "gitstats")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with the data on stdout.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

/// Location of the YAML task configuration
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Path to the configuration file
    #[arg(short, long, env = "GITSTATS_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

impl Default for ConfigArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Clone a repository and run the tasks against every commit
    ///
    /// Records are written to stdout, one line each (after the CSV header).
    ///
    /// Example:
    ///   gitstats run https://github.com/user/project.git files todos > stats.csv
    Run {
        /// URL or path of the repository to clone
        repository: String,

        /// Only run these tasks (default: every configured task)
        tasks: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = DEFAULT_FORMAT)]
        format: String,

        /// Branch to walk (default: the repository's HEAD branch)
        #[arg(short, long)]
        branch: Option<String>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Keep the clone without asking
        #[arg(long, conflicts_with = "delete")]
        keep: bool,

        /// Delete the clone without asking
        #[arg(long)]
        delete: bool,
    },

    /// Run the tasks once against the current state of a local repository
    RunOnce {
        /// Repository directory
        #[arg(default_value = ".")]
        directory: PathBuf,

        /// Only run these tasks (default: every configured task)
        tasks: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = DEFAULT_FORMAT)]
        format: String,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Remove stale git locks in the local workspace and reset it to a branch
    Clear {
        /// Workspace repository (default: the platform data directory)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Branch to reset to
        #[arg(short, long, default_value = "master")]
        branch: String,
    },
}

impl Cli {
    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

impl Command {
    /// Cleanup policy of a `run` command; `Keep` for the others
    #[must_use]
    pub fn cleanup_policy(&self) -> CleanupPolicy {
        match self {
            Self::Run { keep, delete, .. } => CleanupPolicy::from_flags(*keep, *delete),
            _ => CleanupPolicy::Keep,
        }
    }

    /// Workspace of a `clear` command, falling back to the default location
    #[must_use]
    pub fn workspace_path(&self) -> Option<PathBuf> {
        match self {
            Self::Clear { workspace, .. } => Some(
                workspace
                    .clone()
                    .unwrap_or_else(workspace::default_workspace),
            ),
            _ => None,
        }
    }
}
