// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gitstats-tasks

use thiserror::Error;

/// Errors that can occur while executing task commands
#[derive(Debug, Error)]
pub enum TasksError {
    /// The shell could not be started
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        /// The command line that was being run
        command: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The working directory does not exist
    #[error("Working directory not found: {path}")]
    DirectoryNotFound {
        /// The directory the command was meant to run in
        path: String,
    },
}
