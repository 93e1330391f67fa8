// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gitstats-git

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    /// Error from git2 library
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// Invalid commit reference (branch, tag, or SHA)
    #[error("Invalid commit reference: {reference}")]
    InvalidReference {
        /// The reference string that could not be resolved
        reference: String,
    },

    /// Cloning the remote repository failed
    #[error("Failed to clone {url} into {}: {source}", .destination.display())]
    Clone {
        /// The repository location that was cloned
        url: String,
        /// Where the clone was written
        destination: PathBuf,
        /// Underlying git2 error
        source: git2::Error,
    },

    /// Checking out a commit into the working tree failed
    #[error("Failed to check out {commit}: {source}")]
    Checkout {
        /// The commit that could not be checked out
        commit: String,
        /// Underlying git2 error
        source: git2::Error,
    },

    /// The commit carries a timestamp chrono cannot represent
    #[error("Commit {commit} has an invalid timestamp: {seconds}")]
    InvalidTimestamp {
        /// The commit whose time was read
        commit: String,
        /// Raw seconds since the epoch
        seconds: i64,
    },

    /// Filesystem error while cleaning up lock files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
