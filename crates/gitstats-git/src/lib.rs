// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitstats-git: Git collaborator for gitstats
//!
//! This library crate wraps the handful of repository operations the gitstats
//! traversal needs: cloning, listing the commits of a branch, checking out a
//! commit, reading its timestamp, and resetting a workspace to a branch.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use gitstats_git::{Git, VersionControl};
//! use std::path::Path;
//!
//! let git = Git::new();
//! let dir = Path::new("/tmp/checkout");
//! git.clone_repository("https://github.com/rust-lang/log", dir)
//!     .expect("clone");
//!
//! for commit in git.list_commits(dir, None).expect("list commits") {
//!     git.checkout(dir, &commit).expect("checkout");
//!     println!("{} {}", commit.short_sha(), git.commit_timestamp(dir, &commit).expect("time"));
//! }
//! ```

pub mod client;
pub mod commit;
pub mod error;

pub use client::{Git, VersionControl, clear_stale_locks};
pub use commit::CommitId;
pub use error::GitError;
