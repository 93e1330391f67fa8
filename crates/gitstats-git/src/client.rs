// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Version-control client
//!
//! [`VersionControl`] is the seam between the gitstats traversal and the
//! repository. [`Git`] implements it on top of the `git2` crate. Every
//! operation takes the working directory explicitly, so a single client can
//! serve any number of checkouts.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::build::CheckoutBuilder;
use git2::{ObjectType, Oid, Repository, ResetType, Sort};
use tracing::debug;

use crate::commit::CommitId;
use crate::error::GitError;

/// Lock files git leaves behind when a process dies mid-operation
const STALE_LOCKS: [&str; 2] = ["HEAD.lock", "index.lock"];

/// Repository operations needed to walk and analyze history
///
/// Implementations are synchronous; each call completes before returning.
pub trait VersionControl {
    /// Clone `url` (remote URL or local path) into `destination`
    ///
    /// # Errors
    ///
    /// Returns `GitError::Clone` if the repository cannot be cloned.
    fn clone_repository(&self, url: &str, destination: &Path) -> Result<(), GitError>;

    /// List the commits reachable from `branch`, oldest first
    ///
    /// When `branch` is `None` the repository's current HEAD is used.
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidReference` if the branch cannot be resolved.
    fn list_commits(&self, dir: &Path, branch: Option<&str>) -> Result<Vec<CommitId>, GitError>;

    /// Check out `commit` in the working tree at `dir`, detaching HEAD
    ///
    /// # Errors
    ///
    /// Returns `GitError::Checkout` if the tree cannot be checked out.
    fn checkout(&self, dir: &Path, commit: &CommitId) -> Result<(), GitError>;

    /// Read the committer timestamp of `commit`
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the commit cannot be found or its time is invalid.
    fn commit_timestamp(&self, dir: &Path, commit: &CommitId) -> Result<DateTime<Utc>, GitError>;

    /// The commit HEAD currently points at
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be resolved.
    fn head_commit(&self, dir: &Path) -> Result<CommitId, GitError>;

    /// Point HEAD at `branch` and hard-reset the working tree to it
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidReference` if the branch does not exist.
    fn reset_hard(&self, dir: &Path, branch: &str) -> Result<(), GitError>;
}

impl<T: VersionControl + ?Sized> VersionControl for &T {
    fn clone_repository(&self, url: &str, destination: &Path) -> Result<(), GitError> {
        (**self).clone_repository(url, destination)
    }

    fn list_commits(&self, dir: &Path, branch: Option<&str>) -> Result<Vec<CommitId>, GitError> {
        (**self).list_commits(dir, branch)
    }

    fn checkout(&self, dir: &Path, commit: &CommitId) -> Result<(), GitError> {
        (**self).checkout(dir, commit)
    }

    fn commit_timestamp(&self, dir: &Path, commit: &CommitId) -> Result<DateTime<Utc>, GitError> {
        (**self).commit_timestamp(dir, commit)
    }

    fn head_commit(&self, dir: &Path) -> Result<CommitId, GitError> {
        (**self).head_commit(dir)
    }

    fn reset_hard(&self, dir: &Path, branch: &str) -> Result<(), GitError> {
        (**self).reset_hard(dir, branch)
    }
}

/// `git2`-backed [`VersionControl`] client
#[derive(Debug, Clone, Copy, Default)]
pub struct Git;

impl Git {
    /// Create a new client
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn open(dir: &Path) -> Result<Repository, GitError> {
        Repository::open(dir).map_err(|_| GitError::RepositoryNotFound {
            path: dir.display().to_string(),
        })
    }

    fn parse_oid(commit: &CommitId) -> Result<Oid, GitError> {
        Oid::from_str(commit.as_str()).map_err(|_| GitError::InvalidReference {
            reference: commit.to_string(),
        })
    }

    /// Resolve a branch name to its tip commit
    ///
    /// Fresh clones only carry a local branch for the default branch, so
    /// `origin/<branch>` is tried as a fallback.
    fn resolve_branch(repo: &Repository, branch: &str) -> Result<Oid, GitError> {
        let object = repo
            .revparse_single(branch)
            .or_else(|_| repo.revparse_single(&format!("origin/{branch}")))
            .map_err(|_| GitError::InvalidReference {
                reference: branch.to_string(),
            })?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| GitError::InvalidReference {
                reference: branch.to_string(),
            })?;
        Ok(commit.id())
    }
}

impl VersionControl for Git {
    fn clone_repository(&self, url: &str, destination: &Path) -> Result<(), GitError> {
        debug!(url, destination = %destination.display(), "Cloning repository");
        Repository::clone(url, destination).map_err(|source| GitError::Clone {
            url: url.to_string(),
            destination: destination.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    fn list_commits(&self, dir: &Path, branch: Option<&str>) -> Result<Vec<CommitId>, GitError> {
        let repo = Self::open(dir)?;
        if repo.is_empty()? {
            debug!("Repository at {} has no commits", dir.display());
            return Ok(Vec::new());
        }
        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;

        match branch {
            Some(branch) => revwalk.push(Self::resolve_branch(&repo, branch)?)?,
            None => revwalk.push_head()?,
        }

        let commits = revwalk
            .map(|oid| oid.map(CommitId::from))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            count = commits.len(),
            branch = branch.unwrap_or("HEAD"),
            "Listed commits"
        );
        Ok(commits)
    }

    fn checkout(&self, dir: &Path, commit: &CommitId) -> Result<(), GitError> {
        let repo = Self::open(dir)?;
        let oid = Self::parse_oid(commit)?;
        let checkout_err = |source| GitError::Checkout {
            commit: commit.to_string(),
            source,
        };

        let object = repo
            .find_object(oid, Some(ObjectType::Commit))
            .map_err(checkout_err)?;
        let mut builder = CheckoutBuilder::new();
        builder.force();
        repo.checkout_tree(&object, Some(&mut builder))
            .map_err(checkout_err)?;
        repo.set_head_detached(oid).map_err(checkout_err)?;

        debug!(commit = commit.short_sha(), "Checked out commit");
        Ok(())
    }

    fn commit_timestamp(&self, dir: &Path, commit: &CommitId) -> Result<DateTime<Utc>, GitError> {
        let repo = Self::open(dir)?;
        let oid = Self::parse_oid(commit)?;
        let seconds = repo.find_commit(oid)?.time().seconds();
        DateTime::from_timestamp(seconds, 0).ok_or_else(|| GitError::InvalidTimestamp {
            commit: commit.to_string(),
            seconds,
        })
    }

    fn head_commit(&self, dir: &Path) -> Result<CommitId, GitError> {
        let repo = Self::open(dir)?;
        let commit = repo
            .head()?
            .peel_to_commit()
            .map_err(|_| GitError::InvalidReference {
                reference: "HEAD".to_string(),
            })?;
        Ok(CommitId::from(commit.id()))
    }

    fn reset_hard(&self, dir: &Path, branch: &str) -> Result<(), GitError> {
        let repo = Self::open(dir)?;
        let refname = format!("refs/heads/{branch}");
        if repo.find_reference(&refname).is_err() {
            return Err(GitError::InvalidReference {
                reference: branch.to_string(),
            });
        }
        repo.set_head(&refname)?;

        let oid = Self::resolve_branch(&repo, branch)?;
        let object = repo.find_object(oid, Some(ObjectType::Commit))?;
        repo.reset(&object, ResetType::Hard, None)?;

        debug!(branch, "Reset working tree");
        Ok(())
    }
}

/// Remove lock files left in `dir/.git` by an interrupted git process
///
/// Returns the paths that were removed.
///
/// # Errors
///
/// Returns `GitError::Io` if an existing lock file cannot be deleted.
pub fn clear_stale_locks(dir: &Path) -> Result<Vec<PathBuf>, GitError> {
    let git_dir = dir.join(".git");
    let mut removed = Vec::new();
    for name in STALE_LOCKS {
        let lock = git_dir.join(name);
        if lock.exists() {
            fs::remove_file(&lock)?;
            debug!("Removed stale lock {}", lock.display());
            removed.push(lock);
        }
    }
    Ok(removed)
}
