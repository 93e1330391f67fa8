// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit traversal
//!
//! The [`TraversalEngine`] walks a list of commits in order. For each one it
//! checks the commit out in the shared working directory, reads its
//! timestamp, runs every task, and hands the resulting [`Record`] on before
//! touching the next commit. Only one record exists at a time.
//!
//! Checkout and timestamp failures are fatal: the working directory can no
//! longer be trusted, so traversal stops. Task failures are not; the task's
//! output (including its error text) becomes its value in the record.

use std::path::PathBuf;

use gitstats_git::{CommitId, GitError, VersionControl};
use gitstats_tasks::{CommandRunner, TaskSet};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::record::Record;

/// Fatal errors that stop a traversal
#[derive(Debug, Error)]
pub enum TraversalError {
    /// The commit could not be checked out
    #[error("Checkout of {commit} failed: {source}")]
    Checkout {
        /// The commit being checked out
        commit: CommitId,
        /// Underlying git error
        source: GitError,
    },

    /// The commit timestamp could not be read
    #[error("Could not read the timestamp of {commit}: {source}")]
    Timestamp {
        /// The commit whose timestamp was read
        commit: CommitId,
        /// Underlying git error
        source: GitError,
    },
}

/// Drives checkout, task execution and record assembly over a commit list
///
/// The engine borrows its collaborators; it owns nothing but the path of the
/// working directory it mutates.
pub struct TraversalEngine<'a, V: ?Sized, R: ?Sized> {
    vcs: &'a V,
    runner: &'a R,
    tasks: &'a TaskSet,
    workdir: PathBuf,
}

impl<'a, V, R> TraversalEngine<'a, V, R>
where
    V: VersionControl + ?Sized,
    R: CommandRunner + ?Sized,
{
    /// Create an engine over the working tree at `workdir`
    ///
    /// `tasks` is the effective task set; its order is the record order.
    pub fn new(vcs: &'a V, runner: &'a R, tasks: &'a TaskSet, workdir: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            runner,
            tasks,
            workdir: workdir.into(),
        }
    }

    /// Check out `commit` and build its record
    ///
    /// # Errors
    ///
    /// Returns `TraversalError` if the checkout or the timestamp read fails.
    pub fn process(&self, commit: CommitId) -> Result<Record, TraversalError> {
        self.vcs
            .checkout(&self.workdir, &commit)
            .map_err(|source| TraversalError::Checkout {
                commit: commit.clone(),
                source,
            })?;
        self.capture(commit)
    }

    /// Build the record of the commit currently checked out, without checkout
    ///
    /// # Errors
    ///
    /// Returns `TraversalError::Timestamp` if the timestamp cannot be read.
    pub fn capture(&self, commit: CommitId) -> Result<Record, TraversalError> {
        let timestamp = self
            .vcs
            .commit_timestamp(&self.workdir, &commit)
            .map_err(|source| TraversalError::Timestamp {
                commit: commit.clone(),
                source,
            })?;

        let values: IndexMap<String, String> = self
            .tasks
            .iter()
            .map(|(name, command)| (name.to_string(), self.run_task(&commit, name, command)))
            .collect();

        Ok(Record::new(commit, timestamp, values))
    }

    /// Run one task; failures become the recorded text instead of errors
    fn run_task(&self, commit: &CommitId, name: &str, command: &str) -> String {
        match self.runner.run(&self.workdir, command) {
            Ok(output) => {
                if !output.success() {
                    warn!(
                        task = name,
                        commit = commit.short_sha(),
                        exit_code = ?output.exit_code,
                        "Task failed, recording its output"
                    );
                }
                output.recorded_text()
            }
            Err(err) => {
                warn!(
                    task = name,
                    commit = commit.short_sha(),
                    error = %err,
                    "Task could not be run, recording the error"
                );
                err.to_string()
            }
        }
    }

    /// Lazily process `commits` in order
    ///
    /// Each call to `next` checks out one commit and builds its record. After
    /// a fatal error the iterator yields that error once and then ends.
    pub fn records<I>(&self, commits: I) -> Records<'_, 'a, V, R, I::IntoIter>
    where
        I: IntoIterator<Item = CommitId>,
    {
        Records {
            engine: self,
            commits: commits.into_iter(),
            position: 0,
            failed: false,
        }
    }

    /// Process `commits` in order, pushing each record into `sink`
    ///
    /// Returns the number of records pushed. Traversal stops at the first
    /// fatal error or the first error returned by `sink`.
    ///
    /// # Errors
    ///
    /// Returns the traversal error converted into `E`, or the sink's error.
    pub fn run<I, F, E>(&self, commits: I, mut sink: F) -> Result<usize, E>
    where
        I: IntoIterator<Item = CommitId>,
        F: FnMut(Record) -> Result<(), E>,
        E: From<TraversalError>,
    {
        let mut pushed = 0;
        for record in self.records(commits) {
            sink(record?)?;
            pushed += 1;
        }
        Ok(pushed)
    }
}

/// Pull-based record stream returned by [`TraversalEngine::records`]
pub struct Records<'e, 'a, V: ?Sized, R: ?Sized, I> {
    engine: &'e TraversalEngine<'a, V, R>,
    commits: I,
    position: usize,
    failed: bool,
}

impl<V, R, I> Iterator for Records<'_, '_, V, R, I>
where
    V: VersionControl + ?Sized,
    R: CommandRunner + ?Sized,
    I: Iterator<Item = CommitId>,
{
    type Item = Result<Record, TraversalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let commit = self.commits.next()?;
        self.position += 1;
        debug!(
            position = self.position,
            commit = commit.short_sha(),
            "Processing commit"
        );

        let result = self.engine.process(commit);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

impl<V, R, I> std::iter::FusedIterator for Records<'_, '_, V, R, I>
where
    V: VersionControl + ?Sized,
    R: CommandRunner + ?Sized,
    I: std::iter::FusedIterator<Item = CommitId>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use gitstats_tasks::{CommandOutput, TasksError};
    use similar_asserts::assert_eq;
    use std::cell::RefCell;
    use std::path::Path;

    /// In-memory repository: every commit checks out unless listed as broken
    #[derive(Default)]
    struct FakeVcs {
        broken: Vec<&'static str>,
        checkouts: RefCell<Vec<String>>,
    }

    impl VersionControl for FakeVcs {
        fn clone_repository(&self, _url: &str, _destination: &Path) -> Result<(), GitError> {
            Ok(())
        }

        fn list_commits(&self, _dir: &Path, _branch: Option<&str>) -> Result<Vec<CommitId>, GitError> {
            Ok(Vec::new())
        }

        fn checkout(&self, _dir: &Path, commit: &CommitId) -> Result<(), GitError> {
            if self.broken.contains(&commit.as_str()) {
                return Err(GitError::InvalidReference {
                    reference: commit.to_string(),
                });
            }
            self.checkouts.borrow_mut().push(commit.to_string());
            Ok(())
        }

        fn commit_timestamp(&self, _dir: &Path, _commit: &CommitId) -> Result<DateTime<Utc>, GitError> {
            Ok(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        }

        fn head_commit(&self, _dir: &Path) -> Result<CommitId, GitError> {
            Ok(CommitId::new("head"))
        }

        fn reset_hard(&self, _dir: &Path, _branch: &str) -> Result<(), GitError> {
            Ok(())
        }
    }

    /// Echoes the command back; commands starting with `fail` exit 1
    struct EchoRunner;

    impl CommandRunner for EchoRunner {
        fn run(&self, _dir: &Path, command: &str) -> Result<CommandOutput, TasksError> {
            if let Some(rest) = command.strip_prefix("fail") {
                return Ok(CommandOutput {
                    stdout: String::new(),
                    stderr: format!("error{rest}"),
                    exit_code: Some(1),
                });
            }
            if command == "spawn-error" {
                return Err(TasksError::DirectoryNotFound {
                    path: "/gone".to_string(),
                });
            }
            Ok(CommandOutput::ok(format!("{command}\n")))
        }
    }

    fn ids(names: &[&str]) -> Vec<CommitId> {
        names.iter().map(|n| CommitId::new(*n)).collect()
    }

    #[test]
    fn test_records_in_commit_order() {
        let vcs = FakeVcs::default();
        let tasks: TaskSet = [("count", "1")].into_iter().collect();
        let engine = TraversalEngine::new(&vcs, &EchoRunner, &tasks, "/work");

        let records: Vec<Record> = engine
            .records(ids(&["c1", "c2", "c3"]))
            .collect::<Result<_, _>>()
            .expect("traversal");

        let commits: Vec<&str> = records.iter().map(|r| r.commit().as_str()).collect();
        assert_eq!(commits, vec!["c1", "c2", "c3"]);
        assert!(records.iter().all(|r| r.task_value("count") == Some("1")));
        assert_eq!(*vcs.checkouts.borrow(), vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_task_failure_is_recorded() {
        let vcs = FakeVcs::default();
        let tasks: TaskSet = [("ok", "fine"), ("bad", "fail: boom"), ("gone", "spawn-error")]
            .into_iter()
            .collect();
        let engine = TraversalEngine::new(&vcs, &EchoRunner, &tasks, "/work");

        let record = engine.process(CommitId::new("c1")).expect("record");
        assert_eq!(record.task_value("ok"), Some("fine"));
        assert_eq!(record.task_value("bad"), Some("error: boom"));
        assert_eq!(
            record.task_value("gone"),
            Some("Working directory not found: /gone")
        );
    }

    #[test]
    fn test_checkout_failure_stops_traversal() {
        let vcs = FakeVcs {
            broken: vec!["c2"],
            ..FakeVcs::default()
        };
        let tasks = TaskSet::new();
        let engine = TraversalEngine::new(&vcs, &EchoRunner, &tasks, "/work");

        let results: Vec<_> = engine.records(ids(&["c1", "c2", "c3"])).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(TraversalError::Checkout { ref commit, .. }) if commit.as_str() == "c2"
        ));
        assert_eq!(*vcs.checkouts.borrow(), vec!["c1"]);
    }

    #[test]
    fn test_run_pushes_into_sink() {
        let vcs = FakeVcs::default();
        let tasks: TaskSet = [("a", "x"), ("b", "y")].into_iter().collect();
        let engine = TraversalEngine::new(&vcs, &EchoRunner, &tasks, "/work");

        let mut seen = Vec::new();
        let pushed = engine
            .run(ids(&["c1", "c2"]), |record| {
                seen.push(record.keys().map(str::to_string).collect::<Vec<_>>());
                Ok::<_, TraversalError>(())
            })
            .expect("run");

        assert_eq!(pushed, 2);
        assert_eq!(seen[0], vec!["commit", "date", "a", "b"]);
    }

    #[test]
    fn test_run_surfaces_checkout_failure() {
        let vcs = FakeVcs {
            broken: vec!["c1"],
            ..FakeVcs::default()
        };
        let tasks = TaskSet::new();
        let engine = TraversalEngine::new(&vcs, &EchoRunner, &tasks, "/work");

        let mut pushed = 0;
        let result = engine.run(ids(&["c1", "c2"]), |_| {
            pushed += 1;
            Ok::<_, TraversalError>(())
        });
        assert!(result.is_err());
        assert_eq!(pushed, 0);
    }

    #[test]
    fn test_capture_skips_checkout() {
        let vcs = FakeVcs::default();
        let tasks: TaskSet = [("a", "x")].into_iter().collect();
        let engine = TraversalEngine::new(&vcs, &EchoRunner, &tasks, "/work");

        let record = engine.capture(CommitId::new("head")).expect("capture");
        assert_eq!(record.date(), "2024-05-01 12:00:00");
        assert!(vcs.checkouts.borrow().is_empty());
    }

    #[test]
    fn test_zero_commits() {
        let vcs = FakeVcs::default();
        let tasks: TaskSet = [("a", "x")].into_iter().collect();
        let engine = TraversalEngine::new(&vcs, &EchoRunner, &tasks, "/work");
        assert_eq!(engine.records(Vec::new()).count(), 0);
    }
}
