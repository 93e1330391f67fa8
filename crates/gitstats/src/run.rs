// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Run orchestration
//!
//! [`GitStats`] ties the pieces together: it resolves the formatter, computes
//! the effective tasks, clones the repository, drives the traversal engine,
//! and writes the formatted lines to the output as they are produced.
//!
//! # Example
//!
//! ```no_run
//! use gitstats::config::Configuration;
//! use gitstats::run::{GitStats, RunRequest};
//!
//! let configuration = Configuration::load("gitstats.yml").expect("config");
//! let request = RunRequest::new("https://github.com/rust-lang/log").with_tasks(["files"]);
//!
//! let summary = GitStats::with_defaults()
//!     .run(&configuration, &request, &mut std::io::stdout())
//!     .expect("run");
//! eprintln!("{} records in {}", summary.records, summary.workdir.display());
//! ```

use std::cell::Cell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gitstats_git::{CommitId, Git, GitError, VersionControl, clear_stale_locks};
use gitstats_tasks::{CommandRunner, ShellRunner};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, Configuration};
use crate::engine::{TraversalEngine, TraversalError};
use crate::format::{DEFAULT_FORMAT, FormatError, Formatter, FormatterRegistry, RecordStream};
use crate::record::Record;
use crate::workspace;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum RunError {
    /// The configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Clone, commit listing, HEAD lookup or reset failed
    #[error("Version control error: {0}")]
    Git(#[from] GitError),

    /// Traversal stopped on a checkout or timestamp failure
    #[error("Traversal aborted: {0}")]
    Traversal(#[from] TraversalError),

    /// The formatter could not be resolved or failed
    #[error("Format error: {0}")]
    Format(FormatError),

    /// A working directory could not be prepared
    #[error("Working directory {}: {source}", .path.display())]
    Workspace {
        /// The directory involved
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// Writing to the output failed
    #[error("Failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl From<FormatError> for RunError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Traversal(err) => Self::Traversal(err),
            FormatError::InvalidOption { formatter, message } => {
                Self::Config(ConfigError::FormatterOptions { formatter, message })
            }
            other => Self::Format(other),
        }
    }
}

// ============================================================================
// Progress Reporting
// ============================================================================

/// Progress callback signature
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Progress event during a run
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The repository was cloned
    Cloned {
        /// Where it was cloned
        workdir: PathBuf,
    },
    /// Traversal is starting
    Started {
        /// Number of commits to process
        total_commits: usize,
    },
    /// A record was built
    Record {
        /// 1-based position in the commit list
        position: usize,
        /// The commit the record describes
        commit: CommitId,
    },
    /// Every line was written
    Completed {
        /// Summary of the run
        summary: RunSummary,
    },
}

// ============================================================================
// Requests and Summaries
// ============================================================================

/// Parameters of a full-history run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// URL or path of the repository to clone
    pub repository: String,
    /// Task filter; empty means every configured task
    pub tasks: Vec<String>,
    /// Formatter name
    pub format: String,
    /// Branch to walk (None = the clone's HEAD)
    pub branch: Option<String>,
    /// Clone destination (None = a fresh temporary directory)
    pub workdir: Option<PathBuf>,
}

impl RunRequest {
    /// Request a run over `repository` with default settings
    #[must_use]
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tasks: Vec::new(),
            format: DEFAULT_FORMAT.to_string(),
            branch: None,
            workdir: None,
        }
    }

    /// Only run the named tasks
    #[must_use]
    pub fn with_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tasks = tasks.into_iter().map(Into::into).collect();
        self
    }

    /// Use another formatter
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Walk `branch` instead of HEAD
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Clone into `workdir`, which must not exist or be empty
    #[must_use]
    pub fn in_directory(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Directory the commits were checked out in
    pub workdir: PathBuf,
    /// Number of commits listed
    pub commits: usize,
    /// Number of records built
    pub records: usize,
    /// Number of lines written
    pub lines: usize,
}

// ============================================================================
// GitStats
// ============================================================================

/// Runs tasks over a repository history and writes the formatted records
pub struct GitStats<V, R> {
    vcs: V,
    runner: R,
    registry: FormatterRegistry,
    progress: Option<ProgressCallback>,
}

impl GitStats<Git, ShellRunner> {
    /// git2 client, platform shell and the built-in formatters
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Git, ShellRunner::default())
    }
}

impl<V: VersionControl, R: CommandRunner> GitStats<V, R> {
    /// Create a runner from its collaborators, with the built-in formatters
    #[must_use]
    pub fn new(vcs: V, runner: R) -> Self {
        Self {
            vcs,
            runner,
            registry: FormatterRegistry::with_builtins(),
            progress: None,
        }
    }

    /// Replace the formatter registry
    #[must_use]
    pub fn with_registry(mut self, registry: FormatterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set a progress callback
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    fn report(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress {
            callback(&event);
        }
    }

    /// Clone `request.repository` and stream one record per commit to `out`
    ///
    /// The formatter is resolved first, so an unknown format or invalid
    /// formatter options fail before anything is cloned. On a fatal error the
    /// working directory is left in place.
    ///
    /// # Errors
    ///
    /// Returns `RunError` on formatter, clone, listing, checkout, timestamp or
    /// output failures. Task failures are recorded, not returned.
    pub fn run(
        &self,
        configuration: &Configuration,
        request: &RunRequest,
        out: &mut dyn Write,
    ) -> Result<RunSummary, RunError> {
        let formatter = self.registry.resolve(&request.format, configuration)?;
        let tasks = configuration.effective_tasks(&request.tasks);
        debug!(
            tasks = ?tasks.names().collect::<Vec<_>>(),
            format = formatter.name(),
            "Prepared run"
        );

        let workdir = match request.workdir {
            Some(ref dir) => dir.clone(),
            None => workspace::create_temporary().map_err(|source| RunError::Workspace {
                path: std::env::temp_dir(),
                source,
            })?,
        };

        info!("Cloning {} in {}", request.repository, workdir.display());
        self.vcs.clone_repository(&request.repository, &workdir)?;
        self.report(ProgressEvent::Cloned {
            workdir: workdir.clone(),
        });

        let commits = self.vcs.list_commits(&workdir, request.branch.as_deref())?;
        let total = commits.len();
        info!("Iterating through {total} commits");
        self.report(ProgressEvent::Started {
            total_commits: total,
        });

        let engine = TraversalEngine::new(&self.vcs, &self.runner, &tasks, &workdir);
        let (records, lines) = self.emit(formatter.as_ref(), engine.records(commits), out)?;

        let summary = RunSummary {
            workdir,
            commits: total,
            records,
            lines,
        };
        info!("Done");
        self.report(ProgressEvent::Completed {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Build and write a single record for the current HEAD of `directory`
    ///
    /// Nothing is cloned or checked out; tasks run against the tree as it is.
    ///
    /// # Errors
    ///
    /// Returns `RunError` if the formatter cannot be resolved, `directory` is
    /// not a repository, or writing fails.
    pub fn run_once<S: AsRef<str>>(
        &self,
        configuration: &Configuration,
        directory: &Path,
        tasks: &[S],
        format: &str,
        out: &mut dyn Write,
    ) -> Result<RunSummary, RunError> {
        let formatter = self.registry.resolve(format, configuration)?;
        let tasks = configuration.effective_tasks(tasks);

        if !directory.is_dir() {
            return Err(RunError::Workspace {
                path: directory.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "directory not found"),
            });
        }

        let head = self.vcs.head_commit(directory)?;
        info!("Analyzing {} at {}", directory.display(), head.short_sha());

        let engine = TraversalEngine::new(&self.vcs, &self.runner, &tasks, directory);
        let record = engine.capture(head);
        let (records, lines) = self.emit(formatter.as_ref(), std::iter::once(record), out)?;

        Ok(RunSummary {
            workdir: directory.to_path_buf(),
            commits: 1,
            records,
            lines,
        })
    }

    /// Remove stale lock files in `workspace` and hard-reset it to `branch`
    ///
    /// Returns the lock files that were removed.
    ///
    /// # Errors
    ///
    /// Returns `RunError::Git` if the workspace is not a repository or the
    /// branch cannot be resolved.
    pub fn clear(&self, workspace: &Path, branch: &str) -> Result<Vec<PathBuf>, RunError> {
        let removed = clear_stale_locks(workspace)?;
        for lock in &removed {
            info!("Removed {}", lock.display());
        }
        self.vcs.reset_hard(workspace, branch)?;
        info!("Reset {} to {branch}", workspace.display());
        Ok(removed)
    }

    /// Format `records` and write each line; returns (records, lines)
    fn emit<I>(
        &self,
        formatter: &dyn Formatter,
        records: I,
        out: &mut dyn Write,
    ) -> Result<(usize, usize), RunError>
    where
        I: Iterator<Item = Result<Record, TraversalError>>,
    {
        let built = Cell::new(0usize);
        let stream: RecordStream<'_> = Box::new(records.inspect(|result| {
            if let Ok(record) = result {
                built.set(built.get() + 1);
                self.report(ProgressEvent::Record {
                    position: built.get(),
                    commit: record.commit().clone(),
                });
            }
        }));

        let mut lines = 0;
        for line in formatter.format(stream) {
            let line = line?;
            writeln!(out, "{line}").map_err(RunError::Output)?;
            lines += 1;
        }
        out.flush().map_err(RunError::Output)?;

        Ok((built.get(), lines))
    }
}
