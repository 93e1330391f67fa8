// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitstats-tasks: Task definitions and command execution for gitstats
//!
//! This library crate holds the ordered set of named shell tasks a gitstats
//! run executes at every commit, the filtering that selects the tasks of a
//! run, and the command runner that executes them in a working tree.
//!
//! # Example
//!
//! ```no_run
//! use gitstats_tasks::{CommandRunner, ShellRunner, TaskSet};
//! use std::path::Path;
//!
//! let tasks: TaskSet = [("files", "git ls-files | wc -l"), ("todos", "grep -r TODO . | wc -l")]
//!     .into_iter()
//!     .collect();
//!
//! let runner = ShellRunner::default();
//! for (name, command) in tasks.effective(&["files"]).iter() {
//!     let output = runner.run(Path::new("."), command).unwrap();
//!     println!("{name}: {}", output.recorded_text());
//! }
//! ```

pub mod error;
pub mod runner;
pub mod task;

pub use error::TasksError;
pub use runner::{CommandOutput, CommandRunner, ShellRunner};
pub use task::TaskSet;
