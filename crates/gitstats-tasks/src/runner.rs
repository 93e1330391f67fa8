// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Shell command execution
//!
//! [`CommandRunner`] runs one command string inside a working directory and
//! captures what it printed. [`ShellRunner`] is the process-backed
//! implementation; it blocks until the command exits and enforces no timeout.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TasksError;

/// Captured result of one command execution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Everything written to stdout
    pub stdout: String,
    /// Everything written to stderr
    pub stderr: String,
    /// Exit code, or `None` if the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Output of a command that exited with code 0 and printed `stdout`
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// Whether the command exited with code 0
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The text stored in a record for this execution
    ///
    /// A successful command records its stdout without trailing line breaks.
    /// A failed command records stdout followed by stderr, so the error text
    /// shows up in the record instead of being lost. Leading whitespace is
    /// kept as printed.
    #[must_use]
    pub fn recorded_text(&self) -> String {
        let stdout = strip_line_breaks(&self.stdout);
        if self.success() {
            return stdout.to_string();
        }

        let stderr = strip_line_breaks(&self.stderr);
        match (stdout.is_empty(), stderr.is_empty()) {
            (_, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

fn strip_line_breaks(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}

/// Executes a command string in a working directory
pub trait CommandRunner {
    /// Run `command` with `dir` as its working directory
    ///
    /// A command that runs and exits non-zero is *not* an error; inspect
    /// [`CommandOutput::success`].
    ///
    /// # Errors
    ///
    /// Returns `TasksError` if the command could not be started at all.
    fn run(&self, dir: &Path, command: &str) -> Result<CommandOutput, TasksError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, dir: &Path, command: &str) -> Result<CommandOutput, TasksError> {
        (**self).run(dir, command)
    }
}

/// Runs commands through the platform shell (`sh -c` or `cmd /C`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRunner {
    shell: String,
    flag: String,
}

impl ShellRunner {
    /// Use a specific shell program and its "run this string" flag
    #[must_use]
    pub fn new(shell: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            flag: flag.into(),
        }
    }

    /// The shell program in use
    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        if cfg!(windows) {
            Self::new("cmd", "/C")
        } else {
            Self::new("sh", "-c")
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, dir: &Path, command: &str) -> Result<CommandOutput, TasksError> {
        if !dir.is_dir() {
            return Err(TasksError::DirectoryNotFound {
                path: dir.display().to_string(),
            });
        }

        let output = Command::new(&self.shell)
            .arg(&self.flag)
            .arg(command)
            .current_dir(dir)
            .output()
            .map_err(|source| TasksError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };
        debug!(command, exit_code = ?result.exit_code, "Command finished");
        Ok(result)
    }
}
