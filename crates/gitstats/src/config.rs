// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Run configuration
//!
//! The configuration document is YAML with a `tasks` mapping from task name to
//! shell command. Every other top-level key belongs to a formatter and is kept
//! untouched; the traversal never looks at it.
//!
//! ```yaml
//! tasks:
//!   files: git ls-files | wc -l
//!   todos: grep -r TODO src | wc -l
//! csv:
//!   delimiter: ";"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use gitstats_tasks::TaskSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{COMMIT_KEY, DATE_KEY};

/// Default configuration file name, looked up relative to the invocation directory
pub const DEFAULT_CONFIG_FILE: &str = "gitstats.yml";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("Configuration file \"{}\" missing", .0.display())]
    Missing(PathBuf),

    /// Configuration file could not be read
    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Read {
        /// The file that was read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Configuration document is not valid YAML or has the wrong shape
    #[error("Invalid configuration in {origin}: {source}")]
    Parse {
        /// Where the document came from
        origin: String,
        /// Underlying YAML error
        source: serde_yaml::Error,
    },

    /// A task name collides with a fixed record key
    #[error("Task name \"{0}\" is reserved for the record's own fields")]
    ReservedTaskName(String),

    /// A formatter's option block is unusable
    #[error("Invalid {formatter} options: {message}")]
    FormatterOptions {
        /// Formatter owning the options
        formatter: String,
        /// What is wrong with them
        message: String,
    },
}

/// Raw document shape; `tasks: ~` is accepted as "no tasks"
#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    tasks: Option<TaskSet>,
    #[serde(flatten)]
    options: IndexMap<String, serde_yaml::Value>,
}

/// Task definitions plus formatter options
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Configuration {
    /// Every declared task, in document order
    pub tasks: TaskSet,
    /// Formatter options keyed by top-level name, passed through verbatim
    #[serde(flatten)]
    pub options: IndexMap<String, serde_yaml::Value>,
}

impl Configuration {
    /// Create a configuration holding only tasks
    #[must_use]
    pub fn with_tasks(tasks: TaskSet) -> Self {
        Self {
            tasks,
            options: IndexMap::new(),
        }
    }

    /// Load the configuration file at `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the file does not exist, or a parse
    /// error if its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let configuration = Self::parse(&content, &path.display().to_string())?;
        debug!(
            path = %path.display(),
            tasks = configuration.tasks.len(),
            "Loaded configuration"
        );
        Ok(configuration)
    }

    /// Parse a configuration document
    ///
    /// `origin` names the document in error messages.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed documents and
    /// `ConfigError::ReservedTaskName` when a task is named `commit` or `date`.
    pub fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let document: Document =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                origin: origin.to_string(),
                source,
            })?;

        let tasks = document.tasks.unwrap_or_default();
        if let Some(reserved) = tasks
            .names()
            .find(|name| *name == COMMIT_KEY || *name == DATE_KEY)
        {
            return Err(ConfigError::ReservedTaskName(reserved.to_string()));
        }

        Ok(Self {
            tasks,
            options: document.options,
        })
    }

    /// Options block for a formatter, if the document has one
    #[must_use]
    pub fn formatter_options(&self, formatter: &str) -> Option<&serde_yaml::Value> {
        self.options.get(formatter)
    }

    /// Tasks selected by `filter`; see [`TaskSet::effective`]
    #[must_use]
    pub fn effective_tasks<S: AsRef<str>>(&self, filter: &[S]) -> TaskSet {
        self.tasks.effective(filter)
    }
}
