//! Task definitions
//!
//! A [`TaskSet`] maps task names to shell commands and keeps the order in
//! which they were declared. That order is the column order of every record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered mapping of task name to shell command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskSet {
    tasks: IndexMap<String, String>,
}

impl TaskSet {
    /// Create an empty task set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task, keeping its position if the name already exists
    ///
    /// Returns the previous command for that name, if any.
    pub fn insert(&mut self, name: impl Into<String>, command: impl Into<String>) -> Option<String> {
        self.tasks.insert(name.into(), command.into())
    }

    /// Number of tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether there are no tasks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up the command of a task
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tasks.get(name).map(String::as_str)
    }

    /// Whether a task with this name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Task names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// `(name, command)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tasks.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    /// Select the tasks of a run
    ///
    /// An empty filter selects every task. Otherwise the result holds the
    /// tasks whose names appear in `filter`, in declaration order; the order
    /// of `filter` itself is ignored. Names in `filter` that match no task
    /// are dropped without error.
    #[must_use]
    pub fn effective<S: AsRef<str>>(&self, filter: &[S]) -> TaskSet {
        if filter.is_empty() {
            return self.clone();
        }

        for unknown in filter.iter().filter(|n| !self.contains(n.as_ref())) {
            debug!(task = unknown.as_ref(), "Ignoring unknown task in filter");
        }

        self.tasks
            .iter()
            .filter(|(name, _)| filter.iter().any(|f| f.as_ref() == name.as_str()))
            .map(|(name, command)| (name.clone(), command.clone()))
            .collect()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for TaskSet {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        Self {
            tasks: iter
                .into_iter()
                .map(|(n, c)| (n.into(), c.into()))
                .collect(),
        }
    }
}
