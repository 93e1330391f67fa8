// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Per-commit records
//!
//! A [`Record`] is an ordered mapping: `commit`, `date`, then one entry per
//! task of the run in task order. It has no mutating API; once built it is
//! only read, formatted, and dropped.

use chrono::{DateTime, Utc};
use gitstats_git::CommitId;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key of the commit identifier field
pub const COMMIT_KEY: &str = "commit";
/// Key of the commit date field
pub const DATE_KEY: &str = "date";
/// Rendering of the commit timestamp (always UTC)
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Results of running every task of a run against one commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    commit: CommitId,
    date: String,
    values: IndexMap<String, String>,
}

impl Record {
    /// Build a record from a commit, its timestamp and the task outputs
    ///
    /// `values` must be in task order.
    #[must_use]
    pub fn new(
        commit: CommitId,
        timestamp: DateTime<Utc>,
        values: IndexMap<String, String>,
    ) -> Self {
        Self {
            commit,
            date: timestamp.format(DATE_FORMAT).to_string(),
            values,
        }
    }

    /// The commit this record describes
    #[must_use]
    pub fn commit(&self) -> &CommitId {
        &self.commit
    }

    /// The commit date, formatted with [`DATE_FORMAT`]
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Captured output of a task
    #[must_use]
    pub fn task_value(&self, task: &str) -> Option<&str> {
        self.values.get(task).map(String::as_str)
    }

    /// Value of any key, including `commit` and `date`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            COMMIT_KEY => Some(self.commit.as_str()),
            DATE_KEY => Some(&self.date),
            task => self.task_value(task),
        }
    }

    /// Number of keys (two fixed keys plus one per task)
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() + 2
    }

    /// Always false: `commit` and `date` are always present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Keys in record order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        [COMMIT_KEY, DATE_KEY]
            .into_iter()
            .chain(self.values.keys().map(String::as_str))
    }

    /// Values in record order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        [self.commit.as_str(), self.date.as_str()]
            .into_iter()
            .chain(self.values.values().map(String::as_str))
    }

    /// `(key, value)` pairs in record order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys().zip(self.values())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.fields() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
