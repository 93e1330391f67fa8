// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Output formatters
//!
//! A [`Formatter`] turns a lazy stream of records into a lazy stream of output
//! lines. It pulls one record, emits the lines for it, then pulls the next, so
//! memory stays bounded by a single record no matter how long the history is.
//!
//! Formatters are looked up by name in a [`FormatterRegistry`]. Resolution
//! also validates the formatter's options from the configuration, so a bad
//! format name or option fails before any repository work starts.
//!
//! # Example
//!
//! ```
//! use gitstats::config::Configuration;
//! use gitstats::format::{FormatterRegistry, RecordStream};
//!
//! let registry = FormatterRegistry::with_builtins();
//! let formatter = registry.resolve("csv", &Configuration::default()).unwrap();
//!
//! let records: RecordStream<'_> = Box::new(std::iter::empty());
//! assert_eq!(formatter.format(records).count(), 0);
//! ```

pub mod csv;
pub mod ndjson;

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::config::Configuration;
use crate::engine::TraversalError;
use crate::record::Record;

pub use self::csv::{CsvFormatter, CsvOptions};
pub use self::ndjson::NdjsonFormatter;

/// Name of the formatter used when none is requested
pub const DEFAULT_FORMAT: &str = "csv";

/// Lazy record sequence consumed by a formatter
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<Record, TraversalError>> + 'a>;

/// Lazy line sequence produced by a formatter (lines carry no terminator)
pub type LineStream<'a> = Box<dyn Iterator<Item = Result<String, FormatError>> + 'a>;

/// Builds a formatter from the run configuration
pub type FormatterFactory = fn(&Configuration) -> Result<Box<dyn Formatter>, FormatError>;

/// Formatter errors
#[derive(Debug, Error)]
pub enum FormatError {
    /// No formatter is registered under the requested name
    #[error("Unknown format \"{name}\" (available: {available})")]
    UnknownFormat {
        /// The requested name
        name: String,
        /// Comma separated list of registered names
        available: String,
    },

    /// The formatter's options in the configuration are invalid
    #[error("Invalid {formatter} options: {message}")]
    InvalidOption {
        /// Formatter whose options were rejected
        formatter: String,
        /// What was wrong
        message: String,
    },

    /// The record stream ended with a fatal traversal error
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    /// A record could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Turns records into output lines
pub trait Formatter: fmt::Debug {
    /// Registry name of this formatter
    fn name(&self) -> &'static str;

    /// Produce the line stream for `records`
    ///
    /// The returned stream is lazy. A traversal error in `records` is passed
    /// through as [`FormatError::Traversal`] and ends the stream.
    fn format<'a>(&'a self, records: RecordStream<'a>) -> LineStream<'a>;
}

/// Explicit name → factory table of available formatters
#[derive(Debug, Clone, Default)]
pub struct FormatterRegistry {
    factories: BTreeMap<&'static str, FormatterFactory>,
}

impl FormatterRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in formatters
    ///
    /// `csv`, `ndjson`, and `json` (an alias of `ndjson`).
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(csv::NAME, CsvFormatter::from_configuration);
        registry.register(ndjson::NAME, NdjsonFormatter::from_configuration);
        registry.register("json", NdjsonFormatter::from_configuration);
        registry
    }

    /// Register `factory` under `name`, replacing any previous entry
    pub fn register(&mut self, name: &'static str, factory: FormatterFactory) {
        self.factories.insert(name, factory);
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Whether a formatter is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Look up `name` and build the formatter for `configuration`
    ///
    /// # Errors
    ///
    /// Returns `FormatError::UnknownFormat` if `name` is not registered, or
    /// the factory's error if the configuration holds invalid options.
    pub fn resolve(
        &self,
        name: &str,
        configuration: &Configuration,
    ) -> Result<Box<dyn Formatter>, FormatError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| FormatError::UnknownFormat {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })?;
        factory(configuration)
    }
}
