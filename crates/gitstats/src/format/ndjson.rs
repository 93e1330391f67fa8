// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Newline-delimited JSON formatter: one object per record, keys in record order

use super::{FormatError, Formatter, LineStream, RecordStream};
use crate::config::Configuration;

/// Registry name of the NDJSON formatter
pub const NAME: &str = "ndjson";

/// Renders each record as a single-line JSON object
#[derive(Debug, Clone, Copy, Default)]
pub struct NdjsonFormatter;

impl NdjsonFormatter {
    /// Registry factory; this formatter takes no options
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn from_configuration(_: &Configuration) -> Result<Box<dyn Formatter>, FormatError> {
        Ok(Box::new(Self))
    }
}

impl Formatter for NdjsonFormatter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn format<'a>(&'a self, records: RecordStream<'a>) -> LineStream<'a> {
        Box::new(records.map(|record| -> Result<String, FormatError> {
            Ok(serde_json::to_string(&record?)?)
        }))
    }
}
