// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CSV formatter
//!
//! The header comes from the keys of the first record and is written once,
//! just before that record's row. An empty stream produces no output at all.
//! Fields containing the delimiter, a double quote, `\r` or `\n` are quoted
//! and embedded quotes are doubled (RFC 4180).
//!
//! The delimiter can be changed in the configuration:
//!
//! ```yaml
//! csv:
//!   delimiter: ";"
//! ```

use std::borrow::Cow;

use serde::Deserialize;

use super::{FormatError, Formatter, LineStream, RecordStream};
use crate::config::Configuration;

/// Registry name of the CSV formatter
pub const NAME: &str = "csv";

/// Options read from the `csv` block of the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field separator
    pub delimiter: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl CsvOptions {
    /// Read the options from `configuration`, defaulting when absent
    ///
    /// # Errors
    ///
    /// Returns `FormatError::InvalidOption` if the block has the wrong shape or
    /// the delimiter is unusable.
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, FormatError> {
        let options = match configuration.formatter_options(NAME) {
            None | Some(serde_yaml::Value::Null) => Self::default(),
            Some(value) => serde_yaml::from_value::<Self>(value.clone())
                .map_err(|e| invalid(e.to_string()))?,
        };
        options.validate()?;
        Ok(options)
    }

    /// Check that the delimiter is a single ASCII character usable as a separator
    ///
    /// # Errors
    ///
    /// Returns `FormatError::InvalidOption` for non-ASCII delimiters, quotes
    /// and line breaks.
    pub fn validate(&self) -> Result<(), FormatError> {
        match self.delimiter {
            '"' | '\r' | '\n' => Err(invalid(format!(
                "{:?} cannot be used as a delimiter",
                self.delimiter
            ))),
            d if !d.is_ascii() => Err(invalid(format!(
                "delimiter must be a single ASCII character, got {d:?}"
            ))),
            _ => Ok(()),
        }
    }
}

fn invalid(message: String) -> FormatError {
    FormatError::InvalidOption {
        formatter: NAME.to_string(),
        message,
    }
}

/// Renders records as delimiter-separated values with a header line
#[derive(Debug, Clone, Default)]
pub struct CsvFormatter {
    options: CsvOptions,
}

impl CsvFormatter {
    /// Create a formatter with validated `options`
    ///
    /// # Errors
    ///
    /// Returns `FormatError::InvalidOption` if the delimiter is unusable.
    pub fn new(options: CsvOptions) -> Result<Self, FormatError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Registry factory
    ///
    /// # Errors
    ///
    /// Returns `FormatError::InvalidOption` for an invalid `csv` block.
    pub fn from_configuration(
        configuration: &Configuration,
    ) -> Result<Box<dyn Formatter>, FormatError> {
        let options = CsvOptions::from_configuration(configuration)?;
        Ok(Box::new(Self { options }))
    }
}

impl Formatter for CsvFormatter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn format<'a>(&'a self, records: RecordStream<'a>) -> LineStream<'a> {
        Box::new(CsvLines {
            records,
            delimiter: self.options.delimiter,
            header_written: false,
            pending: None,
            finished: false,
        })
    }
}

/// Line stream state: the row of the first record waits in `pending` while
/// the header is returned.
struct CsvLines<'a> {
    records: RecordStream<'a>,
    delimiter: char,
    header_written: bool,
    pending: Option<String>,
    finished: bool,
}

impl CsvLines<'_> {
    fn join<'r>(&self, fields: impl Iterator<Item = &'r str>) -> String {
        let mut line = String::new();
        for (i, field) in fields.enumerate() {
            if i > 0 {
                line.push(self.delimiter);
            }
            line.push_str(&escape_field(field, self.delimiter));
        }
        line
    }
}

impl Iterator for CsvLines<'_> {
    type Item = Result<String, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.pending.take() {
            return Some(Ok(row));
        }
        if self.finished {
            return None;
        }

        match self.records.next() {
            None => {
                self.finished = true;
                None
            }
            Some(Err(e)) => {
                self.finished = true;
                Some(Err(e.into()))
            }
            Some(Ok(record)) => {
                let row = self.join(record.values());
                if self.header_written {
                    return Some(Ok(row));
                }
                self.header_written = true;
                self.pending = Some(row);
                Some(Ok(self.join(record.keys())))
            }
        }
    }
}

/// Quote `field` if it contains the delimiter, a quote or a line break
#[must_use]
pub fn escape_field(field: &str, delimiter: char) -> Cow<'_, str> {
    let needs_quotes = field
        .chars()
        .any(|c| c == delimiter || matches!(c, '"' | '\r' | '\n'));
    if needs_quotes {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TraversalError;
    use crate::record::Record;
    use chrono::{TimeZone, Utc};
    use gitstats_git::{CommitId, GitError};
    use indexmap::IndexMap;
    use similar_asserts::assert_eq;

    fn record(commit: &str, values: &[(&str, &str)]) -> Record {
        Record::new(
            CommitId::new(commit),
            Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap(),
            values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<IndexMap<_, _>>(),
        )
    }

    fn render(formatter: &CsvFormatter, records: Vec<Record>) -> Vec<String> {
        let stream: RecordStream<'_> = Box::new(records.into_iter().map(Ok::<_, TraversalError>));
        formatter
            .format(stream)
            .collect::<Result<_, _>>()
            .expect("format")
    }

    #[test]
    fn test_header_then_rows() {
        let lines = render(
            &CsvFormatter::default(),
            vec![
                record("c1", &[("count", "1")]),
                record("c2", &[("count", "2")]),
            ],
        );
        assert_eq!(
            lines,
            vec![
                "commit,date,count",
                "c1,2025-03-04 05:06:07,1",
                "c2,2025-03-04 05:06:07,2",
            ]
        );
    }

    #[test]
    fn test_empty_stream_has_no_header() {
        assert!(render(&CsvFormatter::default(), Vec::new()).is_empty());
    }

    #[test]
    fn test_fields_are_quoted_when_needed() {
        let lines = render(
            &CsvFormatter::default(),
            vec![record("c1", &[("a", "x,y"), ("b", "say \"hi\""), ("c", "l1\nl2")])],
        );
        assert_eq!(
            lines[1],
            "c1,2025-03-04 05:06:07,\"x,y\",\"say \"\"hi\"\"\",\"l1\nl2\""
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let formatter = CsvFormatter::new(CsvOptions { delimiter: ';' }).expect("formatter");
        let lines = render(&formatter, vec![record("c1", &[("a", "1,5"), ("b", "x;y")])]);
        assert_eq!(lines[0], "commit;date;a;b");
        assert_eq!(lines[1], "c1;2025-03-04 05:06:07;1,5;\"x;y\"");
    }

    #[test]
    fn test_delimiter_from_configuration() {
        let config = Configuration::parse("csv:\n  delimiter: \"\\t\"\n", "test").expect("parse");
        let options = CsvOptions::from_configuration(&config).expect("options");
        assert_eq!(options.delimiter, '\t');
    }

    #[test]
    fn test_missing_block_uses_comma() {
        let options = CsvOptions::from_configuration(&Configuration::default()).expect("options");
        assert_eq!(options, CsvOptions::default());
    }

    #[test]
    fn test_invalid_delimiters() {
        for doc in [
            "csv:\n  delimiter: \"\\\"\"\n",
            "csv:\n  delimiter: \"\\n\"\n",
            "csv:\n  delimiter: \"é\"\n",
            "csv:\n  delimiter: \";;\"\n",
            "csv: [1, 2]\n",
        ] {
            let config = Configuration::parse(doc, "test").expect("parse");
            assert!(
                matches!(
                    CsvFormatter::from_configuration(&config),
                    Err(FormatError::InvalidOption { .. })
                ),
                "{doc:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_traversal_error_ends_stream() {
        let records: RecordStream<'_> = Box::new(
            vec![
                Ok(record("c1", &[])),
                Err(TraversalError::Checkout {
                    commit: CommitId::new("c2"),
                    source: GitError::InvalidReference {
                        reference: "c2".to_string(),
                    },
                }),
            ]
            .into_iter(),
        );
        let formatter = CsvFormatter::default();
        let mut lines = formatter.format(records);

        assert_eq!(lines.next().unwrap().unwrap(), "commit,date");
        assert_eq!(lines.next().unwrap().unwrap(), "c1,2025-03-04 05:06:07");
        assert!(matches!(
            lines.next(),
            Some(Err(FormatError::Traversal(TraversalError::Checkout { .. })))
        ));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_escape_field_borrows_plain_values() {
        assert!(matches!(escape_field("plain", ','), Cow::Borrowed("plain")));
        assert_eq!(escape_field("a\rb", ',').as_ref(), "\"a\rb\"");
    }
}
