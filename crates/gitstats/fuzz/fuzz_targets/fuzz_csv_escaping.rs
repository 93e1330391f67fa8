#![no_main]

//! Fuzz target for CSV field escaping
//!
//! An escaped field must either be the input unchanged (when it holds no
//! special characters) or a quoted field that unquotes back to the input.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use gitstats::format::csv::escape_field;

#[derive(Debug, Arbitrary)]
struct Input {
    field: String,
    delimiter: u8,
}

fuzz_target!(|input: Input| {
    let delimiter = char::from(input.delimiter & 0x7f);
    if matches!(delimiter, '"' | '\r' | '\n') {
        return;
    }

    let escaped = escape_field(&input.field, delimiter);
    if escaped == input.field.as_str() {
        assert!(!input.field.contains(delimiter));
        assert!(!input.field.contains(['"', '\r', '\n']));
    } else {
        assert!(escaped.starts_with('"') && escaped.ends_with('"'));
        let inner = &escaped[1..escaped.len() - 1];
        assert_eq!(inner.replace("\"\"", "\""), input.field);
    }
});
