//! ANVL ("A Name Value Language") encoding and decoding.
//!
//! EZID request and response bodies are newline-separated `label: value`
//! lines. Labels escape `%`, `:`, CR and LF; values escape `%`, CR and LF.
//! Each escaped character becomes `%` followed by two uppercase hex digits.

use crate::error::{EzidError, Result};
use indexmap::IndexMap;

/// Identifier metadata, kept in insertion order
pub type Record = IndexMap<String, String>;

/// Escape a label: `%`, `:`, CR and LF
pub fn escape_label(label: &str) -> String {
    escape(label, &['%', ':', '\r', '\n'])
}

/// Escape a value: `%`, CR and LF
pub fn escape_value(value: &str) -> String {
    escape(value, &['%', '\r', '\n'])
}

fn escape(input: &str, reserved: &[char]) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if reserved.contains(&c) {
            out.push_str(&format!("%{:02X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverse `%XX` escapes. A `%` not followed by two hex digits is kept as is.
pub fn unescape(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Encode a record as ANVL text, one line per entry in the record's order.
///
/// No trailing newline is added.
///
/// ```
/// use ezid::anvl::{encode, Record};
///
/// let mut record = Record::new();
/// record.insert("dc.creator".to_string(), "mer".to_string());
/// record.insert("dc.title".to_string(), "test title".to_string());
/// assert_eq!(encode(&record), "dc.creator: mer\ndc.title: test title");
/// ```
pub fn encode(record: &Record) -> String {
    encode_pairs(record.iter())
}

/// Encode any sequence of label/value pairs as ANVL text
pub fn encode_pairs<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}: {}", escape_label(k.as_ref()), escape_value(v.as_ref())))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode ANVL text into a record.
///
/// Blank lines are skipped and a trailing CR on a line is dropped. When a
/// label repeats, the last value wins.
pub fn decode(text: &str) -> Result<Record> {
    let mut record = Record::new();
    for (index, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }
        let (label, value) = line.split_once(':').ok_or_else(|| EzidError::Anvl {
            line: index + 1,
            reason: "missing ':' separator".to_string(),
        })?;
        let value = value.strip_prefix(' ').unwrap_or(value);
        record.insert(unescape(label), unescape(value));
    }
    Ok(record)
}
