//! Line-oriented reader for encrypted settings exports.
//!
//! Each non-blank line is `<encoded-key><SEP><encoded-value>`. Anything after
//! a second separator is ignored. Lines that cannot be split into two
//! non-empty tokens are skipped rather than failing the import; a token that
//! fails to decode is an error.

use crate::security::FieldCodec;
use crate::{Error, Result};

/// One decoded setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// Decoded key.
    pub key: String,
    /// Decoded value.
    pub value: String,
    /// 1-based line number in the export.
    pub line: usize,
}

/// Streams [`ImportRecord`]s out of an export blob.
///
/// The reader is lazy; records are decoded as they are pulled. Iterate again
/// from a fresh reader to restart.
pub struct RecordReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    codec: &'a FieldCodec,
    separator: char,
    skipped: usize,
}

impl<'a> RecordReader<'a> {
    /// Creates a reader over `data`.
    #[must_use]
    pub fn new(data: &'a str, codec: &'a FieldCodec, separator: char) -> Self {
        Self {
            lines: data.lines().enumerate(),
            codec,
            separator,
            skipped: 0,
        }
    }

    /// Number of non-blank lines skipped as malformed so far.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<ImportRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split(self.separator);
            match (fields.next(), fields.next()) {
                (Some(key), Some(value)) if !key.is_empty() && !value.is_empty() => {
                    if fields.next().is_some() {
                        tracing::debug!(line = line_number, "Ignoring trailing fields");
                    }
                    return Some(decode_line(self.codec, line_number, key, value));
                },
                _ => {
                    self.skipped += 1;
                    tracing::debug!(line = line_number, "Skipping malformed line");
                },
            }
        }
        None
    }
}

fn decode_line(
    codec: &FieldCodec,
    line_number: usize,
    key: &str,
    value: &str,
) -> Result<ImportRecord> {
    let key = codec.decode(key).map_err(|e| e.at_line(line_number))?;
    let value = codec.decode(value).map_err(|e| e.at_line(line_number))?;
    Ok(ImportRecord {
        key,
        value,
        line: line_number,
    })
}

/// Encodes one setting as an export line (without the trailing newline).
///
/// # Errors
///
/// Returns an error if either field cannot be encoded.
pub fn encode_record(
    codec: &FieldCodec,
    key: &str,
    value: &str,
    separator: char,
) -> Result<String> {
    let key = codec.encode(key)?;
    let value = codec.encode(value)?;
    if key.contains(separator) || value.contains(separator) {
        return Err(Error::InvalidInput(format!(
            "separator '{separator}' collides with the token alphabet"
        )));
    }
    Ok(format!("{key}{separator}{value}"))
}
