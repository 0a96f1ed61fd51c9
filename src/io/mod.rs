//! Export I/O.
//!
//! Reads encrypted, line-oriented settings exports.
//!
//! # Wire Format
//!
//! | Element | Form |
//! |---------|------|
//! | Line | `<encoded-key><SEP><encoded-value>` terminated by `\n` |
//! | Token | URL-safe base64, see [`crate::security::FieldCodec`] |
//! | Separator | Single character, `:` by default |

pub mod lines;

pub use lines::{ImportRecord, RecordReader, encode_record};
