//! Dotted setting keys.

use std::fmt;

use super::GroupId;

/// Separator between key segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// A decoded setting key split into its dotted segments.
///
/// When a key has more than one segment, the first one names the group
/// (account) the setting belongs to. Keys without a dot are global settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructuredKey {
    segments: Vec<String>,
}

impl StructuredKey {
    /// Parses a decoded key.
    ///
    /// Never fails: a key without dots is a single segment, and empty
    /// segments are preserved so the key renders back unchanged.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        Self {
            segments: key.split(SEGMENT_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// Returns all segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the group identifier, if the key is group-scoped.
    #[must_use]
    pub fn group_segment(&self) -> Option<&str> {
        if self.segments.len() > 1 {
            self.segments.first().map(String::as_str)
        } else {
            None
        }
    }

    /// Returns the terminal segment.
    #[must_use]
    pub fn last_segment(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Returns true if the key is group-scoped and ends with `field`.
    #[must_use]
    pub fn is_group_field(&self, field: &str) -> bool {
        self.group_segment().is_some() && self.last_segment() == field
    }

    /// Replaces the group segment.
    ///
    /// Single-segment keys are returned unchanged.
    #[must_use]
    pub fn with_group(mut self, group: &GroupId) -> Self {
        if self.segments.len() > 1 {
            self.segments[0] = group.as_str().to_string();
        }
        self
    }
}

impl fmt::Display for StructuredKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEGMENT_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}
