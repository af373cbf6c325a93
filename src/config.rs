//! Format configuration for the annotation export files.
//!
//! The export format is delimiter-based and the exact characters vary between
//! exporter versions, so they are injected into every loader as a read-only
//! [`FormatConfig`] rather than read from ambient globals.

use serde::{Deserialize, Serialize};

/// Delimiters and field counts of one export format version.
///
/// The [`Default`] values match the reference exporter: space-delimited
/// records, `"` as the quote character, 4-field token records, and `#` as
/// both the span-file section separator and the comment marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Field delimiter used by all record files.
    pub delimiter: char,
    /// Quote character; a field opening with it may contain the delimiter.
    pub quote: char,
    /// Exact number of fields in a `.tokens` record.
    pub token_record_len: usize,
    /// Separator between the left and right sections of a `.spans` record.
    pub span_separator: char,
    /// A field equal to this marker starts a trailing comment in `.objects`.
    pub comment_marker: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            delimiter: ' ',
            quote: '"',
            token_record_len: 4,
            span_separator: '#',
            comment_marker: "#".to_string(),
        }
    }
}

impl FormatConfig {
    /// Split a record line into fields on the configured delimiter.
    ///
    /// Consecutive delimiters produce empty fields, mirroring a csv-style
    /// reader. A field that opens with the quote character runs to the
    /// closing quote and may contain embedded delimiters; the quotes are
    /// stripped from the returned field.
    #[must_use]
    pub fn split_fields(&self, line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut chars = line.chars().peekable();
        let mut quoted = false;

        while let Some(c) = chars.next() {
            if quoted {
                if c == self.quote {
                    quoted = false;
                } else {
                    current.push(c);
                }
            } else if c == self.quote && current.is_empty() {
                quoted = true;
            } else if c == self.delimiter {
                fields.push(std::mem::take(&mut current));
            } else {
                current.push(c);
            }
        }
        fields.push(current);
        fields
    }
}
