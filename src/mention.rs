//! Mentions: semantically typed annotations composed of one or more spans.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::FormatConfig;
use crate::error::{Error, Result};
use crate::span::{SpanId, SpanTable};
use crate::token::parse_field;

/// Semantic tag of a mention.
///
/// The export uses a small fixed vocabulary for the entity categories that
/// the evaluation cares about; anything else is preserved as [`Other`].
///
/// [`Other`]: MentionTag::Other
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MentionTag {
    /// Organization.
    Org,
    /// Person.
    Per,
    /// Location.
    Loc,
    /// Location functioning as an organization (e.g. a country acting
    /// as a political agent).
    LocOrg,
    /// Any tag outside the fixed vocabulary.
    Other(String),
}

impl MentionTag {
    /// Parse a tag field. Never fails; unknown tags become [`MentionTag::Other`].
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "org" => MentionTag::Org,
            "per" => MentionTag::Per,
            "loc" => MentionTag::Loc,
            "locorg" => MentionTag::LocOrg,
            other => MentionTag::Other(other.to_string()),
        }
    }

    /// The tag as written in the export file.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            MentionTag::Org => "org",
            MentionTag::Per => "per",
            MentionTag::Loc => "loc",
            MentionTag::LocOrg => "locorg",
            MentionTag::Other(s) => s,
        }
    }
}

impl std::fmt::Display for MentionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index of a mention in its document's [`MentionTable`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MentionId(pub usize);

/// A typed annotation composed of one or more resolved spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Raw mention id from the export file.
    pub id: u32,
    /// Semantic tag.
    pub tag: MentionTag,
    /// Resolved spans, in file order. Never empty.
    pub spans: Vec<SpanId>,
}

/// All mentions of one document, indexed by raw id.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MentionTable {
    mentions: Vec<Mention>,
    by_id: HashMap<u32, MentionId>,
}

impl MentionTable {
    /// Load a `.objects` file, resolving span ids against `spans`.
    ///
    /// Records are delimited fields with an optional trailing comment: a
    /// field equal to the configured comment marker truncates the record
    /// there. A record needs at least an id, a tag, and one span id; fewer
    /// fields are a format error. An unresolvable span id is a reference
    /// error.
    pub fn load(path: &Path, config: &FormatConfig, spans: &SpanTable) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut mentions = Vec::new();
        let mut by_id = HashMap::new();

        for (index, line) in content.lines().enumerate() {
            let lineno = index + 1;
            let mut fields = config.split_fields(line);
            if let Some(pos) = fields.iter().position(|f| *f == config.comment_marker) {
                fields.truncate(pos);
            }

            if fields.is_empty() || fields.iter().all(|f| f.is_empty()) {
                continue;
            }

            if fields.len() <= 2 {
                return Err(Error::format(
                    lineno,
                    path,
                    "expected an id, a tag and at least one span id",
                ));
            }

            let id = parse_field::<u32>(&fields[0], "mention id", lineno, path)?;
            let tag = MentionTag::parse(&fields[1]);

            let mut mention_spans = Vec::with_capacity(fields.len() - 2);
            for field in &fields[2..] {
                let raw = parse_field::<u32>(field, "span id", lineno, path)?;
                let span = spans.resolve(raw).ok_or_else(|| {
                    Error::reference(lineno, path, format!("unknown span id {raw}"))
                })?;
                mention_spans.push(span);
            }

            by_id.insert(id, MentionId(mentions.len()));
            mentions.push(Mention {
                id,
                tag,
                spans: mention_spans,
            });
        }

        log::debug!("loaded {} mentions from {}", mentions.len(), path.display());
        Ok(Self { mentions, by_id })
    }

    /// Look up the table index for a raw mention id.
    #[must_use]
    pub fn resolve(&self, raw_id: u32) -> Option<MentionId> {
        self.by_id.get(&raw_id).copied()
    }

    /// Get a mention by table index.
    ///
    /// # Panics
    ///
    /// Panics if the index did not come from this table.
    #[must_use]
    pub fn get(&self, id: MentionId) -> &Mention {
        &self.mentions[id.0]
    }

    /// Mentions in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Mention> {
        self.mentions.iter()
    }

    /// Number of mentions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// True if the table holds no mentions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenTable;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn spans() -> SpanTable {
        let config = FormatConfig::default();
        let mut tokens = NamedTempFile::new().unwrap();
        tokens
            .write_all(b"1 0 4 Bank\n2 5 2 of\n3 8 7 Rossiya\n")
            .unwrap();
        let tokens = TokenTable::load(tokens.path(), &config).unwrap();

        let mut spans = NamedTempFile::new().unwrap();
        spans
            .write_all(b"101 org_name 0 15 1 3 # 1 2 3 Bank of Rossiya\n102 name 8 7 3 1 # 3 Rossiya\n")
            .unwrap();
        SpanTable::load(spans.path(), &config, &tokens).unwrap()
    }

    fn load_str(content: &str, spans: &SpanTable) -> Result<MentionTable> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        MentionTable::load(file.path(), &FormatConfig::default(), spans)
    }

    #[test]
    fn loads_and_resolves_spans() {
        let spans = spans();
        let table = load_str("1 org 101\n2 loc 102\n", &spans).unwrap();
        assert_eq!(table.len(), 2);

        let mention = table.get(table.resolve(1).unwrap());
        assert_eq!(mention.tag, MentionTag::Org);
        assert_eq!(mention.spans.len(), 1);
        assert_eq!(spans.get(mention.spans[0]).id, 101);
    }

    #[test]
    fn comment_truncates_trailing_fields() {
        let spans = spans();
        let table = load_str("1 org 101 # Bank of Rossiya\n", &spans).unwrap();
        assert_eq!(table.get(table.resolve(1).unwrap()).spans.len(), 1);
    }

    #[test]
    fn comment_only_line_is_skipped() {
        let spans = spans();
        let table = load_str("# header comment\n1 org 101\n", &spans).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn record_without_spans_is_a_format_error() {
        let spans = spans();
        let err = load_str("1 org\n", &spans).unwrap_err();
        assert!(matches!(err, Error::Format { line: 1, .. }));
    }

    #[test]
    fn record_with_only_comment_spans_is_a_format_error() {
        let spans = spans();
        let err = load_str("1 org # 101\n", &spans).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn unknown_span_id_is_a_reference_error() {
        let spans = spans();
        let err = load_str("1 org 999\n", &spans).unwrap_err();
        assert!(matches!(err, Error::Reference { line: 1, .. }));
    }

    #[test]
    fn unknown_tag_is_preserved() {
        let spans = spans();
        let table = load_str("1 project 101\n", &spans).unwrap();
        assert_eq!(
            table.get(MentionId(0)).tag,
            MentionTag::Other("project".to_string())
        );
    }
}
