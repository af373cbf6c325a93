//! Spans: tagged, contiguous token runs with reconstructed text.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::FormatConfig;
use crate::error::{Error, Result};
use crate::token::{parse_field, TokenId, TokenTable};

/// Index of a span in its document's [`SpanTable`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SpanId(pub usize);

/// A tagged annotation over a contiguous run of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Raw span id from the export file.
    pub id: u32,
    /// Span tag name (e.g. `name`, `org_name`, `loc_descr`).
    pub tag: String,
    /// Character start offset.
    pub start: usize,
    /// Character count.
    pub nchars: usize,
    /// Starting token index as declared in the file.
    pub token_start: u32,
    /// Declared token count; always equals `tokens.len()` after a
    /// successful load.
    pub ntokens: usize,
    /// Resolved tokens, in file order.
    pub tokens: Vec<TokenId>,
    /// Literal span text, space-joined from the record's word fields.
    pub text: String,
}

/// All spans of one document, indexed by raw id.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SpanTable {
    spans: Vec<Span>,
    by_id: HashMap<u32, SpanId>,
}

impl SpanTable {
    /// Load a `.spans` file, resolving token ids against `tokens`.
    ///
    /// Expected record format:
    ///
    /// ```text
    /// line  = <left> SEPARATOR <right>
    /// left  = <id> <tag> <start> <nchars> <start_token> <ntokens>
    /// right = <token_id>{ntokens} <word>{ntokens}
    /// ```
    ///
    /// A missing separator, fewer than 6 left fields, or a right section
    /// whose length is not `2 * ntokens` are format errors citing line and
    /// file. A token id absent from `tokens` is a reference error.
    pub fn load(path: &Path, config: &FormatConfig, tokens: &TokenTable) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut spans = Vec::new();
        let mut by_id = HashMap::new();

        for (index, line) in content.lines().enumerate() {
            let lineno = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split(config.span_separator).collect();
            if parts.len() != 2 {
                return Err(Error::format(
                    lineno,
                    path,
                    format!("expected exactly one '{}' separator", config.span_separator),
                ));
            }

            let left: Vec<&str> = parts[0]
                .split(config.delimiter)
                .filter(|f| !f.is_empty())
                .collect();
            if left.len() < 6 {
                return Err(Error::format(
                    lineno,
                    path,
                    format!("expected 6 left fields, found {}", left.len()),
                ));
            }

            let id = parse_field::<u32>(left[0], "span id", lineno, path)?;
            let start = parse_field::<usize>(left[2], "start offset", lineno, path)?;
            let nchars = parse_field::<usize>(left[3], "char count", lineno, path)?;
            let token_start = parse_field::<u32>(left[4], "start token", lineno, path)?;
            let ntokens = parse_field::<usize>(left[5], "token count", lineno, path)?;

            let right: Vec<&str> = parts[1]
                .split(config.delimiter)
                .filter(|f| !f.is_empty())
                .collect();
            if right.len() != 2 * ntokens {
                return Err(Error::format(
                    lineno,
                    path,
                    format!(
                        "expected {} right fields for {} tokens, found {}",
                        2 * ntokens,
                        ntokens,
                        right.len()
                    ),
                ));
            }

            let mut span_tokens = Vec::with_capacity(ntokens);
            for field in &right[..ntokens] {
                let raw = parse_field::<u32>(field, "token id", lineno, path)?;
                let token = tokens.resolve(raw).ok_or_else(|| {
                    Error::reference(lineno, path, format!("unknown token id {raw}"))
                })?;
                span_tokens.push(token);
            }

            let text = right[ntokens..].join(" ").replace('\n', "");

            by_id.insert(id, SpanId(spans.len()));
            spans.push(Span {
                id,
                tag: left[1].to_string(),
                start,
                nchars,
                token_start,
                ntokens,
                tokens: span_tokens,
                text,
            });
        }

        log::debug!("loaded {} spans from {}", spans.len(), path.display());
        Ok(Self { spans, by_id })
    }

    /// Look up the table index for a raw span id.
    #[must_use]
    pub fn resolve(&self, raw_id: u32) -> Option<SpanId> {
        self.by_id.get(&raw_id).copied()
    }

    /// Get a span by table index.
    ///
    /// # Panics
    ///
    /// Panics if the index did not come from this table.
    #[must_use]
    pub fn get(&self, id: SpanId) -> &Span {
        &self.spans[id.0]
    }

    /// Spans in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Span> {
        self.spans.iter()
    }

    /// Number of spans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True if the table holds no spans.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
