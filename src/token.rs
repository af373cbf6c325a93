//! Tokens and the id-indexed token table.
//!
//! Tokens are the bottom layer of the export: every other file refers to
//! them by id. The table is built once per document load and is read-only
//! afterward. Neighbor links are stored as arena indices ([`TokenId`]),
//! not structural references, so the order relation carries no ownership.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::FormatConfig;
use crate::error::{Error, Result};

/// Index of a token in its document's [`TokenTable`] arena.
///
/// The arena is sorted by character start offset, so these indices double
/// as the document-wide token order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TokenId(pub usize);

/// A minimal lexical unit with a character offset and literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Raw token id from the export file.
    pub id: u32,
    /// Character start offset in the document text.
    pub start: usize,
    /// Character length.
    pub len: usize,
    /// Literal token text.
    pub text: String,
    /// Left neighbor in start-offset order; `None` for the first token.
    pub prev: Option<TokenId>,
    /// Right neighbor in start-offset order; `None` for the last token.
    pub next: Option<TokenId>,
}

impl Token {
    /// Character offset one past the end of the token.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// All tokens of one document, sorted by start offset and indexed by raw id.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenTable {
    tokens: Vec<Token>,
    by_id: HashMap<u32, TokenId>,
}

impl TokenTable {
    /// Load a `.tokens` file.
    ///
    /// One delimited record per line; blank lines are skipped. A record with
    /// a field count other than `config.token_record_len` is a format error
    /// citing line and file. After parsing, tokens are sorted by start offset
    /// (not file order) and threaded with `prev`/`next` neighbor links.
    pub fn load(path: &Path, config: &FormatConfig) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut tokens = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let lineno = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let fields = config.split_fields(line);
            if fields.len() != config.token_record_len {
                return Err(Error::format(
                    lineno,
                    path,
                    format!(
                        "expected {} fields, found {}",
                        config.token_record_len,
                        fields.len()
                    ),
                ));
            }

            let id = parse_field::<u32>(&fields[0], "token id", lineno, path)?;
            let start = parse_field::<usize>(&fields[1], "start offset", lineno, path)?;
            let len = parse_field::<usize>(&fields[2], "length", lineno, path)?;

            tokens.push(Token {
                id,
                start,
                len,
                text: fields[3].clone(),
                prev: None,
                next: None,
            });
        }

        tokens.sort_by_key(|t| t.start);

        let last = tokens.len().checked_sub(1);
        for (i, token) in tokens.iter_mut().enumerate() {
            if i > 0 {
                token.prev = Some(TokenId(i - 1));
            }
            if Some(i) != last {
                token.next = Some(TokenId(i + 1));
            }
        }

        let by_id = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, TokenId(i)))
            .collect();

        log::debug!("loaded {} tokens from {}", tokens.len(), path.display());
        Ok(Self { tokens, by_id })
    }

    /// Look up the arena index for a raw token id.
    #[must_use]
    pub fn resolve(&self, raw_id: u32) -> Option<TokenId> {
        self.by_id.get(&raw_id).copied()
    }

    /// Get a token by arena index.
    ///
    /// # Panics
    ///
    /// Panics if the index did not come from this table.
    #[must_use]
    pub fn get(&self, id: TokenId) -> &Token {
        &self.tokens[id.0]
    }

    /// Tokens in start-offset order.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the table holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The leftmost token, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    /// The rightmost token, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }
}

pub(crate) fn parse_field<T: std::str::FromStr>(
    field: &str,
    what: &str,
    lineno: usize,
    path: &Path,
) -> Result<T> {
    field
        .parse()
        .map_err(|_| Error::format(lineno, path, format!("invalid {what} '{field}'")))
}
