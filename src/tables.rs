//! Classification mark lookup.
//!
//! Marks come from an external table keyed by (set category, span tag) and
//! are consumed by the downstream scoring layer. The table is injected as a
//! trait object dependency rather than read from global state, so scoring
//! configurations can swap tables without touching the loaders.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::token_set::SetCategory;

/// A classification label attached to one token of a token set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mark(pub String);

impl Mark {
    /// Create a mark from a label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Mark(label.into())
    }

    /// The label string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Mark {
    fn from(label: &str) -> Self {
        Mark(label.to_string())
    }
}

/// Lookup of the mark for a (set category, span tag) pair.
pub trait MarkTable {
    /// Mark for a token of a `category` set contributed by a span tagged
    /// `span_tag`.
    fn mark(&self, category: SetCategory, span_tag: &str) -> Mark;
}

/// Simple HashMap-based mark table with a fallback default.
///
/// Pairs not present in the table yield the default mark rather than an
/// error; the table on disk only lists the pairs that matter to scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashMapMarkTable {
    entries: HashMap<SetCategory, HashMap<String, Mark>>,
    default: Mark,
}

impl HashMapMarkTable {
    /// Create an empty table with the given fallback mark.
    #[must_use]
    pub fn new(default: impl Into<Mark>) -> Self {
        Self {
            entries: HashMap::new(),
            default: default.into(),
        }
    }

    /// Insert an entry.
    pub fn insert(
        &mut self,
        category: SetCategory,
        span_tag: impl Into<String>,
        mark: impl Into<Mark>,
    ) {
        self.entries
            .entry(category)
            .or_default()
            .insert(span_tag.into(), mark.into());
    }

    /// Create from an iterator of (category, span tag, mark) entries.
    pub fn from_entries<I, S, M>(default: impl Into<Mark>, entries: I) -> Self
    where
        I: IntoIterator<Item = (SetCategory, S, M)>,
        S: Into<String>,
        M: Into<Mark>,
    {
        let mut table = Self::new(default);
        for (category, span_tag, mark) in entries {
            table.insert(category, span_tag, mark);
        }
        table
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// True if no entries were inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MarkTable for HashMapMarkTable {
    fn mark(&self, category: SetCategory, span_tag: &str) -> Mark {
        self.entries
            .get(&category)
            .and_then(|tags| tags.get(span_tag))
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}
