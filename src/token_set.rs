//! Derived token sets used by the evaluation layer.
//!
//! A token set flattens one mention into the tokens it covers, tagged with
//! the mention's resolved category and carrying a per-token classification
//! mark. Organization sets additionally get a parent link when their token
//! run is lexically contained in another organization's run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tables::Mark;
use crate::token::TokenId;

/// Category of a token set.
///
/// `LocOrg` only appears when the caller allows it; otherwise mentions
/// tagged `locorg` fold into `Loc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetCategory {
    /// Organization.
    Org,
    /// Person.
    Per,
    /// Location.
    Loc,
    /// Location functioning as an organization.
    LocOrg,
}

impl SetCategory {
    /// The category key as written in the export tags.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SetCategory::Org => "org",
            SetCategory::Per => "per",
            SetCategory::Loc => "loc",
            SetCategory::LocOrg => "locorg",
        }
    }

    /// True for the organization categories that take part in the
    /// nesting pass.
    #[must_use]
    pub fn is_organization(&self) -> bool {
        matches!(self, SetCategory::Org | SetCategory::LocOrg)
    }
}

impl std::fmt::Display for SetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The tokens covered by one mention, with per-token marks and an optional
/// link to an enclosing organization set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Raw id of the mention this set was built from.
    pub mention: u32,
    /// Resolved category of the set.
    pub category: SetCategory,
    tokens: Vec<TokenId>,
    marks: HashMap<TokenId, Mark>,
    /// Raw mention id of the tightest enclosing organization set, if any.
    pub parent: Option<u32>,
}

impl TokenSet {
    /// Build a set over the given tokens. Duplicates are collapsed and the
    /// tokens kept in document order.
    #[must_use]
    pub fn new(mention: u32, category: SetCategory, mut tokens: Vec<TokenId>) -> Self {
        tokens.sort_unstable();
        tokens.dedup();
        Self {
            mention,
            category,
            tokens,
            marks: HashMap::new(),
            parent: None,
        }
    }

    /// Tokens in document order.
    #[must_use]
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Leftmost token of the set.
    #[must_use]
    pub fn first(&self) -> Option<TokenId> {
        self.tokens.first().copied()
    }

    /// Rightmost token of the set.
    #[must_use]
    pub fn last(&self) -> Option<TokenId> {
        self.tokens.last().copied()
    }

    /// True if the set covers the given token.
    #[must_use]
    pub fn contains(&self, token: TokenId) -> bool {
        self.tokens.binary_search(&token).is_ok()
    }

    /// Mark attached to a token of this set, if the token belongs to it.
    #[must_use]
    pub fn mark_of(&self, token: TokenId) -> Option<&Mark> {
        self.marks.get(&token)
    }

    /// Attach a mark to a token. A token covered by several spans of the
    /// same mention keeps the last mark written.
    pub fn set_mark(&mut self, token: TokenId, mark: Mark) {
        self.marks.insert(token, mark);
    }

    /// Length of the token run in token-order positions, endpoints
    /// inclusive. Empty sets have run length 0.
    #[must_use]
    pub fn run_len(&self) -> usize {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last.0 - first.0 + 1,
            _ => 0,
        }
    }

    /// True if this set's token run strictly encloses `other`'s.
    ///
    /// Containment is judged by token order, not raw character offsets,
    /// so embedded whitespace and punctuation differences between the two
    /// runs do not matter. Identical runs enclose nothing.
    #[must_use]
    pub fn encloses(&self, other: &TokenSet) -> bool {
        match (self.first(), self.last(), other.first(), other.last()) {
            (Some(sf), Some(sl), Some(of), Some(ol)) => {
                sf <= of && ol <= sl && (sf < of || ol < sl)
            }
            _ => false,
        }
    }
}

/// Run the organization-nesting pass over the built sets.
///
/// Considers only the organization categories. For every organization set
/// whose run is strictly contained in another organization set's run, the
/// tightest enclosing set is recorded as its parent (by mention id).
/// Candidates are visited in a fixed order (`Org` before `LocOrg`, file
/// order within a category) and a tie on run length keeps the first
/// candidate, so the winner does not depend on map iteration order.
pub(crate) fn assign_parents(sets: &mut HashMap<SetCategory, Vec<TokenSet>>) {
    let mut orgs: Vec<(SetCategory, usize)> = Vec::new();
    for category in [SetCategory::Org, SetCategory::LocOrg] {
        if let Some(list) = sets.get(&category) {
            orgs.extend((0..list.len()).map(|i| (category, i)));
        }
    }

    let mut parents: Vec<Option<u32>> = Vec::with_capacity(orgs.len());
    for &(cat_a, i_a) in &orgs {
        let a = &sets[&cat_a][i_a];
        let mut best: Option<(usize, u32)> = None;
        for &(cat_b, i_b) in &orgs {
            if (cat_a, i_a) == (cat_b, i_b) {
                continue;
            }
            let b = &sets[&cat_b][i_b];
            if b.encloses(a) {
                let run = b.run_len();
                if best.map_or(true, |(best_run, _)| run < best_run) {
                    best = Some((run, b.mention));
                }
            }
        }
        parents.push(best.map(|(_, mention)| mention));
    }

    for (&(category, index), parent) in orgs.iter().zip(parents) {
        if let Some(list) = sets.get_mut(&category) {
            list[index].parent = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(mention: u32, category: SetCategory, indices: &[usize]) -> TokenSet {
        TokenSet::new(
            mention,
            category,
            indices.iter().map(|&i| TokenId(i)).collect(),
        )
    }

    #[test]
    fn tokens_are_sorted_and_deduped() {
        let ts = set(1, SetCategory::Org, &[3, 1, 2, 1]);
        assert_eq!(ts.tokens(), &[TokenId(1), TokenId(2), TokenId(3)]);
        assert_eq!(ts.first(), Some(TokenId(1)));
        assert_eq!(ts.last(), Some(TokenId(3)));
        assert!(ts.contains(TokenId(2)));
        assert!(!ts.contains(TokenId(4)));
    }

    #[test]
    fn last_mark_wins() {
        let mut ts = set(1, SetCategory::Org, &[0]);
        ts.set_mark(TokenId(0), Mark::new("a"));
        ts.set_mark(TokenId(0), Mark::new("b"));
        assert_eq!(ts.mark_of(TokenId(0)), Some(&Mark::new("b")));
    }

    #[test]
    fn enclosure_is_strict() {
        let outer = set(1, SetCategory::Org, &[0, 1, 2, 3]);
        let inner = set(2, SetCategory::Org, &[1, 2]);
        let same = set(3, SetCategory::Org, &[0, 1, 2, 3]);
        assert!(outer.encloses(&inner));
        assert!(!inner.encloses(&outer));
        assert!(!outer.encloses(&same));
        assert!(!same.encloses(&outer));
    }

    #[test]
    fn tightest_enclosing_set_becomes_parent() {
        let mut sets: HashMap<SetCategory, Vec<TokenSet>> = HashMap::new();
        sets.insert(
            SetCategory::Org,
            vec![
                set(1, SetCategory::Org, &[0, 1, 2, 3, 4, 5]),
                set(2, SetCategory::Org, &[1, 2, 3, 4]),
                set(3, SetCategory::Org, &[2, 3]),
            ],
        );
        assign_parents(&mut sets);

        let orgs = &sets[&SetCategory::Org];
        assert_eq!(orgs[0].parent, None);
        assert_eq!(orgs[1].parent, Some(1));
        assert_eq!(orgs[2].parent, Some(2));
    }

    #[test]
    fn disjoint_sets_have_no_parent() {
        let mut sets: HashMap<SetCategory, Vec<TokenSet>> = HashMap::new();
        sets.insert(
            SetCategory::Org,
            vec![
                set(1, SetCategory::Org, &[0, 1]),
                set(2, SetCategory::Org, &[5, 6]),
            ],
        );
        assign_parents(&mut sets);

        let orgs = &sets[&SetCategory::Org];
        assert_eq!(orgs[0].parent, None);
        assert_eq!(orgs[1].parent, None);
    }

    #[test]
    fn run_length_tie_prefers_org_over_locorg() {
        // Two enclosing candidates with identical token runs: the winner
        // must be fixed, not dependent on map iteration order.
        let mut sets: HashMap<SetCategory, Vec<TokenSet>> = HashMap::new();
        sets.insert(
            SetCategory::Org,
            vec![
                set(1, SetCategory::Org, &[0, 1, 2]),
                set(3, SetCategory::Org, &[1]),
            ],
        );
        sets.insert(SetCategory::LocOrg, vec![set(2, SetCategory::LocOrg, &[0, 1, 2])]);

        for _ in 0..16 {
            let mut sets = sets.clone();
            assign_parents(&mut sets);
            assert_eq!(sets[&SetCategory::Org][1].parent, Some(1));
        }
    }

    #[test]
    fn locorg_participates_in_nesting() {
        let mut sets: HashMap<SetCategory, Vec<TokenSet>> = HashMap::new();
        sets.insert(SetCategory::Org, vec![set(1, SetCategory::Org, &[0, 1, 2])]);
        sets.insert(SetCategory::LocOrg, vec![set(2, SetCategory::LocOrg, &[1])]);
        sets.insert(SetCategory::Per, vec![set(3, SetCategory::Per, &[1])]);
        assign_parents(&mut sets);

        assert_eq!(sets[&SetCategory::LocOrg][0].parent, Some(1));
        // Non-organization categories are untouched by the pass.
        assert_eq!(sets[&SetCategory::Per][0].parent, None);
    }
}
