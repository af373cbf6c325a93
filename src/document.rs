//! The document facade: one fully loaded, cross-referenced document.
//!
//! Loading is a strict sequential pipeline (tokens → spans → mentions →
//! coreference → text) because each stage resolves ids against the previous
//! stage's completed table. A load either yields a fully populated,
//! immutable [`Document`] or a typed error naming the document; callers
//! never see partially built state. For bulk evaluation over many
//! documents, [`Document::load_batch`] logs and skips the failures.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::FormatConfig;
use crate::entity::{load_coreference, Entity};
use crate::error::{Error, Result};
use crate::mention::{MentionTable, MentionTag};
use crate::span::SpanTable;
use crate::tables::MarkTable;
use crate::token::TokenTable;
use crate::token_set::{assign_parents, SetCategory, TokenSet};

/// One document reconstructed from a five-file annotation export.
///
/// The export shares a base name across files:
///
/// | File | Content |
/// |------|---------|
/// | `NAME.tokens`  | delimited token records |
/// | `NAME.spans`   | span records referencing tokens |
/// | `NAME.objects` | mention records referencing spans |
/// | `NAME.coref`   | blank-line-delimited entity blocks (optional) |
/// | `NAME.txt`     | raw document text |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    name: String,
    text: String,
    tokens: TokenTable,
    spans: SpanTable,
    mentions: MentionTable,
    entities: Vec<Entity>,
}

impl Document {
    /// Load the document `name` from the export files under `dir`.
    ///
    /// Any format, reference, or IO error from the pipeline is wrapped in
    /// [`Error::Document`] carrying the document name. An absent `.coref`
    /// file is not an error and yields zero entities.
    pub fn load(name: &str, dir: &Path, config: &FormatConfig) -> Result<Self> {
        Self::load_inner(name, dir, config).map_err(|e| Error::document(name, e))
    }

    fn load_inner(name: &str, dir: &Path, config: &FormatConfig) -> Result<Self> {
        let file = |ext: &str| dir.join(format!("{name}.{ext}"));

        let tokens = TokenTable::load(&file("tokens"), config)?;
        let spans = SpanTable::load(&file("spans"), config, &tokens)?;
        let mentions = MentionTable::load(&file("objects"), config, &spans)?;
        let entities = load_coreference(&file("coref"), &mentions)?;
        let text = fs::read_to_string(file("txt"))?;

        Ok(Self {
            name: name.to_string(),
            text,
            tokens,
            spans,
            mentions,
            entities,
        })
    }

    /// Load many documents, skipping the ones that fail.
    ///
    /// Each failure is logged with the document name; one bad export does
    /// not abort the rest of the batch.
    pub fn load_batch<'a, I>(names: I, dir: &Path, config: &FormatConfig) -> Vec<Document>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut documents = Vec::new();
        for name in names {
            match Document::load(name, dir, config) {
                Ok(document) => documents.push(document),
                Err(e) => log::error!("{e}"),
            }
        }
        documents
    }

    /// Document name (export base name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The token table.
    #[must_use]
    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    /// The span table.
    #[must_use]
    pub fn spans(&self) -> &SpanTable {
        &self.spans
    }

    /// The mention table.
    #[must_use]
    pub fn mentions(&self) -> &MentionTable {
        &self.mentions
    }

    /// Coreference entities; empty when the `.coref` layer is absent.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Build the typed token sets consumed by the scoring layer.
    ///
    /// One set per mention of the `org`, `per` and `loc` categories, plus
    /// `locorg` when `allow_loc_org` is true; with it disabled, `locorg`
    /// mentions fold into `loc` and no `locorg` collection is produced.
    /// Mentions outside those categories are skipped with a warning.
    ///
    /// Every token of every span of a mention gets a mark from `marks`,
    /// keyed by the set's resolved category and the span's own tag; a token
    /// covered by several spans keeps the last span's mark. Organization
    /// sets nested in other organization sets get their parent recorded.
    ///
    /// The result is computed fresh on every call and not cached on the
    /// document.
    pub fn token_sets(
        &self,
        allow_loc_org: bool,
        marks: &impl MarkTable,
    ) -> HashMap<SetCategory, Vec<TokenSet>> {
        let mut sets: HashMap<SetCategory, Vec<TokenSet>> = HashMap::new();
        sets.insert(SetCategory::Org, Vec::new());
        sets.insert(SetCategory::Per, Vec::new());
        sets.insert(SetCategory::Loc, Vec::new());
        if allow_loc_org {
            sets.insert(SetCategory::LocOrg, Vec::new());
        }

        for mention in self.mentions.iter() {
            let category = match &mention.tag {
                MentionTag::Org => SetCategory::Org,
                MentionTag::Per => SetCategory::Per,
                MentionTag::Loc => SetCategory::Loc,
                MentionTag::LocOrg if allow_loc_org => SetCategory::LocOrg,
                MentionTag::LocOrg => SetCategory::Loc,
                MentionTag::Other(tag) => {
                    log::warn!(
                        "document '{}': skipping mention {} with tag '{}'",
                        self.name,
                        mention.id,
                        tag
                    );
                    continue;
                }
            };

            let all_tokens = mention
                .spans
                .iter()
                .flat_map(|&s| self.spans.get(s).tokens.iter().copied())
                .collect();
            let mut set = TokenSet::new(mention.id, category, all_tokens);

            for &span_id in &mention.spans {
                let span = self.spans.get(span_id);
                for &token in &span.tokens {
                    set.set_mark(token, marks.mark(category, &span.tag));
                }
            }

            if let Some(list) = sets.get_mut(&category) {
                list.push(set);
            }
        }

        assign_parents(&mut sets);
        sets
    }
}
