//! Entities: coreference chains over mentions.
//!
//! The `.coref` layer is optional, and the last block of the file may be
//! left unterminated by the exporter. A terminated block resolves its
//! mention references against the mention table; an unterminated trailing
//! block has no resolution context and is kept as raw text. The two cases
//! are distinct variants so callers cannot mistake unresolved data for a
//! resolved chain.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mention::{MentionId, MentionTable};
use crate::token::parse_field;

/// A coreference chain, or the raw text of an unterminated trailing block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    /// A fully id-resolved chain from a blank-line-terminated block.
    Resolved {
        /// Entity id from the block header line.
        id: u32,
        /// Mentions believed to refer to the same real-world referent.
        mentions: Vec<MentionId>,
    },
    /// The raw buffer of a trailing block that ended at end-of-file
    /// without a terminating blank line.
    Raw {
        /// The accumulated block text, one record per line.
        text: String,
    },
}

impl Entity {
    /// True for [`Entity::Resolved`].
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Entity::Resolved { .. })
    }

    /// The resolved mentions, or `None` for a raw block.
    #[must_use]
    pub fn mentions(&self) -> Option<&[MentionId]> {
        match self {
            Entity::Resolved { mentions, .. } => Some(mentions),
            Entity::Raw { .. } => None,
        }
    }

    /// Parse a terminated block.
    ///
    /// The first line carries the entity id; each following line starts
    /// with a mention id, with any trailing descriptor fields ignored.
    fn from_block(
        block: &str,
        start_line: usize,
        path: &Path,
        mentions: &MentionTable,
    ) -> Result<Self> {
        let mut lines = block.lines().enumerate();

        let (offset, header) = lines
            .next()
            .ok_or_else(|| Error::format(start_line, path, "empty coreference block"))?;
        let id_field = header.split_whitespace().next().ok_or_else(|| {
            Error::format(start_line + offset, path, "missing entity id")
        })?;
        let id = parse_field::<u32>(id_field, "entity id", start_line + offset, path)?;

        let mut resolved = Vec::new();
        for (offset, line) in lines {
            let lineno = start_line + offset;
            let field = line.split_whitespace().next().ok_or_else(|| {
                Error::format(lineno, path, "missing mention id")
            })?;
            let raw = parse_field::<u32>(field, "mention id", lineno, path)?;
            let mention = mentions.resolve(raw).ok_or_else(|| {
                Error::reference(lineno, path, format!("unknown mention id {raw}"))
            })?;
            resolved.push(mention);
        }

        Ok(Entity::Resolved {
            id,
            mentions: resolved,
        })
    }
}

/// Load a `.coref` file.
///
/// The file is segmented into blocks separated by blank lines (each line
/// is trimmed before the blank check). Every terminated block becomes an
/// [`Entity::Resolved`]; a trailing unterminated block becomes an
/// [`Entity::Raw`]. A file that cannot be opened yields zero entities;
/// this is the one place in the export where absence is not an error.
/// A file that opens but cannot be read (IO failure, invalid UTF-8) still
/// fails the load.
pub fn load_coreference(path: &Path, mentions: &MentionTable) -> Result<Vec<Entity>> {
    let mut file = match fs::File::open(path) {
        Ok(file) => file,
        Err(_) => {
            log::debug!("no coreference layer at {}", path.display());
            return Ok(Vec::new());
        }
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;

    let mut entities = Vec::new();
    let mut buffer = String::new();
    let mut block_start = 1;
    let mut terminated = true;

    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            if !buffer.is_empty() {
                entities.push(Entity::from_block(&buffer, block_start, path, mentions)?);
                buffer.clear();
            }
            terminated = true;
        } else {
            if terminated {
                block_start = index + 1;
                terminated = false;
            }
            buffer.push_str(line);
            buffer.push('\n');
        }
    }

    if !buffer.is_empty() {
        entities.push(Entity::Raw { text: buffer });
    }

    log::debug!(
        "loaded {} entities from {}",
        entities.len(),
        path.display()
    );
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatConfig;
    use crate::span::SpanTable;
    use crate::token::TokenTable;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn mentions() -> MentionTable {
        let config = FormatConfig::default();
        let mut tokens = NamedTempFile::new().unwrap();
        tokens
            .write_all(b"1 0 4 Bank\n2 5 2 of\n3 8 7 Rossiya\n")
            .unwrap();
        let tokens = TokenTable::load(tokens.path(), &config).unwrap();

        let mut spans = NamedTempFile::new().unwrap();
        spans
            .write_all(b"101 org_name 0 15 1 3 # 1 2 3 Bank of Rossiya\n")
            .unwrap();
        let spans = SpanTable::load(spans.path(), &config, &tokens).unwrap();

        let mut objects = NamedTempFile::new().unwrap();
        objects.write_all(b"10 org 101\n11 org 101\n").unwrap();
        MentionTable::load(objects.path(), &config, &spans).unwrap()
    }

    fn load_str(content: &str, mentions: &MentionTable) -> Result<Vec<Entity>> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        load_coreference(file.path(), mentions)
    }

    #[test]
    fn terminated_blocks_become_resolved_entities() {
        let mentions = mentions();
        let entities = load_str("1\n10 Bank of Rossiya\n11\n\n2\n10\n\n", &mentions).unwrap();
        assert_eq!(entities.len(), 2);

        match &entities[0] {
            Entity::Resolved { id, mentions } => {
                assert_eq!(*id, 1);
                assert_eq!(mentions.len(), 2);
            }
            other => panic!("expected resolved entity, got {other:?}"),
        }
        assert!(entities[1].is_resolved());
    }

    #[test]
    fn trailing_unterminated_block_stays_raw() {
        let mentions = mentions();
        let entities = load_str("1\n10\n\n2\n10\n11", &mentions).unwrap();
        assert_eq!(entities.len(), 2);
        assert!(entities[0].is_resolved());
        match &entities[1] {
            Entity::Raw { text } => assert_eq!(text, "2\n10\n11\n"),
            other => panic!("expected raw entity, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_yields_zero_entities() {
        let mentions = mentions();
        let entities =
            load_coreference(Path::new("/nonexistent/doc.coref"), &mentions).unwrap();
        assert!(entities.is_empty());
    }

    #[test]
    fn unreadable_file_fails_the_load() {
        let mentions = mentions();
        let mut file = NamedTempFile::new().unwrap();
        // Present but not valid UTF-8: must not be mistaken for absence.
        file.write_all(&[0xff, 0xfe, 0x41]).unwrap();
        let err = load_coreference(file.path(), &mentions).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn unknown_mention_id_is_a_reference_error() {
        let mentions = mentions();
        let err = load_str("1\n99\n\n", &mentions).unwrap_err();
        match err {
            Error::Reference { line, .. } => assert_eq!(line, 2),
            other => panic!("expected reference error, got {other}"),
        }
    }

    #[test]
    fn whitespace_only_lines_terminate_blocks() {
        let mentions = mentions();
        let entities = load_str("1\n10\n \t \n2\n11\n\n", &mentions).unwrap();
        assert_eq!(entities.len(), 2);
        assert!(entities.iter().all(Entity::is_resolved));
    }
}
