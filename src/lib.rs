//! # standoff
//!
//! Loading and linking for multi-file standoff annotation exports:
//! tokenization, span boundaries, named-entity mentions, and coreference
//! chains for a single document, reconstructed into a cross-referenced
//! in-memory model for downstream scoring.
//!
//! - **Loading**: four positionally coupled record formats parsed into typed
//!   tables (`.tokens`, `.spans`, `.objects`, `.coref`), plus raw text
//! - **Linking**: strictly layered id resolution (token ← span ← mention ←
//!   entity), with format and reference errors citing line and file
//! - **Token sets**: typed per-mention token collections with classification
//!   marks and organization-nesting parent links
//!
//! # Example
//!
//! ```rust,no_run
//! use standoff::{Document, FormatConfig, HashMapMarkTable};
//! use std::path::Path;
//!
//! let config = FormatConfig::default();
//! let doc = Document::load("book_100", Path::new("testset"), &config)?;
//!
//! let marks = HashMapMarkTable::new("none");
//! let sets = doc.token_sets(true, &marks);
//! for (category, list) in &sets {
//!     println!("{category}: {} mentions", list.len());
//! }
//! # Ok::<(), standoff::Error>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod document;
pub mod entity;
pub mod error;
pub mod mention;
pub mod span;
pub mod tables;
pub mod token;
pub mod token_set;

pub use config::FormatConfig;
pub use document::Document;
pub use entity::Entity;
pub use error::{Error, Result};
pub use mention::{Mention, MentionId, MentionTable, MentionTag};
pub use span::{Span, SpanId, SpanTable};
pub use tables::{HashMapMarkTable, Mark, MarkTable};
pub use token::{Token, TokenId, TokenTable};
pub use token_set::{SetCategory, TokenSet};
