//! Pandoc JSON document model for Marginalia.
//!
//! This crate mirrors the pandoc-types 1.23 AST as plain Rust enums with serde
//! derives, so a document produced by `pandoc -t json` can be deserialized,
//! rewritten and serialized back without loss.
//!
//! # Encoding
//!
//! Pandoc encodes every node as an object with a `"t"` (tag) field and, for
//! nodes that carry data, a `"c"` (content) field. [`Block`], [`Inline`] and
//! [`MetaValue`] use serde's adjacent tagging to match that layout exactly.
//! Tuples and tuple structs encode as JSON arrays, which is how pandoc encodes
//! constructor arguments.
//!
//! # Example
//!
//! ```
//! use marginalia_ast::{Block, Inline, Pandoc};
//!
//! let json = r#"{"pandoc-api-version":[1,23,1],"meta":{},
//!     "blocks":[{"t":"Para","c":[{"t":"Str","c":"Hello"}]}]}"#;
//! let doc = Pandoc::from_json(json).unwrap();
//! assert_eq!(doc.blocks, vec![Block::Para(vec![Inline::Str("Hello".to_owned())])]);
//! ```

mod attr;
mod block;
mod inline;
mod meta;
mod stringify;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use attr::Attr;
pub use block::{
    Alignment, Block, Caption, Cell, ColSpec, ColWidth, ListAttributes, ListNumberDelim,
    ListNumberStyle, Row, TableBody, TableFoot, TableHead,
};
pub use inline::{Citation, CitationMode, Inline, MathType, QuoteType, Target};
pub use meta::MetaValue;
pub use stringify::{stringify, stringify_blocks};

/// Pandoc API version written by this crate (`pandoc-types` 1.23).
pub const PANDOC_API_VERSION: [u32; 3] = [1, 23, 1];

/// A complete pandoc document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pandoc {
    /// API version the document was produced with.
    #[serde(rename = "pandoc-api-version")]
    pub pandoc_api_version: Vec<u32>,
    /// Document metadata (YAML front matter).
    pub meta: BTreeMap<String, MetaValue>,
    /// Document body.
    pub blocks: Vec<Block>,
}

impl Default for Pandoc {
    fn default() -> Self {
        Self {
            pandoc_api_version: PANDOC_API_VERSION.to_vec(),
            meta: BTreeMap::new(),
            blocks: Vec::new(),
        }
    }
}

impl Pandoc {
    /// Create a document from body blocks with empty metadata.
    #[must_use]
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..Self::default()
        }
    }

    /// Parse a document from pandoc's JSON output.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid JSON or does not describe a
    /// pandoc document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize the document to pandoc's JSON input format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
