//! Document metadata values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Block, Inline, stringify, stringify_blocks};

/// A metadata value from the document's YAML front matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum MetaValue {
    MetaMap(BTreeMap<String, MetaValue>),
    MetaList(Vec<MetaValue>),
    MetaBool(bool),
    MetaString(String),
    MetaInlines(Vec<Inline>),
    MetaBlocks(Vec<Block>),
}

impl MetaValue {
    /// Boolean value, when this is a `MetaBool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::MetaBool(b) => Some(*b),
            _ => None,
        }
    }

    /// Plain-text rendering of the value.
    ///
    /// Lists and maps join their entries with a single space.
    #[must_use]
    pub fn stringify(&self) -> String {
        match self {
            Self::MetaMap(map) => map
                .values()
                .map(Self::stringify)
                .collect::<Vec<_>>()
                .join(" "),
            Self::MetaList(items) => items
                .iter()
                .map(Self::stringify)
                .collect::<Vec<_>>()
                .join(" "),
            Self::MetaBool(b) => b.to_string(),
            Self::MetaString(s) => s.clone(),
            Self::MetaInlines(inlines) => stringify(inlines),
            Self::MetaBlocks(blocks) => stringify_blocks(blocks),
        }
    }
}
