//! Structural errors that abort a filter run.

use std::fmt;

use crate::tags::{BlockTag, InlineTag};

/// Location of the node that triggered an error.
///
/// `block` is the 1-based index of the top-level block being walked; `node`
/// is the 1-based pre-order ordinal of the node across the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub block: usize,
    pub node: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {}, node {}", self.block, self.node)
    }
}

/// Tag nesting violation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    /// A closing inline tag does not match the most recently opened one.
    #[error("Closing tag </{}> does not match opening tag {open} at {position}", .found.name())]
    MismatchedTag {
        open: InlineTag,
        found: InlineTag,
        position: Position,
    },

    /// A closing inline tag with nothing open.
    #[error("Closing tag </{}> has no matching opening tag at {position}", .found.name())]
    UnopenedTag { found: InlineTag, position: Position },

    /// A block region closes while inline regions are still open.
    #[error("Closing {closing} while inline {} still open at {position}", describe_open(.open))]
    UnclosedInline {
        open: Vec<InlineTag>,
        closing: BlockTag,
        position: Position,
    },
}

fn describe_open(open: &[InlineTag]) -> String {
    let tags: Vec<String> = open.iter().map(ToString::to_string).collect();
    let noun = if tags.len() == 1 { "region" } else { "regions" };
    format!("{noun} {}", tags.join(", "))
}

impl FilterError {
    /// Where the error was detected.
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            Self::MismatchedTag { position, .. }
            | Self::UnopenedTag { position, .. }
            | Self::UnclosedInline { position, .. } => *position,
        }
    }
}
