//! Node attributes.

use serde::{Deserialize, Serialize};

/// Wire form of [`Attr`]: `[identifier, [classes], [[key, value]]]`.
type AttrTuple = (String, Vec<String>, Vec<(String, String)>);

/// Attributes attached to spans, divs, code blocks, headers and images.
///
/// Pandoc encodes attributes as a three-element array; this struct gives the
/// elements names while keeping the same encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AttrTuple", into = "AttrTuple")]
pub struct Attr {
    /// Element identifier (`#id`), empty when absent.
    pub id: String,
    /// Class names (`.class`).
    pub classes: Vec<String>,
    /// Key-value pairs (`key=value`), in document order.
    pub attributes: Vec<(String, String)>,
}

impl Attr {
    /// Create attributes carrying a single class.
    #[must_use]
    pub fn with_class(class: impl Into<String>) -> Self {
        Self {
            classes: vec![class.into()],
            ..Self::default()
        }
    }

    /// Whether the class list contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Value of the first attribute named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl From<AttrTuple> for Attr {
    fn from((id, classes, attributes): AttrTuple) -> Self {
        Self {
            id,
            classes,
            attributes,
        }
    }
}

impl From<Attr> for AttrTuple {
    fn from(attr: Attr) -> Self {
        (attr.id, attr.classes, attr.attributes)
    }
}
