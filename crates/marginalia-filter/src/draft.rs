//! Draft/publish policy.

use std::collections::BTreeMap;

use marginalia_ast::MetaValue;

/// Metadata key holding the draft flag.
pub const DRAFT_KEY: &str = "draft";

/// Whether annotations are shown (draft) or suppressed (publish).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftMode {
    Draft,
    #[default]
    Publish,
}

impl DraftMode {
    /// Resolve the mode from document metadata.
    ///
    /// A boolean `draft` value is used as is. Text values count as draft when
    /// they read `true`, `yes`, `on` or `1`, ignoring case. A missing key or
    /// any other value means publish.
    #[must_use]
    pub fn resolve(meta: &BTreeMap<String, MetaValue>) -> Self {
        let draft = meta.get(DRAFT_KEY).is_some_and(|value| {
            value.as_bool().unwrap_or_else(|| {
                matches!(value, MetaValue::MetaString(_) | MetaValue::MetaInlines(_))
                    && matches!(
                        value.stringify().trim().to_ascii_lowercase().as_str(),
                        "true" | "yes" | "on" | "1"
                    )
            })
        });
        Self::from(draft)
    }

    #[must_use]
    pub fn is_draft(self) -> bool {
        self == Self::Draft
    }
}

impl From<bool> for DraftMode {
    fn from(draft: bool) -> Self {
        if draft { Self::Draft } else { Self::Publish }
    }
}

#[cfg(test)]
mod tests {
    use marginalia_ast::Inline;

    use super::*;

    fn meta(value: MetaValue) -> BTreeMap<String, MetaValue> {
        BTreeMap::from([(DRAFT_KEY.to_owned(), value)])
    }

    #[test]
    fn test_missing_key_is_publish() {
        assert_eq!(DraftMode::resolve(&BTreeMap::new()), DraftMode::Publish);
    }

    #[test]
    fn test_bool_value() {
        assert_eq!(
            DraftMode::resolve(&meta(MetaValue::MetaBool(true))),
            DraftMode::Draft
        );
        assert_eq!(
            DraftMode::resolve(&meta(MetaValue::MetaBool(false))),
            DraftMode::Publish
        );
    }

    #[test]
    fn test_text_values() {
        assert!(DraftMode::resolve(&meta(MetaValue::MetaString("Yes".to_owned()))).is_draft());
        assert!(
            DraftMode::resolve(&meta(MetaValue::MetaInlines(vec![Inline::Str(
                "TRUE".to_owned()
            )])))
            .is_draft()
        );
        assert!(!DraftMode::resolve(&meta(MetaValue::MetaString("no".to_owned()))).is_draft());
        assert!(!DraftMode::resolve(&meta(MetaValue::MetaString("draft".to_owned()))).is_draft());
    }

    #[test]
    fn test_other_values_are_publish() {
        assert_eq!(
            DraftMode::resolve(&meta(MetaValue::MetaList(vec![MetaValue::MetaBool(true)]))),
            DraftMode::Publish
        );
    }
}
