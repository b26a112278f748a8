//! Figure cache key computation.

use sha1::{Digest, Sha1};

/// Inputs that determine a rendered figure.
#[derive(Debug, Clone, Copy)]
pub struct FigureKey<'a> {
    /// TikZ source as written in the code block.
    pub code: &'a str,
    /// Font package the picture is typeset with.
    pub font: &'a str,
}

impl FigureKey<'_> {
    /// Compute the content hash naming the figure file.
    ///
    /// # Hash Format
    ///
    /// Hex SHA-1 of the code immediately followed by the font name. Figure
    /// directories populated by earlier tools use the same names, so existing
    /// figures are reused.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update(self.code.as_bytes());
        hasher.update(self.font.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let key = FigureKey {
            code: "abc",
            font: "",
        };

        assert_eq!(
            key.compute_hash(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_code_and_font_are_concatenated() {
        let split = FigureKey {
            code: "\\draw;fb",
            font: "b",
        };
        let joined = FigureKey {
            code: "\\draw;",
            font: "fbb",
        };

        assert_eq!(split.compute_hash(), joined.compute_hash());
    }

    #[test]
    fn test_font_matters() {
        let fbb = FigureKey {
            code: "\\draw (0,0) -- (1,1);",
            font: "fbb",
        };
        let libertine = FigureKey {
            font: "libertine",
            ..fbb
        };

        assert_ne!(fbb.compute_hash(), libertine.compute_hash());
        assert_eq!(fbb.compute_hash().len(), 40);
    }
}
