//! Filter harness: one document in, one document out.

use std::collections::BTreeMap;

use marginalia_ast::{Inline, MetaValue, Pandoc};
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::diagram::{CaptionFormatter, DiagramRenderer, PlainCaptionFormatter};
use crate::draft::DraftMode;
use crate::error::FilterError;
use crate::state::WalkState;
use crate::walker::{Figures, Walker};

/// Font package used for TikZ figures when the document names none.
pub const DEFAULT_FONT: &str = "fbb";

/// Metadata key naming the document font package.
const FONT_KEY: &str = "fontfamily";

/// Metadata key for extra LaTeX preamble lines.
const HEADER_INCLUDES_KEY: &str = "header-includes";

/// Preamble line required by `<!box>` regions.
const MDFRAMED: &str = "\\RequirePackage{mdframed}";

/// Result of a filter run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput {
    /// The transformed document.
    pub document: Pandoc,
    /// Non-fatal problems found during the run.
    pub warnings: Vec<String>,
}

/// Annotation filter for one backend.
///
/// A filter is consumed by [`run`](Self::run), so walk state can never leak
/// from one document into the next.
///
/// # Example
///
/// ```
/// use marginalia_ast::{Block, Inline, Pandoc};
/// use marginalia_filter::{Backend, Filter};
///
/// let doc = Pandoc::new(vec![Block::Para(vec![
///     Inline::raw("html", "<comment>"),
///     Inline::Str("hidden".to_owned()),
///     Inline::raw("html", "</comment>"),
/// ])]);
///
/// let output = Filter::new(Backend::Latex).run(doc).unwrap();
/// assert!(output.document.blocks.is_empty());
/// ```
pub struct Filter {
    backend: Backend,
    draft: Option<DraftMode>,
    default_font: String,
    diagrams: Option<Box<dyn DiagramRenderer>>,
    captions: Box<dyn CaptionFormatter>,
}

impl Filter {
    #[must_use]
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            draft: None,
            default_font: DEFAULT_FONT.to_owned(),
            diagrams: None,
            captions: Box::new(PlainCaptionFormatter),
        }
    }

    /// Render TikZ code blocks with `renderer`.
    ///
    /// Without a renderer TikZ code blocks are left as they are.
    #[must_use]
    pub fn with_diagrams(mut self, renderer: impl DiagramRenderer + 'static) -> Self {
        self.diagrams = Some(Box::new(renderer));
        self
    }

    /// Format figure captions with `formatter` instead of plain words.
    #[must_use]
    pub fn with_captions(mut self, formatter: impl CaptionFormatter + 'static) -> Self {
        self.captions = Box::new(formatter);
        self
    }

    /// Force draft or publish mode regardless of the document's `draft` key.
    #[must_use]
    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = Some(DraftMode::from(draft));
        self
    }

    /// Font used for figures when the document has no `fontfamily`.
    #[must_use]
    pub fn with_default_font(mut self, font: impl Into<String>) -> Self {
        self.default_font = font.into();
        self
    }

    /// Transform a document.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] when annotation tags are not properly nested.
    /// No partial document is produced in that case.
    pub fn run(self, mut document: Pandoc) -> Result<FilterOutput, FilterError> {
        if self.backend == Backend::Markdown {
            return Ok(FilterOutput {
                document,
                warnings: Vec::new(),
            });
        }

        let draft = self
            .draft
            .unwrap_or_else(|| DraftMode::resolve(&document.meta));
        debug!(backend = ?self.backend, ?draft, "Resolved draft mode");

        let font = document
            .meta
            .get(FONT_KEY)
            .map(|value| value.stringify().trim().to_owned())
            .filter(|font| !font.is_empty())
            .unwrap_or(self.default_font);
        let figures = self.diagrams.as_deref().map(|renderer| Figures {
            renderer,
            captions: self.captions.as_ref(),
            font,
        });

        let mut walker = Walker::new(WalkState::new(self.backend, draft), figures);
        let blocks = walker.walk_document(std::mem::take(&mut document.blocks))?;
        let (state, mut warnings) = walker.finish();
        document.blocks = blocks;

        let open = state.open_inline_tags();
        if !open.is_empty() {
            let tags: Vec<String> = open.iter().map(ToString::to_string).collect();
            warn!(tags = %tags.join(", "), "Inline regions left open at end of document");
            warnings.push(format!(
                "Inline regions left open at end of document: {}",
                tags.join(", ")
            ));
        }
        if state.block_comment_open() {
            warn!("Block comment left open at end of document");
            warnings.push("Block comment <!comment> left open at end of document".to_owned());
        }

        if state.box_used() && self.backend.is_typeset() {
            require_mdframed(&mut document.meta);
        }

        Ok(FilterOutput { document, warnings })
    }
}

/// Prepend the `mdframed` package to the document's header includes.
fn require_mdframed(meta: &mut BTreeMap<String, MetaValue>) {
    let mut includes = vec![MetaValue::MetaInlines(vec![Inline::raw("tex", MDFRAMED)])];
    match meta.remove(HEADER_INCLUDES_KEY) {
        Some(MetaValue::MetaList(existing)) => includes.extend(existing),
        Some(other) => includes.push(other),
        None => {}
    }
    meta.insert(
        HEADER_INCLUDES_KEY.to_owned(),
        MetaValue::MetaList(includes),
    );
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use marginalia_ast::{Attr, Block};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::diagram::DiagramRequest;
    use crate::tags::InlineTag;

    fn s(text: &str) -> Inline {
        Inline::Str(text.to_owned())
    }

    fn html(text: &str) -> Inline {
        Inline::raw("html", text)
    }

    fn with_meta(blocks: Vec<Block>, key: &str, value: MetaValue) -> Pandoc {
        let mut doc = Pandoc::new(blocks);
        doc.meta.insert(key.to_owned(), value);
        doc
    }

    fn annotated() -> Vec<Block> {
        vec![
            Block::RawBlock("html".to_owned(), "<!box>".to_owned()),
            Block::Para(vec![
                s("plain"),
                Inline::Space,
                html("<highlight>"),
                s("marked"),
                Inline::Space,
                html("<comment>"),
                s("aside"),
                html("</comment>"),
                html("</highlight>"),
                Inline::Space,
                Inline::Span(Attr::with_class("smcaps"), vec![s("caps")]),
                Inline::Space,
                Inline::Span(Attr::with_class("margin"), vec![s("note")]),
            ]),
            Block::RawBlock("html".to_owned(), "</!box>".to_owned()),
            Block::RawBlock("html".to_owned(), "<!comment>".to_owned()),
            Block::Para(vec![s("draft"), Inline::Space, s("only")]),
            Block::RawBlock("html".to_owned(), "</!comment>".to_owned()),
            Block::Para(vec![s("<"), Inline::Space, html("<r sec:a>")]),
        ]
    }

    #[test]
    fn test_publish_is_idempotent() {
        for backend in [
            Backend::Latex,
            Backend::Beamer,
            Backend::Html,
            Backend::RevealJs,
            Backend::Docx,
            Backend::Other,
        ] {
            let once = Filter::new(backend)
                .run(Pandoc::new(annotated()))
                .unwrap()
                .document;
            let twice = Filter::new(backend).run(once.clone()).unwrap().document;

            assert_eq!(once, twice, "{backend:?}");
        }
    }

    #[test]
    fn test_fragments_balance_per_backend() {
        let tags = [
            InlineTag::Comment,
            InlineTag::Highlight,
            InlineTag::Fixme,
            InlineTag::Margin,
            InlineTag::SmallCaps,
        ];
        for backend in [
            Backend::Latex,
            Backend::Beamer,
            Backend::Html,
            Backend::RevealJs,
            Backend::Docx,
        ] {
            for tag in tags {
                let doc = Pandoc::new(vec![Block::Para(vec![
                    s("x"),
                    html(&format!("<{}>", tag.name())),
                    s("y"),
                    html(&format!("</{}>", tag.name())),
                ])]);
                let output = Filter::new(backend).with_draft(true).run(doc).unwrap();

                let Some(Block::Para(inlines)) = output.document.blocks.first() else {
                    panic!("paragraph removed for {backend:?} {tag}");
                };
                let raws: Vec<&str> = inlines
                    .iter()
                    .filter_map(|inline| match inline {
                        Inline::RawInline(_, text) => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                match backend.inline_fragments(tag) {
                    Some(fragments) => {
                        assert_eq!(raws.len(), 2, "{backend:?} {tag}");
                        assert_eq!(raws[0], fragments.open, "{backend:?} {tag}");
                        assert!(raws[1].starts_with(fragments.close), "{backend:?} {tag}");
                    }
                    None => assert!(raws.is_empty(), "{backend:?} {tag}"),
                }
            }
        }
    }

    #[test]
    fn test_draft_latex_output() {
        let doc = with_meta(annotated(), "draft", MetaValue::MetaBool(true));

        let output = Filter::new(Backend::Latex).run(doc).unwrap();

        let latex = |text: &str| Inline::raw("latex", text);
        assert_eq!(
            output.document.blocks,
            vec![
                Block::Para(vec![latex("\\medskip\\begin{mdframed}")]),
                Block::Para(vec![
                    s("plain"),
                    Inline::Space,
                    latex("\\hl{"),
                    s("marked"),
                    Inline::Space,
                    latex("}\\textcolor{cyan}{\\hl{"),
                    s("aside"),
                    latex("}}\\color{black}{}\\hl{"),
                    latex("}\\color{black}{}"),
                    Inline::Space,
                    latex("\\textsc{"),
                    s("caps"),
                    latex("}"),
                    Inline::Space,
                    latex("\\marginpar{\\begin{flushleft}\\scriptsize{\\textcolor{black}{"),
                    s("note"),
                    latex("}}\\end{flushleft}}\\color{black}{}"),
                ]),
                Block::Para(vec![latex("\\end{mdframed}\\medskip{}")]),
                Block::Para(vec![latex("\\color{cyan}{}")]),
                Block::Para(vec![s("draft"), Inline::Space, s("only")]),
                Block::Para(vec![latex("\\color{black}{}")]),
                Block::Para(vec![latex("\\noindent{}"), latex("\\cref{sec:a}")]),
            ]
        );
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_publish_html_output() {
        let output = Filter::new(Backend::Html)
            .run(Pandoc::new(annotated()))
            .unwrap();

        assert_eq!(
            output.document.blocks,
            vec![
                Block::Plain(vec![html(
                    "<div style=\"border:1px solid black; padding:1.5ex;\">"
                )]),
                Block::Para(vec![
                    s("plain"),
                    Inline::Space,
                    s("marked"),
                    Inline::Space,
                    html("<span style=\"font-variant: small-caps;\">"),
                    s("caps"),
                    html("</span>"),
                ]),
                Block::Plain(vec![html("</div>")]),
                Block::Para(vec![
                    html("<div class=\"noindent\">"),
                    html("<a href=\"#sec:a\">here</a>"),
                    html("</div>"),
                ]),
            ]
        );
        assert_eq!(output.document.meta, BTreeMap::new());
    }

    #[test]
    fn test_box_adds_mdframed_header() {
        let doc = with_meta(
            annotated(),
            "header-includes",
            MetaValue::MetaList(vec![MetaValue::MetaInlines(vec![Inline::raw(
                "tex",
                "\\usepackage{soul}",
            )])]),
        );

        let output = Filter::new(Backend::Beamer).run(doc).unwrap();

        assert_eq!(
            output.document.meta.get("header-includes"),
            Some(&MetaValue::MetaList(vec![
                MetaValue::MetaInlines(vec![Inline::raw("tex", MDFRAMED)]),
                MetaValue::MetaInlines(vec![Inline::raw("tex", "\\usepackage{soul}")]),
            ]))
        );
    }

    #[test]
    fn test_single_header_include_is_kept() {
        let existing = MetaValue::MetaInlines(vec![s("x")]);
        let mut meta = BTreeMap::from([("header-includes".to_owned(), existing.clone())]);

        require_mdframed(&mut meta);

        assert_eq!(
            meta.get("header-includes"),
            Some(&MetaValue::MetaList(vec![
                MetaValue::MetaInlines(vec![Inline::raw("tex", MDFRAMED)]),
                existing,
            ]))
        );
    }

    #[test]
    fn test_no_header_without_box_or_for_html() {
        let doc = Pandoc::new(vec![Block::Para(vec![s("x")])]);
        let output = Filter::new(Backend::Latex).run(doc).unwrap();
        assert!(output.document.meta.is_empty());

        let output = Filter::new(Backend::Html)
            .run(Pandoc::new(annotated()))
            .unwrap();
        assert!(!output.document.meta.contains_key("header-includes"));
    }

    #[test]
    fn test_markdown_passthrough() {
        let doc = Pandoc::new(annotated());

        let output = Filter::new(Backend::Markdown).run(doc.clone()).unwrap();

        assert_eq!(output.document, doc);
    }

    #[test]
    fn test_draft_override_wins_over_metadata() {
        let doc = with_meta(
            vec![Block::Para(vec![
                html("<comment>"),
                s("x"),
                html("</comment>"),
            ])],
            "draft",
            MetaValue::MetaBool(true),
        );

        let output = Filter::new(Backend::Html)
            .with_draft(false)
            .run(doc)
            .unwrap();

        assert!(output.document.blocks.is_empty());
    }

    #[test]
    fn test_unclosed_regions_warn() {
        let doc = Pandoc::new(vec![
            Block::Para(vec![s("a"), html("<fixme>"), s("b")]),
            Block::RawBlock("html".to_owned(), "<!comment>".to_owned()),
        ]);

        let output = Filter::new(Backend::Latex).run(doc).unwrap();

        assert_eq!(output.warnings.len(), 2);
        assert!(output.warnings[0].contains("<fixme>"));
        assert!(output.warnings[1].contains("Block comment"));
    }

    #[test]
    fn test_structural_error_aborts() {
        let doc = Pandoc::new(vec![Block::Para(vec![html("</margin>")])]);

        let err = Filter::new(Backend::Html).run(doc).unwrap_err();

        assert!(matches!(err, FilterError::UnopenedTag { .. }));
    }

    struct RecordingRenderer(Arc<Mutex<Vec<DiagramRequest>>>);

    impl DiagramRenderer for RecordingRenderer {
        fn render(&self, request: &DiagramRequest) -> io::Result<PathBuf> {
            if let Ok(mut requests) = self.0.lock() {
                requests.push(request.clone());
            }
            Ok(PathBuf::from("/tmp/figure.pdf"))
        }
    }

    #[test]
    fn test_font_from_metadata() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let doc = with_meta(
            vec![Block::CodeBlock(
                Attr::with_class("tikz"),
                "\\draw (0,0) circle (1);".to_owned(),
            )],
            "fontfamily",
            MetaValue::MetaInlines(vec![s("libertine")]),
        );

        Filter::new(Backend::Latex)
            .with_diagrams(RecordingRenderer(Arc::clone(&requests)))
            .run(doc)
            .unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].font, "libertine");
    }

    #[test]
    fn test_default_font() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let doc = Pandoc::new(vec![Block::CodeBlock(
            Attr::with_class("tikz"),
            "\\draw (0,0) circle (1);".to_owned(),
        )]);

        Filter::new(Backend::Html)
            .with_default_font("kpfonts")
            .with_diagrams(RecordingRenderer(Arc::clone(&requests)))
            .run(doc)
            .unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].font, "kpfonts");
        assert!(!requests[0].vector);
    }
}
