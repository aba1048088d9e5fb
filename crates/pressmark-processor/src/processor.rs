//! The document processor.

use pressmark_config::{ConfigError, ProcessorOptions};
use pressmark_meta::{Metadata, extract, merge_metadata};
use pressmark_renderer::html::{DocumentWrapper, FigureTransform};
use pressmark_renderer::{
    DirectiveResolver, GenericContainer, Parser, Pipeline, ResolveMode, Warning,
};

use crate::document::ProcessedDocument;
use crate::renderer::{BuiltinRenderer, DocumentRenderer, RendererError};

/// Error type for document processing.
///
/// Problems in the input never fail processing; they are reported as
/// [`Warning`]s on the result. Only invalid options and the renderer
/// boundary are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The processor options failed validation.
    #[error("Invalid options: {0}")]
    Config(#[from] ConfigError),

    /// The literal-mode renderer failed.
    #[error("Renderer failed: {0}")]
    Renderer(#[source] RendererError),
}

/// Turns markup documents into HTML.
///
/// A processor holds configuration only. Each call builds its own pipeline
/// and tree, so one processor can serve any number of documents.
///
/// # Example
///
/// ```
/// use pressmark_processor::{DocumentProcessor, Metadata, ProcessorOptions};
///
/// let options = ProcessorOptions { partial: false, ..Default::default() };
/// let metadata = Metadata { title: Some("Bar".into()), ..Default::default() };
/// let processor = DocumentProcessor::new(options, metadata).unwrap();
///
/// let doc = processor.process_sync("---\ntitle: Foo\n---\n\nHello").unwrap();
/// assert_eq!(doc.metadata().title.as_deref(), Some("Bar"));
/// assert!(doc.text().contains("<title>Bar</title>"));
/// ```
pub struct DocumentProcessor {
    options: ProcessorOptions,
    metadata: Metadata,
    renderer: Box<dyn DocumentRenderer>,
}

impl DocumentProcessor {
    /// Create a processor with the built-in literal-mode renderer.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Config`] if `options` fail
    /// [`ProcessorOptions::validate`].
    pub fn new(options: ProcessorOptions, metadata: Metadata) -> Result<Self, ProcessError> {
        options.validate()?;
        let renderer = BuiltinRenderer::from_options(&options);
        Ok(Self {
            options,
            metadata,
            renderer: Box::new(renderer),
        })
    }

    /// Replace the renderer used in literal mode.
    #[must_use]
    pub fn with_renderer<R: DocumentRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    #[must_use]
    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Process `input` on the current thread.
    pub fn process_sync(&self, input: &str) -> Result<ProcessedDocument, ProcessError> {
        let mut warnings = Vec::new();
        let metadata = self.document_metadata(input, &mut warnings);

        let (text, stage_warnings) = match self.options.mode {
            ResolveMode::Hint => {
                let result = self.hint_pipeline(&metadata).render_html(input);
                (result.output, result.warnings)
            }
            ResolveMode::Literal => {
                let result = self.literal_pipeline(&metadata).render_markup(input);
                let html = self
                    .renderer
                    .render(&result.output, &metadata)
                    .map_err(|e| {
                        tracing::warn!(error = %e, "Renderer failed");
                        ProcessError::Renderer(e)
                    })?;
                (html, result.warnings)
            }
        };
        warnings.extend(stage_warnings);

        tracing::debug!(
            mode = ?self.options.mode,
            bytes = text.len(),
            warnings = warnings.len(),
            "Processed document"
        );

        Ok(ProcessedDocument::new(text, metadata, warnings))
    }

    /// Async form of [`process_sync`](Self::process_sync), for callers with
    /// an async calling convention.
    #[allow(clippy::unused_async)]
    pub async fn process(&self, input: &str) -> Result<ProcessedDocument, ProcessError> {
        self.process_sync(input)
    }

    /// Caller metadata over preamble metadata, then option fallbacks.
    fn document_metadata(&self, input: &str, warnings: &mut Vec<Warning>) -> Metadata {
        let extracted = extract(input).unwrap_or_else(|e| {
            let warning = Warning::MalformedPreamble(e.to_string());
            tracing::warn!(%warning, "Ignoring preamble");
            warnings.push(warning);
            Metadata::default()
        });

        let mut metadata = merge_metadata(&self.metadata, &extracted);
        if metadata.title.is_none() {
            metadata.title.clone_from(&self.options.title);
        }
        if metadata.lang.is_none() {
            metadata.lang.clone_from(&self.options.language);
        }
        for href in &self.options.style {
            if !metadata.links.contains(href) {
                metadata.links.push(href.clone());
            }
        }
        metadata
    }

    fn resolver(&self, mode: ResolveMode) -> DirectiveResolver {
        self.options
            .directives
            .iter()
            .fold(DirectiveResolver::new(mode), |resolver, directive| {
                resolver.with_container(GenericContainer::new(&directive.name, &directive.tag))
            })
    }

    /// Document settings take precedence over the processor options.
    fn parser(&self, metadata: &Metadata) -> Parser {
        let hard_line_breaks = metadata
            .settings
            .hard_line_breaks
            .unwrap_or(self.options.hard_line_breaks);
        Parser::new().with_hard_line_breaks(hard_line_breaks)
    }

    fn hint_pipeline(&self, metadata: &Metadata) -> Pipeline {
        let mut pipeline = Pipeline::new()
            .with_parser(self.parser(metadata))
            .with_tree_stage(self.resolver(ResolveMode::Hint));
        if self.options.figures {
            pipeline = pipeline.with_html_stage(FigureTransform);
        }
        if !metadata.settings.partial.unwrap_or(self.options.partial) {
            pipeline = pipeline.with_html_stage(DocumentWrapper::new(metadata.clone()));
        }
        pipeline
    }

    fn literal_pipeline(&self, metadata: &Metadata) -> Pipeline {
        Pipeline::new()
            .with_parser(self.parser(metadata))
            .with_tree_stage(self.resolver(ResolveMode::Literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressmark_config::DirectiveConfig;
    use pressmark_renderer::UnresolvedReason;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    const MODES: [ResolveMode; 2] = [ResolveMode::Hint, ResolveMode::Literal];

    fn processor(mode: ResolveMode) -> DocumentProcessor {
        let options = ProcessorOptions {
            mode,
            ..Default::default()
        };
        DocumentProcessor::new(options, Metadata::default()).unwrap()
    }

    fn process(mode: ResolveMode, input: &str) -> ProcessedDocument {
        processor(mode).process_sync(input).unwrap()
    }

    /// Records the markup handed to it and echoes it back.
    #[derive(Clone, Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl DocumentRenderer for Recorder {
        fn render(&self, markup: &str, _metadata: &Metadata) -> Result<String, RendererError> {
            self.seen.lock().unwrap().push(markup.to_owned());
            Ok(markup.to_owned())
        }
    }

    struct Failing;

    impl DocumentRenderer for Failing {
        fn render(&self, _markup: &str, _metadata: &Metadata) -> Result<String, RendererError> {
            Err("engine crashed".into())
        }
    }

    #[test]
    fn test_div_directive() {
        for mode in MODES {
            let doc = process(mode, ":::div{.note}\nHello\n:::");
            assert_eq!(
                doc.text(),
                "<div class=\"note\">\n<p>Hello</p>\n</div>",
                "{mode:?}"
            );
            assert!(doc.warnings().is_empty(), "{mode:?}");
        }
    }

    #[test]
    fn test_nested_strong_survives() {
        for mode in MODES {
            let doc = process(mode, ":::div{.tip}\n**Bold** text\n:::");
            assert!(
                doc.text().contains("<strong>Bold</strong> text"),
                "{mode:?}: {}",
                doc.text()
            );
            assert!(doc.text().starts_with("<div class=\"tip\">"), "{mode:?}");
        }
    }

    #[test]
    fn test_lone_image_becomes_figure() {
        for mode in MODES {
            let doc = process(mode, "![alt](x.png)");
            assert_eq!(
                doc.text(),
                "<figure><img src=\"x.png\" alt=\"alt\">\
                 <figcaption aria-hidden=\"true\">alt</figcaption></figure>",
                "{mode:?}"
            );
        }
    }

    #[test]
    fn test_unknown_directive_is_flagged() {
        for mode in MODES {
            let doc = process(mode, ":::callout{.note}\nHi\n:::");
            assert_eq!(
                doc.warnings(),
                &[Warning::UnresolvedDirective {
                    name: "callout".to_owned(),
                    reason: UnresolvedReason::UnknownName,
                }],
                "{mode:?}"
            );
            assert_eq!(doc.unconverted_directives(), vec![":::callout{.note}"]);
            assert!(doc.text().contains("<p>Hi</p>"), "{mode:?}");
        }
    }

    #[test]
    fn test_caller_title_wins() {
        for mode in MODES {
            let options = ProcessorOptions {
                mode,
                partial: false,
                ..Default::default()
            };
            let metadata = Metadata {
                title: Some("Bar".to_owned()),
                ..Default::default()
            };
            let doc = DocumentProcessor::new(options, metadata)
                .unwrap()
                .process_sync("---\ntitle: Foo\n---\n\nBody")
                .unwrap();
            assert_eq!(doc.metadata().title.as_deref(), Some("Bar"));
            assert!(doc.text().contains("<title>Bar</title>"), "{mode:?}");
            assert!(!doc.text().contains("Foo"), "{mode:?}");
        }
    }

    #[test]
    fn test_malformed_fence_stays_verbatim() {
        for mode in MODES {
            let doc = process(mode, ":::div{class note}\nHello\n:::");
            assert!(
                doc.text().contains(":::div{class note}"),
                "{mode:?}: {}",
                doc.text()
            );
            assert!(
                doc.warnings()
                    .iter()
                    .any(|w| matches!(w, Warning::MalformedDirective { .. })),
                "{mode:?}"
            );
        }
    }

    #[test]
    fn test_literal_markup_handed_to_renderer() {
        let recorder = Recorder::default();
        let options = ProcessorOptions {
            mode: ResolveMode::Literal,
            ..Default::default()
        };
        let doc = DocumentProcessor::new(options, Metadata::default())
            .unwrap()
            .with_renderer(recorder.clone())
            .process_sync(":::div{.tip}\n**Bold** text\n:::")
            .unwrap();

        let expected = "<div class=\"tip\">\n<p><strong>Bold</strong> text</p>\n</div>\n";
        assert_eq!(recorder.seen.lock().unwrap().as_slice(), &[expected.to_owned()]);
        assert_eq!(doc.text(), expected);
    }

    #[test]
    fn test_hint_mode_skips_renderer() {
        let recorder = Recorder::default();
        processor(ResolveMode::Hint)
            .with_renderer(recorder.clone())
            .process_sync("Hello")
            .unwrap();
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_renderer_failure_propagates() {
        let result = processor(ResolveMode::Literal)
            .with_renderer(Failing)
            .process_sync("Hello");
        let Err(err) = result else {
            panic!("expected renderer failure");
        };
        assert!(matches!(err, ProcessError::Renderer(_)));
        assert_eq!(err.to_string(), "Renderer failed: engine crashed");
    }

    #[test]
    fn test_malformed_preamble_is_not_fatal() {
        for mode in MODES {
            let doc = process(mode, "---\ntitle: [unclosed\n---\n\nBody");
            assert!(doc.metadata().is_empty());
            assert!(matches!(
                doc.warnings(),
                [Warning::MalformedPreamble(_)]
            ));
            assert_eq!(doc.text(), "<p>Body</p>", "{mode:?}");
        }
    }

    #[test]
    fn test_option_fallbacks() {
        let options = ProcessorOptions {
            title: Some("Fallback".to_owned()),
            language: Some("en".to_owned()),
            style: vec!["print.css".to_owned(), "a.css".to_owned()],
            ..Default::default()
        };
        let metadata = Metadata {
            links: vec!["a.css".to_owned()],
            ..Default::default()
        };
        let doc = DocumentProcessor::new(options, metadata)
            .unwrap()
            .process_sync("---\ntitle: Preamble\nlink: b.css\n---\n\nBody")
            .unwrap();

        let merged = doc.metadata();
        assert_eq!(merged.title.as_deref(), Some("Preamble"));
        assert_eq!(merged.lang.as_deref(), Some("en"));
        assert_eq!(merged.links, vec!["a.css", "b.css", "print.css"]);
    }

    #[test]
    fn test_configured_directives() {
        let options = ProcessorOptions {
            directives: vec![
                DirectiveConfig::default(),
                DirectiveConfig {
                    name: "aside".to_owned(),
                    tag: "aside".to_owned(),
                },
            ],
            ..Default::default()
        };
        let doc = DocumentProcessor::new(options, Metadata::default())
            .unwrap()
            .process_sync(":::aside{.margin}\nNote\n:::")
            .unwrap();
        assert_eq!(doc.text(), "<aside class=\"margin\">\n<p>Note</p>\n</aside>");
    }

    #[test]
    fn test_hard_line_breaks() {
        let options = ProcessorOptions {
            hard_line_breaks: true,
            ..Default::default()
        };
        let doc = DocumentProcessor::new(options, Metadata::default())
            .unwrap()
            .process_sync("one\ntwo")
            .unwrap();
        assert_eq!(doc.text(), "<p>one<br>\ntwo</p>");
    }

    #[test]
    fn test_processor_is_reusable() {
        let processor = processor(ResolveMode::Hint);
        let first = processor.process_sync(":::div{.a}\nX\n:::").unwrap();
        let second = processor.process_sync(":::div{.a}\nX\n:::").unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        for mode in MODES {
            let processor = processor(mode);
            let input = ":::div{.note}\n*Hi*\n:::";
            let asynchronous = processor.process(input).await.unwrap();
            assert_eq!(asynchronous, processor.process_sync(input).unwrap());
        }
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = ProcessorOptions {
            directives: vec![DirectiveConfig {
                name: "div".to_owned(),
                tag: "<div>".to_owned(),
            }],
            ..Default::default()
        };
        let Err(err) = DocumentProcessor::new(options, Metadata::default()) else {
            panic!("expected invalid options");
        };
        assert!(matches!(err, ProcessError::Config(ConfigError::Validation(_))));
        assert_eq!(
            err.to_string(),
            "Invalid options: directives[0].tag must be an HTML element name"
        );
    }

    #[test]
    fn test_document_settings_override_options() {
        let input = "---\ntitle: Doc\nvfm:\n  partial: false\n  hardLineBreaks: true\n---\n\none\ntwo";
        for mode in MODES {
            let doc = process(mode, input);
            assert!(doc.text().starts_with("<!doctype html>"), "{mode:?}");
            assert!(doc.text().contains("<p>one<br>\ntwo</p>"), "{mode:?}: {}", doc.text());
        }

        let options = ProcessorOptions {
            partial: false,
            hard_line_breaks: true,
            ..Default::default()
        };
        let doc = DocumentProcessor::new(options, Metadata::default())
            .unwrap()
            .process_sync("---\nvfm:\n  partial: true\n  hardLineBreaks: false\n---\n\none\ntwo")
            .unwrap();
        assert_eq!(doc.text(), "<p>one\ntwo</p>");
    }

    #[test]
    fn test_adjacent_emphasis_survives() {
        for mode in MODES {
            let doc = process(mode, "*one*_two_ and **x*y***");
            assert_eq!(
                doc.text(),
                "<p><em>one</em><em>two</em> and <strong>x<em>y</em></strong></p>",
                "{mode:?}"
            );
        }
    }

    #[test]
    fn test_directive_inside_list_item() {
        for mode in MODES {
            let doc = process(mode, "- one\n\n  :::div{.note}\n  Hi\n  :::\n- two\n");
            assert!(doc.warnings().is_empty(), "{mode:?}: {:?}", doc.warnings());
            assert!(
                doc.text().contains("<div class=\"note\">\n<p>Hi</p>\n</div>"),
                "{mode:?}: {}",
                doc.text()
            );
            assert!(doc.text().starts_with("<ul>"), "{mode:?}");
        }
    }

    #[test]
    fn test_directive_inside_blockquote() {
        for mode in MODES {
            let doc = process(mode, "> :::div{.note}\n> Hi\n> :::\n");
            assert!(doc.warnings().is_empty(), "{mode:?}: {:?}", doc.warnings());
            assert_eq!(
                doc.text(),
                "<blockquote>\n<div class=\"note\">\n<p>Hi</p>\n</div>\n</blockquote>",
                "{mode:?}"
            );
        }
    }

    #[test]
    fn test_blank_line_in_literal_fragment_is_reported() {
        let doc = process(ResolveMode::Literal, ":::div{.y}\n<pre>\na\n\nb\n</pre>\n:::");
        assert!(
            doc.warnings()
                .iter()
                .any(|w| matches!(w, Warning::SerializationGap { .. })),
            "{:?}",
            doc.warnings()
        );
    }
}
