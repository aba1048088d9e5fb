//! Renderers for literal-mode output.

use pressmark_config::ProcessorOptions;
use pressmark_meta::Metadata;
use pressmark_renderer::Pipeline;
use pressmark_renderer::html::{DocumentWrapper, FigureTransform};

/// Error returned by a [`DocumentRenderer`].
pub type RendererError = Box<dyn std::error::Error + Send + Sync>;

/// A renderer that only reads markup text.
///
/// Literal mode serializes the resolved tree and passes the text here. The
/// renderer owns everything from that point on, including the document shell.
pub trait DocumentRenderer: Send + Sync {
    /// Render `markup` to HTML.
    ///
    /// # Errors
    ///
    /// Any error is returned to the caller of the processor unchanged.
    fn render(&self, markup: &str, metadata: &Metadata) -> Result<String, RendererError>;
}

/// Renders markup with the crate's own parser and HTML projection.
///
/// A `partial` document setting in the metadata takes precedence over the
/// option the renderer was built with.
///
/// No directive handlers are registered: by the time text reaches a
/// renderer, recognized directives are already raw HTML, and anything left
/// is shown as written.
#[derive(Clone, Debug)]
pub struct BuiltinRenderer {
    figures: bool,
    partial: bool,
}

impl Default for BuiltinRenderer {
    fn default() -> Self {
        Self {
            figures: true,
            partial: true,
        }
    }
}

impl BuiltinRenderer {
    #[must_use]
    pub fn from_options(options: &ProcessorOptions) -> Self {
        Self {
            figures: options.figures,
            partial: options.partial,
        }
    }
}

impl DocumentRenderer for BuiltinRenderer {
    fn render(&self, markup: &str, metadata: &Metadata) -> Result<String, RendererError> {
        let mut pipeline = Pipeline::new();
        if self.figures {
            pipeline = pipeline.with_html_stage(FigureTransform);
        }
        if !metadata.settings.partial.unwrap_or(self.partial) {
            pipeline = pipeline.with_html_stage(DocumentWrapper::new(metadata.clone()));
        }
        Ok(pipeline.render_html(markup).output)
    }
}
