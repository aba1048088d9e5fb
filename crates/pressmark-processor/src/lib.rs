//! Document processor for pressmark.
//!
//! A [`DocumentProcessor`] is built from [`ProcessorOptions`] and caller
//! metadata, and turns markup into HTML:
//!
//! - **Hint mode**: parse, resolve directives to rendering hints, project to
//!   HTML, wrap figures and, for full documents, add the document shell.
//! - **Literal mode**: parse, collapse directives into raw HTML, write the
//!   tree back to markup and hand the text to a [`DocumentRenderer`].
//!
//! # Example
//!
//! ```
//! use pressmark_processor::{DocumentProcessor, Metadata, ProcessorOptions};
//!
//! let processor = DocumentProcessor::new(ProcessorOptions::default(), Metadata::default())?;
//! let doc = processor.process_sync(":::div{.note}\n**Hello**\n:::")?;
//!
//! assert_eq!(doc.text(), "<div class=\"note\">\n<p><strong>Hello</strong></p>\n</div>");
//! assert!(doc.unconverted_directives().is_empty());
//! # Ok::<(), pressmark_processor::ProcessError>(())
//! ```

mod document;
mod processor;
mod renderer;

pub use document::ProcessedDocument;
pub use pressmark_config::{DirectiveConfig, ProcessorOptions};
pub use pressmark_meta::Metadata;
pub use pressmark_renderer::{ResolveMode, Warning};
pub use processor::{DocumentProcessor, ProcessError};
pub use renderer::{BuiltinRenderer, DocumentRenderer, RendererError};
