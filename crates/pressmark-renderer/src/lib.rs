//! Markup tree pipeline for pressmark.
//!
//! Parses markup with container directives into a [`Node`] tree, resolves
//! directives against registered handlers, and writes the result either back
//! to markup ([`serialize`]) or to HTML ([`html::project`]).
//!
//! # Quick Start
//!
//! ```
//! use pressmark_renderer::{
//!     DirectiveResolver, GenericContainer, Pipeline, ResolveMode, html::FigureTransform,
//! };
//!
//! let mut pipeline = Pipeline::new()
//!     .with_tree_stage(
//!         DirectiveResolver::new(ResolveMode::Hint).with_container(GenericContainer::div()),
//!     )
//!     .with_html_stage(FigureTransform);
//!
//! let result = pipeline.render_html(":::div{.note}\n![A cat](cat.png)\n:::");
//! assert_eq!(
//!     result.output,
//!     "<div class=\"note\">\n<figure><img src=\"cat.png\" alt=\"A cat\">\
//!      <figcaption aria-hidden=\"true\">A cat</figcaption></figure>\n</div>"
//! );
//! ```
//!
//! # Resolution Modes
//!
//! - [`ResolveMode::Hint`]: directives keep their place in the tree and carry
//!   a [`RenderingHint`]. Use this when the tree goes straight to HTML.
//! - [`ResolveMode::Literal`]: directives are replaced by raw HTML, so the
//!   tree can be serialized to markup for a renderer that only reads text.
//!
//! # Diagnostics
//!
//! Nothing here fails on bad input. Every stage appends [`Warning`]s and
//! logs them through `tracing`.

mod ast;
mod conformance;
pub mod directive;
pub mod html;
mod markup;
mod parser;
mod pipeline;
mod util;
mod warning;

pub use ast::{DirectiveNode, Node, RenderingHint};
pub use conformance::unconverted_directives;
pub use directive::{
    AttributeError, Attributes, ContainerDirective, DirectiveResolver, GenericContainer,
    ResolveMode,
};
pub use markup::{Serialized, serialize};
pub use parser::{Parsed, Parser, parse};
pub use pipeline::{HtmlTransform, Pipeline, RenderResult, TreeTransform};
pub use warning::{UnresolvedReason, Warning};
