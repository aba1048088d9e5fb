//! Container directives: `:::name[label]{attrs}` ... `:::`
//!
//! Fences are recognised line by line before markup parsing, so a directive
//! body is parsed as ordinary markup and nests freely. Resolution happens
//! later on the tree: [`DirectiveResolver`] asks the registered
//! [`ContainerDirective`] handlers for a rendering hint per directive.
//!
//! Malformed fences are never fatal. They stay in the document as literal
//! text and are reported as warnings.

mod attributes;
mod container;
mod fence;
pub(crate) mod nesting;
mod resolver;
pub(crate) mod scan;
mod syntax;

pub use attributes::{AttributeError, Attributes};
pub use container::{ContainerDirective, GenericContainer};
pub use resolver::{DirectiveResolver, ResolveMode};
