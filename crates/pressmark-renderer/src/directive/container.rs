//! Container directive handlers.

use std::collections::BTreeMap;

use crate::ast::{DirectiveNode, RenderingHint};
use crate::warning::UnresolvedReason;

/// Handler for container directives: `:::name` ... `:::`
///
/// A handler inspects a parsed directive and decides how it renders. It
/// never touches the directive's children; the resolver and the output
/// stages take care of those.
///
/// # Thread Safety
///
/// Handlers implement `Send` only (not `Sync`) since each document gets its
/// own resolver instance.
///
/// # Example
///
/// ```
/// use pressmark_renderer::{ContainerDirective, DirectiveNode, RenderingHint, UnresolvedReason};
///
/// struct Aside;
///
/// impl ContainerDirective for Aside {
///     fn name(&self) -> &str { "aside" }
///
///     fn resolve(&mut self, _directive: &DirectiveNode) -> Result<RenderingHint, UnresolvedReason> {
///         Ok(RenderingHint { tag: "aside".to_owned(), ..Default::default() })
///     }
/// }
/// ```
pub trait ContainerDirective: Send {
    /// Directive name, matched against `:::name`.
    fn name(&self) -> &str;

    /// Produce the rendering hint for `directive`.
    ///
    /// # Errors
    ///
    /// Returns the reason the directive cannot be rendered. The directive is
    /// then left untouched and reported as unresolved.
    fn resolve(&mut self, directive: &DirectiveNode) -> Result<RenderingHint, UnresolvedReason>;
}

/// Maps `:::name{.class}` onto an element carrying that class.
///
/// A class is required. An `id` attribute is carried over when present.
#[derive(Clone, Debug)]
pub struct GenericContainer {
    name: String,
    tag: String,
}

impl GenericContainer {
    /// `tag` is written into the output as is, so it must be a valid HTML
    /// element name. `ProcessorOptions::validate` checks this for
    /// configured directives.
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// The `:::div{.class}` to `<div class="...">` handler.
    #[must_use]
    pub fn div() -> Self {
        Self::new("div", "div")
    }
}

impl ContainerDirective for GenericContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&mut self, directive: &DirectiveNode) -> Result<RenderingHint, UnresolvedReason> {
        let class = directive
            .attributes
            .class()
            .ok_or(UnresolvedReason::MissingClass)?;

        let mut attributes = BTreeMap::from([("class".to_owned(), class)]);
        if let Some(id) = &directive.attributes.id {
            attributes.insert("id".to_owned(), id.clone());
        }

        Ok(RenderingHint {
            tag: self.tag.clone(),
            attributes,
        })
    }
}
