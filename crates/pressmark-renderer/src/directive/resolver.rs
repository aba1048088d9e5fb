//! Directive resolution.

use super::ContainerDirective;
use crate::ast::Node;
use crate::html::literal_fragment;
use crate::pipeline::TreeTransform;
use crate::warning::{UnresolvedReason, Warning, report};

/// What a resolved directive turns into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ResolveMode {
    /// Attach a [`RenderingHint`](crate::RenderingHint) and keep the
    /// directive in the tree for the HTML projector.
    #[default]
    Hint,
    /// Replace the directive by a raw HTML node, for consumers that only
    /// read markup text.
    Literal,
}

/// Resolves container directives against registered handlers.
///
/// Directives with no matching handler, or whose handler declines them, are
/// left in place and reported as [`Warning::UnresolvedDirective`].
///
/// # Example
///
/// ```
/// use pressmark_renderer::{
///     DirectiveResolver, GenericContainer, Node, ResolveMode, TreeTransform, parse,
/// };
///
/// let mut tree = parse(":::div{.note}\nHello\n:::").tree;
/// let mut warnings = Vec::new();
/// DirectiveResolver::new(ResolveMode::Literal)
///     .with_container(GenericContainer::div())
///     .transform(&mut tree, &mut warnings);
///
/// assert!(warnings.is_empty());
/// assert_eq!(
///     tree.children()[0],
///     Node::Html { value: "<div class=\"note\">\n<p>Hello</p>\n</div>".to_owned() }
/// );
/// ```
pub struct DirectiveResolver {
    mode: ResolveMode,
    handlers: Vec<Box<dyn ContainerDirective>>,
}

#[derive(Default)]
struct Counts {
    resolved: usize,
    unresolved: usize,
}

impl DirectiveResolver {
    #[must_use]
    pub fn new(mode: ResolveMode) -> Self {
        Self {
            mode,
            handlers: Vec::new(),
        }
    }

    /// Register a container handler. Later registrations do not override
    /// earlier ones with the same name.
    #[must_use]
    pub fn with_container<D: ContainerDirective + 'static>(mut self, directive: D) -> Self {
        self.handlers.push(Box::new(directive));
        self
    }

    #[must_use]
    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    /// Resolve every directive in `tree`.
    pub fn resolve(&mut self, tree: &mut Node, warnings: &mut Vec<Warning>) {
        let mut counts = Counts::default();
        self.resolve_node(tree, warnings, &mut counts);
        tracing::debug!(
            mode = ?self.mode,
            resolved = counts.resolved,
            unresolved = counts.unresolved,
            "Resolved directives"
        );
    }

    fn resolve_node(&mut self, node: &mut Node, warnings: &mut Vec<Warning>, counts: &mut Counts) {
        if let Node::Directive(directive) = node
            && directive.hint.is_none()
        {
            let outcome = match self.handlers.iter_mut().find(|h| h.name() == directive.name) {
                Some(handler) => handler.resolve(directive),
                None => Err(UnresolvedReason::UnknownName),
            };
            match outcome {
                Ok(hint) => {
                    directive.hint = Some(hint);
                    counts.resolved += 1;
                }
                Err(reason) => {
                    counts.unresolved += 1;
                    report(
                        warnings,
                        Warning::UnresolvedDirective {
                            name: directive.name.clone(),
                            reason,
                        },
                    );
                }
            }
        }

        if let Some(children) = node.children_mut() {
            for child in children {
                self.resolve_node(child, warnings, counts);
            }
        }

        if self.mode == ResolveMode::Literal
            && let Node::Directive(directive) = node
            && let Some(hint) = &directive.hint
        {
            let value = literal_fragment(directive, hint);
            // An HTML block ends at a blank line, so the fragment would be
            // read back as several blocks.
            if value.lines().any(|line| line.trim().is_empty()) {
                report(
                    warnings,
                    Warning::SerializationGap {
                        node: "containerDirective",
                        detail: format!(
                            "literal HTML of :::{} contains a blank line and reads back split",
                            directive.name
                        ),
                    },
                );
            }
            *node = Node::Html { value };
        }
    }
}

impl TreeTransform for DirectiveResolver {
    fn name(&self) -> &str {
        "directives"
    }

    fn transform(&mut self, tree: &mut Node, warnings: &mut Vec<Warning>) {
        self.resolve(tree, warnings);
    }
}
