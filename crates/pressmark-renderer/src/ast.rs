//! Markup syntax tree.
//!
//! [`Node`] covers the block and inline constructs pressmark understands,
//! plus container directives. Every tree produced by [`crate::Parser`] uses
//! only these variants, so [`crate::serialize`] can always write it back out.

use std::collections::BTreeMap;

use crate::directive::Attributes;

/// A node of the markup tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Document root.
    Root { children: Vec<Node> },
    /// Literal text. Soft line breaks are kept as `\n`.
    Text { value: String },
    Paragraph { children: Vec<Node> },
    /// ATX or setext heading, `depth` in `1..=6`.
    Heading { depth: u8, children: Vec<Node> },
    Emphasis { children: Vec<Node> },
    Strong { children: Vec<Node> },
    InlineCode { value: String },
    /// Code block. `value` has no trailing newline.
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    List {
        ordered: bool,
        /// First number of an ordered list.
        start: Option<u64>,
        /// Tight lists render items without paragraph wrappers.
        tight: bool,
        children: Vec<Node>,
    },
    ListItem { children: Vec<Node> },
    Blockquote { children: Vec<Node> },
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Node>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    /// Hard line break.
    Break,
    ThematicBreak,
    /// Raw HTML, block or inline.
    Html { value: String },
    /// Raw YAML preamble payload.
    Preamble { value: String },
    /// `:::name[label]{attrs}` container directive.
    Directive(DirectiveNode),
}

/// A container directive and its block content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectiveNode {
    pub name: String,
    pub label: Option<String>,
    pub attributes: Attributes,
    pub children: Vec<Node>,
    /// Set once a handler has resolved the directive.
    pub hint: Option<RenderingHint>,
}

/// How a resolved directive renders: element tag plus attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderingHint {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl Node {
    /// Create a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Create a paragraph.
    #[must_use]
    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::Paragraph { children }
    }

    /// Create a document root.
    #[must_use]
    pub fn root(children: Vec<Node>) -> Self {
        Self::Root { children }
    }

    /// Type name as used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Root { .. } => "root",
            Self::Text { .. } => "text",
            Self::Paragraph { .. } => "paragraph",
            Self::Heading { .. } => "heading",
            Self::Emphasis { .. } => "emphasis",
            Self::Strong { .. } => "strong",
            Self::InlineCode { .. } => "inlineCode",
            Self::Code { .. } => "code",
            Self::List { .. } => "list",
            Self::ListItem { .. } => "listItem",
            Self::Blockquote { .. } => "blockquote",
            Self::Link { .. } => "link",
            Self::Image { .. } => "image",
            Self::Break => "break",
            Self::ThematicBreak => "thematicBreak",
            Self::Html { .. } => "html",
            Self::Preamble { .. } => "yaml",
            Self::Directive(_) => "containerDirective",
        }
    }

    /// Child nodes, empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Root { children }
            | Self::Paragraph { children }
            | Self::Heading { children, .. }
            | Self::Emphasis { children }
            | Self::Strong { children }
            | Self::List { children, .. }
            | Self::ListItem { children }
            | Self::Blockquote { children }
            | Self::Link { children, .. } => children,
            Self::Directive(directive) => &directive.children,
            Self::Text { .. }
            | Self::InlineCode { .. }
            | Self::Code { .. }
            | Self::Image { .. }
            | Self::Break
            | Self::ThematicBreak
            | Self::Html { .. }
            | Self::Preamble { .. } => &[],
        }
    }

    /// Mutable child list, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Root { children }
            | Self::Paragraph { children }
            | Self::Heading { children, .. }
            | Self::Emphasis { children }
            | Self::Strong { children }
            | Self::List { children, .. }
            | Self::ListItem { children }
            | Self::Blockquote { children }
            | Self::Link { children, .. } => Some(children),
            Self::Directive(directive) => Some(&mut directive.children),
            _ => None,
        }
    }

    /// Whether the node is phrasing content.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Text { .. }
                | Self::Emphasis { .. }
                | Self::Strong { .. }
                | Self::InlineCode { .. }
                | Self::Link { .. }
                | Self::Image { .. }
                | Self::Break
        )
    }

    /// Concatenated text of the node and its descendants.
    ///
    /// Line breaks contribute a space.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { value } | Self::InlineCode { value } => out.push_str(value),
            Self::Image { alt, .. } => out.push_str(alt),
            Self::Break => out.push(' '),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Call `f` for every node of the subtree, parents before children.
    pub fn walk(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }
}

impl DirectiveNode {
    /// Create an unresolved directive.
    pub fn new(name: impl Into<String>, attributes: Attributes, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            label: None,
            attributes,
            children,
            hint: None,
        }
    }

    /// Opening fence line, e.g. `:::div[Label]{.note}`.
    #[must_use]
    pub fn open_fence(&self) -> String {
        let mut fence = format!(":::{}", self.name);
        if let Some(label) = &self.label {
            fence.push('[');
            fence.push_str(label);
            fence.push(']');
        }
        fence.push_str(&self.attributes.to_syntax());
        fence
    }
}
