//! HTML tree and serialization.
//!
//! [`project`] maps a markup tree onto [`HtmlNode`]s, HTML transforms such
//! as [`FigureTransform`] rewrite that tree, and [`HtmlNode::to_html`] writes
//! it out. Structural newlines are added by the writer around block
//! elements, so the tree itself holds no whitespace-only text.

mod document;
mod figure;
mod project;

pub use document::DocumentWrapper;
pub use figure::FigureTransform;
pub(crate) use project::literal_fragment;
pub use project::project;

use crate::util::{escape_attr, escape_text};

/// A node of the HTML tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HtmlNode {
    Root(Vec<HtmlNode>),
    Doctype,
    Element(Element),
    Text(String),
    /// Pre-rendered HTML, written verbatim.
    Raw { value: String, block: bool },
}

/// An HTML element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    /// Attributes in output order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<HtmlNode>,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements written on their own line.
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "details",
    "div",
    "dl",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hr",
    "html",
    "li",
    "link",
    "main",
    "meta",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "title",
    "ul",
];

/// Elements whose block children go on separate lines.
const WRAPPING_ELEMENTS: &[&str] = &[
    "article",
    "aside",
    "blockquote",
    "body",
    "details",
    "div",
    "footer",
    "head",
    "header",
    "html",
    "li",
    "main",
    "nav",
    "ol",
    "section",
    "ul",
];

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<HtmlNode>) -> Self {
        self.children = children;
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl From<Element> for HtmlNode {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl HtmlNode {
    /// Whether the writer puts this node on its own line.
    fn is_block(&self) -> bool {
        match self {
            Self::Element(element) => BLOCK_ELEMENTS.contains(&element.tag.as_str()),
            Self::Raw { block, .. } => *block,
            Self::Root(_) | Self::Doctype => true,
            Self::Text(_) => false,
        }
    }

    /// Serialize to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, false);
        out
    }

    /// Serialize to HTML without any line break inside text, so the result
    /// never contains a blank line. Text newlines become `&#10;`.
    #[must_use]
    pub fn to_html_single_block(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, true);
        out
    }

    fn write(&self, out: &mut String, encode_newlines: bool) {
        match self {
            Self::Root(children) => write_children(children, false, out, encode_newlines),
            Self::Doctype => out.push_str("<!doctype html>"),
            Self::Text(text) if encode_newlines => {
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        out.push_str("&#10;");
                    }
                    escape_text(line, out);
                }
            }
            Self::Text(text) => escape_text(text, out),
            Self::Raw { value, .. } => out.push_str(value),
            Self::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    return;
                }

                let wrap = WRAPPING_ELEMENTS.contains(&element.tag.as_str());
                write_children(&element.children, wrap, out, encode_newlines);

                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

/// Write `children`, breaking lines around block nodes.
///
/// With `wrap`, a line break also follows the opening tag and precedes the
/// closing tag whenever any child is a block.
fn write_children(children: &[HtmlNode], wrap: bool, out: &mut String, encode_newlines: bool) {
    let wrap = wrap && children.iter().any(HtmlNode::is_block);
    if wrap {
        out.push('\n');
    }
    for (i, child) in children.iter().enumerate() {
        if i > 0 && (child.is_block() || children[i - 1].is_block()) {
            out.push('\n');
        }
        child.write(out, encode_newlines);
    }
    if wrap {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(text: &str) -> HtmlNode {
        Element::new("p")
            .with_children(vec![HtmlNode::Text(text.to_owned())])
            .into()
    }

    #[test]
    fn test_root_joins_blocks_with_newline() {
        let root = HtmlNode::Root(vec![p("a"), p("b")]);
        assert_eq!(root.to_html(), "<p>a</p>\n<p>b</p>");
    }

    #[test]
    fn test_wrapping_element() {
        let div: HtmlNode = Element::new("div")
            .with_attr("class", "note")
            .with_children(vec![p("Hello")])
            .into();
        assert_eq!(div.to_html(), "<div class=\"note\">\n<p>Hello</p>\n</div>");
    }

    #[test]
    fn test_inline_children_stay_on_one_line() {
        let li: HtmlNode = Element::new("li")
            .with_children(vec![
                HtmlNode::Text("a ".to_owned()),
                Element::new("em")
                    .with_children(vec![HtmlNode::Text("b".to_owned())])
                    .into(),
            ])
            .into();
        assert_eq!(li.to_html(), "<li>a <em>b</em></li>");
    }

    #[test]
    fn test_void_element_and_escaping() {
        let img: HtmlNode = Element::new("img")
            .with_attr("src", "a&b.png")
            .with_attr("alt", "say \"hi\"")
            .into();
        assert_eq!(img.to_html(), r#"<img src="a&amp;b.png" alt="say &quot;hi&quot;">"#);

        assert_eq!(HtmlNode::Text("1 < 2".to_owned()).to_html(), "1 &lt; 2");
    }

    #[test]
    fn test_single_block_encodes_text_newlines() {
        let div: HtmlNode = Element::new("div")
            .with_children(vec![p("a\n\nb")])
            .into();
        let html = div.to_html_single_block();
        assert_eq!(html, "<div>\n<p>a&#10;&#10;b</p>\n</div>");
        assert!(!html.contains("\n\n"));
    }

    #[test]
    fn test_raw_block_gets_own_line() {
        let root = HtmlNode::Root(vec![
            p("a"),
            HtmlNode::Raw {
                value: "<hr class=\"x\">".to_owned(),
                block: true,
            },
        ]);
        assert_eq!(root.to_html(), "<p>a</p>\n<hr class=\"x\">");
    }

    #[test]
    fn test_attr_lookup() {
        let element = Element::new("a").with_attr("href", "x");
        assert_eq!(element.attr("href"), Some("x"));
        assert_eq!(element.attr("title"), None);
    }
}
