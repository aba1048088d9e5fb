//! Markup tree to HTML tree projection.

use super::{Element, HtmlNode};
use crate::ast::{DirectiveNode, Node, RenderingHint};

/// Where a node is being projected.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Context {
    Block,
    /// Content of a tight list item: paragraphs are unwrapped.
    TightItem,
    Inline,
}

/// Project a markup tree onto an HTML tree.
///
/// Resolved directives become elements as their hint prescribes. An
/// unresolved directive is written as its literal fences around its
/// projected content, so it stays visible. The preamble produces nothing.
///
/// # Example
///
/// ```
/// use pressmark_renderer::{html, parse};
///
/// let tree = parse("# Hi\n\n- a\n- b").tree;
/// assert_eq!(
///     html::project(&tree).to_html(),
///     "<h1>Hi</h1>\n<ul>\n<li>a</li>\n<li>b</li>\n</ul>"
/// );
/// ```
#[must_use]
pub fn project(tree: &Node) -> HtmlNode {
    match tree {
        Node::Root { children } => HtmlNode::Root(project_all(children, Context::Block)),
        other => HtmlNode::Root(project_all(std::slice::from_ref(other), Context::Block)),
    }
}

/// Render a resolved directive as one HTML block with no blank lines, so it
/// survives as a single raw HTML block in markup.
pub(crate) fn literal_fragment(directive: &DirectiveNode, hint: &RenderingHint) -> String {
    HtmlNode::Element(hinted_element(directive, hint)).to_html_single_block()
}

fn hinted_element(directive: &DirectiveNode, hint: &RenderingHint) -> Element {
    let mut element = Element::new(hint.tag.clone());
    for (name, value) in &hint.attributes {
        element = element.with_attr(name.clone(), value.clone());
    }
    element.with_children(project_all(&directive.children, Context::Block))
}

fn project_all(nodes: &[Node], ctx: Context) -> Vec<HtmlNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        project_node(node, ctx, &mut out);
    }
    out
}

fn element(tag: &str, children: Vec<HtmlNode>) -> HtmlNode {
    Element::new(tag).with_children(children).into()
}

fn text(value: impl Into<String>) -> HtmlNode {
    HtmlNode::Text(value.into())
}

fn project_node(node: &Node, ctx: Context, out: &mut Vec<HtmlNode>) {
    match node {
        Node::Root { children } => out.extend(project_all(children, Context::Block)),
        Node::Text { value } => out.push(text(value.as_str())),
        Node::Paragraph { children } if ctx == Context::TightItem => {
            out.extend(project_all(children, Context::Inline));
        }
        Node::Paragraph { children } => out.push(element("p", project_all(children, Context::Inline))),
        Node::Heading { depth, children } => {
            let tag = format!("h{}", (*depth).clamp(1, 6));
            out.push(element(&tag, project_all(children, Context::Inline)));
        }
        Node::Emphasis { children } => out.push(element("em", project_all(children, Context::Inline))),
        Node::Strong { children } => {
            out.push(element("strong", project_all(children, Context::Inline)));
        }
        Node::InlineCode { value } => out.push(element("code", vec![text(value.as_str())])),
        Node::Code { lang, value, .. } => {
            let mut code = Element::new("code");
            if let Some(lang) = lang {
                code = code.with_attr("class", format!("language-{lang}"));
            }
            if !value.is_empty() {
                code.children.push(text(format!("{value}\n")));
            }
            out.push(element("pre", vec![code.into()]));
        }
        Node::List {
            ordered,
            start,
            tight,
            children,
        } => {
            let mut list = Element::new(if *ordered { "ol" } else { "ul" });
            if let Some(start) = start.filter(|&n| *ordered && n != 1) {
                list = list.with_attr("start", start.to_string());
            }
            let item_ctx = if *tight {
                Context::TightItem
            } else {
                Context::Block
            };
            for child in children {
                match child {
                    Node::ListItem { children } => {
                        list.children.push(element("li", project_all(children, item_ctx)));
                    }
                    other => project_node(other, Context::Block, &mut list.children),
                }
            }
            out.push(list.into());
        }
        Node::ListItem { children } => out.push(element("li", project_all(children, Context::Block))),
        Node::Blockquote { children } => {
            out.push(element("blockquote", project_all(children, Context::Block)));
        }
        Node::Link {
            url,
            title,
            children,
        } => {
            let mut link = Element::new("a").with_attr("href", url.as_str());
            if let Some(title) = title {
                link = link.with_attr("title", title.as_str());
            }
            out.push(link.with_children(project_all(children, Context::Inline)).into());
        }
        Node::Image { url, title, alt } => {
            let mut image = Element::new("img")
                .with_attr("src", url.as_str())
                .with_attr("alt", alt.as_str());
            if let Some(title) = title {
                image = image.with_attr("title", title.as_str());
            }
            out.push(image.into());
        }
        Node::Break => {
            out.push(element("br", Vec::new()));
            out.push(text("\n"));
        }
        Node::ThematicBreak => out.push(element("hr", Vec::new())),
        Node::Html { value } => out.push(HtmlNode::Raw {
            value: value.clone(),
            block: ctx != Context::Inline,
        }),
        Node::Preamble { .. } => {}
        Node::Directive(directive) => match &directive.hint {
            Some(hint) => out.push(hinted_element(directive, hint).into()),
            None => {
                out.push(element("p", vec![text(directive.open_fence())]));
                out.extend(project_all(&directive.children, Context::Block));
                out.push(element("p", vec![text(":::")]));
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn render(source: &str) -> String {
        project(&parse(source).tree).to_html()
    }

    fn note_hint() -> RenderingHint {
        RenderingHint {
            tag: "div".to_owned(),
            attributes: BTreeMap::from([("class".to_owned(), "note".to_owned())]),
        }
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(render("a\n\nb *c*"), "<p>a</p>\n<p>b <em>c</em></p>");
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            render("```js\nlet x;\n```"),
            "<pre><code class=\"language-js\">let x;\n</code></pre>"
        );
        assert_eq!(render("```\n```"), "<pre><code></code></pre>");
    }

    #[test]
    fn test_loose_list_and_start() {
        assert_eq!(
            render("2. a\n\n3. b"),
            "<ol start=\"2\">\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ol>"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(render("> q"), "<blockquote>\n<p>q</p>\n</blockquote>");
    }

    #[test]
    fn test_link_image_break() {
        assert_eq!(
            render("[a](u \"t\")  \n![b](i.png)"),
            "<p><a href=\"u\" title=\"t\">a</a><br>\n<img src=\"i.png\" alt=\"b\"></p>"
        );
    }

    #[test]
    fn test_inline_html_and_block_html() {
        assert_eq!(
            render("<aside>x</aside>\n\na <b>c</b>"),
            "<aside>x</aside>\n<p>a <b>c</b></p>"
        );
    }

    #[test]
    fn test_preamble_dropped() {
        assert_eq!(render("---\ntitle: x\n---\n\nbody"), "<p>body</p>");
    }

    #[test]
    fn test_unresolved_directive_is_visible() {
        assert_eq!(
            render(":::callout{.note}\nHi\n:::"),
            "<p>:::callout{.note}</p>\n<p>Hi</p>\n<p>:::</p>"
        );
    }

    #[test]
    fn test_hinted_directive() {
        let mut tree = parse(":::div{.note}\nHello\n:::").tree;
        if let Some(children) = tree.children_mut()
            && let Some(Node::Directive(directive)) = children.first_mut()
        {
            directive.hint = Some(note_hint());
        }
        assert_eq!(
            project(&tree).to_html(),
            "<div class=\"note\">\n<p>Hello</p>\n</div>"
        );
    }

    #[test]
    fn test_literal_fragment_has_no_blank_lines() {
        let Node::Root { children } = parse(":::div{.note}\nline one\nline two\n\n```\na\n\nb\n```\n:::").tree
        else {
            panic!("expected root");
        };
        let Node::Directive(directive) = &children[0] else {
            panic!("expected directive");
        };
        let html = literal_fragment(directive, &note_hint());
        assert_eq!(
            html,
            "<div class=\"note\">\n<p>line one&#10;line two</p>\n<pre><code>a&#10;&#10;b&#10;</code></pre>\n</div>"
        );
    }
}
