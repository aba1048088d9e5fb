//! Figure wrapping for standalone images.

use super::{Element, HtmlNode};
use crate::pipeline::HtmlTransform;
use crate::warning::Warning;

/// Turns a paragraph holding nothing but an image into a `<figure>`.
///
/// A non-empty alt text is repeated in a `<figcaption>` hidden from
/// assistive technology, since the image already carries it.
#[derive(Clone, Copy, Debug, Default)]
pub struct FigureTransform;

impl HtmlTransform for FigureTransform {
    fn name(&self) -> &str {
        "figure"
    }

    fn transform(&mut self, tree: &mut HtmlNode, _warnings: &mut Vec<Warning>) {
        wrap_figures(tree);
    }
}

fn wrap_figures(node: &mut HtmlNode) {
    let children = match node {
        HtmlNode::Root(children) => children,
        HtmlNode::Element(element) => {
            if let Some(alt) = lone_image_alt(element) {
                element.tag = "figure".to_owned();
                if !alt.is_empty() {
                    let caption = Element::new("figcaption")
                        .with_attr("aria-hidden", "true")
                        .with_children(vec![HtmlNode::Text(alt)]);
                    element.children.push(caption.into());
                }
                return;
            }
            &mut element.children
        }
        HtmlNode::Doctype | HtmlNode::Text(_) | HtmlNode::Raw { .. } => return,
    };
    for child in children {
        wrap_figures(child);
    }
}

/// Alt text of the image if `element` is a `<p>` containing only an image.
fn lone_image_alt(element: &Element) -> Option<String> {
    if element.tag != "p" {
        return None;
    }
    match element.children.as_slice() {
        [HtmlNode::Element(image)] if image.tag == "img" => {
            Some(image.attr("alt").unwrap_or_default().to_owned())
        }
        _ => None,
    }
}
