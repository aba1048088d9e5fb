//! Full-document wrapper.

use pressmark_meta::Metadata;

use super::{Element, HtmlNode};
use crate::pipeline::HtmlTransform;
use crate::warning::Warning;

/// Wraps a fragment into a complete HTML document whose head is built from
/// document metadata.
///
/// # Example
///
/// ```
/// use pressmark_meta::Metadata;
/// use pressmark_renderer::html::{DocumentWrapper, HtmlNode};
/// use pressmark_renderer::HtmlTransform;
///
/// let metadata = Metadata { title: Some("Doc".into()), ..Default::default() };
/// let mut tree = HtmlNode::Root(Vec::new());
/// DocumentWrapper::new(metadata).transform(&mut tree, &mut Vec::new());
/// assert!(tree.to_html().contains("<title>Doc</title>"));
/// ```
#[derive(Clone, Debug)]
pub struct DocumentWrapper {
    metadata: Metadata,
}

impl DocumentWrapper {
    #[must_use]
    pub fn new(metadata: Metadata) -> Self {
        Self { metadata }
    }

    fn head(&self) -> Element {
        let meta = &self.metadata;
        let mut head = vec![
            Element::new("meta").with_attr("charset", "utf-8").into(),
            Element::new("meta")
                .with_attr("name", "viewport")
                .with_attr("content", "width=device-width, initial-scale=1")
                .into(),
        ];

        if let Some(title) = &meta.title {
            head.push(
                Element::new("title")
                    .with_children(vec![HtmlNode::Text(title.clone())])
                    .into(),
            );
        }

        let keywords = meta.keywords.join(", ");
        let named = [
            ("author", meta.author.as_deref()),
            ("description", meta.description.as_deref()),
            ("keywords", Some(keywords.as_str()).filter(|k| !k.is_empty())),
            ("date", meta.date.as_deref()),
        ];
        for (name, content) in named {
            if let Some(content) = content {
                head.push(
                    Element::new("meta")
                        .with_attr("name", name)
                        .with_attr("content", content)
                        .into(),
                );
            }
        }

        for href in &meta.links {
            head.push(
                Element::new("link")
                    .with_attr("rel", "stylesheet")
                    .with_attr("href", href.as_str())
                    .into(),
            );
        }

        Element::new("head").with_children(head)
    }
}

impl HtmlTransform for DocumentWrapper {
    fn name(&self) -> &str {
        "document"
    }

    fn transform(&mut self, tree: &mut HtmlNode, _warnings: &mut Vec<Warning>) {
        let body = match std::mem::replace(tree, HtmlNode::Root(Vec::new())) {
            HtmlNode::Root(children) => children,
            other => vec![other],
        };

        let mut html = Element::new("html");
        if let Some(lang) = &self.metadata.lang {
            html = html.with_attr("lang", lang.as_str());
        }
        let html = html.with_children(vec![
            self.head().into(),
            Element::new("body").with_children(body).into(),
        ]);

        *tree = HtmlNode::Root(vec![HtmlNode::Doctype, html.into()]);
    }
}
