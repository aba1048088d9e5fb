//! Markup parser.
//!
//! Builds a [`Node`] tree from markup text. Parsing never fails: malformed
//! directive fences stay literal text and are reported as warnings.
//!
//! The document is first split into its preamble and body. The body is then
//! cut into plain markup and container directives by a line scanner, and each
//! plain run is parsed with pulldown-cmark into tree nodes.
//!
//! List items and blockquotes that hold directive fences are not built from
//! pulldown-cmark's events. Their body is stripped of the container prefix
//! and parsed like a top-level block, so fences nest inside them too.
//!
//! Only CommonMark constructs are recognized. Tables, strikethrough, task
//! lists and footnotes stay literal text.

use std::ops::Range;

use pressmark_meta::split_preamble;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser as EventParser, Tag};

use crate::ast::{DirectiveNode, Node};
use crate::directive::nesting::{strip_item, strip_quote};
use crate::directive::scan::{Segment, split_blocks};
use crate::util::heading_level_to_num;
use crate::warning::Warning;

/// Markup parser.
///
/// # Example
///
/// ```
/// use pressmark_renderer::{Node, Parser};
///
/// let parsed = Parser::new().parse(":::div{.note}\nHello\n:::");
/// assert!(parsed.warnings.is_empty());
/// let Node::Root { children } = &parsed.tree else { unreachable!() };
/// assert_eq!(children[0].type_name(), "containerDirective");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Parser {
    hard_line_breaks: bool,
}

/// A parsed tree and the warnings raised while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parsed {
    pub tree: Node,
    pub warnings: Vec<Warning>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat every soft line break as a hard break.
    #[must_use]
    pub fn with_hard_line_breaks(mut self, enabled: bool) -> Self {
        self.hard_line_breaks = enabled;
        self
    }

    /// Parse `source` into a tree rooted at [`Node::Root`].
    #[must_use]
    pub fn parse(&self, source: &str) -> Parsed {
        let mut warnings = Vec::new();
        let mut children = Vec::new();

        let (body, first_line) = match split_preamble(source) {
            Some(preamble) => {
                children.push(Node::Preamble {
                    value: preamble.raw.to_owned(),
                });
                (preamble.body, preamble.line_count + 1)
            }
            None => (source, 1),
        };
        children.extend(self.parse_blocks(body, first_line, &mut warnings));

        tracing::debug!(
            blocks = children.len(),
            warnings = warnings.len(),
            "Parsed markup"
        );

        Parsed {
            tree: Node::Root { children },
            warnings,
        }
    }

    fn parse_blocks(&self, source: &str, first_line: usize, warnings: &mut Vec<Warning>) -> Vec<Node> {
        let mut nodes = Vec::new();
        for segment in split_blocks(source, first_line, warnings) {
            match segment {
                Segment::Markup { text, line } => {
                    nodes.extend(self.build_tree(text, line, warnings));
                }
                Segment::Directive {
                    name,
                    label,
                    attributes,
                    body,
                    body_line,
                } => {
                    let children = self.parse_blocks(body, body_line, warnings);
                    nodes.push(Node::Directive(DirectiveNode {
                        name,
                        label,
                        attributes,
                        children,
                        hint: None,
                    }));
                }
            }
        }
        nodes
    }

    fn build_tree(&self, text: &str, first_line: usize, warnings: &mut Vec<Warning>) -> Vec<Node> {
        let mut builder = TreeBuilder {
            stack: vec![(Frame::Root, Vec::new())],
            hard_line_breaks: self.hard_line_breaks,
        };
        let mut events = EventParser::new_ext(text, Options::empty()).into_offset_iter();

        while let Some((event, range)) = events.next() {
            match event {
                Event::Start(tag @ (Tag::Item | Tag::BlockQuote(_)))
                    if !builder.in_container() && text[range.clone()].contains(":::") =>
                {
                    let loose = skip_container(&mut events);
                    let start = text[..range.start].rfind('\n').map_or(0, |i| i + 1);
                    let body = &text[start..range.end];
                    let line = first_line + text[..start].matches('\n').count();
                    let stripped = if matches!(tag, Tag::Item) {
                        strip_item(body)
                    } else {
                        strip_quote(body)
                    };
                    let children = self.parse_blocks(&stripped, line, warnings);
                    builder.container(tag, loose, children);
                }
                event => builder.event(event),
            }
        }
        builder.finish()
    }
}

/// Consume events up to the end of the container just opened. Returns
/// whether it held a paragraph directly, which marks a loose list item.
fn skip_container<'a>(events: &mut impl Iterator<Item = (Event<'a>, Range<usize>)>) -> bool {
    let mut depth = 1usize;
    let mut loose = false;
    for (event, _) in events {
        match event {
            Event::Start(tag) => {
                loose |= depth == 1 && matches!(tag, Tag::Paragraph);
                depth += 1;
            }
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
    loose
}

/// Parse with default options.
#[must_use]
pub fn parse(source: &str) -> Parsed {
    Parser::new().parse(source)
}

/// Open container while folding events into nodes.
enum Frame {
    Root,
    Paragraph,
    Heading(u8),
    Blockquote,
    List {
        start: Option<u64>,
        loose: bool,
    },
    /// `run_start` is where the current run of bare inline children begins.
    Item {
        loose: bool,
        run_start: usize,
    },
    Emphasis,
    Strong,
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        title: Option<String>,
    },
    Code {
        lang: Option<String>,
        meta: Option<String>,
    },
    Html,
    /// Constructs outside the node set; children are hoisted into the parent.
    Transparent,
}

struct TreeBuilder {
    stack: Vec<(Frame, Vec<Node>)>,
    hard_line_breaks: bool,
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) | Event::Html(text) if self.in_raw() => {
                self.push(Node::text(text.into_string()));
            }
            Event::Text(text) => self.push(Node::text(text.into_string())),
            Event::Code(code) => self.push(Node::InlineCode {
                value: code.into_string(),
            }),
            Event::Html(html) | Event::InlineHtml(html) => self.push(Node::Html {
                value: html.into_string(),
            }),
            Event::SoftBreak if self.hard_line_breaks => self.push(Node::Break),
            Event::SoftBreak => self.push(Node::text("\n")),
            Event::HardBreak => self.push(Node::Break),
            Event::Rule => {
                self.close_inline_run();
                self.push(Node::ThematicBreak);
                self.block_appended();
            }
            Event::TaskListMarker(checked) => {
                self.push(Node::text(if checked { "[x] " } else { "[ ] " }));
            }
            Event::FootnoteReference(label) => self.push(Node::text(format!("[^{label}]"))),
            Event::InlineMath(math) => self.push(Node::text(format!("${math}$"))),
            Event::DisplayMath(math) => self.push(Node::text(format!("$${math}$$"))),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        if is_block_tag(&tag) {
            self.close_inline_run();
        }

        let frame = match tag {
            Tag::Paragraph => {
                if let Some((Frame::Item { loose, .. }, _)) = self.stack.last_mut() {
                    *loose = true;
                }
                Frame::Paragraph
            }
            Tag::Heading { level, .. } => Frame::Heading(heading_level_to_num(level)),
            Tag::BlockQuote(_) => Frame::Blockquote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                let (lang, meta) = split_info(&info);
                Frame::Code { lang, meta }
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => Frame::Code {
                lang: None,
                meta: None,
            },
            Tag::HtmlBlock => Frame::Html,
            Tag::List(start) => Frame::List {
                start,
                loose: false,
            },
            Tag::Item => Frame::Item {
                loose: false,
                run_start: 0,
            },
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                url: dest_url.into_string(),
                title: non_empty(title),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                url: dest_url.into_string(),
                title: non_empty(title),
            },
            _ => Frame::Transparent,
        };
        self.stack.push((frame, Vec::new()));
    }

    fn end(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some((frame, mut children)) = self.stack.pop() else {
            return;
        };

        let node = match frame {
            Frame::Root => return,
            Frame::Paragraph => Node::Paragraph {
                children: merge_text(children),
            },
            Frame::Heading(depth) => Node::Heading {
                depth,
                children: merge_text(children),
            },
            Frame::Blockquote => Node::Blockquote { children },
            Frame::List { start, loose } => Node::List {
                ordered: start.is_some(),
                start,
                tight: !loose,
                children,
            },
            Frame::Item { loose, run_start } => {
                wrap_inline_run(&mut children, run_start);
                if let Some((Frame::List { loose: list_loose, .. }, _)) = self.stack.last_mut() {
                    *list_loose |= loose;
                }
                Node::ListItem { children }
            }
            Frame::Emphasis => Node::Emphasis {
                children: merge_text(children),
            },
            Frame::Strong => Node::Strong {
                children: merge_text(children),
            },
            Frame::Link { url, title } => Node::Link {
                url,
                title,
                children: merge_text(children),
            },
            Frame::Image { url, title } => Node::Image {
                url,
                title,
                alt: children.iter().map(Node::text_content).collect(),
            },
            Frame::Code { lang, meta } => {
                let mut value = raw_text(&children);
                if value.ends_with('\n') {
                    value.pop();
                }
                Node::Code { lang, meta, value }
            }
            Frame::Html => {
                let value = raw_text(&children);
                let value = value.trim_end_matches('\n');
                if !value.is_empty() {
                    self.push(Node::Html {
                        value: value.to_owned(),
                    });
                    self.block_appended();
                }
                return;
            }
            Frame::Transparent => {
                for child in children {
                    self.push(child);
                }
                return;
            }
        };

        let is_block = !node.is_inline() && !matches!(node, Node::ListItem { .. });
        self.push(node);
        if is_block {
            self.block_appended();
        }
    }

    /// Append a list item or blockquote whose children were parsed apart.
    fn container(&mut self, tag: Tag<'_>, loose: bool, children: Vec<Node>) {
        self.start(tag);
        if let Some((Frame::Item { loose: item_loose, .. }, _)) = self.stack.last_mut() {
            *item_loose = loose;
        }
        for child in children {
            self.push(child);
            self.block_appended();
        }
        self.end();
    }

    fn in_container(&self) -> bool {
        self.stack
            .iter()
            .any(|(frame, _)| matches!(frame, Frame::Item { .. } | Frame::Blockquote))
    }

    fn finish(mut self) -> Vec<Node> {
        while self.stack.len() > 1 {
            self.end();
        }
        self.stack
            .pop()
            .map(|(_, children)| children)
            .unwrap_or_default()
    }

    fn push(&mut self, node: Node) {
        if let Some((_, children)) = self.stack.last_mut() {
            children.push(node);
        }
    }

    fn in_raw(&self) -> bool {
        matches!(self.stack.last(), Some((Frame::Code { .. } | Frame::Html, _)))
    }

    /// Before a block opens inside a list item, wrap pending inline content
    /// in a paragraph.
    fn close_inline_run(&mut self) {
        if let Some((Frame::Item { run_start, .. }, children)) = self.stack.last_mut() {
            wrap_inline_run(children, *run_start);
            *run_start = children.len();
        }
    }

    fn block_appended(&mut self) {
        if let Some((Frame::Item { run_start, .. }, children)) = self.stack.last_mut() {
            *run_start = children.len();
        }
    }
}

fn is_block_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::BlockQuote(_)
            | Tag::CodeBlock(_)
            | Tag::HtmlBlock
            | Tag::List(_)
            | Tag::Table(_)
            | Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::MetadataBlock(_)
    )
}

fn wrap_inline_run(children: &mut Vec<Node>, start: usize) {
    if start < children.len() {
        let run: Vec<Node> = children.drain(start..).collect();
        children.push(Node::Paragraph {
            children: merge_text(run),
        });
    }
}

/// Merge adjacent text nodes.
fn merge_text(children: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        if let Node::Text { value } = &child
            && let Some(Node::Text { value: prev }) = merged.last_mut()
        {
            prev.push_str(value);
            continue;
        }
        merged.push(child);
    }
    merged
}

fn raw_text(children: &[Node]) -> String {
    children
        .iter()
        .filter_map(|child| match child {
            Node::Text { value } | Node::Html { value } => Some(value.as_str()),
            _ => None,
        })
        .collect()
}

/// Split a fence info string into language and meta.
fn split_info(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => (Some(lang.to_owned()), non_empty(CowStr::from(meta.trim()))),
        None if info.is_empty() => (None, None),
        None => (Some(info.to_owned()), None),
    }
}

fn non_empty(s: CowStr<'_>) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.into_string())
    }
}
