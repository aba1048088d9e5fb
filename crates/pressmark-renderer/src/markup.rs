//! Tree to markup serializer.
//!
//! Writes a [`Node`] tree back out as markup text that [`crate::parse`]
//! reads into an equivalent tree. Text is escaped where it would otherwise
//! be read as syntax, and emphasis delimiters are picked so they open and
//! close where the tree says. A resolved directive has no markup form for its hint:
//! its children are written on their own, joined by blank lines, and a
//! [`Warning::SerializationGap`] is reported.

use std::fmt::Write;

use crate::ast::{DirectiveNode, Node};
use crate::warning::{Warning, report};

/// Serialized markup and any fidelity warnings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Serialized {
    pub text: String,
    pub warnings: Vec<Warning>,
}

/// Serialize a tree to markup.
///
/// # Example
///
/// ```
/// use pressmark_renderer::{parse, serialize};
///
/// let tree = parse("# Title\n\n- *a*\n- b").tree;
/// assert_eq!(serialize(&tree).text, "# Title\n\n- *a*\n- b\n");
/// ```
#[must_use]
pub fn serialize(tree: &Node) -> Serialized {
    let mut writer = MarkupWriter::default();
    let mut text = writer.block(tree);
    if !text.is_empty() {
        text.push('\n');
    }
    tracing::debug!(
        bytes = text.len(),
        warnings = writer.warnings.len(),
        "Serialized tree to markup"
    );
    Serialized {
        text,
        warnings: writer.warnings,
    }
}

#[derive(Default)]
struct MarkupWriter {
    warnings: Vec<Warning>,
    /// Nesting depth of trial writes. Warnings raised inside one are logged
    /// only once the trial is kept.
    trial: usize,
}

/// Inline writing context.
#[derive(Clone, Copy, Default)]
struct Inline {
    /// Headings cannot contain line breaks.
    single_line: bool,
}

/// What follows an inline node in the written output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum After {
    /// End of the block.
    End,
    /// The first character the next sibling writes.
    Char(char),
    /// Closing delimiter of the enclosing emphasis or strong.
    Close(char),
}

impl After {
    fn char(self) -> Option<char> {
        match self {
            Self::End => None,
            Self::Char(c) | Self::Close(c) => Some(c),
        }
    }
}

impl MarkupWriter {
    fn block(&mut self, node: &Node) -> String {
        match node {
            Node::Root { children } => self.blocks(children, "\n\n"),
            Node::Paragraph { children } => self.inline(children, Inline::default()),
            Node::Heading { depth, children } => {
                let hashes = "#".repeat(usize::from((*depth).clamp(1, 6)));
                let mut content = self.inline(children, Inline { single_line: true });
                escape_closing_hashes(&mut content);
                if content.is_empty() {
                    hashes
                } else {
                    format!("{hashes} {content}")
                }
            }
            Node::ThematicBreak => "***".to_owned(),
            Node::Code { lang, meta, value } => code_block(lang.as_deref(), meta.as_deref(), value),
            Node::Html { value } => value.clone(),
            Node::Preamble { value } if value.is_empty() => "---\n---".to_owned(),
            Node::Preamble { value } => format!("---\n{value}\n---"),
            Node::List { .. } => self.list(node, false),
            Node::ListItem { children } => {
                let body = self.blocks(children, "\n");
                indent_item("- ", &body)
            }
            Node::Blockquote { children } => {
                let body = self.blocks(children, "\n\n");
                quote(&body)
            }
            Node::Directive(directive) => self.directive(directive),
            inline => self.inline(std::slice::from_ref(inline), Inline::default()),
        }
    }

    /// Serialize sibling blocks joined by `sep`.
    fn blocks(&mut self, nodes: &[Node], sep: &str) -> String {
        let mut parts = Vec::with_capacity(nodes.len());
        let mut alternate = false;
        for (i, node) in nodes.iter().enumerate() {
            let part = match node {
                Node::List { ordered, .. } => {
                    // Adjacent lists need different markers or they merge.
                    let follows_list = matches!(
                        i.checked_sub(1).map(|prev| &nodes[prev]),
                        Some(Node::List { ordered: prev, .. }) if prev == ordered
                    );
                    alternate = follows_list && !alternate;
                    self.list(node, alternate)
                }
                other => self.block(other),
            };
            parts.push(part);
        }
        parts.join(sep)
    }

    fn list(&mut self, node: &Node, alternate: bool) -> String {
        let Node::List {
            ordered,
            start,
            tight,
            children,
        } = node
        else {
            return self.block(node);
        };

        let sep = if *tight { "\n" } else { "\n\n" };
        let mut number = start.unwrap_or(1);
        let mut items = Vec::with_capacity(children.len());

        for child in children {
            let marker = match (*ordered, alternate) {
                (true, false) => format!("{number}. "),
                (true, true) => format!("{number}) "),
                (false, false) => "- ".to_owned(),
                (false, true) => "* ".to_owned(),
            };
            number += 1;

            let body = match child {
                Node::ListItem { children } => self.blocks(children, sep),
                other => self.block(other),
            };
            items.push(indent_item(&marker, &body));
        }

        items.join(sep)
    }

    fn directive(&mut self, directive: &DirectiveNode) -> String {
        if directive.hint.is_some() {
            self.report(Warning::SerializationGap {
                node: "containerDirective",
                detail: format!(
                    "rendering hint of :::{} has no markup form, writing its content only",
                    directive.name
                ),
            });
            return self.blocks(&directive.children, "\n\n");
        }

        let mut out = directive.open_fence();
        let body = self.blocks(&directive.children, "\n\n");
        if !body.is_empty() {
            out.push('\n');
            out.push_str(&body);
        }
        out.push_str("\n:::");
        out
    }

    fn inline(&mut self, nodes: &[Node], ctx: Inline) -> String {
        let mut out = String::new();
        self.inline_into(nodes, ctx, After::End, &mut out);
        out
    }

    /// Write inline `nodes`, followed in the output by `after`. Returns
    /// `false` if some emphasis could not be delimited so it reads back.
    fn inline_into(&mut self, nodes: &[Node], ctx: Inline, after: After, out: &mut String) -> bool {
        let mut ok = true;
        for (i, node) in nodes.iter().enumerate() {
            let next = leading_char(&nodes[i + 1..], ctx).map_or(after, After::Char);
            match node {
                Node::Text { value } => push_text(out, value, ctx.single_line),
                Node::Emphasis { children } => ok &= self.emphasis(children, 1, ctx, next, out),
                Node::Strong { children } => ok &= self.emphasis(children, 2, ctx, next, out),
                Node::InlineCode { value } => inline_code(value, out),
                Node::Link {
                    url,
                    title,
                    children,
                } => {
                    // `!` right before `[` would turn the link into an image.
                    if out.ends_with('!') {
                        out.pop();
                        out.push_str("\\!");
                    }
                    out.push('[');
                    ok &= self.inline_into(children, ctx, After::Char(']'), out);
                    out.push_str("](");
                    push_destination(out, url, title.as_deref());
                    out.push(')');
                }
                Node::Image { url, title, alt } => {
                    out.push_str("![");
                    push_text(out, alt, true);
                    out.push_str("](");
                    push_destination(out, url, title.as_deref());
                    out.push(')');
                }
                Node::Break if ctx.single_line => out.push(' '),
                Node::Break => out.push_str("\\\n"),
                Node::Html { value } => out.push_str(value),
                block => {
                    self.report(Warning::SerializationGap {
                        node: block.type_name(),
                        detail: "block node inside inline content".to_owned(),
                    });
                    let text = self.block(block);
                    out.push_str(&text);
                }
            }
        }
        ok
    }

    /// Write emphasis (`len` 1) or strong (`len` 2) around `children`.
    ///
    /// `*` is tried first, then `_`. A delimiter is kept only if it opens
    /// and closes at the written position and does not run into a
    /// neighbouring delimiter of the same character. Returns `false` if
    /// neither fits, after writing with `*` and reporting a gap.
    fn emphasis(
        &mut self,
        children: &[Node],
        len: usize,
        ctx: Inline,
        after: After,
        out: &mut String,
    ) -> bool {
        let mark = out.len();
        let warnings_mark = self.warnings.len();

        for delim in ['*', '_'] {
            self.trial += 1;
            let fits = self.try_emphasis(children, len, delim, ctx, after, out);
            self.trial -= 1;
            if fits {
                if self.trial == 0 {
                    for warning in &self.warnings[warnings_mark..] {
                        tracing::warn!(warning = %warning, "Recoverable markup problem");
                    }
                }
                return true;
            }
            out.truncate(mark);
            self.warnings.truncate(warnings_mark);
        }

        self.try_emphasis(children, len, '*', ctx, after, out);
        self.report(Warning::SerializationGap {
            node: if len == 1 { "emphasis" } else { "strong" },
            detail: "no delimiter opens and closes here".to_owned(),
        });
        false
    }

    fn report(&mut self, warning: Warning) {
        if self.trial == 0 {
            report(&mut self.warnings, warning);
        } else {
            self.warnings.push(warning);
        }
    }

    fn try_emphasis(
        &mut self,
        children: &[Node],
        len: usize,
        delim: char,
        ctx: Inline,
        after: After,
        out: &mut String,
    ) -> bool {
        let before = out.chars().next_back();
        let run = delim.to_string().repeat(len);
        out.push_str(&run);
        let start = out.len();
        let children_ok = self.inline_into(children, ctx, After::Close(delim), out);
        let first = out[start..].chars().next();
        let last = out[start..].chars().next_back();
        out.push_str(&run);

        let next = after.char();
        let intraword_ok = delim == '*' || (!is_word_char(before) && !is_word_char(next));
        children_ok
            && before != Some(delim)
            && after != After::Close(delim)
            && intraword_ok
            && left_flanking(before, first)
            && right_flanking(last, next)
    }
}

/// First character the inline `nodes` write, skipping empty text.
fn leading_char(nodes: &[Node], ctx: Inline) -> Option<char> {
    nodes.iter().find_map(|node| match node {
        Node::Text { value } => value
            .chars()
            .next()
            .map(|c| if c == '\n' && ctx.single_line { ' ' } else { c }),
        Node::Emphasis { .. } | Node::Strong { .. } => Some('*'),
        Node::InlineCode { .. } => Some('`'),
        Node::Link { .. } => Some('['),
        Node::Image { .. } => Some('!'),
        Node::Break if ctx.single_line => Some(' '),
        Node::Break => Some('\\'),
        Node::Html { value } => value.chars().next(),
        _ => Some('\n'),
    })
}

/// `None` stands for the start or end of the line.
fn is_space(c: Option<char>) -> bool {
    c.is_none_or(char::is_whitespace)
}

fn is_punct(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_punctuation())
}

fn is_word_char(c: Option<char>) -> bool {
    !is_space(c) && !is_punct(c)
}

fn left_flanking(before: Option<char>, first: Option<char>) -> bool {
    !is_space(first) && (!is_punct(first) || is_space(before) || is_punct(before))
}

fn right_flanking(last: Option<char>, next: Option<char>) -> bool {
    !is_space(last) && (!is_punct(last) || is_space(next) || is_punct(next))
}

/// Escape a trailing run of `#` that would be read as the heading's closing
/// sequence.
fn escape_closing_hashes(content: &mut String) {
    let trimmed = content.trim_end_matches([' ', '\t']);
    let run_start = trimmed.trim_end_matches('#').len();
    let preceded_by_space = run_start == 0 || trimmed[..run_start].ends_with([' ', '\t']);
    if run_start < trimmed.len() && preceded_by_space {
        content.insert(run_start, '\\');
    }
}

/// Escape `value` so it reads back as plain text.
fn push_text(out: &mut String, value: &str, single_line: bool) {
    for c in value.chars() {
        let line_start = out.is_empty() || out.ends_with('\n');
        match c {
            '\n' if single_line => out.push(' '),
            '\\' | '*' | '_' | '`' | '[' | ']' | '<' | '&' => {
                out.push('\\');
                out.push(c);
            }
            '#' | '>' | '-' | '+' | '=' | '|' | ':' | '~' if line_start => {
                out.push('\\');
                out.push(c);
            }
            // `1.` or `1)` at line start would open an ordered list.
            '.' | ')' if line_is_number(out) => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
}

/// Whether the current line of `out` is one to nine digits.
fn line_is_number(out: &str) -> bool {
    let tail: Vec<u8> = out
        .bytes()
        .rev()
        .take_while(|&b| b != b'\n')
        .take(10)
        .collect();
    (1..=9).contains(&tail.len()) && tail.iter().all(u8::is_ascii_digit)
}

fn longest_run(s: &str, marker: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in s.chars() {
        if c == marker {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn inline_code(value: &str, out: &mut String) {
    let fence = "`".repeat(longest_run(value, '`') + 1);
    let pad = value.starts_with('`')
        || value.ends_with('`')
        || (value.starts_with(' ') && value.ends_with(' ') && !value.trim().is_empty());
    out.push_str(&fence);
    if pad {
        out.push(' ');
    }
    out.push_str(value);
    if pad {
        out.push(' ');
    }
    out.push_str(&fence);
}

fn push_destination(out: &mut String, url: &str, title: Option<&str>) {
    let needs_angle = url.is_empty()
        || url
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>'));
    if needs_angle {
        out.push('<');
        out.push_str(&url.replace('<', "\\<").replace('>', "\\>"));
        out.push('>');
    } else {
        out.push_str(url);
    }

    if let Some(title) = title {
        let escaped = title.replace('\\', "\\\\").replace('"', "\\\"");
        write!(out, " \"{escaped}\"").unwrap();
    }
}

fn code_block(lang: Option<&str>, meta: Option<&str>, value: &str) -> String {
    let mut info = lang.unwrap_or_default().to_owned();
    if let Some(meta) = meta {
        info.push(' ');
        info.push_str(meta);
    }

    // Backtick fences cannot carry backticks in their info string.
    let marker = if info.contains('`') { '~' } else { '`' };
    let fence = marker.to_string().repeat((longest_run(value, marker) + 1).max(3));

    if value.is_empty() {
        format!("{fence}{info}\n{fence}")
    } else {
        format!("{fence}{info}\n{value}\n{fence}")
    }
}

/// Prefix the first line with `marker` and indent the rest to match.
fn indent_item(marker: &str, body: &str) -> String {
    if body.is_empty() {
        return marker.trim_end().to_owned();
    }
    let indent = " ".repeat(marker.len());
    let mut out = String::with_capacity(body.len() + marker.len());
    for (i, line) in body.split('\n').enumerate() {
        if i == 0 {
            out.push_str(marker);
        } else {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&indent);
            }
        }
        out.push_str(line);
    }
    out
}

fn quote(body: &str) -> String {
    body.split('\n')
        .map(|line| {
            if line.is_empty() {
                ">".to_owned()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
