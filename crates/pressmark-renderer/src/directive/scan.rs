//! Line-level block scanner.
//!
//! Splits a markup block into plain markup runs and container directives.
//! Directive bodies are returned unparsed so the caller can recurse into
//! them. Fences inside fenced code are ignored, and so are fences inside
//! list items and blockquotes: those belong to the container and are found
//! when its body is scanned.

use super::attributes::Attributes;
use super::fence::CodeFence;
use super::nesting::Nesting;
use super::syntax::{FenceLine, parse_fence_line};
use crate::warning::{Warning, report};

/// A run of source produced by [`split_blocks`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// Plain markup, possibly spanning many blocks.
    Markup {
        text: &'a str,
        /// 1-based line number of the first line.
        line: usize,
    },
    Directive {
        name: String,
        label: Option<String>,
        attributes: Attributes,
        /// Source between the fences.
        body: &'a str,
        /// 1-based line number of the first body line.
        body_line: usize,
    },
}

/// Split `source` into segments.
///
/// `first_line` is the 1-based line number of the first line of `source`
/// in the whole document, used in warnings.
pub(crate) fn split_blocks<'a>(
    source: &'a str,
    first_line: usize,
    warnings: &mut Vec<Warning>,
) -> Vec<Segment<'a>> {
    let lines = line_offsets(source);
    let offset_of = |idx: usize| lines.get(idx).map_or(source.len(), |&(offset, _)| offset);
    let mut markup_line = first_line;

    let mut segments = Vec::new();
    let mut markup_start = 0;
    let mut code = CodeFence::new();
    let mut nesting = Nesting::new();
    let mut i = 0;

    while i < lines.len() {
        let (offset, line) = lines[i];
        let line_no = first_line + i;

        let in_code = code.in_fence();
        if code.observe(line) || in_code || nesting.observe(line) {
            i += 1;
            continue;
        }

        match parse_fence_line(line) {
            None => {}
            Some(Ok(FenceLine::Close { .. })) => {
                report(warnings, Warning::StrayClose { line: line_no });
            }
            Some(Err(e)) => report(
                warnings,
                Warning::MalformedDirective {
                    line: line_no,
                    fence: line.trim().to_owned(),
                    reason: e.to_string(),
                },
            ),
            Some(Ok(FenceLine::Open {
                colons,
                name,
                label,
                attributes,
            })) => {
                push_markup(&mut segments, &source[markup_start..offset], markup_line);

                let (close, closed) = find_close(&lines, i + 1, colons);
                if !closed {
                    report(
                        warnings,
                        Warning::UnclosedDirective {
                            line: line_no,
                            name: name.clone(),
                        },
                    );
                }
                segments.push(Segment::Directive {
                    name,
                    label,
                    attributes,
                    body: &source[offset_of(i + 1)..offset_of(close)],
                    body_line: line_no + 1,
                });

                i = if closed { close + 1 } else { lines.len() };
                markup_start = offset_of(i);
                markup_line = first_line + i;
                nesting = Nesting::new();
                continue;
            }
        }

        i += 1;
    }

    push_markup(&mut segments, &source[markup_start..], markup_line);
    segments
}

fn push_markup<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str, line: usize) {
    if !text.trim().is_empty() {
        segments.push(Segment::Markup { text, line });
    }
}

/// Find the index of the fence closing the directive whose body starts at
/// `from` and whose opening fence has `colons` colons. Returns
/// `(lines.len(), false)` if there is none.
///
/// A closing fence must be at least as long as the fence it closes. Shorter
/// ones are left in the body.
fn find_close(lines: &[(usize, &str)], from: usize, colons: usize) -> (usize, bool) {
    // Colon counts of directives opened inside the body.
    let mut open = Vec::new();
    let mut code = CodeFence::new();
    let mut nesting = Nesting::new();

    for (idx, &(_, line)) in lines.iter().enumerate().skip(from) {
        let in_code = code.in_fence();
        if code.observe(line) || in_code || nesting.observe(line) {
            continue;
        }
        match parse_fence_line(line) {
            Some(Ok(FenceLine::Open { colons, .. })) => open.push(colons),
            Some(Ok(FenceLine::Close { colons: len })) => match open.last() {
                Some(&inner) if len >= inner => {
                    open.pop();
                }
                Some(_) => {}
                None if len >= colons => return (idx, true),
                None => {}
            },
            _ => {}
        }
    }

    (lines.len(), false)
}

/// Byte offset and content (without line ending) of every line.
fn line_offsets(source: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in source.split_inclusive('\n') {
        let line = raw.trim_end_matches('\n').trim_end_matches('\r');
        lines.push((offset, line));
        offset += raw.len();
    }
    lines
}
