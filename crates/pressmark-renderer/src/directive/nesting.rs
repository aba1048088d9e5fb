//! List item and blockquote tracking.
//!
//! A fence that sits inside a list item or blockquote belongs to that
//! container, not to the block being scanned. [`Nesting`] follows the
//! container structure line by line so the scanner can leave those fences
//! alone, and the strip helpers recover a container's body so it can be
//! scanned on its own.

use super::syntax::parse_fence_line;

/// Open list item state.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Nesting {
    /// Content column of the open list item.
    item: Option<usize>,
    after_blank: bool,
}

impl Nesting {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its line ending).
    ///
    /// Returns `true` if the line belongs to a list item or a blockquote.
    pub(crate) fn observe(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            self.after_blank = true;
            return self.item.is_some();
        }
        let after_blank = std::mem::replace(&mut self.after_blank, false);

        if let Some(column) = self.item
            && leading_spaces(line) >= column
        {
            return true;
        }
        if let Some(column) = list_item_column(line) {
            self.item = Some(column);
            return true;
        }
        if quote_content(line).is_some() {
            self.item = None;
            return true;
        }

        // Text right after item text continues it lazily. A blank line or a
        // fence ends the item.
        if after_blank || parse_fence_line(line).is_some() {
            self.item = None;
        }
        false
    }
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Content column of the list item opened by `line`, if it opens one.
fn list_item_column(line: &str) -> Option<usize> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker_len = match rest.as_bytes().first()? {
        b'-' | b'+' | b'*' => 1,
        b'0'..=b'9' => {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits > 9 || !matches!(rest.as_bytes().get(digits), Some(b'.' | b')')) {
                return None;
            }
            digits + 1
        }
        _ => return None,
    };

    let after = &rest[marker_len..];
    if after.trim().is_empty() {
        return Some(indent + marker_len + 1);
    }
    match leading_spaces(after) {
        0 => None,
        spaces @ 1..=4 => Some(indent + marker_len + spaces),
        // Five or more spaces start indented code one column in.
        _ => Some(indent + marker_len + 1),
    }
}

/// Text after the `>` marker of a blockquote line.
fn quote_content(line: &str) -> Option<&str> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = line[indent..].strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Body of a list item whose source starts at its marker line.
///
/// The marker is removed and continuation lines lose up to the item's
/// content column of indentation. Lazy lines are kept as written.
pub(crate) fn strip_item(source: &str) -> String {
    let mut lines = source.split('\n');
    let Some(first) = lines.next() else {
        return String::new();
    };
    let column = list_item_column(first).unwrap_or(0);
    let mut out = String::with_capacity(source.len());
    out.push_str(first.get(column..).unwrap_or_default());
    for line in lines {
        out.push('\n');
        let strip = leading_spaces(line).min(column);
        out.push_str(&line[strip..]);
    }
    out
}

/// Body of a blockquote: each line loses its `>` marker. Lazy lines are kept
/// as written.
pub(crate) fn strip_quote(source: &str) -> String {
    source
        .split('\n')
        .map(|line| quote_content(line).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_item_columns() {
        assert_eq!(list_item_column("- a"), Some(2));
        assert_eq!(list_item_column("  * a"), Some(4));
        assert_eq!(list_item_column("10. a"), Some(4));
        assert_eq!(list_item_column("1)   a"), Some(5));
        assert_eq!(list_item_column("-"), Some(2));
        assert_eq!(list_item_column("-a"), None);
        assert_eq!(list_item_column("***"), None);
        assert_eq!(list_item_column("1.5"), None);
    }

    #[test]
    fn test_indented_fence_stays_in_item() {
        let mut nesting = Nesting::new();
        assert!(nesting.observe("- item"));
        assert!(nesting.observe(""));
        assert!(nesting.observe("  :::div{.note}"));
        assert!(!nesting.observe(":::"));
    }

    #[test]
    fn test_blank_line_then_unindented_text_leaves_item() {
        let mut nesting = Nesting::new();
        nesting.observe("- item");
        nesting.observe("");
        assert!(!nesting.observe("text"));
        assert!(!nesting.observe("  :::div{.note}"));
    }

    #[test]
    fn test_lazy_line_keeps_item_open() {
        let mut nesting = Nesting::new();
        nesting.observe("- item");
        assert!(!nesting.observe("lazy"));
        assert!(nesting.observe("  :::div{.note}"));
    }

    #[test]
    fn test_quote_lines() {
        let mut nesting = Nesting::new();
        assert!(nesting.observe("> :::div{.note}"));
        assert!(!nesting.observe(":::div{.note}"));
    }

    #[test]
    fn test_strip_item() {
        assert_eq!(
            strip_item("- item\n\n  :::div{.note}\n  Hi\n  :::"),
            "item\n\n:::div{.note}\nHi\n:::"
        );
        assert_eq!(strip_item("1.  a\n    b\nlazy"), "a\nb\nlazy");
    }

    #[test]
    fn test_strip_quote() {
        assert_eq!(
            strip_quote("> :::div{.note}\n>Hi\nlazy\n>\n> :::"),
            ":::div{.note}\nHi\nlazy\n\n:::"
        );
    }
}
