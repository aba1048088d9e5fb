//! Container fence syntax: `:::name[label]{attrs}` and `:::`.

use super::attributes::{AttributeError, Attributes, closing_quote};
use super::fence::strip_indent;

/// A line recognised as a container fence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FenceLine {
    Open {
        /// Length of the colon run.
        colons: usize,
        name: String,
        label: Option<String>,
        attributes: Attributes,
    },
    Close { colons: usize },
}

/// Why a line starting with `:::` is not a valid fence.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum FenceError {
    #[error("invalid directive name `{0}`")]
    InvalidName(String),
    #[error("unclosed `[` in label")]
    UnclosedLabel,
    #[error("unclosed `{{` in attributes")]
    UnclosedAttributes,
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error("unexpected text after fence: `{0}`")]
    TrailingText(String),
}

/// Parse a line as a container fence.
///
/// Returns `None` when the line does not start with `:::` (after at most
/// three spaces), and an error when it does but is malformed.
pub(crate) fn parse_fence_line(line: &str) -> Option<Result<FenceLine, FenceError>> {
    let trimmed = strip_indent(line)?.trim_end();
    let colons = trimmed.chars().take_while(|&c| c == ':').count();
    if colons < 3 {
        return None;
    }

    let after_colons = trimmed[colons..].trim_start();
    if after_colons.is_empty() {
        return Some(Ok(FenceLine::Close { colons }));
    }

    Some(parse_open(colons, after_colons))
}

fn parse_open(colons: usize, s: &str) -> Result<FenceLine, FenceError> {
    let name_end = s
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(s.len());
    let name = &s[..name_end];
    if !is_valid_directive_name(name) {
        return Err(FenceError::InvalidName(name.to_owned()));
    }
    let mut rest = &s[name_end..];

    let mut label = None;
    if rest.starts_with('[') {
        let (inner, consumed) = delimited(rest, '[', ']', false).ok_or(FenceError::UnclosedLabel)?;
        label = Some(inner.to_owned());
        rest = &rest[consumed..];
    }

    let mut attributes = Attributes::default();
    if rest.starts_with('{') {
        let (inner, consumed) =
            delimited(rest, '{', '}', true).ok_or(FenceError::UnclosedAttributes)?;
        attributes = Attributes::parse(inner)?;
        rest = &rest[consumed..];
    }

    let trailing = rest.trim();
    if !trailing.is_empty() {
        return Err(FenceError::TrailingText(trailing.to_owned()));
    }

    Ok(FenceLine::Open {
        colons,
        name: name.to_owned(),
        label,
        attributes,
    })
}

/// Valid names start with a letter and contain only alphanumerics, hyphens
/// and underscores.
fn is_valid_directive_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_alphabetic)
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Extract the content between a leading `open` and its matching `close`.
///
/// With `quoted`, delimiters inside a quoted `key="value"` do not count.
/// Returns the inner text and the bytes consumed, delimiters included.
fn delimited(s: &str, open: char, close: char, quoted: bool) -> Option<(&str, usize)> {
    let mut depth = 0usize;
    let mut skip_to = 0;
    let mut prev = None;
    for (i, c) in s.char_indices() {
        if i < skip_to {
            continue;
        }
        if quoted && prev == Some('=') && (c == '"' || c == '\'') {
            skip_to = i + 1 + closing_quote(&s[i + 1..], c)? + 1;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some((&s[1..i], i + 1));
            }
        }
        prev = Some(c);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open(line: &str) -> (String, Option<String>, Attributes) {
        match parse_fence_line(line) {
            Some(Ok(FenceLine::Open {
                name,
                label,
                attributes,
                ..
            })) => (name, label, attributes),
            other => panic!("expected opening fence, got {other:?}"),
        }
    }

    #[test]
    fn test_not_a_fence() {
        assert_eq!(parse_fence_line("plain text"), None);
        assert_eq!(parse_fence_line("::leaf"), None);
        assert_eq!(parse_fence_line("    :::div{.note}"), None);
        assert_eq!(parse_fence_line("text :::div"), None);
    }

    #[test]
    fn test_close() {
        assert_eq!(parse_fence_line(":::"), Some(Ok(FenceLine::Close { colons: 3 })));
        assert_eq!(parse_fence_line("::::  "), Some(Ok(FenceLine::Close { colons: 4 })));
        assert_eq!(parse_fence_line("  :::"), Some(Ok(FenceLine::Close { colons: 3 })));
    }

    #[test]
    fn test_open_name_only() {
        let (name, label, attributes) = open(":::aside");
        assert_eq!(name, "aside");
        assert_eq!(label, None);
        assert!(attributes.is_empty());
    }

    #[test]
    fn test_open_with_attributes() {
        let (name, _, attributes) = open(":::div{.note}");
        assert_eq!(name, "div");
        assert_eq!(attributes.classes, vec!["note"]);
    }

    #[test]
    fn test_open_with_label_and_space() {
        let (name, label, attributes) = open("::: callout[Watch [out]]{#w}");
        assert_eq!(name, "callout");
        assert_eq!(label.as_deref(), Some("Watch [out]"));
        assert_eq!(attributes.id.as_deref(), Some("w"));
    }

    #[test]
    fn test_malformed_attributes() {
        assert!(matches!(
            parse_fence_line(":::div{class note}"),
            Some(Err(FenceError::Attribute(AttributeError::MissingValue(_))))
        ));
    }

    #[test]
    fn test_malformed_brackets() {
        assert_eq!(
            parse_fence_line(":::div{.note"),
            Some(Err(FenceError::UnclosedAttributes))
        );
        assert_eq!(
            parse_fence_line(":::div[label"),
            Some(Err(FenceError::UnclosedLabel))
        );
    }

    #[test]
    fn test_malformed_name() {
        assert_eq!(
            parse_fence_line(":::{.note}"),
            Some(Err(FenceError::InvalidName(String::new())))
        );
        assert_eq!(
            parse_fence_line(":::1st"),
            Some(Err(FenceError::InvalidName("1st".to_owned())))
        );
    }

    #[test]
    fn test_colon_count() {
        assert!(matches!(
            parse_fence_line("::::div{.a}"),
            Some(Ok(FenceLine::Open { colons: 4, .. }))
        ));
    }

    #[test]
    fn test_braces_inside_quoted_values() {
        let (_, _, attributes) = open(r#":::div{title="a}b" .c}"#);
        assert_eq!(attributes.get("title"), Some("a}b"));
        assert_eq!(attributes.classes, vec!["c"]);

        let (_, _, attributes) = open(r#":::div{x='{' y="say \"}\""}"#);
        assert_eq!(attributes.get("x"), Some("{"));
        assert_eq!(attributes.get("y"), Some(r#"say "}""#));
    }

    #[test]
    fn test_trailing_text() {
        assert_eq!(
            parse_fence_line(":::div{.note} extra"),
            Some(Err(FenceError::TrailingText("extra".to_owned())))
        );
    }
}
