//! Directive attribute parsing.
//!
//! Parses the `{#id .class key="value"}` block of a directive fence. Unlike
//! lenient attribute readers, a malformed block is an error: the fence it
//! belongs to is then kept as literal text.
//!
//! Quoted values may contain `\"`, `\'` and `\\` escapes.

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Parsed directive attributes.
///
/// `class="a b"` and `.a .b` both land in [`classes`](Self::classes), and
/// `id="x"` lands in [`id`](Self::id), so [`pairs`](Self::pairs) never holds
/// either key.
///
/// # Example
///
/// ```
/// use pressmark_renderer::Attributes;
///
/// let attrs = Attributes::parse(r#"#intro .note lang="en""#).unwrap();
/// assert_eq!(attrs.id.as_deref(), Some("intro"));
/// assert_eq!(attrs.classes, vec!["note"]);
/// assert_eq!(attrs.get("lang"), Some("en"));
/// assert!(Attributes::parse("class note").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Remaining `key=value` pairs.
    pub pairs: BTreeMap<String, String>,
}

/// Malformed attribute block.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("empty id after `#`")]
    EmptyId,
    #[error("empty class after `.`")]
    EmptyClass,
    #[error("invalid attribute name at `{0}`")]
    InvalidName(String),
    #[error("attribute `{0}` has no `=value`")]
    MissingValue(String),
    #[error("attribute `{0}` has an empty value")]
    EmptyValue(String),
    #[error("unterminated quoted value for `{0}`")]
    UnterminatedQuote(String),
}

impl Attributes {
    /// Parse the inside of an attribute block (without braces).
    ///
    /// # Errors
    ///
    /// Returns an error on empty `#`/`.` shorthands, invalid names, bare keys
    /// without a value and unterminated quotes.
    pub fn parse(attrs_str: &str) -> Result<Self, AttributeError> {
        let mut attrs = Self::default();
        let mut remaining = attrs_str.trim_start();

        while !remaining.is_empty() {
            if let Some(rest) = remaining.strip_prefix('#') {
                let (id, rest) = split_shorthand(rest);
                if id.is_empty() {
                    return Err(AttributeError::EmptyId);
                }
                attrs.id = Some(id.to_owned());
                remaining = rest;
            } else if let Some(rest) = remaining.strip_prefix('.') {
                let (class, rest) = split_shorthand(rest);
                if class.is_empty() {
                    return Err(AttributeError::EmptyClass);
                }
                attrs.classes.push(class.to_owned());
                remaining = rest;
            } else {
                let (key, value, rest) = parse_key_value(remaining)?;
                match key {
                    "id" => attrs.id = Some(value.into_owned()),
                    "class" => attrs
                        .classes
                        .extend(value.split_whitespace().map(str::to_owned)),
                    _ => {
                        attrs.pairs.insert(key.to_owned(), value.into_owned());
                    }
                }
                remaining = rest;
            }
            remaining = remaining.trim_start();
        }

        Ok(attrs)
    }

    /// Get a key-value attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    /// Space-separated class list, `None` when there are no classes.
    #[must_use]
    pub fn class(&self) -> Option<String> {
        if self.classes.is_empty() {
            None
        } else {
            Some(self.classes.join(" "))
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.classes.is_empty() && self.pairs.is_empty()
    }

    /// Reconstruct the `{...}` block, or an empty string if there is nothing
    /// to write.
    ///
    /// Ids and classes the shorthand cannot carry are written in key form,
    /// so the block always parses back to the same attributes.
    #[must_use]
    pub fn to_syntax(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut parts = Vec::new();
        if let Some(id) = &self.id {
            if is_shorthand_safe(id) {
                parts.push(format!("#{id}"));
            } else {
                parts.push(format!(r#"id="{}""#, escape_value(id)));
            }
        }
        for class in &self.classes {
            if is_shorthand_safe(class) {
                parts.push(format!(".{class}"));
            } else {
                parts.push(format!(r#"class="{}""#, escape_value(class)));
            }
        }
        for (key, value) in &self.pairs {
            parts.push(format!(r#"{key}="{}""#, escape_value(value)));
        }

        format!("{{{}}}", parts.join(" "))
    }
}

fn is_shorthand_safe(value: &str) -> bool {
    !value.is_empty()
        && !value.chars().any(|c| {
            c.is_whitespace() || matches!(c, '.' | '#' | '{' | '}' | '"' | '\'' | '\\')
        })
}

fn escape_value(value: &str) -> String {
    value.replace('\\', r"\\").replace('"', r#"\""#)
}

/// Split a `#id` / `.class` shorthand off the front of `s`.
fn split_shorthand(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
        .unwrap_or(s.len());
    s.split_at(end)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | ':')
}

/// Parse `key="value"`, `key='value'` or `key=value` off the front of `s`.
fn parse_key_value(s: &str) -> Result<(&str, Cow<'_, str>, &str), AttributeError> {
    let key_end = s.find(|c: char| !is_name_char(c)).unwrap_or(s.len());
    let key = &s[..key_end];
    if key.is_empty() {
        let snippet: String = s.chars().take(10).collect();
        return Err(AttributeError::InvalidName(snippet));
    }

    let Some(after_eq) = s[key_end..].strip_prefix('=') else {
        return Err(AttributeError::MissingValue(key.to_owned()));
    };

    for quote in ['"', '\''] {
        if let Some(quoted) = after_eq.strip_prefix(quote) {
            let Some(end) = closing_quote(quoted, quote) else {
                return Err(AttributeError::UnterminatedQuote(key.to_owned()));
            };
            return Ok((key, unescape_value(&quoted[..end]), &quoted[end + 1..]));
        }
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    if end == 0 {
        return Err(AttributeError::EmptyValue(key.to_owned()));
    }
    Ok((key, Cow::Borrowed(&after_eq[..end]), &after_eq[end..]))
}

/// Byte index of the first `quote` in `s` that is not backslash-escaped.
pub(crate) fn closing_quote(s: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(i);
        }
    }
    None
}

/// Resolve `\\`, `\"` and `\'`. Any other backslash is kept as written.
fn unescape_value(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && matches!(next, '\\' | '"' | '\'')
        {
            out.push(next);
            chars.next();
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
