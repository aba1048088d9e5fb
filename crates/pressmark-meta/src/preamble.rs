//! Preamble detection and metadata extraction.
//!
//! A preamble is a YAML block fenced by `---` lines at the very start of a
//! document. It is closed by a `---` or `...` line. Anything else, including a
//! fenced block further down the document, is ordinary markup.

use crate::{Metadata, MetadataError};

/// Opening (and closing) preamble fence.
const FENCE: &str = "---";
/// Alternative closing fence.
const FENCE_END_ALT: &str = "...";

/// A preamble split off the start of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preamble<'a> {
    /// Raw payload between the fences, without the trailing newline.
    pub raw: &'a str,
    /// Document text following the closing fence.
    pub body: &'a str,
    /// Number of source lines taken by the preamble, fences included.
    pub line_count: usize,
}

/// Split a leading preamble off `source`.
///
/// Returns `None` unless the first line is exactly `---` and a closing fence
/// follows.
///
/// # Example
///
/// ```
/// use pressmark_meta::split_preamble;
///
/// let preamble = split_preamble("---\ntitle: Foo\n---\n# Body\n").unwrap();
/// assert_eq!(preamble.raw, "title: Foo");
/// assert_eq!(preamble.body, "# Body\n");
/// assert_eq!(preamble.line_count, 3);
/// ```
#[must_use]
pub fn split_preamble(source: &str) -> Option<Preamble<'_>> {
    let first_end = source.find('\n')?;
    if source[..first_end].trim_end_matches('\r') != FENCE {
        return None;
    }

    let raw_start = first_end + 1;
    let mut pos = raw_start;
    let mut line_count = 1;

    while pos < source.len() {
        let line_end = source[pos..].find('\n').map_or(source.len(), |i| pos + i);
        let line = source[pos..line_end].trim_end_matches('\r');
        line_count += 1;

        if line == FENCE || line == FENCE_END_ALT {
            let raw = &source[raw_start..pos];
            let raw = raw.strip_suffix('\n').unwrap_or(raw);
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            let body_start = (line_end + 1).min(source.len());
            return Some(Preamble {
                raw,
                body: &source[body_start..],
                line_count,
            });
        }

        pos = line_end + 1;
    }

    None
}

/// Extract metadata from the preamble of `source`.
///
/// A document without a preamble yields empty metadata.
///
/// # Errors
///
/// Returns an error if the preamble is present but is not valid YAML.
pub fn extract(source: &str) -> Result<Metadata, MetadataError> {
    match split_preamble(source) {
        Some(preamble) => Metadata::from_yaml(preamble.raw),
        None => Ok(Metadata::default()),
    }
}
