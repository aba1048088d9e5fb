//! Output conformance checks.

/// Regions whose text is content, not leftover syntax.
const SKIPPED: &[(&str, &str)] = &[("<pre", "</pre>"), ("<code", "</code>"), ("<!--", "-->")];

/// Find directive fences that survived into rendered HTML.
///
/// Returns each `:::name...` opening fence found at the start of a line or
/// directly after a tag, outside code and comments. An empty result means
/// every directive was converted.
///
/// # Example
///
/// ```
/// use pressmark_renderer::unconverted_directives;
///
/// let html = "<p>:::callout{.note}</p>\n<p>Hi</p>\n<p>:::</p>";
/// assert_eq!(unconverted_directives(html), vec![":::callout{.note}"]);
/// assert!(unconverted_directives("<pre><code>:::div{.x}\n</code></pre>").is_empty());
/// ```
#[must_use]
pub fn unconverted_directives(html: &str) -> Vec<String> {
    let visible = strip_skipped(html);
    let bytes = visible.as_bytes();
    let mut found = Vec::new();

    let mut search_from = 0;
    while let Some(offset) = visible[search_from..].find(":::") {
        let start = search_from + offset;
        let colons = visible[start..].bytes().take_while(|&b| b == b':').count();
        search_from = start + colons;

        let at_boundary = start == 0 || matches!(bytes[start - 1], b'>' | b'\n');
        let starts_name = visible[search_from..]
            .trim_start_matches(' ')
            .chars()
            .next()
            .is_some_and(char::is_alphabetic);
        if !at_boundary || !starts_name {
            continue;
        }

        let end = visible[start..]
            .find(['<', '\n'])
            .map_or(visible.len(), |i| start + i);
        found.push(visible[start..end].trim_end().to_owned());
        search_from = end;
    }

    found
}

/// Copy `html` with code, preformatted and comment regions removed. Each
/// removed region leaves a `>` so the text after it still starts at a tag
/// boundary.
fn strip_skipped(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    loop {
        let next = SKIPPED
            .iter()
            .filter_map(|&(open, close)| rest.find(open).map(|at| (at, close)))
            .min_by_key(|&(at, _)| at);
        let Some((at, close)) = next else {
            out.push_str(rest);
            return out;
        };

        out.push_str(&rest[..at]);
        out.push('>');
        match rest[at..].find(close) {
            Some(end) => rest = &rest[at + end + close.len()..],
            None => return out,
        }
    }
}
