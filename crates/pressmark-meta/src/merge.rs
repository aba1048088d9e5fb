//! Metadata precedence rules.
//!
//! Combines caller-supplied metadata with metadata extracted from a preamble.

use crate::{DocumentSettings, Metadata};

/// Merge explicit (caller) metadata with extracted (preamble) metadata.
///
/// # Precedence Rules
///
/// - Scalars and `keywords`: explicit value if present and non-empty,
///   otherwise the extracted value
/// - `links`: concatenated, explicit first, duplicates dropped
/// - `vars`: key-wise union (explicit value wins per key)
/// - `settings`: per field, explicit value if set, otherwise the extracted one
///
/// Merging is idempotent: `merge_metadata(&merge_metadata(a, b), &Metadata::default())`
/// equals `merge_metadata(a, b)`, and so does merging a merged value with itself.
///
/// # Example
///
/// ```
/// use pressmark_meta::{Metadata, merge_metadata};
///
/// let explicit = Metadata { title: Some("A".into()), ..Default::default() };
/// let extracted = Metadata {
///     title: Some("B".into()),
///     author: Some("C".into()),
///     ..Default::default()
/// };
///
/// let merged = merge_metadata(&explicit, &extracted);
/// assert_eq!(merged.title.as_deref(), Some("A"));
/// assert_eq!(merged.author.as_deref(), Some("C"));
/// ```
#[must_use]
pub fn merge_metadata(explicit: &Metadata, extracted: &Metadata) -> Metadata {
    let mut vars = extracted.vars.clone();
    for (key, value) in &explicit.vars {
        vars.insert(key.clone(), value.clone());
    }

    Metadata {
        title: pick(explicit.title.as_ref(), extracted.title.as_ref()),
        author: pick(explicit.author.as_ref(), extracted.author.as_ref()),
        date: pick(explicit.date.as_ref(), extracted.date.as_ref()),
        lang: pick(explicit.lang.as_ref(), extracted.lang.as_ref()),
        description: pick(explicit.description.as_ref(), extracted.description.as_ref()),
        keywords: if explicit.keywords.is_empty() {
            extracted.keywords.clone()
        } else {
            explicit.keywords.clone()
        },
        links: concat_unique(&explicit.links, &extracted.links),
        vars,
        settings: DocumentSettings {
            partial: explicit.settings.partial.or(extracted.settings.partial),
            hard_line_breaks: explicit
                .settings
                .hard_line_breaks
                .or(extracted.settings.hard_line_breaks),
        },
    }
}

fn pick(explicit: Option<&String>, extracted: Option<&String>) -> Option<String> {
    let present = |value: &&String| !value.trim().is_empty();
    explicit.filter(present).or(extracted.filter(present)).cloned()
}

fn concat_unique(first: &[String], second: &[String]) -> Vec<String> {
    let mut links: Vec<String> = Vec::with_capacity(first.len() + second.len());
    for link in first.iter().chain(second) {
        if !links.contains(link) {
            links.push(link.clone());
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn title(t: &str) -> Metadata {
        Metadata {
            title: Some(t.to_owned()),
            ..Default::default()
        }
    }

    fn links(hrefs: &[&str]) -> Metadata {
        Metadata {
            links: hrefs.iter().map(|&h| h.to_owned()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_explicit_wins() {
        let extracted = Metadata {
            title: Some("B".to_owned()),
            author: Some("C".to_owned()),
            ..Default::default()
        };
        let merged = merge_metadata(&title("A"), &extracted);
        assert_eq!(
            merged,
            Metadata {
                title: Some("A".to_owned()),
                author: Some("C".to_owned()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_merge_empty_explicit_takes_extracted() {
        let merged = merge_metadata(&Metadata::default(), &title("B"));
        assert_eq!(merged, title("B"));
    }

    #[test]
    fn test_merge_blank_explicit_is_absent() {
        let merged = merge_metadata(&title("  "), &title("B"));
        assert_eq!(merged.title.as_deref(), Some("B"));
    }

    #[test]
    fn test_merge_blank_both_is_none() {
        let merged = merge_metadata(&title(""), &title(""));
        assert!(merged.title.is_none());
    }

    #[test]
    fn test_merge_links_concatenate() {
        let merged = merge_metadata(&links(&["x.css"]), &links(&["y.css"]));
        assert_eq!(merged.links, vec!["x.css", "y.css"]);
    }

    #[test]
    fn test_merge_links_drop_duplicates() {
        let merged = merge_metadata(&links(&["x.css", "y.css"]), &links(&["y.css", "z.css"]));
        assert_eq!(merged.links, vec!["x.css", "y.css", "z.css"]);
    }

    #[test]
    fn test_merge_keywords_not_concatenated() {
        let explicit = Metadata {
            keywords: vec!["a".to_owned()],
            ..Default::default()
        };
        let extracted = Metadata {
            keywords: vec!["b".to_owned(), "c".to_owned()],
            ..Default::default()
        };
        assert_eq!(merge_metadata(&explicit, &extracted).keywords, vec!["a"]);
        assert_eq!(
            merge_metadata(&Metadata::default(), &extracted).keywords,
            vec!["b", "c"]
        );
    }

    #[test]
    fn test_merge_vars_union() {
        let mut explicit_vars = HashMap::new();
        explicit_vars.insert("shared".to_owned(), serde_json::json!("explicit"));
        explicit_vars.insert("own".to_owned(), serde_json::json!(1));
        let mut extracted_vars = HashMap::new();
        extracted_vars.insert("shared".to_owned(), serde_json::json!("extracted"));
        extracted_vars.insert("other".to_owned(), serde_json::json!(true));

        let merged = merge_metadata(
            &Metadata {
                vars: explicit_vars,
                ..Default::default()
            },
            &Metadata {
                vars: extracted_vars,
                ..Default::default()
            },
        );

        assert_eq!(merged.vars.len(), 3);
        assert_eq!(merged.vars["shared"], serde_json::json!("explicit"));
        assert_eq!(merged.vars["own"], serde_json::json!(1));
        assert_eq!(merged.vars["other"], serde_json::json!(true));
    }

    #[test]
    fn test_merge_idempotent_with_empty() {
        let a = Metadata {
            title: Some("A".to_owned()),
            links: vec!["x.css".to_owned(), "x.css".to_owned()],
            ..Default::default()
        };
        let b = Metadata {
            author: Some("C".to_owned()),
            lang: Some("".to_owned()),
            links: vec!["y.css".to_owned()],
            ..Default::default()
        };
        let once = merge_metadata(&a, &b);
        assert_eq!(merge_metadata(&once, &Metadata::default()), once);
    }

    #[test]
    fn test_merge_idempotent_with_itself() {
        let once = merge_metadata(&links(&["x.css"]), &links(&["y.css"]));
        assert_eq!(merge_metadata(&once, &once), once);
    }

    #[test]
    fn test_merge_settings_per_field() {
        let explicit = Metadata {
            settings: DocumentSettings {
                partial: Some(true),
                hard_line_breaks: None,
            },
            ..Default::default()
        };
        let extracted = Metadata {
            settings: DocumentSettings {
                partial: Some(false),
                hard_line_breaks: Some(true),
            },
            ..Default::default()
        };
        assert_eq!(
            merge_metadata(&explicit, &extracted).settings,
            DocumentSettings {
                partial: Some(true),
                hard_line_breaks: Some(true),
            }
        );
    }
}
