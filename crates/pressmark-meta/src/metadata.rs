//! Document metadata types.
//!
//! Provides the [`Metadata`] struct harvested from a document preamble or
//! supplied by the caller.
//!
//! # Metadata Fields
//!
//! - `title`, `author`, `date`, `lang`, `description`: scalar values
//! - `keywords`: a list, or a single comma-separated string
//! - `link`: stylesheet references (strings or `{href}` maps)
//! - `vars`: free-form variables for templating
//! - `vfm`: per-document processing overrides (`partial`, `hardLineBreaks`)

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Document metadata.
///
/// All fields are optional. A `None` scalar or an empty list means the value
/// was not supplied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title.
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,

    /// Document author.
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<String>,

    /// Publication date, kept verbatim.
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,

    /// Document language (BCP 47 tag, e.g. `ja`).
    #[serde(
        default,
        alias = "language",
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub lang: Option<String>,

    /// Short description for the document head.
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    /// Keywords for the document head.
    #[serde(
        default,
        deserialize_with = "keyword_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub keywords: Vec<String>,

    /// Stylesheet hrefs, in link order.
    #[serde(
        default,
        rename = "link",
        alias = "links",
        deserialize_with = "link_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub links: Vec<String>,

    /// Custom variables for templating or downstream renderers.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub vars: HashMap<String, serde_json::Value>,

    /// Processing overrides for this document.
    #[serde(default, rename = "vfm", skip_serializing_if = "DocumentSettings::is_empty")]
    pub settings: DocumentSettings,
}

/// Processing options a document may set for itself.
///
/// A set value takes precedence over the processor's option of the same
/// name. Other keys under `vfm` are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_line_breaks: Option<bool>,
}

impl DocumentSettings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partial.is_none() && self.hard_line_breaks.is_none()
    }
}

impl Metadata {
    /// Parse metadata from the raw YAML payload of a preamble.
    ///
    /// Empty content returns a default instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a field has the wrong shape.
    pub fn from_yaml(content: &str) -> Result<Self, MetadataError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(trimmed)
            .map_err(|e| MetadataError::Parse(format!("Invalid YAML: {e}")))
    }

    /// Check if metadata has any non-default values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.date.is_none()
            && self.lang.is_none()
            && self.description.is_none()
            && self.keywords.is_empty()
            && self.links.is_empty()
            && self.vars.is_empty()
            && self.settings.is_empty()
    }
}

/// Error type for metadata operations.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Preamble payload could not be parsed.
    #[error("{0}")]
    Parse(String),
}

/// YAML scalar accepted where a string is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

/// A stylesheet reference: a bare href or a map carrying one.
#[derive(Deserialize)]
#[serde(untagged)]
enum LinkEntry {
    Href(String),
    Attrs { href: String },
}

fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(Scalar::into_string))
}

fn keyword_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let keywords = match Option::<OneOrMany<Scalar>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(one)) => one
            .into_string()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_owned)
            .collect(),
        Some(OneOrMany::Many(many)) => many.into_iter().map(Scalar::into_string).collect(),
    };
    Ok(keywords)
}

fn link_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<OneOrMany<LinkEntry>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(one)) => vec![one],
        Some(OneOrMany::Many(many)) => many,
    };
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            LinkEntry::Href(href) | LinkEntry::Attrs { href } => href,
        })
        .collect())
}
