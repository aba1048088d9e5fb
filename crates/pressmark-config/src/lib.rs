//! Processor options for pressmark.
//!
//! Options are plain data deserialized with serde. Every key is optional;
//! missing keys take the defaults documented on [`ProcessorOptions`].
//!
//! ```
//! use pressmark_config::ProcessorOptions;
//! use pressmark_renderer::ResolveMode;
//!
//! let options = ProcessorOptions::from_toml_str(
//!     r#"
//! mode = "literal"
//! partial = false
//! style = ["print.css"]
//!
//! [[directives]]
//! name = "aside"
//! tag = "aside"
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(options.mode, ResolveMode::Literal);
//! assert_eq!(options.directives.len(), 1);
//! ```

use std::collections::HashSet;

use pressmark_renderer::ResolveMode;
use serde::Deserialize;

/// Options controlling a document processor.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessorOptions {
    /// Directive resolution strategy. Defaults to hint mode.
    pub mode: ResolveMode,
    /// Emit an HTML fragment instead of a full document. Defaults to `true`.
    pub partial: bool,
    /// Fallback title when neither the caller nor the preamble sets one.
    pub title: Option<String>,
    /// Fallback document language.
    pub language: Option<String>,
    /// Stylesheet hrefs appended after caller and preamble links.
    pub style: Vec<String>,
    /// Turn soft line breaks into hard breaks.
    pub hard_line_breaks: bool,
    /// Container directives to recognize.
    pub directives: Vec<DirectiveConfig>,
    /// Wrap lone images in `<figure>`. Defaults to `true`.
    pub figures: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            mode: ResolveMode::default(),
            partial: true,
            title: None,
            language: None,
            style: Vec::new(),
            hard_line_breaks: false,
            directives: vec![DirectiveConfig::default()],
            figures: true,
        }
    }
}

/// A generic container registration: `:::name{.class}` renders as `<tag class>`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DirectiveConfig {
    pub name: String,
    pub tag: String,
}

impl Default for DirectiveConfig {
    fn default() -> Self {
        Self {
            name: "div".to_owned(),
            tag: "div".to_owned(),
        }
    }
}

/// Options error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl ProcessorOptions {
    /// Parse and validate options from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Check directive registrations and stylesheet entries.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` on the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (index, directive) in self.directives.iter().enumerate() {
            let field = format!("directives[{index}]");
            require_identifier(&directive.name, &format!("{field}.name"))?;
            require_tag(&directive.tag, &format!("{field}.tag"))?;
            if !seen.insert(directive.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "directive `{}` is registered more than once",
                    directive.name
                )));
            }
        }

        for (index, href) in self.style.iter().enumerate() {
            if href.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "style[{index}] cannot be empty"
                )));
            }
        }

        Ok(())
    }
}

/// A directive name as written after the fence colons.
fn require_identifier(value: &str, field: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let valid = chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ConfigError::Validation(format!(
            "{field} must start with a letter and contain only letters, digits, `-` or `_`"
        )));
    }
    Ok(())
}

fn require_tag(value: &str, field: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(ConfigError::Validation(format!(
            "{field} must be an HTML element name"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = ProcessorOptions::default();
        assert_eq!(options.mode, ResolveMode::Hint);
        assert!(options.partial);
        assert!(options.figures);
        assert!(!options.hard_line_breaks);
        assert_eq!(options.directives, vec![DirectiveConfig::default()]);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let options = ProcessorOptions::from_toml_str("").unwrap();
        assert_eq!(options, ProcessorOptions::default());
    }

    #[test]
    fn test_full_toml() {
        let options = ProcessorOptions::from_toml_str(
            r#"
mode = "literal"
partial = false
title = "Handbook"
language = "de"
style = ["base.css", "print.css"]
hard_line_breaks = true
figures = false

[[directives]]
name = "div"
tag = "div"

[[directives]]
name = "aside"
tag = "aside"
"#,
        )
        .unwrap();

        assert_eq!(options.mode, ResolveMode::Literal);
        assert!(!options.partial);
        assert_eq!(options.title.as_deref(), Some("Handbook"));
        assert_eq!(options.language.as_deref(), Some("de"));
        assert_eq!(options.style, vec!["base.css", "print.css"]);
        assert!(options.hard_line_breaks);
        assert!(!options.figures);
        assert_eq!(options.directives[1].name, "aside");
        assert_eq!(options.directives[1].tag, "aside");
    }

    #[test]
    fn test_explicit_empty_directives_disables_default() {
        let options = ProcessorOptions::from_toml_str("directives = []").unwrap();
        assert!(options.directives.is_empty());
    }

    #[test]
    fn test_directive_tag_defaults() {
        let options =
            ProcessorOptions::from_toml_str("[[directives]]\nname = \"box\"\n").unwrap();
        assert_eq!(options.directives[0].name, "box");
        assert_eq!(options.directives[0].tag, "div");
    }

    #[test]
    fn test_unknown_mode() {
        let result = ProcessorOptions::from_toml_str("mode = \"eager\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_directive_name() {
        let result =
            ProcessorOptions::from_toml_str("[[directives]]\nname = \"1st\"\ntag = \"div\"\n");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("directives[0].name"));
    }

    #[test]
    fn test_invalid_tag() {
        let result = ProcessorOptions::from_toml_str(
            "[[directives]]\nname = \"note\"\ntag = \"<div>\"\n",
        );
        assert!(result.unwrap_err().to_string().contains("directives[0].tag"));
    }

    #[test]
    fn test_duplicate_directive() {
        let result = ProcessorOptions::from_toml_str(
            "[[directives]]\nname = \"div\"\n\n[[directives]]\nname = \"div\"\ntag = \"section\"\n",
        );
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("registered more than once")
        );
    }

    #[test]
    fn test_empty_style_entry() {
        let result = ProcessorOptions::from_toml_str("style = [\"a.css\", \" \"]");
        assert_eq!(
            result.unwrap_err().to_string(),
            "Configuration error: style[1] cannot be empty"
        );
    }
}
