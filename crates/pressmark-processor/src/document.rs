//! Processor output.

use std::fmt;

use pressmark_meta::Metadata;
use pressmark_renderer::{Warning, unconverted_directives};

/// A processed document.
///
/// Holds a single rendered text. [`canonical_text`](Self::canonical_text) is
/// a read-only alias for consumers that read the output under that name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedDocument {
    text: String,
    metadata: Metadata,
    warnings: Vec<Warning>,
}

impl ProcessedDocument {
    pub(crate) fn new(text: String, metadata: Metadata, warnings: Vec<Warning>) -> Self {
        Self {
            text,
            metadata,
            warnings,
        }
    }

    /// Rendered HTML.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Alias of [`text`](Self::text).
    pub fn canonical_text(&self) -> &str {
        &self.text
    }

    /// Metadata after merging caller, preamble and option values.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Recoverable problems found while processing.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Directive fences still visible in the output.
    pub fn unconverted_directives(&self) -> Vec<String> {
        unconverted_directives(&self.text)
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for ProcessedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
