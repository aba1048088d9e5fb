//! Recoverable diagnostics.
//!
//! Nothing in the markup pipeline fails on bad input. Problems are collected
//! as [`Warning`]s next to the output, and each one is logged when raised.

/// A recoverable problem found while processing a document.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    /// A `:::` line that is not a valid fence. The line is kept as text.
    #[error("line {line}: malformed directive `{fence}`: {reason}")]
    MalformedDirective {
        line: usize,
        fence: String,
        reason: String,
    },
    /// An opening fence without a matching `:::`. The directive extends to
    /// the end of its enclosing block.
    #[error("line {line}: unclosed directive :::{name} (missing closing :::)")]
    UnclosedDirective { line: usize, name: String },
    /// A closing `:::` with no open directive. The line is kept as text.
    #[error("line {line}: `:::` without an open directive")]
    StrayClose { line: usize },
    /// A well-formed directive no handler could resolve.
    #[error("unresolved directive :::{name}: {reason}")]
    UnresolvedDirective {
        name: String,
        reason: UnresolvedReason,
    },
    /// A node that markup syntax cannot express exactly.
    #[error("{node} cannot be written as markup exactly: {detail}")]
    SerializationGap { node: &'static str, detail: String },
    /// The preamble exists but is not valid metadata.
    #[error("malformed preamble: {0}")]
    MalformedPreamble(String),
}

/// Why a directive was left unresolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnresolvedReason {
    #[error("no handler registered for this name")]
    UnknownName,
    #[error("missing class attribute")]
    MissingClass,
}

/// Log `warning` and add it to `warnings`.
pub(crate) fn report(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!(warning = %warning, "Recoverable markup problem");
    warnings.push(warning);
}
