//! Code fence tracking.
//!
//! Directive fences inside fenced code are content, not syntax. The block
//! scanner feeds every line through a [`CodeFence`] to know when to skip.

/// Open code fence state.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CodeFence {
    /// Marker character and run length of the open fence.
    open: Option<(char, usize)>,
}

impl CodeFence {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line (without its line ending).
    ///
    /// Returns `true` if the line opened or closed a fence.
    pub(crate) fn observe(&mut self, line: &str) -> bool {
        let Some(trimmed) = strip_indent(line) else {
            return false;
        };

        match self.open {
            Some((marker, len)) => {
                let run = run_length(trimmed, marker);
                if run >= len && trimmed[run..].trim().is_empty() {
                    self.open = None;
                    return true;
                }
                false
            }
            None => match opening(trimmed) {
                Some(fence) => {
                    self.open = Some(fence);
                    true
                }
                None => false,
            },
        }
    }
}

/// Strip up to three spaces of indentation. Four or more is an indented code
/// line, which never opens or closes a fence.
pub(crate) fn strip_indent(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 || line[indent..].starts_with('\t') {
        None
    } else {
        Some(&line[indent..])
    }
}

fn run_length(s: &str, marker: char) -> usize {
    s.chars().take_while(|&c| c == marker).count()
}

fn opening(trimmed: &str) -> Option<(char, usize)> {
    let marker = trimmed.chars().next().filter(|&c| c == '`' || c == '~')?;
    let len = run_length(trimmed, marker);
    if len < 3 {
        return None;
    }
    // A backtick fence's info string may not contain backticks.
    if marker == '`' && trimmed[len..].contains('`') {
        return None;
    }
    Some((marker, len))
}
