//! Parse errors and their rendering.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
use rowan::TextRange;

/// Failure to read query text back into a chain. Every variant carries the
/// span of the offending text and its 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: {message}, found {found}")]
    Syntax {
        line: usize,
        found: String,
        message: String,
        range: TextRange,
    },

    #[error("line {line}: `{namespace}[{index}]` is out of range ({len} available)")]
    DanglingReference {
        line: usize,
        namespace: &'static str,
        index: usize,
        len: usize,
        range: TextRange,
    },

    #[error("line {line}: literal nesting exceeds {limit} levels")]
    RecursionLimitExceeded {
        line: usize,
        limit: u32,
        range: TextRange,
    },
}

impl ParseError {
    pub fn range(&self) -> TextRange {
        match self {
            ParseError::Syntax { range, .. }
            | ParseError::DanglingReference { range, .. }
            | ParseError::RecursionLimitExceeded { range, .. } => *range,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            ParseError::Syntax { line, .. }
            | ParseError::DanglingReference { line, .. }
            | ParseError::RecursionLimitExceeded { line, .. } => *line,
        }
    }

    fn label(&self) -> String {
        match self {
            ParseError::Syntax { message, .. } => message.clone(),
            ParseError::DanglingReference { namespace, len, .. } => {
                format!("only {len} {namespace} entries are available")
            }
            ParseError::RecursionLimitExceeded { limit, .. } => {
                format!("nested deeper than {limit} levels")
            }
        }
    }

    /// Render against the source text as an annotated snippet.
    pub fn render(&self, source: &str) -> String {
        let start: usize = self.range().start().into();
        let end: usize = self.range().end().into();
        // Zero-width spans (end of input) still get a visible marker.
        let end = if start == end {
            (start + 1).min(source.len())
        } else {
            end
        };
        let start = start.min(end);

        let label = self.label();
        let title = self.to_string();
        let snippet = Snippet::source(source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(start..end).label(&label));
        let report = vec![Level::ERROR.primary_title(&title).element(snippet)];

        Renderer::plain().render(&report).to_string()
    }
}
