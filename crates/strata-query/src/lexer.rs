//! Lexer for query text.
//!
//! Query text is line oriented, so lexing yields [`Statement`]s rather than a
//! flat token stream: one per non-blank line, holding only the tokens the
//! parser looks at. Whitespace is dropped and newlines end a statement.
//! Input no rule recognizes becomes a [`SyntaxKind::Unknown`] token, left for
//! the parser to report.

use std::ops::Range;

use logos::Logos;
use rowan::{TextRange, TextSize};

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

/// Significant tokens of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based line number.
    pub line: usize,
    /// Never empty.
    pub tokens: Vec<Token>,
}

pub fn statements(source: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut tokens = Vec::new();
    let mut line = 1;

    for (kind, range) in SyntaxKind::lexer(source).spanned() {
        let kind = kind.unwrap_or(SyntaxKind::Unknown);
        match kind {
            SyntaxKind::Whitespace => {}
            SyntaxKind::Newline => {
                if !tokens.is_empty() {
                    statements.push(Statement {
                        line,
                        tokens: std::mem::take(&mut tokens),
                    });
                }
                line += 1;
            }
            _ => tokens.push(Token {
                kind,
                span: text_range(range),
            }),
        }
    }
    if !tokens.is_empty() {
        statements.push(Statement { line, tokens });
    }

    statements
}

fn text_range(range: Range<usize>) -> TextRange {
    let offset = |at: usize| TextSize::from(u32::try_from(at).unwrap_or(u32::MAX));
    TextRange::new(offset(range.start), offset(range.end))
}

#[inline]
pub fn token_text<'src>(source: &'src str, token: &Token) -> &'src str {
    &source[Range::<usize>::from(token.span)]
}
