//! Token kinds of the query text grammar.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    /// Keyword argument separator: `limit=5`
    #[token("=")]
    Equals,

    #[token(".")]
    Dot,

    #[token("true")]
    KwTrue,

    #[token("false")]
    KwFalse,

    #[token("null")]
    KwNull,

    /// JSON number; a fraction or exponent makes it a float.
    #[regex(r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    /// JSON string literal, escapes decoded by the parser.
    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    Str,

    /// Defined after the keywords so they take precedence.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Id,

    #[regex(r"[ \t]+")]
    Whitespace,

    /// Statement separator.
    #[token("\n")]
    #[token("\r\n")]
    Newline,

    /// Input no rule matches.
    Unknown,
}

impl SyntaxKind {
    /// How the kind reads in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            SyntaxKind::ParenOpen => "`(`",
            SyntaxKind::ParenClose => "`)`",
            SyntaxKind::BracketOpen => "`[`",
            SyntaxKind::BracketClose => "`]`",
            SyntaxKind::BraceOpen => "`{`",
            SyntaxKind::BraceClose => "`}`",
            SyntaxKind::Comma => "`,`",
            SyntaxKind::Colon => "`:`",
            SyntaxKind::Equals => "`=`",
            SyntaxKind::Dot => "`.`",
            SyntaxKind::KwTrue | SyntaxKind::KwFalse => "boolean",
            SyntaxKind::KwNull => "`null`",
            SyntaxKind::Number => "number",
            SyntaxKind::Str => "string",
            SyntaxKind::Id => "identifier",
            SyntaxKind::Whitespace => "whitespace",
            SyntaxKind::Newline => "end of line",
            SyntaxKind::Unknown => "unrecognized input",
        }
    }
}
