//! Text to chain.
//!
//! Grammar (one statement per line; all but the last define subqueries):
//!
//! ```text
//! statement = NAME ("." segment)*
//! segment   = NAME | NAME "(" [arg ("," arg)* [","]] ")"
//! arg       = [NAME "="] literal           positional args precede keywords
//! NAME      = IDENT | "true" | "false" | "null"
//! literal   = NUMBER | STRING | "true" | "false" | "null"
//!           | "[" [literal ("," literal)* [","]] "]"
//!           | "{" [STRING ":" literal ("," STRING ":" literal)* [","]] "}"
//!           | "documents" "[" INT "]" | "query" "[" INT "]"
//! ```
//!
//! Argument text is evaluated by this grammar alone. The only names in scope
//! are `documents` and `query`; nothing else from the host can be reached.

use rowan::{TextRange, TextSize};
use serde::Deserialize;
use strata_core::{Map, Value};

use crate::chain::{Chain, Kwargs, Part};
use crate::error::ParseError;
use crate::lexer::{Statement, Token, statements, token_text};
use crate::syntax_kind::SyntaxKind;

const DEFAULT_MAX_DEPTH: u32 = 64;

/// Parser limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Deepest literal nesting accepted in an argument.
    pub max_depth: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Parse compiled query text with default options.
///
/// `query[i]` names statement `i` of `text`. When `text` is a single
/// statement, `query[i]` names `subqueries[i]` instead, so the root line can be
/// parsed on its own against a previously compiled subquery list.
pub fn parse(text: &str, documents: &[Value], subqueries: &[Chain]) -> Result<Chain, ParseError> {
    parse_with(text, documents, subqueries, ParseOptions::default())
}

#[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
pub fn parse_with(
    text: &str,
    documents: &[Value],
    subqueries: &[Chain],
    options: ParseOptions,
) -> Result<Chain, ParseError> {
    let statements = statements(text);
    let mut parser = Parser {
        source: text,
        tokens: &[],
        pos: 0,
        line: 1,
        documents,
        queries: Vec::new(),
        max_depth: options.max_depth,
        depth: 0,
    };

    let Some((last, preceding)) = statements.split_last() else {
        return Err(parser.syntax_error("expected a query"));
    };
    if preceding.is_empty() {
        parser.queries = subqueries.to_vec();
    }

    for statement in preceding {
        let chain = parser.statement(statement)?;
        parser.queries.push(chain);
    }
    let chain = parser.statement(last)?;
    tracing::debug!(statements = statements.len(), parts = chain.len(), "parsed query");
    Ok(chain)
}

struct Parser<'a> {
    source: &'a str,
    /// Tokens of the statement being parsed.
    tokens: &'a [Token],
    pos: usize,
    line: usize,
    documents: &'a [Value],
    queries: Vec<Chain>,
    max_depth: u32,
    depth: u32,
}

impl<'a> Parser<'a> {
    fn statement(&mut self, statement: &'a Statement) -> Result<Chain, ParseError> {
        self.tokens = &statement.tokens;
        self.pos = 0;
        self.line = statement.line;

        let root = self.expect_name("expected a root name")?;
        let mut chain = Chain::new(root);
        while self.eat(SyntaxKind::Dot) {
            let name = self.expect_name("expected a method or attribute name after `.`")?;
            if self.at(SyntaxKind::ParenOpen) {
                let (args, kwargs) = self.arguments()?;
                chain.push(Part::Call {
                    method: name,
                    args,
                    kwargs,
                });
            } else {
                chain.push(Part::Attr(name));
            }
        }

        if self.current().is_some() {
            return Err(self.syntax_error("expected `.` or end of line"));
        }
        Ok(chain)
    }

    fn arguments(&mut self) -> Result<(Vec<Value>, Kwargs), ParseError> {
        self.bump();
        let mut args = Vec::new();
        let mut kwargs = Kwargs::new();

        loop {
            if self.eat(SyntaxKind::ParenClose) {
                break;
            }

            if self.at_name() && self.nth(1) == Some(SyntaxKind::Equals) {
                let at = self.pos;
                let name = self.text().to_owned();
                self.bump();
                self.bump();
                let value = self.literal()?;
                if kwargs.insert(name, value).is_some() {
                    return Err(self.syntax_error_at(at, "duplicate keyword argument"));
                }
            } else if !kwargs.is_empty() {
                return Err(self.syntax_error("positional argument follows keyword argument"));
            } else {
                args.push(self.literal()?);
            }

            if self.eat(SyntaxKind::Comma) {
                continue;
            }
            if self.eat(SyntaxKind::ParenClose) {
                break;
            }
            return Err(self.syntax_error("expected `,` or `)`"));
        }

        Ok((args, kwargs))
    }

    fn literal(&mut self) -> Result<Value, ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::RecursionLimitExceeded {
                line: self.line,
                limit: self.max_depth,
                range: self.span_at(self.pos),
            });
        }
        self.depth += 1;
        let value = self.literal_inner();
        self.depth -= 1;
        value
    }

    fn literal_inner(&mut self) -> Result<Value, ParseError> {
        let Some(kind) = self.current() else {
            return Err(self.syntax_error("expected an argument"));
        };

        match kind {
            SyntaxKind::KwNull => {
                self.bump();
                Ok(Value::Null)
            }
            SyntaxKind::KwTrue | SyntaxKind::KwFalse => {
                self.bump();
                Ok(Value::Bool(kind == SyntaxKind::KwTrue))
            }
            SyntaxKind::Number => self.number(),
            SyntaxKind::Str => self.string().map(Value::String),
            SyntaxKind::BracketOpen => self.array(),
            SyntaxKind::BraceOpen => self.object(),
            SyntaxKind::Id => self.reference(),
            _ => Err(self.syntax_error("expected a literal, `documents[i]` or `query[i]`")),
        }
    }

    fn number(&mut self) -> Result<Value, ParseError> {
        let text = self.text();
        let value = if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>().ok().map(Value::Float)
        } else {
            text.parse::<i64>().ok().map(Value::Int)
        };
        match value {
            Some(value) => {
                self.bump();
                Ok(value)
            }
            None => Err(self.syntax_error("number out of range")),
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        match serde_json::from_str::<String>(self.text()) {
            Ok(s) => {
                self.bump();
                Ok(s)
            }
            Err(_) => Err(self.syntax_error("invalid string literal")),
        }
    }

    fn array(&mut self) -> Result<Value, ParseError> {
        self.bump();
        let mut items = Vec::new();
        loop {
            if self.eat(SyntaxKind::BracketClose) {
                break;
            }
            items.push(self.literal()?);
            if self.eat(SyntaxKind::Comma) {
                continue;
            }
            if self.eat(SyntaxKind::BracketClose) {
                break;
            }
            return Err(self.syntax_error("expected `,` or `]`"));
        }
        Ok(Value::Array(items))
    }

    fn object(&mut self) -> Result<Value, ParseError> {
        self.bump();
        let mut map = Map::new();
        loop {
            if self.eat(SyntaxKind::BraceClose) {
                break;
            }
            if !self.at(SyntaxKind::Str) {
                return Err(self.syntax_error("expected a string key"));
            }
            let key = self.string()?;
            if !self.eat(SyntaxKind::Colon) {
                return Err(self.syntax_error("expected `:`"));
            }
            let value = self.literal()?;
            map.insert(key, value);
            if self.eat(SyntaxKind::Comma) {
                continue;
            }
            if self.eat(SyntaxKind::BraceClose) {
                break;
            }
            return Err(self.syntax_error("expected `,` or `}`"));
        }
        Ok(Value::Object(map))
    }

    /// `documents[i]` or `query[i]`.
    fn reference(&mut self) -> Result<Value, ParseError> {
        let start = self.span_at(self.pos);
        let namespace = match self.text() {
            "documents" => "documents",
            "query" => "query",
            _ => {
                return Err(
                    self.syntax_error("unknown name, only `documents` and `query` are in scope")
                );
            }
        };
        self.bump();

        if !self.eat(SyntaxKind::BracketOpen) {
            return Err(self.syntax_error("expected `[`"));
        }
        let index = match self.current() {
            Some(SyntaxKind::Number) => self.text().parse::<usize>().ok(),
            _ => None,
        };
        let Some(index) = index else {
            return Err(self.syntax_error("expected a non-negative integer index"));
        };
        self.bump();
        let close = self.span_at(self.pos);
        if !self.eat(SyntaxKind::BracketClose) {
            return Err(self.syntax_error("expected `]`"));
        }
        let range = start.cover(close);

        let (value, len) = match namespace {
            "documents" => (self.documents.get(index).cloned(), self.documents.len()),
            _ => (
                self.queries.get(index).cloned().map(Value::from),
                self.queries.len(),
            ),
        };
        value.ok_or_else(|| ParseError::DanglingReference {
            line: self.line,
            namespace,
            index,
            len,
            range,
        })
    }

    fn current(&self) -> Option<SyntaxKind> {
        self.nth(0)
    }

    fn nth(&self, lookahead: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.pos + lookahead).map(|token| token.kind)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == Some(kind)
    }

    /// Keywords are valid names: `coll.null` is an attribute, `f(true=1)` a keyword argument.
    fn at_name(&self) -> bool {
        matches!(
            self.current(),
            Some(SyntaxKind::Id | SyntaxKind::KwTrue | SyntaxKind::KwFalse | SyntaxKind::KwNull)
        )
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        let matched = self.at(kind);
        if matched {
            self.bump();
        }
        matched
    }

    fn bump(&mut self) {
        debug_assert!(self.pos < self.tokens.len(), "bump past end of statement");
        self.pos += 1;
    }

    fn expect_name(&mut self, message: &str) -> Result<String, ParseError> {
        if !self.at_name() {
            return Err(self.syntax_error(message));
        }
        let name = self.text().to_owned();
        self.bump();
        Ok(name)
    }

    /// Text of the current token; empty at end of statement.
    fn text(&self) -> &'a str {
        match self.tokens.get(self.pos) {
            Some(token) => token_text(self.source, token),
            None => "",
        }
    }

    /// Span of token `at`, or an empty span after the last token.
    fn span_at(&self, at: usize) -> TextRange {
        if let Some(token) = self.tokens.get(at) {
            return token.span;
        }
        let offset = match self.tokens.last() {
            Some(last) => last.span.end(),
            None => TextSize::from(0),
        };
        TextRange::empty(offset)
    }

    fn syntax_error(&self, message: &str) -> ParseError {
        self.syntax_error_at(self.pos, message)
    }

    fn syntax_error_at(&self, at: usize, message: &str) -> ParseError {
        ParseError::Syntax {
            line: self.line,
            found: self.describe(at),
            message: message.to_owned(),
            range: self.span_at(at),
        }
    }

    /// What sits at token `at`; literals and names also show their text.
    fn describe(&self, at: usize) -> String {
        let Some(token) = self.tokens.get(at) else {
            return SyntaxKind::Newline.describe().to_owned();
        };
        match token.kind {
            SyntaxKind::Number
            | SyntaxKind::Str
            | SyntaxKind::Id
            | SyntaxKind::KwTrue
            | SyntaxKind::KwFalse
            | SyntaxKind::Unknown => format!(
                "{} `{}`",
                token.kind.describe(),
                token_text(self.source, token)
            ),
            kind => kind.describe().to_owned(),
        }
    }
}
