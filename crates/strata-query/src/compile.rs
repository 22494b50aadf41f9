//! Chain to text.
//!
//! ```text
//! coll.find({"x": 1}).limit(5)   =>   coll.find(documents[0]).limit(5)
//!                                     documents = [{"x": 1}]
//! ```
//!
//! Nested chains are compiled first and emitted as numbered statements ahead
//! of the root expression, so `query[i]` always names line `i` of the text.
//! Mappings, sequences and anything without an inline literal form go to the
//! shared `documents` list.

use strata_core::Value;

use crate::chain::{Chain, Part};
use crate::query_node::as_chain;

/// Output of [`compile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// Newline-separated statements; the last one is the root expression.
    pub text: String,
    pub documents: Vec<Value>,
    /// Chains referenced as `query[i]`, in statement order.
    pub subqueries: Vec<Chain>,
}

impl Compiled {
    pub fn root_expression(&self) -> &str {
        self.text.rsplit('\n').next().unwrap_or_default()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

/// A name [`compile`] cannot write as query text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{position} name `{name}` cannot be written as query text")]
pub struct CompileError {
    pub position: &'static str,
    pub name: String,
}

/// Compile a chain to text the parser reads back to an equal chain.
///
/// Every name (root, attribute, method, keyword argument) must be an
/// identifier: ASCII letters, digits and `_`, not starting with a digit.
/// `true`, `false` and `null` are accepted.
pub fn compile(chain: &Chain) -> Result<Compiled, CompileError> {
    check_names(chain)?;
    Ok(render(chain))
}

/// [`compile`] without the name check, for display.
pub(crate) fn render(chain: &Chain) -> Compiled {
    let mut compiler = Compiler::default();
    let root = compiler.expression(chain);
    compiler.lines.push(root);

    Compiled {
        text: compiler.lines.join("\n"),
        documents: compiler.documents,
        subqueries: compiler.subqueries,
    }
}

fn check_names(chain: &Chain) -> Result<(), CompileError> {
    check_name("root", chain.root())?;
    for part in chain.parts() {
        match part {
            Part::Attr(name) => check_name("attribute", name)?,
            Part::Call {
                method,
                args,
                kwargs,
            } => {
                check_name("method", method)?;
                for (name, _) in kwargs {
                    check_name("keyword argument", name)?;
                }
                for value in args.iter().chain(kwargs.values()) {
                    if let Some(nested) = as_chain(value) {
                        check_names(nested)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn check_name(position: &'static str, name: &str) -> Result<(), CompileError> {
    if is_identifier(name) {
        return Ok(());
    }
    Err(CompileError {
        position,
        name: name.to_owned(),
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Default)]
struct Compiler {
    lines: Vec<String>,
    documents: Vec<Value>,
    subqueries: Vec<Chain>,
}

impl Compiler {
    fn expression(&mut self, chain: &Chain) -> String {
        let mut out = chain.root().to_owned();
        for part in chain.parts() {
            out.push('.');
            match part {
                Part::Attr(name) => out.push_str(name),
                Part::Call {
                    method,
                    args,
                    kwargs,
                } => {
                    let mut rendered: Vec<String> = args.iter().map(|arg| self.arg(arg)).collect();
                    for (name, value) in kwargs {
                        let value = self.arg(value);
                        rendered.push(format!("{name}={value}"));
                    }
                    out.push_str(method);
                    out.push('(');
                    out.push_str(&rendered.join(", "));
                    out.push(')');
                }
            }
        }
        out
    }

    fn arg(&mut self, value: &Value) -> String {
        if let Some(chain) = as_chain(value) {
            let text = self.expression(chain);
            self.lines.push(text);
            self.subqueries.push(chain.clone());
            return format!("query[{}]", self.lines.len() - 1);
        }

        match inline_literal(value) {
            Some(literal) => literal,
            None => {
                self.documents.push(value.clone());
                format!("documents[{}]", self.documents.len() - 1)
            }
        }
    }
}

/// Inline text for scalars the parser reads back to an equal value.
fn inline_literal(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_owned()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        // `{:?}` keeps a fractional part or exponent, so floats stay floats.
        Value::Float(f) if f.is_finite() => Some(format!("{f:?}")),
        Value::String(s) => serde_json::to_string(s).ok(),
        _ => None,
    }
}
