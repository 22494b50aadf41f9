//! Flavour classification.
//!
//! A flavour is decided by the shape of the compiled root expression alone:
//! registered `(name, pattern)` pairs are tried in registration order and the
//! first match wins. Patterns are never ranked by specificity. A chain without
//! Parts is always [`SELECT_ALL`].

use std::fmt;

use regex_automata::Input;
use regex_automata::dfa::{Automaton, StartKind, dense};

use crate::chain::Chain;
use crate::compile::{CompileError, compile};

/// Flavour of a chain with no Parts.
pub const SELECT_ALL: &str = "select_all";

/// Collection operations recognised by [`Classifier::default`].
pub const DEFAULT_FLAVOURS: &[&str] = &[
    "find_one",
    "find",
    "count_documents",
    "distinct",
    "aggregate",
    "insert_one",
    "insert_many",
    "update_one",
    "update_many",
    "replace_one",
    "delete_one",
    "delete_many",
    "bulk_write",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Flavour(String);

impl Flavour {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn select_all() -> Self {
        Self::new(SELECT_ALL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_select_all(&self) -> bool {
        self.0 == SELECT_ALL
    }
}

impl fmt::Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Flavour {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Flavour {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("no flavour matches `{expression}`")]
    Unclassifiable { expression: String },

    #[error("invalid pattern for flavour `{flavour}`: {message}")]
    InvalidPattern { flavour: String, message: String },

    #[error("matching flavour `{flavour}` failed: {message}")]
    MatchFailed { flavour: String, message: String },

    #[error(transparent)]
    Compile(#[from] CompileError),
}

struct Entry {
    flavour: Flavour,
    pattern: String,
    dfa: dense::DFA<Vec<u32>>,
}

/// Ordered set of flavour patterns.
pub struct Classifier {
    entries: Vec<Entry>,
}

impl Classifier {
    /// Classifier without any pattern: only [`SELECT_ALL`] is recognised.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a flavour. It is tried after every flavour registered before it.
    pub fn register(
        &mut self,
        flavour: impl Into<String>,
        pattern: &str,
    ) -> Result<&mut Self, ClassifyError> {
        let flavour = Flavour::new(flavour);
        let dfa = dense::DFA::builder()
            .configure(dense::DFA::config().start_kind(StartKind::Unanchored))
            .build(pattern)
            .map_err(|e| ClassifyError::InvalidPattern {
                flavour: flavour.to_string(),
                message: e.to_string(),
            })?;

        self.entries.push(Entry {
            flavour,
            pattern: pattern.to_owned(),
            dfa,
        });
        Ok(self)
    }

    pub fn flavours(&self) -> impl Iterator<Item = &Flavour> {
        self.entries.iter().map(|entry| &entry.flavour)
    }

    pub fn pattern(&self, flavour: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.flavour == flavour)
            .map(|entry| entry.pattern.as_str())
    }

    pub fn classify(&self, chain: &Chain) -> Result<Flavour, ClassifyError> {
        if chain.is_empty() {
            tracing::debug!(root = chain.root(), "classified as select-all");
            return Ok(Flavour::select_all());
        }

        let compiled = compile(chain)?;
        let expression = compiled.root_expression();
        for entry in &self.entries {
            let matched = entry
                .dfa
                .try_search_fwd(&Input::new(expression))
                .map_err(|e| ClassifyError::MatchFailed {
                    flavour: entry.flavour.to_string(),
                    message: e.to_string(),
                })?
                .is_some();
            if matched {
                tracing::debug!(flavour = %entry.flavour, expression, "classified query");
                return Ok(entry.flavour.clone());
            }
        }

        Err(ClassifyError::Unclassifiable {
            expression: expression.to_owned(),
        })
    }
}

/// Pattern matching `<root>(.<attr>)*.<method>(` at the start of the
/// expression, so `coll.find(` and `db.users.find(` share a flavour.
pub fn method_pattern(method: &str) -> String {
    format!(
        r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*\.{}\(",
        regex_escape(method)
    )
}

fn regex_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl Default for Classifier {
    fn default() -> Self {
        let mut classifier = Self::empty();
        for flavour in DEFAULT_FLAVOURS {
            if let Err(e) = classifier.register(*flavour, &method_pattern(flavour)) {
                panic!("built-in flavour pattern is invalid: {e}");
            }
        }
        classifier
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (&e.flavour, &e.pattern)))
            .finish()
    }
}
