//! Reference tokens and string escaping.
//!
//! Encoded records stand in for shared structure with tagged strings:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `?id` | Node flattened into this record's `builds` table |
//! | `&id` | artifact by content hash (`blobs`, `files`, or the store) |
//! | `%id` | Node persisted externally under a persistent identifier |
//!
//! Plain strings that would be mistaken for a token get a leading `\`.

use std::borrow::Cow;
use std::fmt;

/// Key carrying the canonical type name in a node record.
pub const TYPE_TAG: &str = "_path";

const ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Build,
    Artifact,
    Stored,
}

impl ReferenceKind {
    pub fn sigil(self) -> char {
        match self {
            ReferenceKind::Build => '?',
            ReferenceKind::Artifact => '&',
            ReferenceKind::Stored => '%',
        }
    }

    fn from_sigil(c: char) -> Option<Self> {
        match c {
            '?' => Some(ReferenceKind::Build),
            '&' => Some(ReferenceKind::Artifact),
            '%' => Some(ReferenceKind::Stored),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReferenceKind::Build => "build",
            ReferenceKind::Artifact => "artifact",
            ReferenceKind::Stored => "stored node",
        })
    }
}

/// A parsed reference token borrowing its id from the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    pub kind: ReferenceKind,
    pub id: &'a str,
}

impl<'a> Reference<'a> {
    /// Parse a token. Returns `None` for plain strings and for a bare sigil.
    pub fn parse(token: &'a str) -> Option<Self> {
        let kind = ReferenceKind::from_sigil(token.chars().next()?)?;
        let id = &token[1..];
        (!id.is_empty()).then_some(Self { kind, id })
    }

    pub fn render(kind: ReferenceKind, id: &str) -> String {
        format!("{}{id}", kind.sigil())
    }
}

impl fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.sigil(), self.id)
    }
}

fn needs_escape(s: &str) -> bool {
    s.starts_with(['?', '&', '%', ESCAPE])
}

/// Escape a plain string so it cannot be read back as a token.
pub fn escape(s: &str) -> Cow<'_, str> {
    if needs_escape(s) {
        Cow::Owned(format!("{ESCAPE}{s}"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Escape a mapping key; additionally protects the type tag.
pub fn escape_key(key: &str) -> Cow<'_, str> {
    if key == TYPE_TAG || needs_escape(key) {
        Cow::Owned(format!("{ESCAPE}{key}"))
    } else {
        Cow::Borrowed(key)
    }
}

/// Inverse of [`escape`] and [`escape_key`].
pub fn unescape(s: &str) -> &str {
    s.strip_prefix(ESCAPE).unwrap_or(s)
}

/// Whether `s` carries the escape prefix.
pub fn is_escaped(s: &str) -> bool {
    s.starts_with(ESCAPE)
}
