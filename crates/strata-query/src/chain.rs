//! Query chains and the fluent builder.
//!
//! A [`Chain`] is a root identifier followed by an ordered list of [`Part`]s.
//! Building never evaluates anything: reading an attribute appends a bare
//! [`Part::Attr`], invoking turns the trailing attribute into a
//! [`Part::Call`], and comparisons append calls so filter expressions can be
//! captured symbolically.

use std::fmt;
use std::ops::{Bound, RangeBounds};

use indexmap::IndexMap;
use strata_core::Value;

/// Keyword arguments of a call, in call order.
pub type Kwargs = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChainError {
    #[error("cannot invoke `{root}`: the chain does not end in an attribute")]
    NotCallable { root: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Attr(String),
    Call {
        method: String,
        args: Vec<Value>,
        kwargs: Kwargs,
    },
}

impl Part {
    pub fn name(&self) -> &str {
        match self {
            Part::Attr(name) => name,
            Part::Call { method, .. } => method,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Part::Call { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    root: String,
    parts: Vec<Part>,
}

impl Chain {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            parts: Vec::new(),
        }
    }

    pub fn from_parts(root: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            root: root.into(),
            parts,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// A chain without parts is the bare root: the select-all shape.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn push(&mut self, part: Part) {
        self.parts.push(part);
    }

    pub fn attr(mut self, name: impl Into<String>) -> Self {
        self.parts.push(Part::Attr(name.into()));
        self
    }

    /// Append a call with positional arguments only.
    pub fn call<I>(self, method: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.call_with(method, args, Kwargs::new())
    }

    pub fn call_with<I, K>(mut self, method: impl Into<String>, args: I, kwargs: K) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
        K: IntoIterator<Item = (String, Value)>,
    {
        self.parts.push(Part::Call {
            method: method.into(),
            args: args.into_iter().map(Into::into).collect(),
            kwargs: kwargs.into_iter().collect(),
        });
        self
    }

    /// Call the trailing attribute, rewriting it in place into a call Part.
    pub fn invoke<I>(mut self, args: I, kwargs: Kwargs) -> Result<Self, ChainError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        match self.parts.pop() {
            Some(Part::Attr(method)) => {
                self.parts.push(Part::Call {
                    method,
                    args: args.into_iter().map(Into::into).collect(),
                    kwargs,
                });
                Ok(self)
            }
            _ => Err(ChainError::NotCallable { root: self.root }),
        }
    }

    /// Chain over a contiguous sub-range of Parts; bounds are clamped.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let len = self.parts.len();
        let start = match range.start_bound() {
            Bound::Included(&i) => i,
            Bound::Excluded(&i) => i.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&i) => i.saturating_add(1),
            Bound::Excluded(&i) => i,
            Bound::Unbounded => len,
        }
        .clamp(start, len);

        Self {
            root: self.root.clone(),
            parts: self.parts[start..end].to_vec(),
        }
    }

    pub fn eq(self, other: impl Into<Value>) -> Self {
        self.call("eq", [other.into()])
    }

    pub fn ne(self, other: impl Into<Value>) -> Self {
        self.call("ne", [other.into()])
    }

    pub fn lt(self, other: impl Into<Value>) -> Self {
        self.call("lt", [other.into()])
    }

    pub fn le(self, other: impl Into<Value>) -> Self {
        self.call("le", [other.into()])
    }

    pub fn gt(self, other: impl Into<Value>) -> Self {
        self.call("gt", [other.into()])
    }

    pub fn ge(self, other: impl Into<Value>) -> Self {
        self.call("ge", [other.into()])
    }
}

/// Renders the chain's root expression; nested chains and literal documents
/// show as `query[i]`/`documents[i]` exactly as [`crate::compile`] emits them.
impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compiled = crate::compile::render(self);
        f.write_str(compiled.root_expression())
    }
}

/// Fluent chain construction.
///
/// ```
/// use strata_query::chain;
///
/// let q = chain!(coll.find(serde_json::json!({"x": 1})).limit(5));
/// assert_eq!(q.len(), 2);
/// ```
#[macro_export]
macro_rules! chain {
    (@parts $chain:expr ;) => {
        $chain
    };
    (@parts $chain:expr ; . $name:ident ( $($arg:expr),* $(,)? ) $($rest:tt)*) => {
        $crate::chain!(
            @parts $chain.call(stringify!($name), {
                let args: ::std::vec::Vec<$crate::Value> =
                    ::std::vec![$($crate::Value::from($arg)),*];
                args
            }) ; $($rest)*
        )
    };
    (@parts $chain:expr ; . $name:ident $($rest:tt)*) => {
        $crate::chain!(@parts $chain.attr(stringify!($name)) ; $($rest)*)
    };
    ($root:ident $($rest:tt)*) => {
        $crate::chain!(@parts $crate::Chain::new(stringify!($root)) ; $($rest)*)
    };
}
