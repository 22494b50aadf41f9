//! The `Node` contract and per-type schemas.
//!
//! A Node is a polymorphic serializable unit. Each concrete type declares a
//! static [`NodeSchema`]: its canonical type name, the ordered list of fields
//! its constructor consumes, the ordered list of fields assigned after
//! construction, and the constructor itself. The decoder drives construction
//! purely from the schema; no runtime introspection is involved.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;

/// Shared handle to a Node. Identity (pointer equality) is what the encoder
/// and decoder deduplicate on.
pub type NodeRef = Arc<dyn Node>;

/// Constructor invoked with the constructor-time fields of a decoded record.
pub type Construct = fn(&mut Fields) -> Result<Box<dyn Node>, NodeError>;

/// Static description of a Node type.
pub struct NodeSchema {
    /// Canonical type name, written as the record's `_path`.
    pub name: &'static str,
    /// Fields consumed by [`NodeSchema::construct`], in encoding order.
    pub init: &'static [&'static str],
    /// Fields assigned through [`Node::assign`] once the Node exists.
    pub post: &'static [&'static str],
    pub construct: Construct,
}

impl NodeSchema {
    /// Whether `field` is declared as constructor-time or post-construction.
    pub fn declares(&self, field: &str) -> bool {
        self.init.iter().chain(self.post).any(|name| *name == field)
    }

    pub fn is_post(&self, field: &str) -> bool {
        self.post.iter().any(|name| *name == field)
    }

    /// Build a Node from decoded fields: run the constructor over the
    /// constructor-time fields, then assign the post-construction ones.
    ///
    /// Fields the schema does not declare are dropped with a warning.
    pub fn instantiate(&self, mut fields: Fields) -> Result<Box<dyn Node>, NodeError> {
        let mut node = (self.construct)(&mut fields)?;
        for (name, value) in fields {
            if self.is_post(&name) {
                node.assign(&name, value)?;
            } else {
                tracing::warn!(node = self.name, field = %name, "ignoring undeclared field");
            }
        }
        Ok(node)
    }
}

impl fmt::Debug for NodeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSchema")
            .field("name", &self.name)
            .field("init", &self.init)
            .field("post", &self.post)
            .finish_non_exhaustive()
    }
}

pub trait Node: fmt::Debug + Send + Sync + 'static {
    fn schema(&self) -> &'static NodeSchema;

    /// Field values in schema order: constructor fields, then post-construction
    /// fields. Optional post fields that are unset may be omitted.
    fn fields(&self) -> Vec<(&'static str, Value)>;

    /// Assign a post-construction field.
    fn assign(&mut self, field: &str, value: Value) -> Result<(), NodeError> {
        let _ = value;
        Err(NodeError::UnknownField {
            node: self.schema().name,
            field: field.to_owned(),
        })
    }

    /// Identifier under which this Node is persisted outside the record.
    /// Nodes that report one encode as `%id` instead of being flattened.
    fn persistent_id(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn Node {
    pub fn type_name(&self) -> &'static str {
        self.schema().name
    }

    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Field errors raised while constructing or assigning a Node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("`{node}` is missing field `{field}`")]
    MissingField { node: &'static str, field: String },

    #[error("`{node}.{field}` expected {expected}, found {found}")]
    InvalidField {
        node: &'static str,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("`{node}` has no field `{field}`")]
    UnknownField { node: &'static str, field: String },
}

/// Decoded field values handed to a constructor.
///
/// Constructors `take` what they need; whatever remains is left for the caller.
#[derive(Debug, Clone)]
pub struct Fields {
    node: &'static str,
    values: IndexMap<String, Value>,
}

impl Fields {
    pub fn new(node: &'static str) -> Self {
        Self {
            node,
            values: IndexMap::new(),
        }
    }

    /// Type name these fields belong to.
    pub fn node(&self) -> &'static str {
        self.node
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    pub fn take(&mut self, name: &str) -> Result<Value, NodeError> {
        self.remove(name).ok_or_else(|| NodeError::MissingField {
            node: self.node,
            field: name.to_owned(),
        })
    }

    pub fn take_string(&mut self, name: &str) -> Result<String, NodeError> {
        match self.take(name)? {
            Value::String(s) => Ok(s),
            other => Err(invalid(self.node, name, "string", &other)),
        }
    }

    pub fn take_bool(&mut self, name: &str) -> Result<bool, NodeError> {
        match self.take(name)? {
            Value::Bool(b) => Ok(b),
            other => Err(invalid(self.node, name, "bool", &other)),
        }
    }

    pub fn take_strings(&mut self, name: &str) -> Result<Vec<String>, NodeError> {
        match self.take(name)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(invalid(self.node, name, "array of strings", &other)),
                })
                .collect(),
            other => Err(invalid(self.node, name, "array", &other)),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Build an [`NodeError::InvalidField`] describing `found`.
pub fn invalid(node: &'static str, field: &str, expected: &'static str, found: &Value) -> NodeError {
    NodeError::InvalidField {
        node,
        field: field.to_owned(),
        expected,
        found: found.kind_name(),
    }
}
