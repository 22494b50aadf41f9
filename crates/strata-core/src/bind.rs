//! Substitution of [`Variable`] placeholders.
//!
//! Nodes are immutable once shared, so binding rebuilds every Node on the
//! path to a Variable through its schema and leaves untouched subgraphs
//! shared with the input. A Node reachable twice is rebuilt once.

use std::collections::HashMap;
use std::sync::Arc;

use crate::node::{Fields, NodeError, NodeRef};
use crate::nodes::Variable;
use crate::value::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("variable `{0}` is unbound and has no default")]
    Unbound(String),

    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Replace every Variable in `value` by its binding, or its default.
#[tracing::instrument(level = "debug", skip_all, fields(bindings = bindings.len()))]
pub fn bind(value: &Value, bindings: &Map) -> Result<Value, BindError> {
    let mut binder = Binder {
        bindings,
        memo: HashMap::new(),
    };
    Ok(binder.value(value)?.unwrap_or_else(|| value.clone()))
}

struct Binder<'a> {
    bindings: &'a Map,
    /// Rebuilt Nodes by the address of their original; `None` = unchanged.
    memo: HashMap<usize, Option<Value>>,
}

impl Binder<'_> {
    /// `Ok(None)` when `value` contains no Variable.
    fn value(&mut self, value: &Value) -> Result<Option<Value>, BindError> {
        match value {
            Value::Array(items) => {
                let rebound = self.items(items.iter())?;
                Ok(rebound.map(Value::Array))
            }
            Value::Object(map) => {
                let rebound = self.items(map.values())?;
                Ok(rebound.map(|values| {
                    Value::Object(map.keys().cloned().zip(values).collect())
                }))
            }
            Value::Node(node) => self.node(node),
            _ => Ok(None),
        }
    }

    fn items<'v>(
        &mut self,
        items: impl ExactSizeIterator<Item = &'v Value>,
    ) -> Result<Option<Vec<Value>>, BindError> {
        let mut out = Vec::with_capacity(items.len());
        let mut changed = false;
        for item in items {
            match self.value(item)? {
                Some(new) => {
                    changed = true;
                    out.push(new);
                }
                None => out.push(item.clone()),
            }
        }
        Ok(changed.then_some(out))
    }

    fn node(&mut self, node: &NodeRef) -> Result<Option<Value>, BindError> {
        if let Some(variable) = node.downcast_ref::<Variable>() {
            return self.variable(variable).map(Some);
        }

        let key = Arc::as_ptr(node).cast::<()>() as usize;
        if let Some(done) = self.memo.get(&key) {
            return Ok(done.clone());
        }

        let schema = node.schema();
        let original = node.fields();
        let values: Vec<&Value> = original.iter().map(|(_, value)| value).collect();
        let rebound = match self.items(values.into_iter())? {
            Some(values) => {
                let mut fields = Fields::new(schema.name);
                for ((name, _), value) in original.iter().zip(values) {
                    fields.insert(*name, value);
                }
                let rebuilt: NodeRef = Arc::from(schema.instantiate(fields)?);
                Some(Value::Node(rebuilt))
            }
            None => None,
        };
        self.memo.insert(key, rebound.clone());
        Ok(rebound)
    }

    fn variable(&self, variable: &Variable) -> Result<Value, BindError> {
        self.bindings
            .get(variable.name())
            .or_else(|| variable.default_value())
            .cloned()
            .ok_or_else(|| BindError::Unbound(variable.name().to_owned()))
    }
}
