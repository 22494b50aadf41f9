//! `Query`: a chain wrapped as a Node so it can be embedded in graphs and
//! passed as an argument to another chain.
//!
//! Record shape: `root` is the root identifier; `parts` is an array where an
//! attribute Part is its name and a call Part is
//! `{"method": .., "args": [..], "kwargs": {..}}`.

use std::any::Any;
use std::sync::Arc;

use strata_core::node::invalid;
use strata_core::{Fields, Map, Node, NodeError, NodeSchema, Value};

use crate::chain::{Chain, Kwargs, Part};

pub static QUERY: NodeSchema = NodeSchema {
    name: "strata.query.Query",
    init: &["root", "parts"],
    post: &[],
    construct: Query::construct,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    chain: Chain,
}

impl Query {
    pub fn new(chain: Chain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn into_chain(self) -> Chain {
        self.chain
    }

    fn construct(fields: &mut Fields) -> Result<Box<dyn Node>, NodeError> {
        let root = fields.take_string("root")?;
        let parts = match fields.take("parts")? {
            Value::Array(items) => items
                .into_iter()
                .map(part_from_value)
                .collect::<Result<Vec<_>, _>>()?,
            other => return Err(invalid(QUERY.name, "parts", "array", &other)),
        };
        Ok(Box::new(Self::new(Chain::from_parts(root, parts))))
    }
}

impl Node for Query {
    fn schema(&self) -> &'static NodeSchema {
        &QUERY
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("root", Value::from(self.chain.root())),
            (
                "parts",
                Value::Array(self.chain.parts().iter().map(part_to_value).collect()),
            ),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<Chain> for Value {
    fn from(chain: Chain) -> Self {
        Value::Node(Arc::new(Query::new(chain)))
    }
}

/// The chain embedded in `value`, if it holds a [`Query`].
pub fn as_chain(value: &Value) -> Option<&Chain> {
    value.downcast_node::<Query>().map(Query::chain)
}

fn part_to_value(part: &Part) -> Value {
    match part {
        Part::Attr(name) => Value::from(name.as_str()),
        Part::Call {
            method,
            args,
            kwargs,
        } => {
            let mut map = Map::new();
            map.insert("method".into(), Value::from(method.as_str()));
            map.insert("args".into(), Value::Array(args.clone()));
            map.insert("kwargs".into(), Value::Object(kwargs.clone()));
            Value::Object(map)
        }
    }
}

fn part_from_value(value: Value) -> Result<Part, NodeError> {
    let mut map = match value {
        Value::String(name) => return Ok(Part::Attr(name)),
        Value::Object(map) => map,
        other => return Err(invalid(QUERY.name, "parts", "string or object", &other)),
    };

    let method = match map.shift_remove("method") {
        Some(Value::String(method)) => method,
        Some(other) => return Err(invalid(QUERY.name, "parts.method", "string", &other)),
        None => {
            return Err(NodeError::MissingField {
                node: QUERY.name,
                field: "parts.method".to_owned(),
            });
        }
    };
    let args = match map.shift_remove("args") {
        Some(Value::Array(args)) => args,
        None => Vec::new(),
        Some(other) => return Err(invalid(QUERY.name, "parts.args", "array", &other)),
    };
    let kwargs: Kwargs = match map.shift_remove("kwargs") {
        Some(Value::Object(kwargs)) => kwargs,
        None => Kwargs::new(),
        Some(other) => return Err(invalid(QUERY.name, "parts.kwargs", "object", &other)),
    };

    Ok(Part::Call {
        method,
        args,
        kwargs,
    })
}
