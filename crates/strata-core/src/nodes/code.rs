use std::any::Any;
use std::sync::Arc;

use crate::node::{Fields, Node, NodeError, NodeRef, NodeSchema};
use crate::value::Value;

pub static CODE: NodeSchema = NodeSchema {
    name: "strata.nodes.Code",
    init: &["name", "source"],
    post: &["params"],
    construct: Code::construct,
};

/// Descriptor of a callable given by its source text.
///
/// The engine never evaluates `source`; executing it is up to the backend
/// that receives the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    name: String,
    source: String,
    params: Vec<String>,
}

impl Code {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    fn construct(fields: &mut Fields) -> Result<Box<dyn Node>, NodeError> {
        let name = fields.take_string("name")?;
        let source = fields.take_string("source")?;
        Ok(Box::new(Self::new(name, source)))
    }
}

impl Node for Code {
    fn schema(&self) -> &'static NodeSchema {
        &CODE
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::from(self.name.as_str())),
            ("source", Value::from(self.source.as_str())),
            (
                "params",
                Value::Array(self.params.iter().map(|p| Value::from(p.as_str())).collect()),
            ),
        ]
    }

    fn assign(&mut self, field: &str, value: Value) -> Result<(), NodeError> {
        if field != "params" {
            return Err(NodeError::UnknownField {
                node: CODE.name,
                field: field.to_owned(),
            });
        }
        let mut scratch = Fields::new(CODE.name);
        scratch.insert("params", value);
        self.params = scratch.take_strings("params")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
