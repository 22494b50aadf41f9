use std::any::Any;
use std::sync::Arc;

use crate::node::{Fields, Node, NodeError, NodeRef, NodeSchema};
use crate::value::Value;

pub static VARIABLE: NodeSchema = NodeSchema {
    name: "strata.nodes.Variable",
    init: &["name"],
    post: &["default"],
    construct: Variable::construct,
};

/// Named placeholder, substituted at use time by [`crate::bind`].
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    default: Option<Value>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    fn construct(fields: &mut Fields) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(Self::new(fields.take_string("name")?)))
    }
}

impl Node for Variable {
    fn schema(&self) -> &'static NodeSchema {
        &VARIABLE
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        let mut fields = vec![("name", Value::from(self.name.as_str()))];
        if let Some(default) = &self.default {
            fields.push(("default", default.clone()));
        }
        fields
    }

    fn assign(&mut self, field: &str, value: Value) -> Result<(), NodeError> {
        match field {
            "default" => {
                self.default = Some(value);
                Ok(())
            }
            _ => Err(NodeError::UnknownField {
                node: VARIABLE.name,
                field: field.to_owned(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
