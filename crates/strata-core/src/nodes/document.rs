use std::any::Any;
use std::sync::Arc;

use crate::node::{Fields, Node, NodeError, NodeRef, NodeSchema, invalid};
use crate::value::{Map, Value};

pub static DOCUMENT: NodeSchema = NodeSchema {
    name: "strata.nodes.Document",
    init: &["content"],
    post: &["metadata"],
    construct: Document::construct,
};

/// Ordered envelope around arbitrary nested content.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    content: Value,
    metadata: Map,
}

impl Document {
    pub fn new(content: impl Into<Value>) -> Self {
        Self {
            content: content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn metadata(&self) -> &Map {
        &self.metadata
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    fn construct(fields: &mut Fields) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(Self::new(fields.take("content")?)))
    }
}

impl Node for Document {
    fn schema(&self) -> &'static NodeSchema {
        &DOCUMENT
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("content", self.content.clone()),
            ("metadata", Value::Object(self.metadata.clone())),
        ]
    }

    fn assign(&mut self, field: &str, value: Value) -> Result<(), NodeError> {
        match (field, value) {
            ("metadata", Value::Object(map)) => {
                self.metadata = map;
                Ok(())
            }
            ("metadata", other) => Err(invalid(DOCUMENT.name, field, "object", &other)),
            _ => Err(NodeError::UnknownField {
                node: DOCUMENT.name,
                field: field.to_owned(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
