//! Node variants used only by tests.

use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};

use strata_core::{Fields, Node, NodeError, NodeRef, NodeSchema, Value};

pub static RUN: NodeSchema = NodeSchema {
    name: "tests.Run",
    init: &["id"],
    post: &[],
    construct: Run::construct,
};

/// Node persisted outside the record under its own id.
#[derive(Debug)]
pub struct Run {
    pub id: String,
}

impl Run {
    fn construct(fields: &mut Fields) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(Run {
            id: fields.take_string("id")?,
        }))
    }
}

impl Node for Run {
    fn schema(&self) -> &'static NodeSchema {
        &RUN
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![("id", Value::from(self.id.as_str()))]
    }

    fn persistent_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub static SLOT: NodeSchema = NodeSchema {
    name: "tests.Slot",
    init: &[],
    post: &["value"],
    construct: Slot::construct,
};

/// Mutable Node, the only way to build a cyclic graph.
#[derive(Debug, Default)]
pub struct Slot {
    value: Mutex<Value>,
}

impl Slot {
    fn construct(_: &mut Fields) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(Slot::default()))
    }

    pub fn set(&self, value: Value) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }
}

impl Node for Slot {
    fn schema(&self) -> &'static NodeSchema {
        &SLOT
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        let value = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        vec![("value", value.clone())]
    }

    fn assign(&mut self, field: &str, value: Value) -> Result<(), NodeError> {
        match field {
            "value" => {
                self.set(value);
                Ok(())
            }
            _ => Err(NodeError::UnknownField {
                node: SLOT.name,
                field: field.to_owned(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Slot holding itself.
pub fn self_loop() -> NodeRef {
    let slot = Arc::new(Slot::default());
    let node: NodeRef = slot.clone();
    slot.set(Value::Node(node.clone()));
    node
}
