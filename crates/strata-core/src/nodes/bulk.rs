use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::node::{Fields, Node, NodeError, NodeRef, NodeSchema, invalid};
use crate::value::Value;

pub static BULK_OPERATION: NodeSchema = NodeSchema {
    name: "strata.nodes.BulkOperation",
    init: &["kind", "filter"],
    post: &["payload", "upsert"],
    construct: BulkOperation::construct,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkKind {
    InsertOne,
    UpdateOne,
    UpdateMany,
    ReplaceOne,
    DeleteOne,
    DeleteMany,
}

impl BulkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkKind::InsertOne => "insert_one",
            BulkKind::UpdateOne => "update_one",
            BulkKind::UpdateMany => "update_many",
            BulkKind::ReplaceOne => "replace_one",
            BulkKind::DeleteOne => "delete_one",
            BulkKind::DeleteMany => "delete_many",
        }
    }
}

impl fmt::Display for BulkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "insert_one" => BulkKind::InsertOne,
            "update_one" => BulkKind::UpdateOne,
            "update_many" => BulkKind::UpdateMany,
            "replace_one" => BulkKind::ReplaceOne,
            "delete_one" => BulkKind::DeleteOne,
            "delete_many" => BulkKind::DeleteMany,
            _ => return Err(()),
        })
    }
}

/// One mutating instruction of a batched write.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOperation {
    kind: BulkKind,
    filter: Value,
    payload: Value,
    upsert: bool,
}

impl BulkOperation {
    pub fn new(kind: BulkKind, filter: impl Into<Value>) -> Self {
        Self {
            kind,
            filter: filter.into(),
            payload: Value::Null,
            upsert: false,
        }
    }

    pub fn insert_one(document: impl Into<Value>) -> Self {
        Self::new(BulkKind::InsertOne, Value::Null).with_payload(document)
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    pub fn kind(&self) -> BulkKind {
        self.kind
    }

    pub fn filter(&self) -> &Value {
        &self.filter
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn is_upsert(&self) -> bool {
        self.upsert
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    fn construct(fields: &mut Fields) -> Result<Box<dyn Node>, NodeError> {
        let kind = match fields.take("kind")? {
            Value::String(s) => s.parse().map_err(|()| NodeError::InvalidField {
                node: BULK_OPERATION.name,
                field: "kind".to_owned(),
                expected: "bulk operation kind",
                found: "string",
            })?,
            other => return Err(invalid(BULK_OPERATION.name, "kind", "string", &other)),
        };
        Ok(Box::new(Self::new(kind, fields.take("filter")?)))
    }
}

impl Node for BulkOperation {
    fn schema(&self) -> &'static NodeSchema {
        &BULK_OPERATION
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("kind", Value::from(self.kind.as_str())),
            ("filter", self.filter.clone()),
            ("payload", self.payload.clone()),
            ("upsert", Value::Bool(self.upsert)),
        ]
    }

    fn assign(&mut self, field: &str, value: Value) -> Result<(), NodeError> {
        match (field, value) {
            ("payload", value) => self.payload = value,
            ("upsert", Value::Bool(b)) => self.upsert = b,
            ("upsert", other) => return Err(invalid(BULK_OPERATION.name, field, "bool", &other)),
            _ => {
                return Err(NodeError::UnknownField {
                    node: BULK_OPERATION.name,
                    field: field.to_owned(),
                });
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
