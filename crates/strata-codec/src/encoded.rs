//! Wire model of an encoded graph.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Encoded value: plain data where Nodes and artifacts are replaced by
/// reference tokens or `_path` records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Encoded {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Encoded>),
    Object(IndexMap<String, Encoded>),
}

impl Encoded {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Encoded::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Encoded>> {
        match self {
            Encoded::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Encoded> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// JSON view. Non-finite floats have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Encoded::Null => Json::Null,
            Encoded::Bool(b) => Json::Bool(*b),
            Encoded::Int(i) => Json::from(*i),
            Encoded::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Encoded::String(s) => Json::String(s.clone()),
            Encoded::Array(items) => Json::Array(items.iter().map(Encoded::to_json).collect()),
            Encoded::Object(map) => Json::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Order-sensitive for objects; NaN equals NaN so a record always equals itself.
impl PartialEq for Encoded {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Encoded::Null, Encoded::Null) => true,
            (Encoded::Bool(a), Encoded::Bool(b)) => a == b,
            (Encoded::Int(a), Encoded::Int(b)) => a == b,
            (Encoded::Float(a), Encoded::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Encoded::String(a), Encoded::String(b)) => a == b,
            (Encoded::Array(a), Encoded::Array(b)) => a == b,
            (Encoded::Object(a), Encoded::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
            }
            _ => false,
        }
    }
}

impl From<&str> for Encoded {
    fn from(s: &str) -> Self {
        Encoded::String(s.to_owned())
    }
}

impl From<String> for Encoded {
    fn from(s: String) -> Self {
        Encoded::String(s)
    }
}

/// Output of one encode call: `data` plus the side tables it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: Encoded,
    /// Node id to node record (`_path` first, then fields).
    pub builds: IndexMap<String, Encoded>,
    /// Content hash to bytes.
    pub blobs: IndexMap<String, Vec<u8>>,
    /// Content hash to the file holding those bytes.
    pub files: IndexMap<String, PathBuf>,
}

impl Record {
    /// Record holding `data` and empty tables.
    pub fn new(data: Encoded) -> Self {
        Self {
            data,
            builds: IndexMap::new(),
            blobs: IndexMap::new(),
            files: IndexMap::new(),
        }
    }

    /// Whether `data` stands alone, without any table entry.
    pub fn is_self_contained(&self) -> bool {
        self.builds.is_empty() && self.blobs.is_empty() && self.files.is_empty()
    }

    /// JSON view for inspection; blobs are hex-encoded.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "data": self.data.to_json(),
            "builds": self
                .builds
                .iter()
                .map(|(id, record)| (id.clone(), record.to_json()))
                .collect::<serde_json::Map<_, _>>(),
            "blobs": self
                .blobs
                .iter()
                .map(|(hash, bytes)| (hash.clone(), serde_json::Value::from(hex::encode(bytes))))
                .collect::<serde_json::Map<_, _>>(),
            "files": self
                .files
                .iter()
                .map(|(hash, path)| (hash.clone(), serde_json::Value::from(path.display().to_string())))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}
