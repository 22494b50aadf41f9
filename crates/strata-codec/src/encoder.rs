//! Graph encoder.
//!
//! Walks a [`Value`], passing scalars through and preserving the order of
//! sequences and mappings. Each Node is flattened once into `builds` under
//! its content-derived id and referenced as `?id`; each artifact payload is
//! stored once under its content hash and referenced as `&hash`. Sharing is
//! detected by identity first (the same `Arc` is visited once) and by content
//! second (equal records or bytes collapse to one table entry).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use strata_core::reference::{ReferenceKind, escape, escape_key};
use strata_core::{Artifact, ArtifactError, NodeRef, Reference, TYPE_TAG, Value, content_hash};

use crate::encoded::{Encoded, Record};

const DEFAULT_MAX_DEPTH: u32 = 256;
const ROOT: &str = "<root>";

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("cannot encode artifact of `{node}`: {source}")]
    ArtifactEncoding {
        node: String,
        #[source]
        source: ArtifactError,
    },

    #[error("node `{node}` contains itself")]
    Cycle { node: String },

    #[error("{table} entry `{key}` already holds a different payload")]
    ConflictingEntry { table: &'static str, key: String },

    #[error("value nesting exceeds {limit} levels")]
    DepthLimitExceeded { limit: u32 },

    #[error("cannot canonicalize node `{node}`: {source}")]
    Canonical {
        node: String,
        #[source]
        source: postcard::Error,
    },
}

/// Encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Node type names encoded inline as `_path` records instead of being
    /// flattened into `builds`.
    pub excluded: IndexSet<String>,
    pub max_depth: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            excluded: IndexSet::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(mut self, node_type: impl Into<String>) -> Self {
        self.excluded.insert(node_type.into());
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Per-call encoder state. Create one per top-level value and discard it
/// afterwards; on error the partially filled tables must not be used.
pub struct EncodeContext {
    options: EncodeOptions,
    builds: IndexMap<String, Encoded>,
    blobs: IndexMap<String, Vec<u8>>,
    files: IndexMap<String, std::path::PathBuf>,
    /// Encoded form of each visited Node, by address. Holding the `NodeRef`
    /// keeps the address from being reused within the call.
    visited: HashMap<usize, (NodeRef, Encoded)>,
    in_progress: HashSet<usize>,
    /// Type names of the Nodes being encoded, innermost last.
    stack: Vec<&'static str>,
    depth: u32,
}

impl Default for EncodeContext {
    fn default() -> Self {
        Self::new(EncodeOptions::default())
    }
}

fn address(node: &NodeRef) -> usize {
    Arc::as_ptr(node).cast::<()>() as usize
}

impl EncodeContext {
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            options,
            builds: IndexMap::new(),
            blobs: IndexMap::new(),
            files: IndexMap::new(),
            visited: HashMap::new(),
            in_progress: HashSet::new(),
            stack: Vec::new(),
            depth: 0,
        }
    }

    pub fn encode(&mut self, value: &Value) -> Result<Encoded, EncodeError> {
        if self.depth >= self.options.max_depth {
            return Err(EncodeError::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let encoded = self.encode_inner(value);
        self.depth -= 1;
        encoded
    }

    /// Close the call: `data` plus every table entry it references.
    pub fn finish(self, data: Encoded) -> Record {
        Record {
            data,
            builds: self.builds,
            blobs: self.blobs,
            files: self.files,
        }
    }

    fn encode_inner(&mut self, value: &Value) -> Result<Encoded, EncodeError> {
        tracing::trace!(kind = value.kind_name(), "encoding value");
        Ok(match value {
            Value::Null => Encoded::Null,
            Value::Bool(b) => Encoded::Bool(*b),
            Value::Int(i) => Encoded::Int(*i),
            Value::Float(f) => Encoded::Float(*f),
            Value::String(s) => Encoded::String(escape(s).into_owned()),
            Value::Array(items) => Encoded::Array(
                items
                    .iter()
                    .map(|item| self.encode(item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(escape_key(key).into_owned(), self.encode(value)?);
                }
                Encoded::Object(out)
            }
            Value::Node(node) => self.encode_node(node)?,
            Value::Artifact(artifact) => self.encode_artifact(artifact)?,
        })
    }

    fn encode_node(&mut self, node: &NodeRef) -> Result<Encoded, EncodeError> {
        if let Some(id) = node.persistent_id() {
            return Ok(Encoded::String(Reference::render(ReferenceKind::Stored, id)));
        }

        let key = address(node);
        if let Some((_, encoded)) = self.visited.get(&key) {
            return Ok(encoded.clone());
        }

        let name = node.type_name();
        let encoded = if self.options.excluded.contains(name) {
            self.node_record(node)?
        } else {
            let id = self.flatten(node)?;
            Encoded::String(Reference::render(ReferenceKind::Build, &id))
        };
        self.visited.insert(key, (Arc::clone(node), encoded.clone()));
        Ok(encoded)
    }

    /// Write `node`'s record into `builds` and return its id.
    pub(crate) fn flatten(&mut self, node: &NodeRef) -> Result<String, EncodeError> {
        let record = self.node_record(node)?;
        let canonical = postcard::to_allocvec(&record).map_err(|source| EncodeError::Canonical {
            node: node.type_name().to_owned(),
            source,
        })?;
        let id = content_hash(&canonical);
        tracing::debug!(node = node.type_name(), %id, "flattened node");
        insert_unique(&mut self.builds, "builds", id.clone(), record)?;
        Ok(id)
    }

    /// `{"_path": type, ...fields}` with every field encoded.
    fn node_record(&mut self, node: &NodeRef) -> Result<Encoded, EncodeError> {
        let key = address(node);
        let name = node.type_name();
        if !self.in_progress.insert(key) {
            return Err(EncodeError::Cycle {
                node: name.to_owned(),
            });
        }
        self.stack.push(name);

        let result = self.node_fields(node);

        self.stack.pop();
        self.in_progress.remove(&key);
        result
    }

    fn node_fields(&mut self, node: &NodeRef) -> Result<Encoded, EncodeError> {
        let mut record = IndexMap::new();
        record.insert(TYPE_TAG.to_owned(), Encoded::from(node.type_name()));
        for (field, value) in node.fields() {
            record.insert(escape_key(field).into_owned(), self.encode(&value)?);
        }
        Ok(Encoded::Object(record))
    }

    fn encode_artifact(&mut self, artifact: &Artifact) -> Result<Encoded, EncodeError> {
        if let Some(hash) = artifact.known_hash() {
            return Ok(Encoded::String(Reference::render(ReferenceKind::Artifact, hash)));
        }

        let bytes = artifact
            .bytes()
            .map_err(|source| EncodeError::ArtifactEncoding {
                node: self.stack.last().copied().unwrap_or(ROOT).to_owned(),
                source,
            })?;
        let hash = content_hash(&bytes);

        // Identical bytes are stored once, whichever table saw them first.
        if !self.files.contains_key(&hash) {
            match artifact {
                Artifact::File(_) if self.blobs.contains_key(&hash) => {}
                Artifact::File(path) => {
                    tracing::debug!(%hash, path = %path.display(), "storing file artifact");
                    self.files.insert(hash.clone(), path.clone());
                }
                _ => {
                    tracing::debug!(%hash, len = bytes.len(), "storing blob artifact");
                    insert_unique(&mut self.blobs, "blobs", hash.clone(), bytes.to_vec())?;
                }
            }
        }

        Ok(Encoded::String(Reference::render(ReferenceKind::Artifact, &hash)))
    }
}

/// Insert unless an equal entry is present; refuse to replace a different one.
pub(crate) fn insert_unique<V: PartialEq>(
    table: &mut IndexMap<String, V>,
    name: &'static str,
    key: String,
    value: V,
) -> Result<(), EncodeError> {
    match table.get(&key) {
        Some(existing) if *existing == value => Ok(()),
        Some(_) => Err(EncodeError::ConflictingEntry { table: name, key }),
        None => {
            table.insert(key, value);
            Ok(())
        }
    }
}

/// Encode `value` with default options.
pub fn encode(value: &Value) -> Result<Record, EncodeError> {
    encode_with(value, EncodeOptions::default())
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn encode_with(value: &Value, options: EncodeOptions) -> Result<Record, EncodeError> {
    let mut context = EncodeContext::new(options);
    let data = context.encode(value)?;
    let record = context.finish(data);
    tracing::debug!(
        builds = record.builds.len(),
        blobs = record.blobs.len(),
        files = record.files.len(),
        "encoded value"
    );
    Ok(record)
}

/// Content-derived identifier of `node`: the id it is flattened under.
pub fn node_id(node: &NodeRef) -> Result<String, EncodeError> {
    EncodeContext::default().flatten(node)
}
