//! Graph decoder, the dual of [`crate::encoder`].
//!
//! A `_path` record is a constructor call: its fields decode depth-first, the
//! schema splits them into constructor-time and post-construction fields, and
//! the Node is built and then assigned. `?id` decodes `builds[id]` once per
//! call, so every reference to an id yields the same `Arc`. `&hash` resolves
//! from the record's own tables, or lazily through the [`StoreLoader`].
//! `%id` always goes through the loader.
//!
//! A failure aborts the call; nothing decoded so far is returned.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use strata_core::artifact::DeferredArtifact;
use strata_core::reference::{ReferenceKind, is_escaped, unescape};
use strata_core::{
    Artifact, ArtifactError, Fields, Map, NodeError, NodeRef, Reference, Registry, StoreError,
    StoreLoader, TYPE_TAG, Value,
};

use crate::encoded::{Encoded, Record};

const DEFAULT_MAX_DEPTH: u32 = 256;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown node type `{0}`")]
    UnknownNodeType(String),

    #[error("missing {kind} reference `{id}`")]
    MissingReference { kind: ReferenceKind, id: String },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("cannot build `{node}`: {source}")]
    Node {
        node: String,
        #[source]
        source: NodeError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("value nesting exceeds {limit} levels")]
    DepthLimitExceeded { limit: u32 },
}

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Fetch artifacts that live only in the store while decoding, instead of
    /// on first observation.
    pub eager_artifacts: bool,
    pub max_depth: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            eager_artifacts: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eager_artifacts(mut self, eager: bool) -> Self {
        self.eager_artifacts = eager;
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Per-call decoder state over one [`Record`].
pub struct DecodeContext<'a> {
    registry: &'a Registry,
    record: &'a Record,
    loader: Option<Arc<dyn StoreLoader>>,
    options: DecodeOptions,
    builds: HashMap<String, NodeRef>,
    stored: HashMap<String, NodeRef>,
    artifacts: HashMap<String, Artifact>,
    in_progress: HashSet<String>,
    depth: u32,
}

impl<'a> DecodeContext<'a> {
    pub fn new(
        registry: &'a Registry,
        record: &'a Record,
        loader: Option<Arc<dyn StoreLoader>>,
        options: DecodeOptions,
    ) -> Self {
        Self {
            registry,
            record,
            loader,
            options,
            builds: HashMap::new(),
            stored: HashMap::new(),
            artifacts: HashMap::new(),
            in_progress: HashSet::new(),
            depth: 0,
        }
    }

    /// Decode the record's `data`.
    pub fn decode_data(&mut self) -> Result<Value, DecodeError> {
        let record = self.record;
        self.decode(&record.data)
    }

    pub fn decode(&mut self, encoded: &Encoded) -> Result<Value, DecodeError> {
        if self.depth >= self.options.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let value = self.decode_inner(encoded);
        self.depth -= 1;
        value
    }

    fn decode_inner(&mut self, encoded: &Encoded) -> Result<Value, DecodeError> {
        Ok(match encoded {
            Encoded::Null => Value::Null,
            Encoded::Bool(b) => Value::Bool(*b),
            Encoded::Int(i) => Value::Int(*i),
            Encoded::Float(f) => Value::Float(*f),
            Encoded::String(s) if is_escaped(s) => Value::String(unescape(s).to_owned()),
            Encoded::String(s) => match Reference::parse(s) {
                Some(reference) => self.resolve(reference)?,
                None => Value::String(s.clone()),
            },
            Encoded::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.decode(item))
                    .collect::<Result<_, _>>()?,
            ),
            Encoded::Object(map) if map.contains_key(TYPE_TAG) => Value::Node(self.construct(map)?),
            Encoded::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(unescape(key).to_owned(), self.decode(value)?);
                }
                Value::Object(out)
            }
        })
    }

    /// Build a Node from a `_path` record.
    fn construct(&mut self, record: &IndexMap<String, Encoded>) -> Result<NodeRef, DecodeError> {
        let name = match record.get(TYPE_TAG) {
            Some(Encoded::String(name)) => name.as_str(),
            _ => {
                return Err(DecodeError::MalformedRecord(format!(
                    "`{TYPE_TAG}` must be a type name"
                )));
            }
        };
        let schema = self
            .registry
            .resolve(name)
            .map_err(|_| DecodeError::UnknownNodeType(name.to_owned()))?;

        let mut fields = Fields::new(schema.name);
        for (key, value) in record {
            if key == TYPE_TAG {
                continue;
            }
            fields.insert(unescape(key), self.decode(value)?);
        }

        let node = schema
            .instantiate(fields)
            .map_err(|source| DecodeError::Node {
                node: schema.name.to_owned(),
                source,
            })?;
        Ok(Arc::from(node))
    }

    fn resolve(&mut self, reference: Reference<'_>) -> Result<Value, DecodeError> {
        tracing::trace!(%reference, "resolving reference");
        match reference.kind {
            ReferenceKind::Build => self.resolve_build(reference.id).map(Value::Node),
            ReferenceKind::Artifact => self.resolve_artifact(reference.id).map(Value::Artifact),
            ReferenceKind::Stored => self.resolve_stored(reference.id).map(Value::Node),
        }
    }

    fn resolve_build(&mut self, id: &str) -> Result<NodeRef, DecodeError> {
        if let Some(node) = self.builds.get(id) {
            return Ok(Arc::clone(node));
        }

        let tables = self.record;
        let record = tables.builds.get(id).ok_or_else(|| DecodeError::MissingReference {
            kind: ReferenceKind::Build,
            id: id.to_owned(),
        })?;
        let Encoded::Object(record) = record else {
            return Err(DecodeError::MalformedRecord(format!(
                "build `{id}` is not a node record"
            )));
        };
        if !record.contains_key(TYPE_TAG) {
            return Err(DecodeError::MalformedRecord(format!(
                "build `{id}` has no `{TYPE_TAG}`"
            )));
        }
        if !self.in_progress.insert(id.to_owned()) {
            return Err(DecodeError::MalformedRecord(format!(
                "build `{id}` refers to itself"
            )));
        }

        let node = self.construct(record);
        self.in_progress.remove(id);
        let node = node?;

        tracing::debug!(%id, node = node.type_name(), "decoded build");
        self.builds.insert(id.to_owned(), Arc::clone(&node));
        Ok(node)
    }

    fn resolve_artifact(&mut self, hash: &str) -> Result<Artifact, DecodeError> {
        if let Some(artifact) = self.artifacts.get(hash) {
            return Ok(artifact.clone());
        }

        let tables = self.record;
        let artifact = if let Some(bytes) = tables.blobs.get(hash) {
            Artifact::from_bytes(bytes.clone())
        } else if let Some(path) = tables.files.get(hash) {
            Artifact::from_path(path.clone())
        } else if let Some(loader) = &self.loader {
            let deferred = DeferredArtifact::new(hash, Arc::clone(loader));
            if self.options.eager_artifacts {
                deferred.fetch().map_err(|e| match e {
                    ArtifactError::Store(e) => DecodeError::Store(e),
                    _ => DecodeError::MissingReference {
                        kind: ReferenceKind::Artifact,
                        id: hash.to_owned(),
                    },
                })?;
            }
            tracing::debug!(%hash, eager = self.options.eager_artifacts, "deferred artifact");
            Artifact::Deferred(deferred)
        } else {
            return Err(DecodeError::MissingReference {
                kind: ReferenceKind::Artifact,
                id: hash.to_owned(),
            });
        };

        self.artifacts.insert(hash.to_owned(), artifact.clone());
        Ok(artifact)
    }

    fn resolve_stored(&mut self, id: &str) -> Result<NodeRef, DecodeError> {
        if let Some(node) = self.stored.get(id) {
            return Ok(Arc::clone(node));
        }
        let missing = || DecodeError::MissingReference {
            kind: ReferenceKind::Stored,
            id: id.to_owned(),
        };

        let loader = self.loader.as_ref().ok_or_else(missing)?;
        let node = loader.load_node(id)?.ok_or_else(missing)?;
        tracing::debug!(%id, node = node.type_name(), "loaded stored node");
        self.stored.insert(id.to_owned(), Arc::clone(&node));
        Ok(node)
    }
}

/// Decode `record` against `registry`.
pub fn decode(
    record: &Record,
    registry: &Registry,
    loader: Option<Arc<dyn StoreLoader>>,
) -> Result<Value, DecodeError> {
    decode_with(record, registry, loader, DecodeOptions::default())
}

#[tracing::instrument(level = "debug", skip_all, fields(builds = record.builds.len()))]
pub fn decode_with(
    record: &Record,
    registry: &Registry,
    loader: Option<Arc<dyn StoreLoader>>,
    options: DecodeOptions,
) -> Result<Value, DecodeError> {
    DecodeContext::new(registry, record, loader, options).decode_data()
}
