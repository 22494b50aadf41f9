//! Node registry: canonical type name to schema.
//!
//! A registry is populated once at startup and read-only afterwards, so it can
//! be shared across threads without locking. Registering two schemas under the
//! same canonical name is a structural bug in the program, reported as an error
//! for tests to catch rather than something to recover from.

use indexmap::IndexMap;

use crate::node::NodeSchema;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown node type `{0}`")]
    UnknownNodeType(String),

    #[error("node type `{0}` is registered twice")]
    DuplicateNodeType(&'static str),
}

/// Name-to-schema table. Iteration follows registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    schemas: IndexMap<&'static str, &'static NodeSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: &'static NodeSchema) -> Result<(), RegistryError> {
        use indexmap::map::Entry;

        match self.schemas.entry(schema.name) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateNodeType(schema.name)),
            Entry::Vacant(slot) => {
                slot.insert(schema);
                Ok(())
            }
        }
    }

    /// Resolve a canonical type name to its schema.
    pub fn resolve(&self, name: &str) -> Result<&'static NodeSchema, RegistryError> {
        self.schemas
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownNodeType(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static NodeSchema> + '_ {
        self.schemas.values().copied()
    }
}
