//! In-memory [`StoreLoader`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use strata_core::{NodeRef, StoreError, StoreLoader, content_hash};

use crate::encoded::Record;

/// Content-addressed artifacts and persistent Nodes held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: RwLock<HashMap<String, Vec<u8>>>,
    nodes: RwLock<HashMap<String, NodeRef>>,
    artifact_loads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` and return their content hash.
    pub fn put_artifact(&self, bytes: impl Into<Vec<u8>>) -> String {
        let bytes = bytes.into();
        let hash = content_hash(&bytes);
        self.artifacts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(hash.clone(), bytes);
        hash
    }

    pub fn put_node(&self, id: impl Into<String>, node: NodeRef) {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), node);
    }

    /// Move a record's blobs into the store, leaving `&hash` references in
    /// `data` and `builds` to resolve through it.
    pub fn absorb_blobs(&self, record: &mut Record) {
        let mut artifacts = self.artifacts.write().unwrap_or_else(PoisonError::into_inner);
        for (hash, bytes) in record.blobs.drain(..) {
            artifacts.insert(hash, bytes);
        }
    }

    pub fn contains_artifact(&self, hash: &str) -> bool {
        self.artifacts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(hash)
    }

    /// Number of artifact lookups served so far.
    pub fn artifact_loads(&self) -> usize {
        self.artifact_loads.load(Ordering::Relaxed)
    }
}

impl StoreLoader for MemoryStore {
    fn load_artifact(&self, hash: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.artifact_loads.fetch_add(1, Ordering::Relaxed);
        let artifacts = self
            .artifacts
            .read()
            .map_err(|_| StoreError::new("artifact table lock poisoned"))?;
        Ok(artifacts.get(hash).cloned())
    }

    fn load_node(&self, id: &str) -> Result<Option<NodeRef>, StoreError> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| StoreError::new("node table lock poisoned"))?;
        Ok(nodes.get(id).cloned())
    }
}
