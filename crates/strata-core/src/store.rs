//! Contract for the external artifact/metadata store.
//!
//! The engine never persists anything itself. When a decoded record refers to
//! something outside its own tables (`&hash` not in `blobs`/`files`, or any
//! `%id`), it asks the caller-supplied [`StoreLoader`]. Loader calls may block;
//! async callers should treat them as suspension points.

use crate::node::NodeRef;

/// Failure raised by a caller's loader, propagated verbatim.
#[derive(Debug, thiserror::Error)]
#[error("store loader failed: {0}")]
pub struct StoreError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

pub trait StoreLoader: Send + Sync {
    /// Bytes of the artifact with the given content hash, `None` if absent.
    fn load_artifact(&self, hash: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Node persisted under `id`, `None` if absent.
    fn load_node(&self, id: &str) -> Result<Option<NodeRef>, StoreError>;
}
