//! Binary payloads attached to Nodes.
//!
//! An artifact is stored and deduplicated by the SHA-256 of its bytes. Three
//! sources are supported:
//! - **Bytes**: already in memory
//! - **File**: read from disk when observed
//! - **Deferred**: fetched through a [`StoreLoader`] on first observation, then cached

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::hash::content_hash;
use crate::store::{StoreError, StoreLoader};

/// Failure to produce an artifact's bytes.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("cannot read artifact file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact `&{hash}` is not present in the store")]
    MissingReference { hash: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub enum Artifact {
    Bytes(Arc<[u8]>),
    File(PathBuf),
    Deferred(DeferredArtifact),
}

impl Artifact {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Artifact::Bytes(Arc::from(bytes.into()))
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Artifact::File(path.into())
    }

    /// Materialize the payload. File artifacts are re-read on every call;
    /// deferred ones hit the store once.
    pub fn bytes(&self) -> Result<Arc<[u8]>, ArtifactError> {
        match self {
            Artifact::Bytes(bytes) => Ok(Arc::clone(bytes)),
            Artifact::File(path) => read_file(path),
            Artifact::Deferred(deferred) => deferred.fetch(),
        }
    }

    /// Hash known without touching the payload (deferred artifacts only).
    pub fn known_hash(&self) -> Option<&str> {
        match self {
            Artifact::Deferred(deferred) => Some(deferred.hash()),
            _ => None,
        }
    }

    /// Content hash, materializing the payload if necessary.
    pub fn content_hash(&self) -> Result<String, ArtifactError> {
        match self.known_hash() {
            Some(hash) => Ok(hash.to_owned()),
            None => Ok(content_hash(&self.bytes()?)),
        }
    }

    /// Human-readable label for inspection output.
    pub fn label(&self) -> String {
        match self {
            Artifact::Bytes(bytes) => format!("&{}", content_hash(bytes)),
            Artifact::File(path) => path.display().to_string(),
            Artifact::Deferred(deferred) => format!("&{}", deferred.hash()),
        }
    }
}

fn read_file(path: &Path) -> Result<Arc<[u8]>, ArtifactError> {
    std::fs::read(path)
        .map(Arc::from)
        .map_err(|source| ArtifactError::Io {
            path: path.to_owned(),
            source,
        })
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Bytes(bytes) => write!(f, "Artifact::Bytes({} bytes)", bytes.len()),
            Artifact::File(path) => write!(f, "Artifact::File({})", path.display()),
            Artifact::Deferred(deferred) => deferred.fmt(f),
        }
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Artifact::Bytes(a), Artifact::Bytes(b)) => a == b,
            (Artifact::File(a), Artifact::File(b)) => a == b,
            (Artifact::Deferred(a), Artifact::Deferred(b)) => a.hash() == b.hash(),
            (Artifact::Bytes(bytes), Artifact::Deferred(deferred))
            | (Artifact::Deferred(deferred), Artifact::Bytes(bytes)) => {
                content_hash(bytes) == deferred.hash()
            }
            _ => false,
        }
    }
}

/// Artifact whose bytes live in an external store.
#[derive(Clone)]
pub struct DeferredArtifact {
    hash: String,
    loader: Arc<dyn StoreLoader>,
    cell: Arc<OnceCell<Arc<[u8]>>>,
}

impl DeferredArtifact {
    pub fn new(hash: impl Into<String>, loader: Arc<dyn StoreLoader>) -> Self {
        Self {
            hash: hash.into(),
            loader,
            cell: Arc::new(OnceCell::new()),
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Whether the payload was already fetched.
    pub fn is_fetched(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Fetch the payload, caching it for every clone of this handle.
    pub fn fetch(&self) -> Result<Arc<[u8]>, ArtifactError> {
        self.cell
            .get_or_try_init(|| {
                tracing::debug!(hash = %self.hash, "fetching deferred artifact");
                match self.loader.load_artifact(&self.hash)? {
                    Some(bytes) => Ok(Arc::from(bytes)),
                    None => Err(ArtifactError::MissingReference {
                        hash: self.hash.clone(),
                    }),
                }
            })
            .map(Arc::clone)
    }
}

impl fmt::Debug for DeferredArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredArtifact")
            .field("hash", &self.hash)
            .field("fetched", &self.is_fetched())
            .finish()
    }
}
