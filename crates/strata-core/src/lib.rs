#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core model for Strata object graphs.
//!
//! - [`Value`]: the nested value model that may embed Nodes and artifacts
//! - [`Node`]/[`NodeSchema`]: polymorphic serializable units and their schemas
//! - [`Registry`]: canonical type name to schema
//! - [`reference`]: the `?id`/`&id`/`%id` token vocabulary
//! - [`StoreLoader`]: contract for the caller's artifact/metadata store

pub mod artifact;
pub mod bind;
pub mod hash;
pub mod node;
pub mod nodes;
pub mod reference;
pub mod registry;
pub mod store;
pub mod value;

#[cfg(test)]
mod reference_tests;
#[cfg(test)]
mod registry_tests;

pub use artifact::{Artifact, ArtifactError, DeferredArtifact};
pub use bind::{BindError, bind};
pub use hash::content_hash;
pub use node::{Construct, Fields, Node, NodeError, NodeRef, NodeSchema};
pub use reference::{Reference, ReferenceKind, TYPE_TAG};
pub use registry::{Registry, RegistryError};
pub use store::{StoreError, StoreLoader};
pub use value::{Map, Value, node_eq};
