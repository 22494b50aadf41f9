//! Strata: shared object graphs and replayable query chains.
//!
//! # Example
//!
//! ```
//! use strata_lib::{chain, Value};
//!
//! let query = chain!(coll.find(serde_json::json!({"x": 1})).limit(5));
//! let compiled = strata_lib::compile(&query).unwrap();
//! assert_eq!(compiled.text, "coll.find(documents[0]).limit(5)");
//!
//! let parsed = strata_lib::parse(&compiled.text, &compiled.documents).unwrap();
//! assert_eq!(parsed, query);
//! assert_eq!(strata_lib::classify(&parsed).unwrap(), "find");
//!
//! let record = strata_lib::encode(&Value::from(parsed)).unwrap();
//! let decoded = strata_lib::decode(&record, None).unwrap();
//! assert_eq!(strata_lib::as_chain(&decoded), Some(&query));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::sync::{Arc, LazyLock};

pub use strata_codec::{
    DecodeError, DecodeOptions, EncodeError, EncodeOptions, Encoded, FormatError, MemoryStore,
    Record, builtin, node_id, with_builtins,
};
pub use strata_core::nodes::{BulkKind, BulkOperation, Code, Document, Variable};
pub use strata_core::{
    Artifact, ArtifactError, BindError, Map, Node, NodeError, NodeRef, NodeSchema, Registry,
    RegistryError, StoreError, StoreLoader, Value, bind,
};
pub use strata_query::query_node::as_chain;
pub use strata_query::{
    Backend, Chain, ChainError, ClassifyError, Classifier, CompileError, Compiled, DispatchError,
    Dispatcher, Flavour, Kwargs, ParseError, Part, Query, SELECT_ALL, chain, replay,
};

/// Errors surfaced by the top-level operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Bind(#[from] BindError),
}

pub type Result<T> = std::result::Result<T, Error>;

static CLASSIFIER: LazyLock<Classifier> = LazyLock::new(Classifier::default);

/// Encode `value` into a record with default options.
pub fn encode(value: &Value) -> Result<Record> {
    Ok(strata_codec::encode(value)?)
}

/// Decode `record` against the built-in registry.
pub fn decode(record: &Record, loader: Option<Arc<dyn StoreLoader>>) -> Result<Value> {
    Ok(strata_codec::decode(record, builtin(), loader)?)
}

/// Encode `value` straight into the framed binary container.
pub fn to_bytes(value: &Value) -> Result<Vec<u8>> {
    Ok(encode(value)?.to_binary()?)
}

/// Inverse of [`to_bytes`].
pub fn from_bytes(bytes: &[u8], loader: Option<Arc<dyn StoreLoader>>) -> Result<Value> {
    let record = Record::from_binary(bytes)?;
    decode(&record, loader)
}

/// Compile `chain` to text, hoisting documents and subqueries.
pub fn compile(chain: &Chain) -> Result<Compiled> {
    Ok(strata_query::compile(chain)?)
}

/// Rebuild a chain from compiled text and its documents list.
///
/// Every `query[i]` must name an earlier statement of `text`.
pub fn parse(text: &str, documents: &[Value]) -> Result<Chain> {
    Ok(strata_query::parse(text, documents, &[])?)
}

/// Classify `chain` against the default flavours.
pub fn classify(chain: &Chain) -> Result<Flavour> {
    Ok(CLASSIFIER.classify(chain)?)
}

/// Route `chain` through `dispatcher`, replaying it when no handler applies.
pub fn dispatch<B: Backend>(
    dispatcher: &Dispatcher<B>,
    backend: &B,
    chain: &Chain,
) -> std::result::Result<B::Output, B::Error> {
    dispatcher.dispatch(backend, chain)
}
