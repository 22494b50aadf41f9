#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Graph encoder/decoder for Strata values.
//!
//! ```text
//! Value ──encode──▶ Record { data, builds, blobs, files } ──decode──▶ Value
//!                      │
//!                      └── to_binary / from_binary (framed postcard)
//! ```

pub mod binary;
pub mod builtin;
pub mod decoder;
pub mod encoded;
pub mod encoder;
pub mod memory;

mod invariants;

#[cfg(test)]
mod encoder_tests;
#[cfg(test)]
mod test_nodes;

pub use binary::FormatError;
pub use builtin::{builtin, with_builtins};
pub use decoder::{DecodeContext, DecodeError, DecodeOptions, decode, decode_with};
pub use encoded::{Encoded, Record};
pub use encoder::{EncodeContext, EncodeError, EncodeOptions, encode, encode_with, node_id};
pub use memory::MemoryStore;
