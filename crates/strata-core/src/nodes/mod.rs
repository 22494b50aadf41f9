//! Node variants shipped with the core.
//!
//! `Query` lives in `strata-query` next to the chain it wraps.

mod bulk;
mod code;
mod document;
mod variable;

pub use bulk::{BULK_OPERATION, BulkKind, BulkOperation};
pub use code::{CODE, Code};
pub use document::{DOCUMENT, Document};
pub use variable::{VARIABLE, Variable};
