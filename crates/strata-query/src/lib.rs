#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Replayable query chains.
//!
//! ```text
//! Chain ──compile──▶ text + documents + subqueries ──parse──▶ Chain
//!   │
//!   └──classify──▶ Flavour ──dispatch──▶ handler | replay against a Backend
//! ```
//!
//! - [`chain`]: the Part model and fluent builder (plus the [`chain!`] macro)
//! - [`compile`]/[`parser`]: lossless text form with hoisted documents
//! - [`classify`]/[`dispatch`]: structural flavours and routing

pub mod chain;
pub mod classify;
pub mod compile;
pub mod dispatch;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod query_node;
pub mod syntax_kind;

#[cfg(test)]
mod compile_tests;
#[cfg(test)]
mod dispatch_tests;
#[cfg(test)]
mod parser_tests;

pub use chain::{Chain, ChainError, Kwargs, Part};
pub use classify::{ClassifyError, Classifier, Flavour, SELECT_ALL};
pub use compile::{CompileError, Compiled, compile};
pub use dispatch::{Backend, DispatchError, Dispatcher, Handler, replay};
pub use error::ParseError;
pub use parser::{ParseOptions, parse, parse_with};
pub use query_node::{QUERY, Query};

pub use strata_core::Value;
