//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use strata_core::{NodeSchema, Registry};

/// Two shipped variants sharing a canonical name is a build defect.
pub(crate) fn register_builtin(registry: &mut Registry, schema: &'static NodeSchema) {
    if let Err(e) = registry.register(schema) {
        panic!("built-in registry: {e}");
    }
}
