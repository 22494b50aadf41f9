//! Registry of every Node variant shipped with Strata.

use std::sync::LazyLock;

use strata_core::nodes::{BULK_OPERATION, CODE, DOCUMENT, VARIABLE};
use strata_core::{NodeSchema, Registry};
use strata_query::QUERY;

/// Schemas of the shipped variants, in registration order.
pub static SCHEMAS: &[&NodeSchema] = &[&DOCUMENT, &QUERY, &CODE, &VARIABLE, &BULK_OPERATION];

static BUILTIN: LazyLock<Registry> = LazyLock::new(|| {
    let mut registry = Registry::new();
    for schema in SCHEMAS {
        crate::invariants::register_builtin(&mut registry, *schema);
    }
    registry
});

/// Shared registry of the shipped variants.
pub fn builtin() -> &'static Registry {
    &BUILTIN
}

/// Owned copy of [`builtin`] to register application variants on top of.
pub fn with_builtins() -> Registry {
    BUILTIN.clone()
}
