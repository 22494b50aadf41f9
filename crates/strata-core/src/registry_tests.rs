use super::*;
use crate::nodes::{CODE, DOCUMENT, VARIABLE};

#[test]
fn resolve_registered() {
    let mut registry = Registry::new();
    registry.register(&DOCUMENT).unwrap();
    registry.register(&CODE).unwrap();

    assert_eq!(registry.len(), 2);
    assert!(registry.contains("strata.nodes.Code"));
    assert_eq!(
        registry.resolve("strata.nodes.Document").unwrap().name,
        DOCUMENT.name
    );
}

#[test]
fn resolve_unknown() {
    let registry = Registry::new();

    let err = registry.resolve("app.Missing").unwrap_err();
    assert_eq!(err, RegistryError::UnknownNodeType("app.Missing".into()));
    insta::assert_snapshot!(err, @"unknown node type `app.Missing`");
}

#[test]
fn duplicate_name_rejected() {
    let mut registry = Registry::new();
    registry.register(&VARIABLE).unwrap();

    let err = registry.register(&VARIABLE).unwrap_err();
    assert_eq!(err, RegistryError::DuplicateNodeType("strata.nodes.Variable"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn iteration_follows_registration_order() {
    let mut registry = Registry::new();
    registry.register(&VARIABLE).unwrap();
    registry.register(&DOCUMENT).unwrap();

    let names: Vec<&str> = registry.iter().map(|schema| schema.name).collect();
    assert_eq!(names, ["strata.nodes.Variable", "strata.nodes.Document"]);
}
