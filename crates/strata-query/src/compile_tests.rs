use serde_json::json;
use strata_core::nodes::Document;

use super::*;

#[test]
fn hoists_documents() {
    let chain = chain!(coll.find(json!({"x": 1})).limit(5));

    let compiled = compile(&chain).unwrap();
    assert_eq!(compiled.text, "coll.find(documents[0]).limit(5)");
    assert_eq!(compiled.documents, [Value::from(json!({"x": 1}))]);
    assert!(compiled.subqueries.is_empty());
}

#[test]
fn empty_chain_is_bare_root() {
    let compiled = compile(&Chain::new("coll")).unwrap();

    assert_eq!(compiled.text, "coll");
    assert_eq!(compiled.root_expression(), "coll");
}

#[test]
fn scalars_stay_inline() {
    let chain = Chain::new("coll").call(
        "f",
        [
            Value::Null,
            Value::Bool(true),
            Value::Int(-3),
            Value::Float(2.5),
            Value::Float(1.0),
            Value::from("a\"b"),
        ],
    );

    let compiled = compile(&chain).unwrap();
    insta::assert_snapshot!(compiled.text, @r#"coll.f(null, true, -3, 2.5, 1.0, "a\"b")"#);
    assert!(compiled.documents.is_empty());
}

#[test]
fn sequences_and_mappings_always_hoist() {
    let chain = chain!(coll.update_many(json!({}), json!({"$set": {"y": 1}})));

    let compiled = compile(&chain).unwrap();
    assert_eq!(compiled.text, "coll.update_many(documents[0], documents[1])");
    assert_eq!(
        compiled.documents,
        [
            Value::from(json!({})),
            Value::from(json!({"$set": {"y": 1}}))
        ]
    );
}

#[test]
fn opaque_values_go_to_documents() {
    let doc = Value::Node(Document::new(json!({"x": 1})).into_ref());
    let chain = Chain::new("coll").call("f", [Value::Float(f64::NAN), doc.clone()]);

    let compiled = compile(&chain).unwrap();
    assert_eq!(compiled.text, "coll.f(documents[0], documents[1])");
    assert_eq!(compiled.documents[1], doc);
}

#[test]
fn kwargs_follow_positional_args() {
    let chain = Chain::new("coll").call_with(
        "find",
        [json!({"x": 1})],
        [("limit".to_owned(), Value::Int(5))],
    );
    let only_kwargs = Chain::new("coll").call_with(
        "find",
        Vec::<Value>::new(),
        [("limit".to_owned(), Value::Int(5))],
    );

    assert_eq!(compile(&chain).unwrap().text, "coll.find(documents[0], limit=5)");
    assert_eq!(compile(&only_kwargs).unwrap().text, "coll.find(limit=5)");
    assert_eq!(compile(&chain!(coll.count_documents())).unwrap().text, "coll.count_documents()");
}

#[test]
fn subqueries_are_numbered_in_line_order() {
    let a = Chain::new("a").attr("x");
    let b = Chain::new("b").call("f", [Value::from(a.clone())]);
    let root = Chain::new("c").call("g", [Value::from(b.clone()), Value::from(json!([1]))]);

    let compiled = compile(&root).unwrap();
    insta::assert_snapshot!(compiled.text, @r"
    a.x
    b.f(query[0])
    c.g(query[1], documents[0])
    ");
    assert_eq!(compiled.subqueries, [a, b]);
    assert_eq!(compiled.lines().count(), 3);
    assert_eq!(compiled.root_expression(), "c.g(query[1], documents[0])");
}

#[test]
fn documents_are_shared_across_statements() {
    let inner = chain!(other.find(json!({"a": 1})));
    let root = chain!(coll.find(json!({"b": 2}), inner));

    let compiled = compile(&root).unwrap();
    assert_eq!(
        compiled.text,
        "other.find(documents[1])\ncoll.find(documents[0], query[0])"
    );
    assert_eq!(compiled.documents.len(), 2);
}

#[test]
fn keyword_names_compile() {
    let chain = Chain::new("null").attr("true").call_with(
        "false",
        Vec::<Value>::new(),
        [("null".to_owned(), Value::Int(1))],
    );

    assert_eq!(compile(&chain).unwrap().text, "null.true.false(null=1)");
}

#[test]
fn non_identifier_names_are_rejected() {
    let operator = Chain::new("coll").call_with(
        "update_one",
        Vec::<Value>::new(),
        [("$set".to_owned(), Value::Int(1))],
    );
    let err = compile(&operator).unwrap_err();
    insta::assert_snapshot!(err, @"keyword argument name `$set` cannot be written as query text");

    let err = compile(&Chain::new("coll").attr("")).unwrap_err();
    assert_eq!(err.position, "attribute");
    assert_eq!(err.name, "");

    assert!(compile(&Chain::new("1coll")).is_err());
    assert!(compile(&Chain::new("coll").call("find-one", Vec::<Value>::new())).is_err());
}

#[test]
fn nested_names_are_checked() {
    let inner = Chain::new("other").attr("my field");
    let root = Chain::new("coll").call_with(
        "find",
        Vec::<Value>::new(),
        [("filter".to_owned(), Value::from(inner))],
    );

    let err = compile(&root).unwrap_err();
    insta::assert_snapshot!(err, @"attribute name `my field` cannot be written as query text");
}
