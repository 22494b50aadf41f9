use indoc::indoc;
use serde_json::json;

use super::*;

fn call(method: &str, args: Vec<Value>) -> Part {
    Part::Call {
        method: method.into(),
        args,
        kwargs: Kwargs::new(),
    }
}

fn parse_err(text: &str, documents: &[Value]) -> ParseError {
    parse(text, documents, &[]).unwrap_err()
}

#[test]
fn reconstructs_parts() {
    let documents = [Value::from(json!({"x": 1}))];

    let chain = parse("coll.find(documents[0]).limit(5)", &documents, &[]).unwrap();
    assert_eq!(chain.root(), "coll");
    assert_eq!(
        chain.parts(),
        [
            call("find", vec![Value::from(json!({"x": 1}))]),
            call("limit", vec![Value::Int(5)]),
        ]
    );
}

#[test]
fn compile_parse_round_trip() {
    let a = chain!(users.find(json!({"active": true})).distinct("id"));
    let root = Chain::new("orders")
        .attr("archive")
        .call_with(
            "find",
            [Value::from(json!({"total": {"$gt": 10}})), Value::from(a)],
            [
                ("limit".to_owned(), Value::Int(20)),
                ("note".to_owned(), Value::from("&not a ref")),
            ],
        )
        .call("sort", [Value::Float(-0.5), Value::Null]);

    let compiled = compile(&root).unwrap();
    let parsed = parse(&compiled.text, &compiled.documents, &compiled.subqueries).unwrap();
    assert_eq!(parsed, root);

    let again = compile(&parsed).unwrap();
    assert_eq!(again.text, compiled.text);
}

#[test]
fn keyword_names_round_trip() {
    let root = Chain::new("null")
        .attr("true")
        .call_with(
            "false",
            [Value::Bool(true)],
            [
                ("null".to_owned(), Value::Null),
                ("true".to_owned(), Value::Bool(false)),
            ],
        )
        .attr("x");

    let compiled = compile(&root).unwrap();
    insta::assert_snapshot!(compiled.text, @"null.true.false(true, null=null, true=false).x");
    let parsed = parse(&compiled.text, &compiled.documents, &compiled.subqueries).unwrap();
    assert_eq!(parsed, root);
}

#[test]
fn numeric_edges_and_nested_kwarg_subqueries_round_trip() {
    let a = Chain::new("a").call("f", [Value::Float(5e-324)]);
    let b = Chain::new("b").call("g", [Value::from(a)]);
    let root = Chain::new("coll").call_with(
        "find",
        [
            Value::Float(-0.0),
            Value::Float(1e300),
            Value::Float(-2.5e-8),
            Value::Int(i64::MIN),
            Value::Int(i64::MAX),
        ],
        [("filter".to_owned(), Value::from(b))],
    );

    let compiled = compile(&root).unwrap();
    insta::assert_snapshot!(compiled.text, @r"
    a.f(5e-324)
    b.g(query[0])
    coll.find(-0.0, 1e300, -2.5e-8, -9223372036854775808, 9223372036854775807, filter=query[1])
    ");

    let parsed = parse(&compiled.text, &compiled.documents, &compiled.subqueries).unwrap();
    assert_eq!(parsed, root);
    let Part::Call { args, .. } = &parsed.parts()[0] else {
        panic!("expected a call");
    };
    assert!(matches!(args[0], Value::Float(f) if f == 0.0 && f.is_sign_negative()));
    assert_eq!(compile(&parsed).unwrap().text, compiled.text);
}

#[test]
fn single_statement_uses_given_subqueries() {
    let inner = chain!(a.find());
    let root = Chain::new("b").call("g", [Value::from(inner.clone())]);
    let compiled = compile(&root).unwrap();

    let parsed = parse(compiled.root_expression(), &[], &compiled.subqueries).unwrap();
    assert_eq!(parsed, root);
    assert_eq!(compiled.subqueries, [inner]);
}

#[test]
fn literal_grammar() {
    let chain = parse(
        r#"c.f([1, 2.5, "x", null], {"a": {"b": [true, false]}}, -0, 1e3, "é",)"#,
        &[],
        &[],
    )
    .unwrap();

    let Part::Call { args, .. } = &chain.parts()[0] else {
        panic!("expected a call");
    };
    assert_eq!(
        args,
        &[
            Value::from(json!([1, 2.5, "x", null])),
            Value::from(json!({"a": {"b": [true, false]}})),
            Value::Int(0),
            Value::Float(1000.0),
            Value::from("é"),
        ]
    );
}

#[test]
fn whitespace_blank_lines_and_crlf() {
    let text = "a . x\r\n\r\nb.f( query[0] , k = 1 )\n";

    let chain = parse(text, &[], &[]).unwrap();
    let Part::Call { args, kwargs, .. } = &chain.parts()[0] else {
        panic!("expected a call");
    };
    assert_eq!(args, &[Value::from(Chain::new("a").attr("x"))]);
    assert_eq!(kwargs.get("k"), Some(&Value::Int(1)));
}

#[test]
fn bare_root_and_attributes() {
    assert!(parse("coll", &[], &[]).unwrap().is_empty());
    assert_eq!(
        parse("db.users", &[], &[]).unwrap().parts(),
        [Part::Attr("users".into())]
    );
}

#[test]
fn unmatched_segment() {
    let err = parse_err("coll.find(1 5)", &[]);
    insta::assert_snapshot!(err, @"line 1: expected `,` or `)`, found number `5`");
    assert_eq!(
        err.range(),
        rowan::TextRange::new(rowan::TextSize::from(12), rowan::TextSize::from(13))
    );
}

#[test]
fn host_names_are_not_in_scope() {
    let err = parse_err("coll.find(os)", &[]);
    insta::assert_snapshot!(err, @"line 1: unknown name, only `documents` and `query` are in scope, found identifier `os`");
}

#[test]
fn positional_after_keyword() {
    let err = parse_err("coll.find(limit=5, 3)", &[]);
    insta::assert_snapshot!(err, @"line 1: positional argument follows keyword argument, found number `3`");
}

#[test]
fn duplicate_keyword() {
    let err = parse_err("coll.find(k=1, k=2)", &[]);
    insta::assert_snapshot!(err, @"line 1: duplicate keyword argument, found identifier `k`");
}

#[test]
fn garbage_is_reported() {
    let err = parse_err("coll.find(#!)", &[]);
    insta::assert_snapshot!(err, @"line 1: expected a literal, `documents[i]` or `query[i]`, found unrecognized input `#`");
}

#[test]
fn unterminated_call() {
    let err = parse_err("coll.find(1", &[]);
    insta::assert_snapshot!(err, @"line 1: expected `,` or `)`, found end of line");
}

#[test]
fn empty_text() {
    let err = parse_err("\n\n", &[]);
    assert!(matches!(err, ParseError::Syntax { line: 1, .. }));
}

#[test]
fn dangling_document() {
    let documents = [Value::Null];

    let err = parse_err("coll.find(documents[2])", &documents);
    insta::assert_snapshot!(err, @"line 1: `documents[2]` is out of range (1 available)");
}

#[test]
fn forward_query_reference() {
    let text = indoc! {"
        a.x
        b.f(query[1])
    "};

    let err = parse_err(text, &[]);
    assert!(matches!(
        err,
        ParseError::DanglingReference {
            line: 2,
            namespace: "query",
            index: 1,
            len: 1,
            ..
        }
    ));
}

#[test]
fn nesting_limit() {
    let options = ParseOptions::new().max_depth(2);

    let err = parse_with("c.f([[1]])", &[], &[], options).unwrap_err();
    insta::assert_snapshot!(err, @"line 1: literal nesting exceeds 2 levels");
    assert!(parse_with("c.f([1])", &[], &[], options).is_ok());
}

#[test]
fn render_points_at_offending_text() {
    let source = "coll.find(1 5)";

    let rendered = parse_err(source, &[]).render(source);
    assert!(rendered.starts_with("error: line 1: expected `,` or `)`"));
    assert!(rendered.contains(source));
    assert!(rendered.contains('^'));
}
