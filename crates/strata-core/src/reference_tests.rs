use super::reference::{escape, escape_key, is_escaped, unescape};
use super::*;

#[test]
fn parse_tokens() {
    let build = Reference::parse("?abc").unwrap();
    assert_eq!(build.kind, ReferenceKind::Build);
    assert_eq!(build.id, "abc");

    assert_eq!(
        Reference::parse("&ff00").map(|r| r.kind),
        Some(ReferenceKind::Artifact)
    );
    assert_eq!(
        Reference::parse("%run-7").map(|r| r.kind),
        Some(ReferenceKind::Stored)
    );
}

#[test]
fn plain_strings_are_not_tokens() {
    assert_eq!(Reference::parse("hello"), None);
    assert_eq!(Reference::parse(""), None);
    assert_eq!(Reference::parse("?"), None);
    assert_eq!(Reference::parse("\\?abc"), None);
}

#[test]
fn render_matches_display() {
    let rendered = Reference::render(ReferenceKind::Stored, "run-7");
    assert_eq!(rendered, "%run-7");
    assert_eq!(Reference::parse(&rendered).unwrap().to_string(), rendered);
}

#[test]
fn escape_token_lookalikes() {
    assert_eq!(escape("?what"), "\\?what");
    assert_eq!(escape("&"), "\\&");
    assert_eq!(escape("\\n"), "\\\\n");
    assert_eq!(escape("plain"), "plain");
    assert!(is_escaped(&escape("%x")));
    assert_eq!(unescape(&escape("%x")), "%x");
    assert_eq!(unescape(&escape("\\n")), "\\n");
}

#[test]
fn escape_type_tag_key() {
    assert_eq!(escape_key(TYPE_TAG), "\\_path");
    assert_eq!(escape(TYPE_TAG), TYPE_TAG);
    assert_eq!(escape_key("name"), "name");
    assert_eq!(unescape(&escape_key(TYPE_TAG)), TYPE_TAG);
}
