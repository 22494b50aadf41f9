use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::json;
use strata_core::artifact::DeferredArtifact;
use strata_core::nodes::{DOCUMENT, Document};
use strata_core::{Artifact, ArtifactError, NodeRef, Value, content_hash};

use super::*;
use crate::encoder::insert_unique;
use crate::test_nodes::{Run, self_loop};

fn token(record: &Record) -> &str {
    record.data.as_str().unwrap()
}

#[test]
fn plain_values_pass_through() {
    let value = Value::from(json!({"a": 1, "b": [1, 2, 3]}));

    let record = encode(&value).unwrap();
    assert_eq!(record.data.to_json(), json!({"a": 1, "b": [1, 2, 3]}));
    assert!(record.builds.is_empty());
    assert!(record.blobs.is_empty());
    assert!(record.files.is_empty());
    assert!(record.is_self_contained());
}

#[test]
fn embedded_artifact_becomes_one_blob() {
    let bytes = b"0123456789".to_vec();
    let hash = content_hash(&bytes);
    let doc = Document::new(Value::Artifact(Artifact::from_bytes(bytes.clone())));
    let options = EncodeOptions::new().exclude(DOCUMENT.name);

    let record = encode_with(&Value::Node(doc.into_ref()), options).unwrap();
    assert_eq!(record.blobs.len(), 1);
    assert_eq!(record.blobs.get(&hash), Some(&bytes));
    assert_eq!(
        record.data.get("content").and_then(Encoded::as_str),
        Some(format!("&{hash}").as_str())
    );
    assert!(record.builds.is_empty());
}

#[test]
fn node_flattens_into_builds() {
    let doc = Document::new(json!({"x": 1})).into_ref();

    let record = encode(&Value::Node(Arc::clone(&doc))).unwrap();
    let id = node_id(&doc).unwrap();
    assert_eq!(token(&record), format!("?{id}"));
    assert_eq!(
        record.builds[&id].to_json(),
        json!({"_path": "strata.nodes.Document", "content": {"x": 1}, "metadata": {}})
    );
    let first_key = record.builds[&id].as_object().unwrap().keys().next();
    assert_eq!(first_key.map(String::as_str), Some("_path"));
}

#[test]
fn shared_node_encodes_once() {
    let doc = Document::new(json!({"x": 1})).into_ref();
    let value = Value::from(vec![Value::Node(Arc::clone(&doc)), Value::Node(doc)]);

    let record = encode(&value).unwrap();
    assert_eq!(record.builds.len(), 1);
    let json = record.data.to_json();
    assert_eq!(json[0], json[1]);
}

#[test]
fn equal_content_shares_an_id() {
    let a = Document::new(json!({"x": 1})).into_ref();
    let b = Document::new(json!({"x": 1})).into_ref();

    let record = encode(&Value::from(vec![Value::Node(a.clone()), Value::Node(b.clone())])).unwrap();
    assert_eq!(record.builds.len(), 1);
    assert_eq!(node_id(&a).unwrap(), node_id(&b).unwrap());

    let c = Document::new(json!({"x": 2})).into_ref();
    assert_ne!(node_id(&a).unwrap(), node_id(&c).unwrap());
}

#[test]
fn identical_bytes_across_nodes_stored_once() {
    let payload = b"shared payload".to_vec();
    let a = Document::new(Value::Artifact(Artifact::from_bytes(payload.clone()))).with_metadata("n", 1);
    let b = Document::new(Value::Artifact(Artifact::from_bytes(payload))).with_metadata("n", 2);

    let record = encode(&Value::from(vec![
        Value::Node(a.into_ref()),
        Value::Node(b.into_ref()),
    ]))
    .unwrap();
    assert_eq!(record.builds.len(), 2);
    assert_eq!(record.blobs.len(), 1);
}

#[test]
fn file_and_blob_with_same_bytes() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"payload").unwrap();
    let from_file = Value::Artifact(Artifact::from_path(file.path()));
    let from_bytes = Value::Artifact(Artifact::from_bytes(b"payload".to_vec()));

    let record = encode(&Value::from(vec![from_file.clone(), from_bytes.clone()])).unwrap();
    assert_eq!(record.files.len(), 1);
    assert!(record.blobs.is_empty());
    assert_eq!(record.data.to_json()[0], record.data.to_json()[1]);

    let record = encode(&Value::from(vec![from_bytes, from_file])).unwrap();
    assert_eq!(record.blobs.len(), 1);
    assert!(record.files.is_empty());
}

#[test]
fn unreadable_artifact_names_its_node() {
    let doc = Document::new(Value::Artifact(Artifact::from_path("/nonexistent/strata/blob.bin")));

    let err = encode(&Value::Node(doc.into_ref())).unwrap_err();
    assert!(matches!(
        err,
        EncodeError::ArtifactEncoding {
            ref node,
            source: ArtifactError::Io { .. },
        } if node == "strata.nodes.Document"
    ));
}

#[test]
fn token_lookalikes_are_escaped() {
    let value = Value::from(json!({"_path": "?x", "&k": "%y", "plain": "\\z"}));

    let record = encode(&value).unwrap();
    assert_eq!(
        record.data.to_json(),
        json!({"\\_path": "\\?x", "\\&k": "\\%y", "plain": "\\\\z"})
    );
}

#[test]
fn persistent_nodes_encode_as_stored_references() {
    let run: NodeRef = Arc::new(Run {
        id: "run-1".into(),
    });

    let record = encode(&Value::Node(run)).unwrap();
    assert_eq!(token(&record), "%run-1");
    assert!(record.builds.is_empty());
}

#[test]
fn deferred_artifacts_are_not_fetched() {
    let store = Arc::new(MemoryStore::new());
    let hash = store.put_artifact(b"remote".to_vec());
    let artifact = Artifact::Deferred(DeferredArtifact::new(hash.clone(), store.clone()));

    let record = encode(&Value::Artifact(artifact)).unwrap();
    assert_eq!(token(&record), format!("&{hash}"));
    assert!(record.blobs.is_empty());
    assert_eq!(store.artifact_loads(), 0);
}

#[test]
fn cycle_is_reported() {
    let err = encode(&Value::Node(self_loop())).unwrap_err();

    insta::assert_snapshot!(err, @"node `tests.Slot` contains itself");
}

#[test]
fn depth_limit() {
    let options = EncodeOptions::new().max_depth(2);

    let err = encode_with(&Value::from(json!([[1]])), options.clone()).unwrap_err();
    assert!(matches!(err, EncodeError::DepthLimitExceeded { limit: 2 }));
    assert!(encode_with(&Value::from(json!([1])), options).is_ok());
}

#[test]
fn table_entries_are_never_replaced() {
    let mut table = IndexMap::new();
    insert_unique(&mut table, "blobs", "k".to_owned(), vec![1u8]).unwrap();
    insert_unique(&mut table, "blobs", "k".to_owned(), vec![1u8]).unwrap();

    let err = insert_unique(&mut table, "blobs", "k".to_owned(), vec![2u8]).unwrap_err();
    insta::assert_snapshot!(err, @"blobs entry `k` already holds a different payload");
    assert_eq!(table["k"], vec![1u8]);
}
