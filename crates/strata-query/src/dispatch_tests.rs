use serde_json::json;

use super::*;

/// Backend that records the replayed steps.
struct Recorder;

impl Backend for Recorder {
    type Output = Vec<String>;
    type Error = DispatchError;

    fn root(&self, name: &str) -> Result<Self::Output, Self::Error> {
        Ok(vec![format!("root {name}")])
    }

    fn attr(&self, mut target: Self::Output, name: &str) -> Result<Self::Output, Self::Error> {
        target.push(format!("attr {name}"));
        Ok(target)
    }

    fn call(
        &self,
        mut target: Self::Output,
        method: &str,
        args: &[Value],
        kwargs: &Kwargs,
    ) -> Result<Self::Output, Self::Error> {
        target.push(format!("call {method} {}/{}", args.len(), kwargs.len()));
        Ok(target)
    }
}

fn dispatcher() -> Dispatcher<Recorder> {
    Dispatcher::default().handle("find", |_, chain| {
        Ok(vec![format!("find handler, {} parts", chain.len())])
    })
}

#[test]
fn routes_to_handler() {
    let chain = chain!(coll.find(json!({"x": 1})).limit(5));

    let out = dispatcher().dispatch(&Recorder, &chain).unwrap();
    assert_eq!(out, ["find handler, 2 parts"]);
}

#[test]
fn replays_without_handler() {
    let chain = chain!(db.coll.update_many(json!({}), json!({"$set": {"y": 1}})));

    let out = dispatcher().dispatch(&Recorder, &chain).unwrap();
    assert_eq!(out, ["root db", "attr coll", "call update_many 2/0"]);
}

#[test]
fn replays_unclassified_chains() {
    let chain = chain!(coll.watch());

    let out = dispatcher().dispatch(&Recorder, &chain).unwrap();
    assert_eq!(out, ["root coll", "call watch 0/0"]);
}

#[test]
fn replays_chains_without_a_text_form() {
    let chain = Chain::new("coll").attr("find-one").call("find", [json!({})]);

    let out = dispatcher().dispatch(&Recorder, &chain).unwrap();
    assert_eq!(out, ["root coll", "attr find-one", "call find 1/0"]);
}

#[test]
fn select_all_handler() {
    let dispatcher =
        dispatcher().handle(SELECT_ALL, |_, chain| Ok(vec![format!("all of {}", chain.root())]));

    let out = dispatcher.dispatch(&Recorder, &Chain::new("coll")).unwrap();
    assert_eq!(out, ["all of coll"]);
}

#[test]
fn without_replay_missing_handler() {
    let dispatcher = dispatcher().without_replay();

    let err = dispatcher
        .dispatch(&Recorder, &chain!(coll.insert_one(json!({"a": 1}))))
        .unwrap_err();
    assert_eq!(err, DispatchError::NoHandler(Flavour::new("insert_one")));
}

#[test]
fn without_replay_unclassified() {
    let dispatcher = dispatcher().without_replay();

    let err = dispatcher
        .dispatch(&Recorder, &chain!(coll.watch()))
        .unwrap_err();
    insta::assert_snapshot!(err, @"no flavour matches `coll.watch()`");
}

#[test]
fn replay_keeps_kwargs() {
    let chain = Chain::new("coll").call_with(
        "find",
        Vec::<Value>::new(),
        [("limit".to_owned(), Value::Int(1))],
    );

    let out = replay(&Recorder, &chain).unwrap();
    assert_eq!(out, ["root coll", "call find 0/1"]);
}
