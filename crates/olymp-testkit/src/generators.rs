//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use olymp_core::{Bodies, Provenance, Submission};

/// Generate a JSON leaf. No floats, so values compare exactly after a
/// round trip through storage.
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::String),
    ]
}

/// Generate an arbitrary, shallow JSON document.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Generate a JSON object body.
pub fn body() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,8}", json_value(), 0..6)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

pub fn bodies() -> impl Strategy<Value = Bodies> {
    (body(), body()).prop_map(|(public, private)| Bodies::new(public, private))
}

/// Generate an identification from a small pool so secrets repeat.
pub fn identification() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "sec[0-3]".prop_map(String::from),
        "[a-f0-9]{8}".prop_map(String::from),
    ]
}

pub fn provenance() -> impl Strategy<Value = Provenance> {
    ("https://[a-z]{3,10}\\.ch/[a-z]{0,8}", "[A-Za-z/0-9. ]{0,24}")
        .prop_map(|(url, agent)| Provenance::new(url, agent))
}

pub fn submission() -> impl Strategy<Value = Submission> {
    (identification(), body(), body())
        .prop_map(|(id, public, private)| Submission::new(id, public, private))
}

/// One step against an entry log.
///
/// `pick` selects an existing entry by index modulo the log length, so the
/// step may hit an active, superseded or deleted record.
#[derive(Debug, Clone)]
pub enum LogOp {
    Append(Submission),
    Update { pick: usize, bodies: Bodies },
    Delete { pick: usize },
}

pub fn log_op() -> impl Strategy<Value = LogOp> {
    prop_oneof![
        3 => submission().prop_map(LogOp::Append),
        1 => (any::<usize>(), bodies()).prop_map(|(pick, bodies)| LogOp::Update { pick, bodies }),
        1 => any::<usize>().prop_map(|pick| LogOp::Delete { pick }),
    ]
}

/// Generate up to `max_len` log steps.
pub fn log_ops(max_len: usize) -> impl Strategy<Value = Vec<LogOp>> {
    prop::collection::vec(log_op(), 0..=max_len)
}
