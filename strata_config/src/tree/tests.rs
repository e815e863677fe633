//! Unit tests for tree construction, lookup and the rewrite passes.

use std::collections::HashMap;

use anyhow::{Result, ensure};
use rstest::rstest;
use serde_json::{Value, json};

use super::{Expansion, Kind, Object, REDACTED, Scalar};
use crate::{ConfigError, Origin};

fn origin() -> Origin {
    Origin::at("test.properties", 4, 1)
}

#[test]
fn add_creates_nested_maps_with_origins() -> Result<()> {
    let mut tree = Object::default();
    tree.add(".", "Foo.Bar", json!("abc"), &[origin()])?;
    ensure!(tree.to_raw() == json!({"Foo": {"Bar": "abc"}}));
    ensure!(tree.fetch("Foo", ".")?.origins() == [origin()]);
    ensure!(tree.fetch("Foo.Bar", ".")?.origins() == [origin()]);
    Ok(())
}

#[test]
fn add_replaces_and_appends_array_items() -> Result<()> {
    let mut tree = Object::from_raw(json!({"list": ["a", "b"]}), &[]);
    tree.add(".", "list.1", json!("B"), &[])?;
    tree.add(".", "list.2", json!("c"), &[])?;
    tree.add(".", "list.3.name", json!("d"), &[])?;
    ensure!(tree.to_raw() == json!({"list": ["a", "B", "c", {"name": "d"}]}));
    Ok(())
}

#[test]
fn add_turns_values_into_maps() -> Result<()> {
    let mut tree = Object::from_raw(json!({"a": 1}), &[]);
    tree.add(".", "a.b", json!(2), &[])?;
    ensure!(tree.to_raw() == json!({"a": {"b": 2}}));
    tree.add(".", "a.b.c.d", json!(3), &[origin()])?;
    ensure!(tree.to_raw() == json!({"a": {"b": {"c": {"d": 3}}}}));
    ensure!(tree.fetch("a.b.c", ".")?.origins() == [origin()]);
    Ok(())
}

#[rstest]
#[case("list.x", "invalid array index 'x' at 'list'")]
#[case("list.3", "index 3 is out of bounds for array at 'list' (length 2)")]
fn add_rejects_bad_array_segments(#[case] key: &str, #[case] message: &str) {
    let mut tree = Object::from_raw(json!({"list": [1, 2]}), &[]);
    let err = tree
        .add(".", key, json!(0), &[])
        .expect_err("segment must be rejected");
    assert!(err.is_path_error());
    assert_eq!(err.to_string(), message);
}

#[test]
fn add_honours_custom_delimiters() -> Result<()> {
    let mut tree = Object::default();
    tree.add("__", "server__tls.mode", json!("strict"), &[])?;
    ensure!(tree.to_raw() == json!({"server": {"tls.mode": "strict"}}));
    Ok(())
}

#[test]
fn fetch_walks_maps_and_arrays() -> Result<()> {
    let tree = Object::from_raw(json!({"foo": ["x", {"y": true}]}), &[]);
    ensure!(tree.fetch("foo.1.y", ".")?.to_raw() == json!(true));
    ensure!(tree.fetch("", ".")? == &tree);
    ensure!(tree.fetch_segments(&["foo", "0"], ".")?.to_raw() == json!("x"));
    Ok(())
}

#[test]
fn fetch_out_of_bounds_names_the_array() {
    let tree = Object::from_raw(json!({"foo": ["x", "y"]}), &[]);
    let err = tree
        .fetch_segments(&["foo", "5"], ".")
        .expect_err("index 5 is past the end");
    assert!(
        matches!(
            err,
            ConfigError::ArrayOutOfBounds { ref path, index: 5, len: 2 } if path == "foo"
        ),
        "unexpected {err:?}"
    );
}

#[rstest]
#[case("missing", "missing")]
#[case("foo.bar", "foo.bar")]
#[case("leaf.deeper", "leaf.deeper")]
fn fetch_reports_missing_paths(#[case] path: &str, #[case] reported: &str) {
    let tree = Object::from_raw(json!({"foo": {"baz": 1}, "leaf": 2}), &[]);
    let err = tree.fetch(path, ".").expect_err("path is absent");
    assert!(
        matches!(err, ConfigError::NotFound { path: ref p } if p == reported),
        "unexpected {err:?}"
    );
}

#[test]
fn fetch_rejects_non_numeric_array_segment() {
    let tree = Object::from_raw(json!({"foo": [1]}), &[]);
    let err = tree.fetch("foo.first", ".").expect_err("not an index");
    assert!(matches!(err, ConfigError::InvalidIndex { .. }), "{err:?}");
}

#[rstest]
#[case(json!({"0": "zero", "1": "one", "2": "two"}), json!(["zero", "one", "two"]))]
#[case(json!({"2": "two", "0": "zero", "1": "one"}), json!(["zero", "one", "two"]))]
#[case(json!({"0": "zero", "2": "two"}), json!({"0": "zero", "2": "two"}))]
#[case(json!({"00": "a", "1": "b"}), json!({"00": "a", "1": "b"}))]
#[case(json!({}), json!({}))]
#[case(
    json!({"outer": {"0": {"0": "a", "1": "b"}}}),
    json!({"outer": [["a", "b"]]})
)]
fn positional_maps_become_arrays(#[case] raw: Value, #[case] expected: Value) {
    let converted = Object::from_raw(raw, &[]).convert_maps_to_arrays();
    assert_eq!(converted.to_raw(), expected);
}

#[test]
fn raw_round_trip_preserves_shape() {
    let raw = json!({
        "s": "text",
        "b": false,
        "i": -3,
        "f": 1.5,
        "n": null,
        "a": [1, [2], {"k": "v"}],
        "m": {"empty": {}, "none": []},
    });
    let tree = Object::from_raw(raw.clone(), &[origin()]);
    assert_eq!(tree.get("a").map(Object::kind), Some(Kind::Array));
    assert_eq!(tree.get("m").map(Object::kind), Some(Kind::Map));
    assert_eq!(
        tree.get("i").and_then(Object::as_scalar),
        Some(&Scalar::Int(-3))
    );
    let again = Object::from_raw(tree.to_raw(), &[]);
    assert_eq!(again.to_raw(), raw);
}

#[test]
fn from_raw_with_prefix_wraps_the_tree() {
    let tree = Object::from_raw_with_prefix(json!({"k": 1}), &[origin()], "a.b", ".");
    assert_eq!(tree.to_raw(), json!({"a": {"b": {"k": 1}}}));
    assert_eq!(tree.origins(), [origin()]);
}

#[test]
fn from_serializable_rejects_non_string_keys() {
    let mut map = HashMap::new();
    map.insert(vec![1_u8], "x");
    let err = Object::from_serializable(&map, &[]).expect_err("keys are not strings");
    assert!(matches!(err, ConfigError::NonSerializable { .. }), "{err:?}");
}

fn vars(name: &str) -> Option<String> {
    match name {
        "HOST" => Some("db.internal".to_owned()),
        "URL" => Some("pg://${{HOST}}:5432".to_owned()),
        "LOOP" => Some("${{LOOP}}".to_owned()),
        _ => None,
    }
}

#[test]
fn expansion_substitutes_recursively_and_records_origin() -> Result<()> {
    let tree = Object::from_raw(
        json!({"url": "${{ URL }}/app", "keep": "${{MISSING}}", "n": 5, "l": ["${{HOST}}"]}),
        &[origin()],
    );
    let expansion = Expansion {
        origin_label: "env".to_owned(),
        ..Expansion::default()
    };
    let expanded = tree.to_expanded(&expansion, vars)?;
    ensure!(
        expanded.to_raw()
            == json!({
                "url": "pg://db.internal:5432/app",
                "keep": "${{MISSING}}",
                "n": 5,
                "l": ["db.internal"],
            })
    );
    ensure!(expanded.fetch("url", ".")?.origins() == [origin(), Origin::new("env")]);
    ensure!(expanded.fetch("keep", ".")?.origins() == [origin()]);
    Ok(())
}

#[test]
fn expansion_cycles_hit_the_depth_bound() {
    let tree = Object::from_raw(json!({"a": {"b": "${{LOOP}}"}}), &[]);
    let expansion = Expansion {
        max_depth: 3,
        ..Expansion::default()
    };
    let err = tree
        .to_expanded(&expansion, vars)
        .expect_err("cycle must be bounded");
    assert!(
        matches!(err, ConfigError::RecursionTooDeep { ref path, depth: 3 } if path == "a.b"),
        "unexpected {err:?}"
    );
}

#[test]
fn expansion_supports_custom_tokens() -> Result<()> {
    let tree = Object::from_raw(json!("<%HOST%> and <%HOST"), &[]);
    let expansion = Expansion {
        start: "<%".to_owned(),
        end: "%>".to_owned(),
        ..Expansion::default()
    };
    let expanded = tree.to_expanded(&expansion, vars)?;
    ensure!(expanded.to_raw() == json!("db.internal and <%HOST"));
    Ok(())
}

#[test]
fn redaction_hides_secret_structure() {
    let secret =
        Object::from_raw(json!({"user": "u", "keys": [1, 2]}), &[origin()]).with_secret(true);
    let mut map = super::Map::new();
    map.insert("creds".to_owned(), secret);
    map.insert("open".to_owned(), Object::from_scalar("visible"));
    let tree = Object::from_map(map);

    let redacted = tree.redacted();
    let creds = redacted.get("creds").expect("creds present");
    assert_eq!(creds.kind(), Kind::Value);
    assert_eq!(creds.to_raw(), json!(REDACTED));
    assert!(creds.is_secret());
    assert_eq!(creds.origins(), [origin()]);
    assert_eq!(redacted.fetch("open", ".").map(Object::to_raw).ok(), Some(json!("visible")));
}

#[test]
fn serialize_matches_raw_form() -> Result<()> {
    let raw = json!({"a": [1, "two", null], "b": {"c": 2.5}});
    let tree = Object::from_raw(raw.clone(), &[]);
    ensure!(serde_json::to_value(&tree)? == raw);
    Ok(())
}
