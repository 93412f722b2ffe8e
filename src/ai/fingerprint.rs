//! Context fingerprinting
//!
//! Maps a snapshot to a short stable key for the suggestion cache. Mapping
//! keys are written in sorted order at every depth before digesting, so two
//! snapshots with the same content collide no matter how they were built.
//! This is a dedup key, not a security boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Length of a fingerprint in hex characters
pub const FINGERPRINT_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("Snapshot cannot be serialized: {0}")]
    Unserializable(#[from] serde_json::Error),
}

/// Digest of a snapshot's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint anything that serializes to JSON
pub fn fingerprint<T: Serialize + ?Sized>(snapshot: &T) -> Result<Fingerprint, FingerprintError> {
    let value = serde_json::to_value(snapshot)?;
    let canonical = canonical_json(&value);
    Ok(Fingerprint(format!("{:x}", md5::compute(canonical.as_bytes()))))
}

/// Compact JSON text with object keys sorted at every level
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => write_object(map, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Writes object entries sorted by key.
///
/// `Map` only iterates in key order while serde_json's `preserve_order`
/// feature is off; entries are sorted here regardless.
fn write_object<'a, I>(entries: I, out: &mut String)
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    let mut entries: Vec<(&String, &Value)> = entries.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (i, (key, item)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Display on a string value yields the escaped JSON literal
        out.push_str(&Value::String(key.clone()).to_string());
        out.push(':');
        write_canonical(item, out);
    }
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::context::ContextSnapshot;
    use proptest::prelude::*;
    use serde::ser::Error as _;
    use serde_json::{Map, json};
    use std::collections::BTreeMap;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cyclic reference"))
        }
    }

    // =========================================================================
    // Unit Tests
    // =========================================================================

    #[test]
    fn test_fingerprint_is_fixed_length_hex() {
        let fp = fingerprint(&json!({"a": 1})).unwrap();
        assert_eq!(fp.as_str().len(), FINGERPRINT_LEN);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_struct_and_map_with_same_content_collide() {
        #[derive(Serialize)]
        struct Window {
            title: &'static str,
            app: &'static str,
        }

        let mut map = Map::new();
        map.insert("app".into(), json!("Code"));
        map.insert("title".into(), json!("main.rs"));

        let from_struct = fingerprint(&Window {
            title: "main.rs",
            app: "Code",
        })
        .unwrap();
        let from_map = fingerprint(&map).unwrap();

        assert_eq!(from_struct, from_map);
    }

    #[test]
    fn test_nested_key_order_does_not_matter() {
        #[derive(Serialize)]
        struct Inner {
            z: u8,
            a: u8,
        }
        #[derive(Serialize)]
        struct Outer {
            window: Inner,
            clipboard: &'static str,
        }

        let typed = Outer {
            window: Inner { z: 1, a: 2 },
            clipboard: "x",
        };
        let untyped = json!({"clipboard": "x", "window": {"a": 2, "z": 1}});

        assert_eq!(fingerprint(&typed).unwrap(), fingerprint(&untyped).unwrap());
    }

    #[test]
    fn test_whitespace_changes_fingerprint() {
        let a = ContextSnapshot::new().with_clipboard("hello");
        let b = ContextSnapshot::new().with_clipboard("hello ");
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_array_order_matters() {
        let a = fingerprint(&json!({"k": [1, 2]})).unwrap();
        let b = fingerprint(&json!({"k": [2, 1]})).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unserializable_snapshot_fails() {
        let result = fingerprint(&Unserializable);
        assert!(matches!(result, Err(FingerprintError::Unserializable(_))));
    }

    #[test]
    fn test_canonical_json_sorts_and_escapes_keys() {
        let value = json!({"b": {"y": null, "x": true}, "a\"q": [1, "s"]});
        assert_eq!(
            canonical_json(&value),
            r#"{"a\"q":[1,"s"],"b":{"x":true,"y":null}}"#
        );
    }

    #[test]
    fn test_object_entries_sorted_whatever_the_input_order() {
        let inner = json!({"y": 2, "x": 1});
        let (b, a, z) = ("b".to_string(), "a".to_string(), "z".to_string());
        let (one, empty) = (json!(1), json!({}));
        let reversed = vec![(&z, &empty), (&b, &inner), (&a, &one)];

        let mut out = String::new();
        write_object(reversed, &mut out);

        assert_eq!(out, r#"{"a":1,"b":{"x":1,"y":2},"z":{}}"#);
    }

    #[test]
    fn test_object_output_independent_of_entry_order() {
        let keys: Vec<String> = ["title", "app", "url", "clipboard_content"]
            .iter()
            .map(|k| k.to_string())
            .collect();
        let values: Vec<Value> = (0..keys.len()).map(|i| json!(i)).collect();
        let forward: Vec<(&String, &Value)> = keys.iter().zip(values.iter()).collect();
        let backward: Vec<(&String, &Value)> = forward.iter().rev().copied().collect();

        let mut a = String::new();
        let mut b = String::new();
        write_object(forward, &mut a);
        write_object(backward, &mut b);

        assert_eq!(a, b);
        assert!(a.starts_with(r#"{"app":1,"clipboard_content":3"#));
    }

    // =========================================================================
    // Property-Based Tests
    // =========================================================================

    // **Feature: fingerprint, Property 1: Determinism**
    // *For any* set of fields, populating them in forward or reverse order
    // yields the same fingerprint.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_fingerprint_ignores_insertion_order(
            fields in prop::collection::btree_map("[a-z_]{1,12}", "[ -~]{0,24}", 1..8),
        ) {
            let forward = fields
                .iter()
                .fold(ContextSnapshot::new(), |s, (k, v)| s.with_field(k.clone(), v.clone()));
            let reverse = fields
                .iter()
                .rev()
                .fold(ContextSnapshot::new(), |s, (k, v)| s.with_field(k.clone(), v.clone()));

            prop_assert_eq!(fingerprint(&forward).unwrap(), fingerprint(&reverse).unwrap());
        }
    }

    // **Feature: fingerprint, Property 2: Sensitivity**
    // *For any* snapshot, changing a single field value changes the fingerprint.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_fingerprint_detects_single_field_change(
            fields in prop::collection::btree_map("[a-z_]{1,12}", "[ -~]{0,24}", 1..8),
            suffix in "[ -~]{1,4}",
        ) {
            let original: BTreeMap<String, String> = fields.clone();
            let mut changed = fields;
            let first_key = changed.keys().next().cloned().unwrap();
            changed.entry(first_key).and_modify(|v| v.push_str(&suffix));

            prop_assert_ne!(fingerprint(&original).unwrap(), fingerprint(&changed).unwrap());
        }
    }
}
