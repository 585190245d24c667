//! Canonical serialization for content hashing
//!
//! Ensures a deterministic byte representation for any serializable value:
//! mapping keys are sorted recursively, and the text layout matches the
//! common `json.dumps(value, sort_keys=True)` form used by other ledger
//! tooling (`", "` and `": "` separators, ASCII-only output). Two values
//! that differ only in construction order therefore hash identically.

use crate::Result;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::io;

/// Hash a value to a lowercase hex SHA-256 digest.
///
/// A value that serializes to a bare string is hashed as its raw text;
/// everything else is hashed through its canonical JSON form. Fails only
/// when the value cannot be represented as JSON (e.g. non-string map keys).
pub fn hash<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        Value::String(text) => Ok(hash_bytes(text.as_bytes())),
        other => Ok(hash_bytes(&canonical_bytes_of(other)?)),
    }
}

/// Hash arbitrary bytes using SHA-256, hex encoded
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Serialize to canonical JSON bytes (sorted keys, fixed separators)
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    canonical_bytes_of(serde_json::to_value(value)?)
}

/// Serialize to a canonical JSON string
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let bytes = to_canonical_bytes(value)?;
    // CanonicalFormatter only ever emits ASCII
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn canonical_bytes_of(value: Value) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buffer, CanonicalFormatter);
    sort_keys(value).serialize(&mut ser)?;
    Ok(buffer)
}

/// Rebuild objects with keys in ascending order, at every depth
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// JSON formatter producing the canonical text layout
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // Printable ASCII passes through; everything else becomes \uXXXX
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Allocation, Transaction};
    use serde_json::json;

    #[test]
    fn test_canonical_layout() {
        let value = json!({
            "txns": [{"Bob": 50, "Alice": 50}],
            "txnCount": 1,
            "parentHash": null,
            "blockNumber": 0,
        });
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            r#"{"blockNumber": 0, "parentHash": null, "txnCount": 1, "txns": [{"Alice": 50, "Bob": 50}]}"#
        );
    }

    #[test]
    fn test_known_digest() {
        let value = json!({
            "blockNumber": 0,
            "parentHash": null,
            "txnCount": 1,
            "txns": [{"Alice": 50, "Bob": 50}],
        });
        assert_eq!(
            hash(&value).unwrap(),
            "7c88a4312054f89a2b73b04989cd9b9e1ae437e1048f89fbb4e18a08479de507"
        );
    }

    #[test]
    fn test_strings_hash_raw() {
        assert_eq!(
            hash("hello").unwrap(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_non_ascii_escaped() {
        let value = json!({"a\u{7f}": 2, "Zoë": 1});
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            r#"{"Zo\u00eb": 1, "a\u007f": 2}"#
        );
        assert_eq!(
            hash(&value).unwrap(),
            "719b500e1878dea5e92d866a051571c3a3e6a35c60d0969b3c9443878de6ce06"
        );
    }

    #[test]
    fn test_astral_plane_uses_surrogates() {
        assert_eq!(to_canonical_string("\u{1F600}").unwrap(), r#""\ud83d\ude00""#);
    }

    #[test]
    fn test_key_order_independent() {
        let a = json!({"Alice": 5, "Bob": 5, "nested": {"y": 1, "x": [1, 2]}});
        let b = json!({"nested": {"x": [1, 2], "y": 1}, "Bob": 5, "Alice": 5});
        assert_eq!(hash(&a).unwrap(), hash(&b).unwrap());

        let t1 = Transaction::from([("Bob", 5), ("Alice", -5)]);
        let t2 = Transaction::from([("Alice", -5), ("Bob", 5)]);
        assert_eq!(hash(&t1).unwrap(), hash(&t2).unwrap());
        assert_eq!(
            hash(&Allocation::from([("Bob", 5), ("Alice", 5)])).unwrap(),
            "407ff730e1fb4ec5f309c4d1d3975ac262b05b47bd7e4ce52fbd03cf14b51fcc"
        );
    }

    #[test]
    fn test_rejected_input_type() {
        use std::collections::BTreeMap;

        let mut bad: BTreeMap<Vec<u8>, i64> = BTreeMap::new();
        bad.insert(vec![1, 2], 3);
        assert!(matches!(hash(&bad), Err(crate::Error::Serialization(_))));
    }
}
