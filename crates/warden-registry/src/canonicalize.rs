//! # Canonical JSON
//!
//! Deterministic re-serialization of JSON values, used as the hashing
//! substrate for tool checksums and schema fingerprints. Two documents that
//! are structurally equal but textually different (key order, whitespace,
//! `1.0` vs `1`) canonicalize to byte-identical output.
//!
//! ## Threat Model
//!
//! - **Key Reordering**: an attacker reorders object keys hoping the stamp
//!   is computed over raw bytes. Keys are sorted on every encode.
//! - **Whitespace Padding**: insignificant whitespace never reaches the hash.
//! - **Raw Pass-Through**: malformed input is rejected with a decode error,
//!   it is never hashed as opaque bytes.
//!
//! ## Rules
//!
//! 1. Object keys sorted by UTF-16 code units (RFC 8785 §3.2.3)
//! 2. Integral floats collapse to integers, other numbers keep their
//!    shortest round-trip form
//! 3. Strings use minimal escaping
//! 4. No insignificant whitespace
//! 5. Array order preserved
//!
//! ## References
//!
//! - **RFC 8785** - "JSON Canonicalization Scheme (JCS)"
//!   <https://www.rfc-editor.org/rfc/rfc8785>
//!
//! ## Example
//!
//! ```rust
//! use warden_registry::canonicalize::{canonicalize, canonicalize_bytes};
//! use serde_json::json;
//!
//! let canon = canonicalize(&json!({"b": 1, "a": 2}));
//! assert_eq!(canon, r#"{"a":2,"b":1}"#);
//!
//! let from_text = canonicalize_bytes(br#"{ "a" : 2, "b" : 1.0 }"#).unwrap();
//! assert_eq!(from_text, canon);
//! ```

use crate::models::{Hash, Result};
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;

/// Canonicalizes an already-parsed JSON value.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Parses raw JSON text and canonicalizes it.
///
/// # Errors
///
/// Returns [`RegistryError::Canonicalization`](crate::RegistryError::Canonicalization)
/// when `raw` is not a well-formed JSON document.
pub fn canonicalize_bytes(raw: &[u8]) -> Result<String> {
    let value: Value = serde_json::from_slice(raw)?;
    Ok(canonicalize(&value))
}

/// SHA-256 over the canonical form of `value`.
pub fn hash_canonical(value: &Value) -> Hash {
    Sha256::digest(canonicalize(value).as_bytes()).into()
}

/// Hex-encoded [`hash_canonical`], the form stored in tool stamps.
pub fn hex_digest(value: &Value) -> String {
    hex::encode(hash_canonical(value))
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(out, map),
    }
}

fn write_number(out: &mut String, n: &Number) {
    if n.is_i64() || n.is_u64() {
        out.push_str(&n.to_string());
        return;
    }
    match n.as_f64() {
        // 2^53: beyond this an f64 no longer names a unique integer
        Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            out.push_str(&(f as i64).to_string());
        }
        _ => out.push_str(&n.to_string()),
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\u{20}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_object(out: &mut String, map: &Map<String, Value>) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|(a, _), (b, _)| compare_utf16(a, b));

    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(out, key);
        out.push(':');
        write_value(out, value);
    }
    out.push('}');
}

fn compare_utf16(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}
