//! Canonical cache keys.

use lexiforge_core::Hash;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Serialize a JSON value with object keys sorted at every depth.
///
/// Arrays keep their order. The output is compact and does not depend on
/// how the map type behind [`Value`] orders its entries.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
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

/// Key of one cache entry: `operation:blake3hex`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for an operation and its request
    #[must_use]
    pub fn compute(operation: &str, request: &Value) -> Self {
        let canonical = canonical_json(request);
        let hash = Hash::compute_parts(&[operation.as_bytes(), canonical.as_bytes()]);
        Self(format!("{operation}:{}", hash.to_hex()))
    }

    /// Operation prefix
    #[must_use]
    pub fn operation(&self) -> &str {
        self.0.split_once(':').map_or("", |(op, _)| op)
    }

    /// Full key text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
