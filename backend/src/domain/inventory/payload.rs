//! Canonical payload form used for change detection.
//!
//! Canonicalisation makes semantically equal payloads compare equal:
//!
//! 1. Object keys are sorted recursively (lexicographic).
//! 2. Arrays keep their element order.
//! 3. Floating-point numbers with no fractional part collapse to integers, so
//!    `512.0` and `512` are the same capacity.
//! 4. Fields declared volatile for the kind are removed before comparison.
//!
//! The SHA-256 digest of the compact canonical JSON is persisted next to the
//! payload as a fast equality hint; [`ComparablePayload`] equality itself is
//! structural.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

/// Normalised, comparable payload of one inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct ComparablePayload(Value);

impl ComparablePayload {
    /// Canonicalise `value`, dropping the listed top-level volatile fields.
    ///
    /// # Examples
    /// ```
    /// use inventory_backend::domain::inventory::ComparablePayload;
    /// use serde_json::json;
    ///
    /// let a = ComparablePayload::new(json!({"b": 2, "a": {"y": 1.0, "x": 0}}), &[]);
    /// let b = ComparablePayload::new(json!({"a": {"x": 0, "y": 1}, "b": 2}), &[]);
    /// assert_eq!(a, b);
    /// assert_eq!(a.digest(), b.digest());
    /// ```
    pub fn new(value: Value, volatile_fields: &[&str]) -> Self {
        let mut canonical = canonicalize(&value);
        if let Value::Object(map) = &mut canonical {
            for field in volatile_fields {
                map.remove(*field);
            }
        }
        Self(canonical)
    }

    /// Borrow the canonical JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the payload, returning the canonical JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Lowercase hex SHA-256 of the compact canonical JSON.
    pub fn digest(&self) -> String {
        // Serialising a `Value` to a string cannot fail.
        let compact = self.0.to_string();
        hex::encode(Sha256::digest(compact.as_bytes()))
    }
}

impl From<Value> for ComparablePayload {
    fn from(value: Value) -> Self {
        Self::new(value, &[])
    }
}

impl From<ComparablePayload> for Value {
    fn from(value: ComparablePayload) -> Self {
        value.0
    }
}

impl fmt::Display for ComparablePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by_key(|(k, _)| k.as_str());
            let canonical_map: Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            Value::Object(canonical_map)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(canonicalize).collect()),
        Value::Number(number) => Value::Number(canonical_number(number)),
        other => other.clone(),
    }
}

/// Below this magnitude every integral `f64` is an exact integer.
const EXACT_INTEGER_BOUND: f64 = 9.0e15;

fn canonical_number(number: &Number) -> Number {
    if number.is_i64() || number.is_u64() {
        return number.clone();
    }
    number
        .as_f64()
        .filter(|float| float.abs() < EXACT_INTEGER_BOUND)
        // `f64` displays without exponent or fraction exactly when it is
        // integral, so the parse succeeds only for those.
        .and_then(|float| float.to_string().parse::<i64>().ok())
        .map_or_else(|| number.clone(), Number::from)
}
