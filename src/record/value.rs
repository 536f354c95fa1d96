//! Typed keys and values
//!
//! The three value domains a record can carry, and their on-disk tags.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{LogKvError, Result};

/// On-disk type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ValueType {
    Int = 1,
    Float = 2,
    Text = 3,
}

impl TryFrom<u16> for ValueType {
    type Error = LogKvError;

    fn try_from(tag: u16) -> Result<Self> {
        match tag {
            1 => Ok(ValueType::Int),
            2 => Ok(ValueType::Float),
            3 => Ok(ValueType::Text),
            other => Err(LogKvError::UnsupportedType(other)),
        }
    }
}

impl ValueType {
    /// Payload width for fixed-size types; `None` for Text
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            ValueType::Int | ValueType::Float => Some(8),
            ValueType::Text => None,
        }
    }
}

/// A key or value stored in the log
///
/// Equality and hashing follow the encoded form: floats compare by bit
/// pattern, so every `TypedValue` (including `NaN`) can serve as an index key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypedValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl TypedValue {
    /// The tag written to the record header
    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::Int(_) => ValueType::Int,
            TypedValue::Float(_) => ValueType::Float,
            TypedValue::Text(_) => ValueType::Text,
        }
    }

    /// Payload length in bytes once encoded
    pub fn encoded_len(&self) -> usize {
        match self {
            TypedValue::Int(_) | TypedValue::Float(_) => 8,
            TypedValue::Text(s) => s.len(),
        }
    }

    /// Write the payload bytes (no length prefix, no tag)
    pub(crate) fn write_payload(&self, buf: &mut impl bytes::BufMut) {
        match self {
            TypedValue::Int(v) => buf.put_i64_le(*v),
            TypedValue::Float(v) => buf.put_f64_le(*v),
            TypedValue::Text(s) => buf.put_slice(s.as_bytes()),
        }
    }

    /// Rebuild a value from its tag and payload bytes
    pub(crate) fn from_payload(value_type: ValueType, payload: &[u8]) -> Result<Self> {
        match value_type {
            ValueType::Int => Ok(TypedValue::Int(i64::from_le_bytes(fixed8(
                payload, "Int",
            )?))),
            ValueType::Float => Ok(TypedValue::Float(f64::from_le_bytes(fixed8(
                payload, "Float",
            )?))),
            ValueType::Text => std::str::from_utf8(payload)
                .map(|s| TypedValue::Text(s.to_string()))
                .map_err(|e| LogKvError::Malformed(format!("Text payload is not UTF-8: {}", e))),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TypedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            TypedValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TypedValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn fixed8(payload: &[u8], type_name: &str) -> Result<[u8; 8]> {
    payload.try_into().map_err(|_| {
        LogKvError::Malformed(format!(
            "{} payload must be 8 bytes, got {}",
            type_name,
            payload.len()
        ))
    })
}

// =============================================================================
// Equality / Hashing (bitwise for floats)
// =============================================================================

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypedValue::Int(a), TypedValue::Int(b)) => a == b,
            (TypedValue::Float(a), TypedValue::Float(b)) => a.to_bits() == b.to_bits(),
            (TypedValue::Text(a), TypedValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypedValue {}

impl Hash for TypedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value_type().hash(state);
        match self {
            TypedValue::Int(v) => v.hash(state),
            TypedValue::Float(v) => v.to_bits().hash(state),
            TypedValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Int(v) => write!(f, "{}", v),
            TypedValue::Float(v) => write!(f, "{:?}", v),
            TypedValue::Text(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::Int(v)
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        TypedValue::Int(v as i64)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        TypedValue::Float(v)
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::Text(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        TypedValue::Text(s)
    }
}
