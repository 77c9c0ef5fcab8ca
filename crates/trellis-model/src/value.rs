//! Typed cell values and column schemas.
//!
//! Every store is constructed with a fixed schema: an ordered list of
//! [`ValueType`]s, one per column. Each cell then holds a [`Value`] whose
//! variant matches its column's type; a mismatched write is rejected with
//! [`ModelError::TypeMismatch`](trellis_core::ModelError::TypeMismatch).

use std::any::Any;
use std::cmp::Ordering;
use std::sync::Arc;

/// The semantic type of one column, fixed at store construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean cells.
    Bool,
    /// Signed integer cells.
    Int,
    /// Unsigned integer cells.
    UInt,
    /// Floating point cells.
    Float,
    /// String cells.
    String,
    /// Raw byte cells.
    Bytes,
    /// Boxed handles and other opaque payloads.
    Object,
}

impl ValueType {
    /// Returns the type's name, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::UInt => "UInt",
            Self::Float => "Float",
            Self::String => "String",
            Self::Bytes => "Bytes",
            Self::Object => "Object",
        }
    }

    /// Returns the unset cell value for a column of this type.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::UInt => Value::UInt(0),
            Self::Float => Value::Float(0.0),
            Self::String => Value::String(String::new()),
            Self::Bytes => Value::Bytes(Vec::new()),
            Self::Object => Value::Object(Arc::new(())),
        }
    }
}

/// Type-erased container for one cell.
///
/// # Example
///
/// ```
/// use trellis_model::Value;
///
/// let data = Value::from("Hello");
/// assert_eq!(data.as_str(), Some("Hello"));
///
/// let data = Value::object(42u32);
/// assert_eq!(data.downcast::<u32>(), Some(&42));
/// ```
#[derive(Clone, Debug)]
pub enum Value {
    /// Boolean data.
    Bool(bool),
    /// Signed integer data.
    Int(i64),
    /// Unsigned integer data.
    UInt(u64),
    /// Floating point data.
    Float(f64),
    /// String data.
    String(String),
    /// Raw byte data.
    Bytes(Vec<u8>),
    /// Opaque shared payload (type-erased).
    Object(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Creates an `Object` value from any shareable type.
    pub fn object<T: Any + Send + Sync + 'static>(value: T) -> Self {
        Self::Object(Arc::new(value))
    }

    /// Returns this value's [`ValueType`].
    pub fn type_of(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::UInt(_) => ValueType::UInt,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::Bytes(_) => ValueType::Bytes,
            Self::Object(_) => ValueType::Object,
        }
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the value as a signed integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as an unsigned integer.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::UInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the value as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the value as a byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Attempts to downcast an `Object` value to the given type.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Object(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Total ordering used by column-based sorting.
    ///
    /// Values of the same variant compare naturally; NaN floats and values
    /// of differing variants compare equal, leaving their relative order to
    /// the underlying insertion order.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::UInt(a), Self::UInt(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Bytes(a), Self::Bytes(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            // Objects compare by identity, not contents.
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n as i64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::UInt(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::UInt(n as u64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Float(n as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        let data = Value::from("hello");
        assert_eq!(data.as_str(), Some("hello"));
        assert!(data.as_int().is_none());

        let data = Value::from(7i64);
        assert_eq!(data.as_int(), Some(7));
        assert_eq!(data.type_of(), ValueType::Int);
    }

    #[test]
    fn test_value_object() {
        #[derive(Debug, PartialEq)]
        struct Handle(u32);

        let data = Value::object(Handle(42));
        assert_eq!(data.downcast::<Handle>(), Some(&Handle(42)));
        assert!(data.downcast::<u32>().is_none());
        assert_eq!(data.type_of(), ValueType::Object);
    }

    #[test]
    fn test_object_equality_is_identity() {
        let shared: Arc<dyn std::any::Any + Send + Sync> = Arc::new(5u8);
        let a = Value::Object(shared.clone());
        let b = Value::Object(shared);
        let c = Value::object(5u8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            Value::from("a").compare(&Value::from("b")),
            Ordering::Less
        );
        assert_eq!(Value::from(3i64).compare(&Value::from(3i64)), Ordering::Equal);
        assert_eq!(
            Value::from(2.5f64).compare(&Value::from(1.0f64)),
            Ordering::Greater
        );
        // Mismatched variants are incomparable, not a panic
        assert_eq!(
            Value::from("a").compare(&Value::from(1i64)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_default_values_match_schema() {
        for ty in [
            ValueType::Bool,
            ValueType::Int,
            ValueType::UInt,
            ValueType::Float,
            ValueType::String,
            ValueType::Bytes,
            ValueType::Object,
        ] {
            assert_eq!(ty.default_value().type_of(), ty);
        }
    }
}
