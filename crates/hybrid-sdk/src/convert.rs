//! Conversion between script values and Rust types.
//!
//! Implement `FromValue` to accept a type as a member argument and `ToValue`
//! to return it from a member.

use std::sync::Arc;

use crate::error::{HostError, HostResult};
use crate::function::FunctionHandle;
use crate::object::HostObject;
use crate::value::Value;

/// Convert from Value to Rust type.
pub trait FromValue: Sized {
    /// Convert from Value, returning an error if the type doesn't match.
    fn from_value(value: &Value) -> HostResult<Self>;
}

/// Convert from Rust type to Value.
pub trait ToValue {
    /// Convert to Value.
    fn to_value(self) -> Value;
}

fn mismatch(expected: &str, got: &Value) -> HostError {
    HostError::TypeMismatch {
        expected: expected.to_string(),
        got: got.type_name().to_string(),
    }
}

/// Fetch and convert positional argument `index`.
///
/// Missing arguments read as `undefined`, so optional parameters can be
/// modelled with `Option<T>`.
pub fn arg<T: FromValue>(args: &[Value], index: usize) -> HostResult<T> {
    match args.get(index) {
        Some(value) => T::from_value(value),
        None => T::from_value(&Value::Undefined),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> HostResult<Self> {
        Ok(value.clone())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> HostResult<Self> {
        value.as_number().ok_or_else(|| mismatch("number", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> HostResult<Self> {
        let n = f64::from_value(value)?;
        if n.fract() != 0.0 || n < i32::MIN as f64 || n > i32::MAX as f64 {
            return Err(HostError::TypeMismatch {
                expected: "i32".to_string(),
                got: n.to_string(),
            });
        }
        Ok(n as i32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> HostResult<Self> {
        value.as_bool().ok_or_else(|| mismatch("boolean", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> HostResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("string", value))
    }
}

impl FromValue for FunctionHandle {
    fn from_value(value: &Value) -> HostResult<Self> {
        value
            .as_function()
            .cloned()
            .ok_or_else(|| mismatch("function", value))
    }
}

impl FromValue for Arc<dyn HostObject> {
    fn from_value(value: &Value) -> HostResult<Self> {
        value
            .as_object()
            .cloned()
            .ok_or_else(|| mismatch("object", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> HostResult<Self> {
        if value.is_nullish() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Number(self)
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::Number(self as f64)
    }
}

impl ToValue for u32 {
    fn to_value(self) -> Value {
        Value::Number(self as f64)
    }
}

impl ToValue for usize {
    fn to_value(self) -> Value {
        Value::Number(self as f64)
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::String(self.into())
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::String(self.into())
    }
}

impl ToValue for FunctionHandle {
    fn to_value(self) -> Value {
        Value::Function(self)
    }
}

impl ToValue for Arc<dyn HostObject> {
    fn to_value(self) -> Value {
        Value::Object(self)
    }
}

// Unit type (for members that return void)
impl ToValue for () {
    fn to_value(self) -> Value {
        Value::Undefined
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value_primitives() {
        assert_eq!(f64::from_value(&Value::Number(2.5)).unwrap(), 2.5);
        assert_eq!(i32::from_value(&Value::Number(42.0)).unwrap(), 42);
        assert!(bool::from_value(&Value::Bool(true)).unwrap());
        assert_eq!(String::from_value(&Value::from("hi")).unwrap(), "hi");
    }

    #[test]
    fn test_from_value_mismatch() {
        let err = f64::from_value(&Value::from("3")).unwrap_err();
        assert!(matches!(
            err,
            HostError::TypeMismatch { ref expected, ref got } if expected == "number" && got == "string"
        ));

        assert!(i32::from_value(&Value::Number(1.5)).is_err());
        assert!(i32::from_value(&Value::Number(1e12)).is_err());
    }

    #[test]
    fn test_optional_arguments() {
        let args = [Value::Number(1.0), Value::Null];
        assert_eq!(arg::<Option<f64>>(&args, 0).unwrap(), Some(1.0));
        assert_eq!(arg::<Option<f64>>(&args, 1).unwrap(), None);
        assert_eq!(arg::<Option<f64>>(&args, 7).unwrap(), None);
        assert!(arg::<f64>(&args, 7).is_err());
    }

    #[test]
    fn test_to_value() {
        assert_eq!(6.0_f64.to_value(), Value::Number(6.0));
        assert_eq!(3i32.to_value(), Value::Number(3.0));
        assert_eq!(true.to_value(), Value::Bool(true));
        assert_eq!("x".to_value(), Value::from("x"));
        assert!(().to_value().is_undefined());
        assert_eq!(None::<f64>.to_value(), Value::Null);
    }
}
