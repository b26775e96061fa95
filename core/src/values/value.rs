//! The tagged runtime value.

use alloc::sync::Arc;
use core::fmt;

use super::object::{Array, Object};
use super::primitive::{Primitive, PrimitiveKind};
use crate::evaluator::InternalError;
use crate::types::Type;

/// A runtime value.
///
/// `Null` and `Void` are distinct: `Null` is the null reference, `Void` is
/// the absence of a value (an unbound name, or the result of a `void`
/// method). Asking for the payload of `Void` is an internal error.
#[derive(Clone, Default)]
pub enum Value {
    Primitive(Primitive),
    Null,
    #[default]
    Void,
    Object(Object),
}

impl Value {
    pub fn boolean(value: bool) -> Self {
        Value::Primitive(Primitive::Boolean(value))
    }

    pub fn char(value: char) -> Self {
        let mut units = [0u16; 2];
        let encoded = value.encode_utf16(&mut units);
        Value::Primitive(Primitive::Char(encoded[0]))
    }

    pub fn byte(value: i8) -> Self {
        Value::Primitive(Primitive::Byte(value))
    }

    pub fn short(value: i16) -> Self {
        Value::Primitive(Primitive::Short(value))
    }

    pub fn int(value: i32) -> Self {
        Value::Primitive(Primitive::Int(value))
    }

    pub fn long(value: i64) -> Self {
        Value::Primitive(Primitive::Long(value))
    }

    pub fn float(value: f32) -> Self {
        Value::Primitive(Primitive::Float(value))
    }

    pub fn double(value: f64) -> Self {
        Value::Primitive(Primitive::Double(value))
    }

    pub fn string(value: &str) -> Self {
        Value::Object(Object::Str(Arc::from(value)))
    }

    /// Box a primitive into its wrapper object.
    pub fn boxed(value: Primitive) -> Self {
        Value::Object(Object::Boxed(value))
    }

    pub fn array(element_type: Type, elements: crate::Vec<Value>) -> Self {
        Value::Object(Object::Array(Arc::new(Array::new(element_type, elements))))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Return `self` unless it is `Void`, in which case the caller has
    /// broken an invariant.
    pub fn payload(&self) -> Result<&Value, InternalError> {
        match self {
            Value::Void => Err(InternalError::VoidPayload),
            other => Ok(other),
        }
    }

    /// Exact primitive (not unboxed).
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Value::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Primitive payload of a primitive or a boxed wrapper.
    pub fn unboxed(&self) -> Option<Primitive> {
        match self {
            Value::Primitive(p) | Value::Object(Object::Boxed(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.unboxed().and_then(|p| p.as_bool())
    }

    pub fn as_int(&self) -> Option<i32> {
        match self.unboxed()? {
            Primitive::Int(v) => Some(v),
            Primitive::Short(v) => Some(v as i32),
            Primitive::Byte(v) => Some(v as i32),
            Primitive::Char(v) => Some(v as i32),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        self.unboxed().and_then(|p| p.as_i64())
    }

    pub fn as_double(&self) -> Option<f64> {
        self.unboxed().and_then(|p| p.as_f64())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Object(Object::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Arc<Array>> {
        match self {
            Value::Object(Object::Array(array)) => Some(array),
            _ => None,
        }
    }

    /// The runtime type used for assignability and overload resolution.
    ///
    /// `None` for `null`, `void` and untyped lambdas, which have no type of
    /// their own.
    pub fn runtime_type(&self) -> Option<Type> {
        match self {
            Value::Primitive(p) => Some(Type::Primitive(p.kind())),
            Value::Null | Value::Void => None,
            Value::Object(object) => object.runtime_type(),
        }
    }

    /// Human-readable type name for error messages.
    pub fn type_name(&self) -> crate::String {
        match self {
            Value::Null => "null".into(),
            Value::Void => "void".into(),
            Value::Object(Object::Lambda(_)) => "lambda".into(),
            other => other
                .runtime_type()
                .map(|ty| ty.display_name())
                .unwrap_or_else(|| "unknown".into()),
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        self.as_primitive().map(|p| p.kind())
    }

    /// Value equality as used by `equals`: strings and boxed values compare
    /// by content, other objects by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(Object::Boxed(a)), Value::Object(Object::Boxed(b))) => a == b,
            (Value::Object(a), Value::Object(b)) => a.same(b),
            (Value::Primitive(a), Value::Primitive(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Void, Value::Void) => true,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<Primitive> for Value {
    fn from(value: Primitive) -> Self {
        Value::Primitive(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Primitive(p) => write!(f, "{:?}", p),
            Value::Null => write!(f, "Null"),
            Value::Void => write!(f, "Void"),
            Value::Object(Object::Str(s)) => write!(f, "Str({:?})", s),
            Value::Object(object) => write!(f, "Object({})", object),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Primitive(p) => write!(f, "{}", p),
            Value::Null => write!(f, "null"),
            Value::Void => write!(f, "void"),
            Value::Object(object) => write!(f, "{}", object),
        }
    }
}
