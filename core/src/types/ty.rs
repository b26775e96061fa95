use alloc::sync::Arc;
use core::fmt;

use crate::String;
use crate::values::PrimitiveKind;

/// A declared type as written in script source or registered by the host.
///
/// Reference types are identified by their simple class name and resolved
/// against a [`ClassRegistry`](super::ClassRegistry) when subtyping matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    Void,
    Class(Arc<str>),
    Array(Arc<Type>),
}

impl Type {
    pub fn boolean() -> Type {
        Type::Primitive(PrimitiveKind::Boolean)
    }

    pub fn char() -> Type {
        Type::Primitive(PrimitiveKind::Char)
    }

    pub fn byte() -> Type {
        Type::Primitive(PrimitiveKind::Byte)
    }

    pub fn short() -> Type {
        Type::Primitive(PrimitiveKind::Short)
    }

    pub fn int() -> Type {
        Type::Primitive(PrimitiveKind::Int)
    }

    pub fn long() -> Type {
        Type::Primitive(PrimitiveKind::Long)
    }

    pub fn float() -> Type {
        Type::Primitive(PrimitiveKind::Float)
    }

    pub fn double() -> Type {
        Type::Primitive(PrimitiveKind::Double)
    }

    pub fn object() -> Type {
        Type::class("Object")
    }

    pub fn string() -> Type {
        Type::class("String")
    }

    pub fn class(name: &str) -> Type {
        Type::Class(Arc::from(normalize_class_name(name)))
    }

    pub fn array_of(element: Type) -> Type {
        Type::Array(Arc::new(element))
    }

    /// Parse a type name such as `int`, `String`, `java.lang.Integer` or `int[][]`.
    pub fn parse(name: &str) -> Type {
        let name = name.trim();
        if let Some(inner) = name.strip_suffix("[]") {
            return Type::array_of(Type::parse(inner));
        }
        if name == "void" {
            return Type::Void;
        }
        match PrimitiveKind::from_name(name) {
            Some(kind) => Type::Primitive(kind),
            None => Type::class(name),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Array(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The primitive kind a wrapper class unboxes to (`Integer` → `int`).
    pub fn unboxed_kind(&self) -> Option<PrimitiveKind> {
        self.class_name().and_then(PrimitiveKind::from_box_class)
    }

    /// The wrapper class of a primitive type (`int` → `Integer`).
    pub fn boxed(&self) -> Option<Type> {
        self.as_primitive().map(|kind| Type::class(kind.box_class()))
    }

    pub fn default_value(&self) -> crate::values::Value {
        match self {
            Type::Primitive(kind) => crate::values::Value::Primitive(kind.default_value()),
            _ => crate::values::Value::Null,
        }
    }

    pub fn display_name(&self) -> String {
        alloc::format!("{}", self)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => write!(f, "{}", kind),
            Type::Void => write!(f, "void"),
            Type::Class(name) => write!(f, "{}", name),
            Type::Array(element) => write!(f, "{}[]", element),
        }
    }
}

/// Strip the implicit `java.lang.` package so `java.lang.Integer` and
/// `Integer` name the same registered class.
pub fn normalize_class_name(name: &str) -> &str {
    name.strip_prefix("java.lang.")
        .or_else(|| name.strip_prefix("java.util.function."))
        .unwrap_or(name)
}
