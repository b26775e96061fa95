//! Assignment and cast conversions.
//!
//! Every assignment, argument binding, return and cast expression funnels
//! through here. Assignment ([`coerce_assign`]) only performs the implicit
//! conversions of the host language: primitive widening, boxing, unboxing,
//! reference widening and the narrowing of small `int` values into `byte`,
//! `short` and `char`. Casts ([`coerce_cast`]) additionally narrow, parse
//! strings into primitives, apply truthiness when the target is `boolean`
//! and convert arrays element by element.

use alloc::sync::Arc;

use crate::evaluator::{CoercionError, EvalError};
use crate::types::{ClassRegistry, Type};
use crate::values::{Array, Lambda, Object, Primitive, PrimitiveKind, Value};
use crate::{String, ToString, Vec};

/// Which implicit conversions are allowed on top of identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Subtyping and primitive widening.
    Strict,
    /// `Strict` plus boxing and unboxing.
    Boxing,
}

/// Whether a value of type `from` may be assigned to `to`.
pub fn is_type_assignable(registry: &ClassRegistry, from: &Type, to: &Type, conversion: Conversion) -> bool {
    if from == to {
        return !matches!(from, Type::Void);
    }
    match (from, to) {
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(a), Type::Primitive(b)) => a.widens_to(*b),
        (Type::Primitive(_), _) => {
            conversion == Conversion::Boxing
                && from
                    .boxed()
                    .is_some_and(|boxed| registry.is_reference_assignable(&boxed, to))
        }
        (_, Type::Primitive(target)) => {
            conversion == Conversion::Boxing
                && from.unboxed_kind().is_some_and(|kind| kind.widens_to(*target))
        }
        _ => registry.is_reference_assignable(from, to),
    }
}

/// Boolean interpretation of any value, used by casts to `boolean` and by
/// loosely typed conditions.
///
/// `false`, numeric zero, `'\u0000'`, the empty string, `null` and `void`
/// are false; everything else is true.
pub fn truthiness(value: &Value) -> bool {
    match value {
        Value::Void | Value::Null => false,
        Value::Primitive(p) | Value::Object(Object::Boxed(p)) => !p.is_zero(),
        Value::Object(Object::Str(s)) => !s.is_empty(),
        Value::Object(_) => true,
    }
}

fn type_of(value: &Value) -> String {
    value.type_name()
}

/// Implicit conversion of `value` for storage in a slot of type `target`.
pub fn coerce_assign(registry: &ClassRegistry, value: Value, target: &Type) -> Result<Value, EvalError> {
    tracing::trace!(from = %type_of(&value), to = %target, "coerce_assign");
    let incompatible = |value: &Value| CoercionError::IncompatibleAssign {
        from: type_of(value),
        target: target.to_string(),
    };

    match (&value, target) {
        (Value::Void, _) => Err(CoercionError::VoidAssign {
            target: target.to_string(),
        }
        .into()),
        (_, Type::Void) => Err(incompatible(&value).into()),

        (Value::Null, Type::Primitive(_)) => Err(CoercionError::NullToPrimitive {
            target: target.to_string(),
        }
        .into()),
        (Value::Null, _) => Ok(Value::Null),

        (_, Type::Primitive(kind)) => match value.unboxed() {
            Some(p) if p.kind().widens_to(*kind) => Ok(Value::Primitive(p.cast(*kind))),
            Some(p) if narrows_implicitly(p, *kind) => Ok(Value::Primitive(p.cast(*kind))),
            _ => Err(incompatible(&value).into()),
        },

        (Value::Primitive(p), _) => {
            let boxed = Type::class(p.kind().box_class());
            if registry.is_reference_assignable(&boxed, target) {
                return Ok(Value::boxed(*p));
            }
            match target.unboxed_kind() {
                Some(kind) if narrows_implicitly(*p, kind) => Ok(Value::boxed(p.cast(kind))),
                _ => Err(incompatible(&value).into()),
            }
        }

        (Value::Object(Object::Lambda(lambda)), _) => convert_lambda(registry, lambda, target)
            .unwrap_or_else(|| Err(incompatible(&value).into())),

        (Value::Object(_), _) => {
            let assignable = value
                .runtime_type()
                .is_some_and(|ty| registry.is_reference_assignable(&ty, target));
            if assignable {
                Ok(value)
            } else {
                Err(incompatible(&value).into())
            }
        }
    }
}

/// The host language lets an `int`-or-narrower value initialize a `byte`,
/// `short` or `char` when it is representable there.
fn narrows_implicitly(p: Primitive, target: PrimitiveKind) -> bool {
    matches!(
        p.kind(),
        PrimitiveKind::Int | PrimitiveKind::Short | PrimitiveKind::Char | PrimitiveKind::Byte
    ) && matches!(
        target,
        PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Char
    ) && p.fits_in(target)
}

/// Lambdas may be stored untyped in `Object` slots or converted to the
/// functional interface named by `target`. `None` if neither applies.
fn convert_lambda(
    registry: &ClassRegistry,
    lambda: &Arc<Lambda>,
    target: &Type,
) -> Option<Result<Value, EvalError>> {
    if target == &Type::object() {
        return Some(Ok(Value::Object(Object::Lambda(lambda.clone()))));
    }
    let interface = registry.get(target.class_name()?)?;
    if !interface.is_interface() {
        return None;
    }
    Some(
        lambda
            .convert_to(registry, &interface)
            .map(|functional| Value::Object(Object::Functional(Arc::new(functional))))
            .map_err(EvalError::from),
    )
}

/// Explicit cast of `value` to `target`.
pub fn coerce_cast(registry: &ClassRegistry, value: Value, target: &Type) -> Result<Value, EvalError> {
    tracing::trace!(from = %type_of(&value), to = %target, "coerce_cast");
    let incompatible = |value: &Value| CoercionError::IncompatibleCast {
        from: type_of(value),
        target: target.to_string(),
    };

    match (&value, target) {
        (Value::Void, _) => Err(CoercionError::VoidCast {
            target: target.to_string(),
        }
        .into()),
        (_, Type::Void) => Err(incompatible(&value).into()),

        (_, Type::Primitive(kind)) => cast_to_primitive(&value, *kind)
            .ok_or_else(|| incompatible(&value))?
            .map(Value::Primitive)
            .map_err(EvalError::from),

        (Value::Null, _) => Ok(Value::Null),

        (_, Type::Class(_)) if target.unboxed_kind().is_some() => {
            let Some(kind) = target.unboxed_kind() else {
                return Err(incompatible(&value).into());
            };
            if matches!(value, Value::Object(Object::Boxed(p)) if p.kind() == kind) {
                return Ok(value);
            }
            // Only primitives and other wrappers convert; strings parse to
            // primitive targets alone.
            if value.unboxed().is_none() {
                return Err(incompatible(&value).into());
            }
            let primitive = cast_to_primitive(&value, kind).ok_or_else(|| incompatible(&value))??;
            Ok(Value::boxed(primitive))
        }

        (Value::Object(Object::Array(array)), Type::Array(element)) => {
            cast_array(registry, array, element).map_err(EvalError::from)
        }

        (Value::Object(Object::Lambda(lambda)), _) => convert_lambda(registry, lambda, target)
            .unwrap_or_else(|| Err(incompatible(&value).into())),

        (Value::Primitive(p), _) => {
            let boxed = Type::class(p.kind().box_class());
            if registry.is_reference_assignable(&boxed, target) {
                Ok(Value::boxed(*p))
            } else {
                Err(incompatible(&value).into())
            }
        }

        (Value::Object(_), _) => {
            let assignable = value
                .runtime_type()
                .is_some_and(|ty| registry.is_reference_assignable(&ty, target));
            if assignable {
                Ok(value)
            } else {
                Err(incompatible(&value).into())
            }
        }
    }
}

/// Primitive cast rules. `None` if the value's kind has no conversion to a
/// primitive at all; `Some(Err)` if it has one that failed.
fn cast_to_primitive(value: &Value, kind: PrimitiveKind) -> Option<Result<Primitive, CoercionError>> {
    if kind == PrimitiveKind::Boolean {
        return Some(Ok(Primitive::Boolean(truthiness(value))));
    }
    match value {
        Value::Null => Some(Ok(kind.default_value())),
        Value::Primitive(p) | Value::Object(Object::Boxed(p)) => Some(Ok(p.cast(kind))),
        Value::Object(Object::Str(s)) => Some(parse_string(s, kind)),
        _ => None,
    }
}

/// Strings parse to the widest form first, then narrow: integral targets try
/// a `long`, then a `double` truncated toward zero. A one character string
/// cast to `char` is that character.
fn parse_string(text: &str, kind: PrimitiveKind) -> Result<Primitive, CoercionError> {
    if kind == PrimitiveKind::Char {
        let mut units = text.encode_utf16();
        if let (Some(unit), None) = (units.next(), units.next()) {
            return Ok(Primitive::Char(unit));
        }
    }
    let trimmed = text.trim();
    if kind.is_integral() {
        if let Ok(v) = trimmed.parse::<i64>() {
            return Ok(Primitive::Long(v).cast(kind));
        }
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() || !kind.is_integral())
        .map(|v| Primitive::Double(v).cast(kind))
        .ok_or_else(|| CoercionError::NumberFormat {
            value: text.to_string(),
            target: kind.to_string(),
        })
}

/// Element-wise array cast, recursing into nested arrays.
fn cast_array(registry: &ClassRegistry, array: &Arc<Array>, element: &Type) -> Result<Value, CoercionError> {
    let from = Type::array_of(array.element_type().clone());
    let to = Type::array_of(element.clone());
    if registry.is_reference_assignable(&from, &to) {
        return Ok(Value::Object(Object::Array(array.clone())));
    }

    let elements = array.to_vec();
    let mut converted = Vec::with_capacity(elements.len());
    for (index, item) in elements.into_iter().enumerate() {
        let failed = |item: &Value| CoercionError::ArrayElement {
            index,
            from: type_of(item),
            target: element.to_string(),
        };
        let value = match (&item, element) {
            (Value::Object(Object::Array(inner)), Type::Array(inner_element)) => {
                cast_array(registry, inner, inner_element)?
            }
            (_, Type::Primitive(kind)) => match item.unboxed() {
                Some(p) if p.kind().is_numeric() == kind.is_numeric() => Value::Primitive(p.cast(*kind)),
                _ => return Err(failed(&item)),
            },
            (Value::Null, _) => Value::Null,
            (Value::Primitive(p), _) => {
                let boxed = Type::class(p.kind().box_class());
                if !registry.is_reference_assignable(&boxed, element) {
                    return Err(failed(&item));
                }
                Value::boxed(*p)
            }
            _ => {
                let fits = item
                    .runtime_type()
                    .is_some_and(|ty| registry.is_reference_assignable(&ty, element));
                if !fits {
                    return Err(failed(&item));
                }
                item
            }
        };
        converted.push(value);
    }
    Ok(Value::array(element.clone(), converted))
}

#[cfg(test)]
#[path = "casting_test.rs"]
mod casting_test;
