use crate::casting::{Conversion, coerce_assign, coerce_cast, is_type_assignable, truthiness};
use crate::evaluator::{CoercionError, EvalError};
use crate::types::{ClassRegistry, Type};
use crate::values::{Primitive, Value};
use pretty_assertions::assert_eq;

fn coercion(err: EvalError) -> CoercionError {
    match err {
        EvalError::Coercion(err) => err,
        other => panic!("expected a coercion error, got {other:?}"),
    }
}

#[test]
fn test_assignability() {
    let registry = ClassRegistry::new();
    let boxing = Conversion::Boxing;
    let strict = Conversion::Strict;
    let integer = Type::class("Integer");

    assert!(is_type_assignable(&registry, &Type::int(), &Type::long(), strict));
    assert!(!is_type_assignable(&registry, &Type::long(), &Type::int(), boxing));
    assert!(!is_type_assignable(&registry, &Type::int(), &integer, strict));
    assert!(is_type_assignable(&registry, &Type::int(), &integer, boxing));
    assert!(is_type_assignable(&registry, &Type::int(), &Type::class("Number"), boxing));
    assert!(is_type_assignable(&registry, &integer, &Type::long(), boxing));
    assert!(!is_type_assignable(&registry, &Type::Void, &Type::Void, boxing));
    assert!(is_type_assignable(&registry, &Type::string(), &Type::object(), strict));
}

#[test]
fn test_truthiness() {
    assert!(!truthiness(&Value::Null));
    assert!(!truthiness(&Value::Void));
    assert!(!truthiness(&Value::int(0)));
    assert!(!truthiness(&Value::char('\0')));
    assert!(!truthiness(&Value::string("")));
    assert!(!truthiness(&Value::boxed(Primitive::Double(0.0))));
    assert!(truthiness(&Value::string("false")));
    assert!(truthiness(&Value::long(-1)));
}

#[test]
fn test_assign_widens_and_boxes() {
    let registry = ClassRegistry::new();
    assert_eq!(coerce_assign(&registry, Value::int(5), &Type::long()).unwrap(), Value::long(5));
    assert_eq!(
        coerce_assign(&registry, Value::int(5), &Type::object()).unwrap(),
        Value::boxed(Primitive::Int(5))
    );
    assert_eq!(
        coerce_assign(&registry, Value::boxed(Primitive::Int(5)), &Type::double()).unwrap(),
        Value::double(5.0)
    );
}

#[test]
fn test_assign_narrows_representable_constants_only() {
    let registry = ClassRegistry::new();
    assert_eq!(coerce_assign(&registry, Value::int(100), &Type::byte()).unwrap(), Value::byte(100));
    assert_eq!(coerce_assign(&registry, Value::int(65), &Type::char()).unwrap(), Value::char('A'));
    assert!(matches!(
        coercion(coerce_assign(&registry, Value::int(200), &Type::byte()).unwrap_err()),
        CoercionError::IncompatibleAssign { .. }
    ));
    assert!(matches!(
        coercion(coerce_assign(&registry, Value::long(1), &Type::int()).unwrap_err()),
        CoercionError::IncompatibleAssign { .. }
    ));
}

#[test]
fn test_assign_null_and_void() {
    let registry = ClassRegistry::new();
    assert_eq!(coerce_assign(&registry, Value::Null, &Type::string()).unwrap(), Value::Null);
    assert_eq!(
        coercion(coerce_assign(&registry, Value::Null, &Type::int()).unwrap_err()),
        CoercionError::NullToPrimitive { target: "int".into() }
    );
    assert_eq!(
        coercion(coerce_assign(&registry, Value::Void, &Type::object()).unwrap_err()),
        CoercionError::VoidAssign { target: "Object".into() }
    );
}

#[test]
fn test_assign_rejects_unrelated_reference() {
    let registry = ClassRegistry::new();
    let err = coercion(coerce_assign(&registry, Value::string("x"), &Type::class("Integer")).unwrap_err());
    assert_eq!(
        err,
        CoercionError::IncompatibleAssign {
            from: "String".into(),
            target: "Integer".into()
        }
    );
}

#[test]
fn test_cast_narrows_and_parses() {
    let registry = ClassRegistry::new();
    assert_eq!(coerce_cast(&registry, Value::double(3.7), &Type::int()).unwrap(), Value::int(3));
    assert_eq!(coerce_cast(&registry, Value::int(300), &Type::byte()).unwrap(), Value::byte(44));
    assert_eq!(coerce_cast(&registry, Value::string(" 42 "), &Type::int()).unwrap(), Value::int(42));
    assert_eq!(coerce_cast(&registry, Value::string("2.9"), &Type::long()).unwrap(), Value::long(2));
    assert_eq!(coerce_cast(&registry, Value::string("x"), &Type::char()).unwrap(), Value::char('x'));
    assert!(matches!(
        coercion(coerce_cast(&registry, Value::string("abc"), &Type::int()).unwrap_err()),
        CoercionError::NumberFormat { .. }
    ));
}

#[test]
fn test_cast_to_boolean_uses_truthiness() {
    let registry = ClassRegistry::new();
    assert_eq!(coerce_cast(&registry, Value::int(2), &Type::boolean()).unwrap(), Value::boolean(true));
    assert_eq!(coerce_cast(&registry, Value::Null, &Type::boolean()).unwrap(), Value::boolean(false));
    assert_eq!(
        coerce_cast(&registry, Value::string(""), &Type::boolean()).unwrap(),
        Value::boolean(false)
    );
}

#[test]
fn test_cast_null_and_void() {
    let registry = ClassRegistry::new();
    assert_eq!(coerce_cast(&registry, Value::Null, &Type::int()).unwrap(), Value::int(0));
    assert_eq!(coerce_cast(&registry, Value::Null, &Type::string()).unwrap(), Value::Null);
    assert_eq!(
        coercion(coerce_cast(&registry, Value::Void, &Type::int()).unwrap_err()),
        CoercionError::VoidCast { target: "int".into() }
    );
}

#[test]
fn test_cast_to_wrapper_converts_primitive_kind() {
    let registry = ClassRegistry::new();
    assert_eq!(
        coerce_cast(&registry, Value::int(7), &Type::class("Long")).unwrap(),
        Value::boxed(Primitive::Long(7))
    );
    assert!(matches!(
        coercion(coerce_cast(&registry, Value::string("s"), &Type::class("Runnable")).unwrap_err()),
        CoercionError::IncompatibleCast { .. }
    ));
    // Strings only parse into primitives, never into wrappers.
    assert_eq!(
        coercion(coerce_cast(&registry, Value::string("12"), &Type::class("Integer")).unwrap_err()),
        CoercionError::IncompatibleCast {
            from: "String".into(),
            target: "Integer".into()
        }
    );
    assert_eq!(
        coerce_cast(&registry, Value::string("12"), &Type::int()).unwrap(),
        Value::int(12)
    );
}

#[test]
fn test_cast_arrays_element_wise() {
    let registry = ClassRegistry::new();
    let ints = Value::array(Type::int(), vec![Value::int(1), Value::int(2)]);
    let doubles = coerce_cast(&registry, ints, &Type::array_of(Type::double())).unwrap();
    let elements = doubles.as_array().unwrap().to_vec();
    assert_eq!(elements, vec![Value::double(1.0), Value::double(2.0)]);

    let strings = Value::array(Type::object(), vec![Value::string("a"), Value::Null]);
    let typed = coerce_cast(&registry, strings, &Type::array_of(Type::string())).unwrap();
    assert_eq!(typed.as_array().unwrap().element_type(), &Type::string());

    let mixed = Value::array(Type::object(), vec![Value::string("a"), Value::int(1)]);
    assert_eq!(
        coercion(coerce_cast(&registry, mixed, &Type::array_of(Type::string())).unwrap_err()),
        CoercionError::ArrayElement {
            index: 1,
            from: "int".into(),
            target: "String".into()
        }
    );
}
