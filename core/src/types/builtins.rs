//! Builtin classes every registry starts with: `Object`, the wrappers,
//! `String`, `Math`, the exception hierarchy and the common functional
//! interfaces.

use super::{ClassBuilder, ClassRegistry, Type};
use crate::evaluator::{EvalError, InternalError};
use crate::scope::Modifiers;
use crate::values::{Object, Primitive, PrimitiveKind, Value};
use crate::{String, ToString, Vec, format};

pub(crate) fn install(registry: &ClassRegistry) {
    registry.register(object_class());
    for name in ["Cloneable", "Serializable"] {
        registry.register(ClassBuilder::interface(name).build());
    }
    registry.register(
        ClassBuilder::interface("Comparable")
            .abstract_method("compareTo", &[Type::object()], Type::int())
            .build(),
    );
    registry.register(
        ClassBuilder::interface("CharSequence")
            .abstract_method("length", &[], Type::int())
            .abstract_method("charAt", &[Type::int()], Type::char())
            .build(),
    );
    registry.register(number_class());
    for kind in PrimitiveKind::ALL {
        registry.register(box_class(kind));
    }
    registry.register(string_class());
    registry.register(math_class());
    install_exceptions(registry);
    install_functional_interfaces(registry);
}

fn bad_argument(method: &str, value: &Value) -> EvalError {
    InternalError::BadNativeArgument {
        method: method.to_string(),
        found: value.type_name(),
    }
    .into()
}

fn arg<'a>(method: &str, args: &'a [Value], index: usize) -> Result<&'a Value, EvalError> {
    args.get(index).ok_or_else(|| bad_argument(method, &Value::Void))
}

fn str_arg<'a>(method: &str, value: &'a Value) -> Result<&'a str, EvalError> {
    value.as_str().ok_or_else(|| bad_argument(method, value))
}

fn int_arg(method: &str, value: &Value) -> Result<i32, EvalError> {
    value.as_int().ok_or_else(|| bad_argument(method, value))
}

fn primitive_arg(method: &str, value: &Value) -> Result<Primitive, EvalError> {
    value.unboxed().ok_or_else(|| bad_argument(method, value))
}

fn units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> Value {
    Value::string(&String::from_utf16_lossy(units))
}

/// `String.hashCode` of the host language.
fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

fn hash_of(value: &Value) -> i32 {
    match value.unboxed() {
        Some(Primitive::Int(v)) => v,
        Some(Primitive::Boolean(b)) => {
            if b {
                1231
            } else {
                1237
            }
        }
        _ => string_hash(&value.to_string()),
    }
}

fn object_class() -> super::ClassDef {
    ClassBuilder::class("Object")
        .constructor(&[], |_, _| Ok(Value::Void))
        .method("toString", &[], Type::string(), |this, _| {
            Ok(Value::string(&this.to_string()))
        })
        .method("equals", &[Type::object()], Type::boolean(), |this, args| {
            Ok(Value::boolean(this.equals(arg("equals", args, 0)?)))
        })
        .method("hashCode", &[], Type::int(), |this, _| Ok(Value::int(hash_of(this))))
        .build()
}

fn number_class() -> super::ClassDef {
    let mut builder = ClassBuilder::abstract_class("Number").implements("Serializable");
    for kind in [
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ] {
        let name = format!("{}Value", kind.name());
        let method = name.clone();
        builder = builder.method(&name, &[], Type::Primitive(kind), move |this, _| {
            Ok(Value::Primitive(primitive_arg(&method, this)?.cast(kind)))
        });
    }
    builder.build()
}

fn parse_primitive(text: &str, kind: PrimitiveKind) -> Option<Primitive> {
    let text = text.trim();
    match kind {
        PrimitiveKind::Boolean => Some(Primitive::Boolean(text.eq_ignore_ascii_case("true"))),
        PrimitiveKind::Char => {
            let mut chars = text.encode_utf16();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Primitive::Char(c)),
                _ => None,
            }
        }
        PrimitiveKind::Float | PrimitiveKind::Double => text
            .parse::<f64>()
            .ok()
            .map(|v| Primitive::Double(v).cast(kind)),
        integral => {
            let v = text.parse::<i64>().ok()?;
            let p = Primitive::Long(v);
            (integral == PrimitiveKind::Long || p.fits_in(integral)).then(|| p.cast(integral))
        }
    }
}

fn box_class(kind: PrimitiveKind) -> super::ClassDef {
    let name = kind.box_class();
    let prim = Type::Primitive(kind);
    let boxed = Type::class(name);
    let mut builder = ClassBuilder::class(name)
        .implements("Comparable")
        .implements("Serializable");
    if kind.is_numeric() && kind != PrimitiveKind::Char {
        builder = builder.extends("Number");
    }

    builder = builder
        .constructor(&[prim.clone()], move |_, args| {
            Ok(Value::boxed(primitive_arg("<init>", arg("<init>", args, 0)?)?.cast(kind)))
        })
        .static_method("valueOf", &[prim.clone()], boxed.clone(), move |_, args| {
            Ok(Value::boxed(primitive_arg("valueOf", arg("valueOf", args, 0)?)?.cast(kind)))
        })
        .method(&format!("{}Value", kind.name()), &[], prim.clone(), move |this, _| {
            Ok(Value::Primitive(primitive_arg("xxxValue", this)?.cast(kind)))
        })
        .method("compareTo", &[boxed.clone()], Type::int(), |this, args| {
            let a = primitive_arg("compareTo", this)?;
            let b = primitive_arg("compareTo", arg("compareTo", args, 0)?)?;
            let ordering = match (a, b) {
                (Primitive::Boolean(x), Primitive::Boolean(y)) => x.cmp(&y) as i32,
                _ => {
                    let (x, y) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
                    x.partial_cmp(&y).map(|o| o as i32).unwrap_or(0)
                }
            };
            Ok(Value::int(ordering))
        });

    let parse_name = match kind {
        PrimitiveKind::Int => Some("parseInt".to_string()),
        PrimitiveKind::Char => None,
        other => {
            let mut name = String::from("parse");
            name.push_str(other.box_class());
            Some(name)
        }
    };
    if let Some(parse_name) = parse_name {
        builder = builder.static_method(&parse_name, &[Type::string()], prim.clone(), move |_, args| {
            let text = str_arg("parse", arg("parse", args, 0)?)?;
            parse_primitive(text, kind).map(Value::Primitive).ok_or_else(|| {
                EvalError::raise(
                    "NumberFormatException",
                    format!("For input string: \"{}\"", text),
                )
            })
        });
    }

    let limits = match kind {
        PrimitiveKind::Byte => Some((Primitive::Byte(i8::MIN), Primitive::Byte(i8::MAX))),
        PrimitiveKind::Short => Some((Primitive::Short(i16::MIN), Primitive::Short(i16::MAX))),
        PrimitiveKind::Char => Some((Primitive::Char(u16::MIN), Primitive::Char(u16::MAX))),
        PrimitiveKind::Int => Some((Primitive::Int(i32::MIN), Primitive::Int(i32::MAX))),
        PrimitiveKind::Long => Some((Primitive::Long(i64::MIN), Primitive::Long(i64::MAX))),
        PrimitiveKind::Float => Some((Primitive::Float(f32::from_bits(1)), Primitive::Float(f32::MAX))),
        PrimitiveKind::Double => Some((Primitive::Double(f64::from_bits(1)), Primitive::Double(f64::MAX))),
        PrimitiveKind::Boolean => None,
    };
    let constant = Modifiers::PUBLIC | Modifiers::FINAL;
    if let Some((min, max)) = limits {
        builder = builder
            .static_field("MIN_VALUE", prim.clone(), Value::Primitive(min), constant)
            .static_field("MAX_VALUE", prim, Value::Primitive(max), constant);
    }
    builder.build()
}

fn string_class() -> super::ClassDef {
    ClassBuilder::class("String")
        .implements("CharSequence")
        .implements("Comparable")
        .implements("Serializable")
        .constructor(&[], |_, _| Ok(Value::string("")))
        .constructor(&[Type::string()], |_, args| Ok(arg("<init>", args, 0)?.clone()))
        .method("length", &[], Type::int(), |this, _| {
            Ok(Value::int(units(str_arg("length", this)?).len() as i32))
        })
        .method("isEmpty", &[], Type::boolean(), |this, _| {
            Ok(Value::boolean(str_arg("isEmpty", this)?.is_empty()))
        })
        .method("charAt", &[Type::int()], Type::char(), |this, args| {
            let units = units(str_arg("charAt", this)?);
            let index = int_arg("charAt", arg("charAt", args, 0)?)?;
            usize::try_from(index)
                .ok()
                .and_then(|i| units.get(i))
                .map(|&c| Value::Primitive(Primitive::Char(c)))
                .ok_or_else(|| {
                    EvalError::raise(
                        "StringIndexOutOfBoundsException",
                        format!("index {} out of bounds for length {}", index, units.len()),
                    )
                })
        })
        .method("substring", &[Type::int()], Type::string(), |this, args| {
            let units = units(str_arg("substring", this)?);
            let begin = int_arg("substring", arg("substring", args, 0)?)?;
            substring(&units, begin, units.len() as i32)
        })
        .method("substring", &[Type::int(), Type::int()], Type::string(), |this, args| {
            let units = units(str_arg("substring", this)?);
            let begin = int_arg("substring", arg("substring", args, 0)?)?;
            let end = int_arg("substring", arg("substring", args, 1)?)?;
            substring(&units, begin, end)
        })
        .method("indexOf", &[Type::string()], Type::int(), |this, args| {
            let haystack = units(str_arg("indexOf", this)?);
            let needle = units(str_arg("indexOf", arg("indexOf", args, 0)?)?);
            let found = if needle.is_empty() {
                Some(0)
            } else {
                haystack.windows(needle.len()).position(|w| w == needle.as_slice())
            };
            Ok(Value::int(found.map(|i| i as i32).unwrap_or(-1)))
        })
        .method("contains", &[Type::class("CharSequence")], Type::boolean(), |this, args| {
            let text = str_arg("contains", this)?;
            Ok(Value::boolean(text.contains(&arg("contains", args, 0)?.to_string())))
        })
        .method("startsWith", &[Type::string()], Type::boolean(), |this, args| {
            let text = str_arg("startsWith", this)?;
            Ok(Value::boolean(text.starts_with(str_arg("startsWith", arg("startsWith", args, 0)?)?)))
        })
        .method("concat", &[Type::string()], Type::string(), |this, args| {
            let mut text = str_arg("concat", this)?.to_string();
            text.push_str(str_arg("concat", arg("concat", args, 0)?)?);
            Ok(Value::string(&text))
        })
        .method("trim", &[], Type::string(), |this, _| {
            Ok(Value::string(str_arg("trim", this)?.trim()))
        })
        .method("toUpperCase", &[], Type::string(), |this, _| {
            Ok(Value::string(&str_arg("toUpperCase", this)?.to_uppercase()))
        })
        .method("toLowerCase", &[], Type::string(), |this, _| {
            Ok(Value::string(&str_arg("toLowerCase", this)?.to_lowercase()))
        })
        .method("compareTo", &[Type::string()], Type::int(), |this, args| {
            let a = units(str_arg("compareTo", this)?);
            let b = units(str_arg("compareTo", arg("compareTo", args, 0)?)?);
            let diff = a
                .iter()
                .zip(&b)
                .find(|(x, y)| x != y)
                .map(|(x, y)| *x as i32 - *y as i32)
                .unwrap_or(a.len() as i32 - b.len() as i32);
            Ok(Value::int(diff))
        })
        .static_method("valueOf", &[Type::object()], Type::string(), |_, args| {
            Ok(Value::string(&arg("valueOf", args, 0)?.to_string()))
        })
        .build()
}

fn substring(units: &[u16], begin: i32, end: i32) -> Result<Value, EvalError> {
    let len = units.len() as i32;
    if begin < 0 || end > len || begin > end {
        return Err(EvalError::raise(
            "StringIndexOutOfBoundsException",
            format!("begin {}, end {}, length {}", begin, end, len),
        ));
    }
    Ok(from_units(&units[begin as usize..end as usize]))
}

fn math_class() -> super::ClassDef {
    let constant = Modifiers::PUBLIC | Modifiers::FINAL;
    let mut builder = ClassBuilder::class("Math")
        .static_field("PI", Type::double(), Value::double(core::f64::consts::PI), constant)
        .static_field("E", Type::double(), Value::double(core::f64::consts::E), constant);

    for kind in [PrimitiveKind::Int, PrimitiveKind::Long, PrimitiveKind::Double] {
        let ty = Type::Primitive(kind);
        let pair = [ty.clone(), ty.clone()];
        builder = builder
            .static_method("max", &pair, ty.clone(), move |_, args| {
                extremum("max", args, kind, |a, b| a >= b)
            })
            .static_method("min", &pair, ty.clone(), move |_, args| {
                extremum("min", args, kind, |a, b| a <= b)
            })
            .static_method("abs", &[ty.clone()], ty, move |_, args| {
                let p = primitive_arg("abs", arg("abs", args, 0)?)?;
                Ok(Value::Primitive(match p {
                    Primitive::Int(v) => Primitive::Int(v.wrapping_abs()),
                    Primitive::Long(v) => Primitive::Long(v.wrapping_abs()),
                    other => Primitive::Double(other.as_f64().unwrap_or_default().abs()),
                }))
            });
    }
    builder
        .static_method("sqrt", &[Type::double()], Type::double(), |_, args| {
            let v = primitive_arg("sqrt", arg("sqrt", args, 0)?)?;
            Ok(Value::double(v.as_f64().unwrap_or_default().sqrt()))
        })
        .build()
}

fn extremum(
    method: &str,
    args: &[Value],
    kind: PrimitiveKind,
    keep_first: impl Fn(f64, f64) -> bool,
) -> Result<Value, EvalError> {
    let a = primitive_arg(method, arg(method, args, 0)?)?.cast(kind);
    let b = primitive_arg(method, arg(method, args, 1)?)?.cast(kind);
    let (x, y) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
    Ok(Value::Primitive(if keep_first(x, y) { a } else { b }))
}

/// Exception classes, parent first.
const EXCEPTIONS: &[(&str, &str)] = &[
    ("Exception", "Throwable"),
    ("Error", "Throwable"),
    ("RuntimeException", "Exception"),
    ("ArithmeticException", "RuntimeException"),
    ("NullPointerException", "RuntimeException"),
    ("ClassCastException", "RuntimeException"),
    ("IllegalArgumentException", "RuntimeException"),
    ("NumberFormatException", "IllegalArgumentException"),
    ("IllegalStateException", "RuntimeException"),
    ("UnsupportedOperationException", "RuntimeException"),
    ("NegativeArraySizeException", "RuntimeException"),
    ("IndexOutOfBoundsException", "RuntimeException"),
    ("ArrayIndexOutOfBoundsException", "IndexOutOfBoundsException"),
    ("StringIndexOutOfBoundsException", "IndexOutOfBoundsException"),
];

fn exception_class(builder: ClassBuilder) -> super::ClassDef {
    builder
        .constructor(&[], |_, _| Ok(Value::Void))
        .constructor(&[Type::string()], |this, args| {
            if let Value::Object(Object::Instance(instance)) = this {
                instance.set_field("message", arg("<init>", args, 0)?.clone())?;
            }
            Ok(Value::Void)
        })
        .build()
}

fn install_exceptions(registry: &ClassRegistry) {
    registry.register(exception_class(
        ClassBuilder::class("Throwable")
            .implements("Serializable")
            .field("message", Type::string())
            .method("getMessage", &[], Type::string(), |this, _| {
                Ok(match this {
                    Value::Object(Object::Instance(instance)) => {
                        instance.field("message").unwrap_or(Value::Null)
                    }
                    _ => Value::Null,
                })
            }),
    ));
    for (name, parent) in EXCEPTIONS {
        registry.register(exception_class(ClassBuilder::class(name).extends(parent)));
    }
}

fn install_functional_interfaces(registry: &ClassRegistry) {
    let object = Type::object;
    let interfaces: Vec<(&str, &str, Vec<Type>, Type)> = Vec::from([
        ("Runnable", "run", Vec::new(), Type::Void),
        ("Callable", "call", Vec::new(), object()),
        ("Supplier", "get", Vec::new(), object()),
        ("IntSupplier", "getAsInt", Vec::new(), Type::int()),
        ("Function", "apply", Vec::from([object()]), object()),
        ("BiFunction", "apply", Vec::from([object(), object()]), object()),
        ("Consumer", "accept", Vec::from([object()]), Type::Void),
        ("Predicate", "test", Vec::from([object()]), Type::boolean()),
        ("IntUnaryOperator", "applyAsInt", Vec::from([Type::int()]), Type::int()),
        ("IntBinaryOperator", "applyAsInt", Vec::from([Type::int(), Type::int()]), Type::int()),
        ("Comparator", "compare", Vec::from([object(), object()]), Type::int()),
    ]);
    for (name, method, params, ret) in interfaces {
        registry.register(
            ClassBuilder::interface(name)
                .abstract_method(method, &params, ret)
                .build(),
        );
    }
    registry.register(
        ClassBuilder::interface("UnaryOperator")
            .implements("Function")
            .build(),
    );
}
