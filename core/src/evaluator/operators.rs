//! Binary and unary operator implementations.
//!
//! Operands go through binary numeric promotion: both sides unbox, then
//! widen to `int`, `long`, `float` or `double`. Integer arithmetic wraps;
//! integer division by zero raises `ArithmeticException`, floating division
//! follows IEEE 754.

use crate::ast::{BinaryOp, UnaryOp};
use crate::evaluator::{CoercionError, EvalError};
use crate::values::{Object, Primitive, PrimitiveKind, Value};
use crate::{ToString, format};

fn bad_operand(op: &str, left: &Value, right: Option<&Value>) -> EvalError {
    let operand = match right {
        Some(right) => format!("{} and {}", left.type_name(), right.type_name()),
        None => left.type_name(),
    };
    CoercionError::BadOperand {
        op: op.to_string(),
        operand,
    }
    .into()
}

fn void_operand(op: &str) -> EvalError {
    CoercionError::VoidOperand { op: op.to_string() }.into()
}

fn is_string(value: &Value) -> bool {
    matches!(value, Value::Object(Object::Str(_)))
}

/// Evaluate a non-short-circuit binary operator.
pub(super) fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if left.is_void() || right.is_void() {
        return Err(void_operand(op.symbol()));
    }

    match op {
        BinaryOp::Add if is_string(left) || is_string(right) => {
            return Ok(Value::string(&format!("{}{}", left, right)));
        }
        BinaryOp::Eq => return Ok(Value::boolean(equality(left, right))),
        BinaryOp::Ne => return Ok(Value::boolean(!equality(left, right))),
        _ => {}
    }

    let (Some(l), Some(r)) = (left.unboxed(), right.unboxed()) else {
        return Err(bad_operand(op.symbol(), left, Some(right)));
    };

    if let (Primitive::Boolean(a), Primitive::Boolean(b)) = (l, r) {
        return match op {
            BinaryOp::BitAnd | BinaryOp::And => Ok(Value::boolean(a & b)),
            BinaryOp::BitOr | BinaryOp::Or => Ok(Value::boolean(a | b)),
            BinaryOp::BitXor => Ok(Value::boolean(a ^ b)),
            _ => Err(bad_operand(op.symbol(), left, Some(right))),
        };
    }
    if !l.kind().is_numeric() || !r.kind().is_numeric() {
        return Err(bad_operand(op.symbol(), left, Some(right)));
    }

    match op {
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => shift(op, l, r)
            .map(Value::Primitive)
            .ok_or_else(|| bad_operand(op.symbol(), left, Some(right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => Ok(Value::boolean(compare(op, l, r))),
        BinaryOp::And | BinaryOp::Or => Err(bad_operand(op.symbol(), left, Some(right))),
        _ => arithmetic(op, l, r)?
            .map(Value::Primitive)
            .ok_or_else(|| bad_operand(op.symbol(), left, Some(right))),
    }
}

/// `==` on two values. Numbers compare by value after promotion, boxed
/// values and strings by content, other references by identity.
pub(super) fn equality(left: &Value, right: &Value) -> bool {
    match (left.unboxed(), right.unboxed()) {
        (Some(Primitive::Boolean(a)), Some(Primitive::Boolean(b))) => a == b,
        (Some(a), Some(b)) if a.kind().is_numeric() && b.kind().is_numeric() => {
            let kind = PrimitiveKind::promote(a.kind(), b.kind());
            if kind.is_floating() {
                a.as_f64() == b.as_f64()
            } else {
                a.as_i64() == b.as_i64()
            }
        }
        _ => left.equals(right),
    }
}

fn compare(op: BinaryOp, l: Primitive, r: Primitive) -> bool {
    let kind = PrimitiveKind::promote(l.kind(), r.kind());
    let ordering = if kind.is_floating() {
        l.as_f64().partial_cmp(&r.as_f64())
    } else {
        l.as_i64().partial_cmp(&r.as_i64())
    };
    // NaN compares false against everything.
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => false,
    }
}

/// `Ok(None)` when `op` is not arithmetic.
fn arithmetic(op: BinaryOp, l: Primitive, r: Primitive) -> Result<Option<Primitive>, EvalError> {
    let kind = PrimitiveKind::promote(l.kind(), r.kind());
    let result = match kind {
        PrimitiveKind::Int => {
            let (a, b) = (l.as_i64().unwrap_or_default(), r.as_i64().unwrap_or_default());
            eval_binary_int(op, a, b)?.map(|v| Primitive::Int(v as i32))
        }
        PrimitiveKind::Long => {
            let (a, b) = (l.as_i64().unwrap_or_default(), r.as_i64().unwrap_or_default());
            eval_binary_long(op, a, b)?.map(Primitive::Long)
        }
        PrimitiveKind::Float => {
            let (a, b) = (l.as_f64().unwrap_or_default() as f32, r.as_f64().unwrap_or_default() as f32);
            eval_binary_float(op, a as f64, b as f64).map(|v| Primitive::Float(v as f32))
        }
        _ => {
            let (a, b) = (l.as_f64().unwrap_or_default(), r.as_f64().unwrap_or_default());
            eval_binary_float(op, a, b).map(Primitive::Double)
        }
    };
    Ok(result)
}

fn division_by_zero() -> EvalError {
    EvalError::raise("ArithmeticException", "/ by zero")
}

/// 32-bit integer arithmetic on operands already promoted to `int`.
fn eval_binary_int(op: BinaryOp, left: i64, right: i64) -> Result<Option<i64>, EvalError> {
    let (a, b) = (left as i32, right as i32);
    let v = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div if b == 0 => return Err(division_by_zero()),
        BinaryOp::Div => a.wrapping_div(b),
        BinaryOp::Rem if b == 0 => return Err(division_by_zero()),
        BinaryOp::Rem => a.wrapping_rem(b),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        _ => return Ok(None),
    };
    Ok(Some(v as i64))
}

fn eval_binary_long(op: BinaryOp, a: i64, b: i64) -> Result<Option<i64>, EvalError> {
    let v = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div if b == 0 => return Err(division_by_zero()),
        BinaryOp::Div => a.wrapping_div(b),
        BinaryOp::Rem if b == 0 => return Err(division_by_zero()),
        BinaryOp::Rem => a.wrapping_rem(b),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        _ => return Ok(None),
    };
    Ok(Some(v))
}

fn eval_binary_float(op: BinaryOp, a: f64, b: f64) -> Option<f64> {
    Some(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        _ => return None,
    })
}

/// Shifts promote the left operand alone; the distance is masked to the
/// width of the result.
fn shift(op: BinaryOp, l: Primitive, r: Primitive) -> Option<Primitive> {
    let distance = r.as_i64()?;
    match unary_promote(l)? {
        Primitive::Int(v) => {
            let n = (distance & 0x1f) as u32;
            Some(Primitive::Int(match op {
                BinaryOp::Shl => v.wrapping_shl(n),
                BinaryOp::Shr => v.wrapping_shr(n),
                _ => ((v as u32) >> n) as i32,
            }))
        }
        Primitive::Long(v) => {
            let n = (distance & 0x3f) as u32;
            Some(Primitive::Long(match op {
                BinaryOp::Shl => v.wrapping_shl(n),
                BinaryOp::Shr => v.wrapping_shr(n),
                _ => ((v as u64) >> n) as i64,
            }))
        }
        _ => None,
    }
}

/// Unary numeric promotion: `byte`, `short` and `char` become `int`.
fn unary_promote(p: Primitive) -> Option<Primitive> {
    match p.kind() {
        PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Char => Some(p.cast(PrimitiveKind::Int)),
        PrimitiveKind::Boolean => None,
        _ => Some(p),
    }
}

/// Evaluate `-x`, `+x`, `!x` or `~x`. Increments go through [`step`].
pub(super) fn unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    if operand.is_void() {
        return Err(void_operand(op.symbol()));
    }
    let bad = || bad_operand(op.symbol(), operand, None);
    let p = operand.unboxed().ok_or_else(bad)?;
    let result = match op {
        UnaryOp::Not => match p {
            Primitive::Boolean(b) => Primitive::Boolean(!b),
            _ => return Err(bad()),
        },
        UnaryOp::Plus => unary_promote(p).ok_or_else(bad)?,
        UnaryOp::Neg => match unary_promote(p).ok_or_else(bad)? {
            Primitive::Int(v) => Primitive::Int(v.wrapping_neg()),
            Primitive::Long(v) => Primitive::Long(v.wrapping_neg()),
            Primitive::Float(v) => Primitive::Float(-v),
            Primitive::Double(v) => Primitive::Double(-v),
            _ => return Err(bad()),
        },
        UnaryOp::BitNot => match unary_promote(p).ok_or_else(bad)? {
            Primitive::Int(v) => Primitive::Int(!v),
            Primitive::Long(v) => Primitive::Long(!v),
            _ => return Err(bad()),
        },
        UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
            return step(op, operand);
        }
    };
    Ok(Value::Primitive(result))
}

/// The value after `++` or `--`. The result keeps the operand's kind, and a
/// boxed operand stays boxed.
pub(super) fn step(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    if operand.is_void() {
        return Err(void_operand(op.symbol()));
    }
    let p = operand
        .unboxed()
        .filter(|p| p.kind().is_numeric())
        .ok_or_else(|| bad_operand(op.symbol(), operand, None))?;
    let delta = match op {
        UnaryOp::PreInc | UnaryOp::PostInc => 1,
        _ => -1,
    };
    let next = match p {
        Primitive::Float(v) => Primitive::Float(v + delta as f32),
        Primitive::Double(v) => Primitive::Double(v + delta as f64),
        _ => Primitive::Long(p.as_i64().unwrap_or_default().wrapping_add(delta)).cast(p.kind()),
    };
    Ok(match operand {
        Value::Object(Object::Boxed(_)) => Value::boxed(next),
        _ => Value::Primitive(next),
    })
}
