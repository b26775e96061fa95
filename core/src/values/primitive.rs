//! Primitive values tagged with their exact primitive kind.
//!
//! A `byte` stays a `byte` until a widening or narrowing conversion says
//! otherwise; arithmetic and casting never collapse kinds into a generic
//! "number".

use core::fmt;

/// The eight primitive kinds of the host language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Char,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PrimitiveKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Simple name of the wrapper class used when boxing this kind.
    pub fn box_class(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Character",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Short => "Short",
            PrimitiveKind::Int => "Integer",
            PrimitiveKind::Long => "Long",
            PrimitiveKind::Float => "Float",
            PrimitiveKind::Double => "Double",
        }
    }

    pub fn from_box_class(name: &str) -> Option<Self> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.box_class() == name)
    }

    /// `char` counts as numeric, `boolean` does not.
    pub fn is_numeric(self) -> bool {
        self != PrimitiveKind::Boolean
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Char
                | PrimitiveKind::Byte
                | PrimitiveKind::Short
                | PrimitiveKind::Int
                | PrimitiveKind::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }

    /// The zero / `false` / `'\u0000'` value of this kind.
    pub fn default_value(self) -> Primitive {
        match self {
            PrimitiveKind::Boolean => Primitive::Boolean(false),
            PrimitiveKind::Char => Primitive::Char(0),
            PrimitiveKind::Byte => Primitive::Byte(0),
            PrimitiveKind::Short => Primitive::Short(0),
            PrimitiveKind::Int => Primitive::Int(0),
            PrimitiveKind::Long => Primitive::Long(0),
            PrimitiveKind::Float => Primitive::Float(0.0),
            PrimitiveKind::Double => Primitive::Double(0.0),
        }
    }

    /// The "one" value of this kind (`true` for boolean, `'\u0001'` for char).
    pub fn one(self) -> Primitive {
        match self {
            PrimitiveKind::Boolean => Primitive::Boolean(true),
            PrimitiveKind::Char => Primitive::Char(1),
            PrimitiveKind::Byte => Primitive::Byte(1),
            PrimitiveKind::Short => Primitive::Short(1),
            PrimitiveKind::Int => Primitive::Int(1),
            PrimitiveKind::Long => Primitive::Long(1),
            PrimitiveKind::Float => Primitive::Float(1.0),
            PrimitiveKind::Double => Primitive::Double(1.0),
        }
    }

    /// Primitive widening conversion. Reflexive.
    pub fn widens_to(self, target: PrimitiveKind) -> bool {
        use PrimitiveKind::*;
        if self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => target == Double,
            Double | Boolean => false,
        }
    }

    /// Binary numeric promotion of two operand kinds.
    pub fn promote(left: PrimitiveKind, right: PrimitiveKind) -> PrimitiveKind {
        use PrimitiveKind::*;
        if left == Double || right == Double {
            Double
        } else if left == Float || right == Float {
            Float
        } else if left == Long || right == Long {
            Long
        } else {
            Int
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive value. `char` is a UTF-16 code unit, as in the host language.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Boolean(bool),
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Boolean(_) => PrimitiveKind::Boolean,
            Primitive::Char(_) => PrimitiveKind::Char,
            Primitive::Byte(_) => PrimitiveKind::Byte,
            Primitive::Short(_) => PrimitiveKind::Short,
            Primitive::Int(_) => PrimitiveKind::Int,
            Primitive::Long(_) => PrimitiveKind::Long,
            Primitive::Float(_) => PrimitiveKind::Float,
            Primitive::Double(_) => PrimitiveKind::Double,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integral payload widened to `i64`. `None` for boolean and floating kinds.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Primitive::Char(c) => Some(c as i64),
            Primitive::Byte(v) => Some(v as i64),
            Primitive::Short(v) => Some(v as i64),
            Primitive::Int(v) => Some(v as i64),
            Primitive::Long(v) => Some(v),
            Primitive::Boolean(_) | Primitive::Float(_) | Primitive::Double(_) => None,
        }
    }

    /// Any numeric payload widened to `f64`. `None` for boolean.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Primitive::Float(v) => Some(v as f64),
            Primitive::Double(v) => Some(v),
            Primitive::Boolean(_) => None,
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    /// True for numeric zero, `'\u0000'` and `false`.
    pub fn is_zero(&self) -> bool {
        match *self {
            Primitive::Boolean(b) => !b,
            Primitive::Float(v) => v == 0.0,
            Primitive::Double(v) => v == 0.0,
            _ => self.as_i64() == Some(0),
        }
    }

    /// Explicit primitive conversion.
    ///
    /// Numeric narrowing truncates toward zero; floating values saturate when
    /// converted to `int`/`long` (NaN becomes 0) and go through `int` before
    /// wrapping into `byte`, `short` or `char`. Booleans convert to 0/1 and
    /// numbers convert to booleans by comparing against zero.
    pub fn cast(self, target: PrimitiveKind) -> Primitive {
        if self.kind() == target {
            return self;
        }
        match self {
            Primitive::Boolean(b) => {
                if b {
                    target.one()
                } else {
                    target.default_value()
                }
            }
            _ if target == PrimitiveKind::Boolean => Primitive::Boolean(!self.is_zero()),
            Primitive::Float(v) => from_f64(v as f64, target),
            Primitive::Double(v) => from_f64(v, target),
            Primitive::Char(_)
            | Primitive::Byte(_)
            | Primitive::Short(_)
            | Primitive::Int(_)
            | Primitive::Long(_) => from_i64(self.as_i64().unwrap_or_default(), target),
        }
    }

    /// Whether an `int` value can be narrowed to `target` without loss.
    pub fn fits_in(&self, target: PrimitiveKind) -> bool {
        let Some(v) = self.as_i64() else {
            return false;
        };
        match target {
            PrimitiveKind::Byte => i8::try_from(v).is_ok(),
            PrimitiveKind::Short => i16::try_from(v).is_ok(),
            PrimitiveKind::Char => u16::try_from(v).is_ok(),
            PrimitiveKind::Int => i32::try_from(v).is_ok(),
            PrimitiveKind::Long => true,
            _ => false,
        }
    }
}

fn from_i64(v: i64, target: PrimitiveKind) -> Primitive {
    match target {
        PrimitiveKind::Boolean => Primitive::Boolean(v != 0),
        PrimitiveKind::Char => Primitive::Char(v as u16),
        PrimitiveKind::Byte => Primitive::Byte(v as i8),
        PrimitiveKind::Short => Primitive::Short(v as i16),
        PrimitiveKind::Int => Primitive::Int(v as i32),
        PrimitiveKind::Long => Primitive::Long(v),
        PrimitiveKind::Float => Primitive::Float(v as f32),
        PrimitiveKind::Double => Primitive::Double(v as f64),
    }
}

fn from_f64(v: f64, target: PrimitiveKind) -> Primitive {
    match target {
        PrimitiveKind::Boolean => Primitive::Boolean(v != 0.0),
        PrimitiveKind::Char => Primitive::Char((v as i32) as u16),
        PrimitiveKind::Byte => Primitive::Byte((v as i32) as i8),
        PrimitiveKind::Short => Primitive::Short((v as i32) as i16),
        PrimitiveKind::Int => Primitive::Int(v as i32),
        PrimitiveKind::Long => Primitive::Long(v as i64),
        PrimitiveKind::Float => Primitive::Float(v as f32),
        PrimitiveKind::Double => Primitive::Double(v),
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Primitive::Boolean(b) => write!(f, "{}", b),
            Primitive::Char(c) => {
                let ch = char::decode_utf16([c]).next().and_then(Result::ok);
                write!(f, "{}", ch.unwrap_or(char::REPLACEMENT_CHARACTER))
            }
            Primitive::Byte(v) => write!(f, "{}", v),
            Primitive::Short(v) => write!(f, "{}", v),
            Primitive::Int(v) => write!(f, "{}", v),
            Primitive::Long(v) => write!(f, "{}", v),
            Primitive::Float(v) => format_floating(f, v as f64),
            Primitive::Double(v) => format_floating(f, v),
        }
    }
}

/// Floating values always print with a fractional part, `1.0` rather than `1`.
fn format_floating(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "NaN")
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            write!(f, "Infinity")
        } else {
            write!(f, "-Infinity")
        }
    } else if value.fract() == 0.0 && value.abs() < 1e7 {
        write!(f, "{:.1}", value)
    } else {
        write!(f, "{}", value)
    }
}
