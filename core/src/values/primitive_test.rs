use super::primitive::{Primitive, PrimitiveKind};
use pretty_assertions::assert_eq;

#[test]
fn test_kind_names_round_trip() {
    for kind in PrimitiveKind::ALL {
        assert_eq!(PrimitiveKind::from_name(kind.name()), Some(kind));
        assert_eq!(PrimitiveKind::from_box_class(kind.box_class()), Some(kind));
    }
    assert_eq!(PrimitiveKind::from_name("Integer"), None);
}

#[test]
fn test_widening_table() {
    use PrimitiveKind::*;
    assert!(Byte.widens_to(Short));
    assert!(Byte.widens_to(Double));
    assert!(Char.widens_to(Int));
    assert!(!Char.widens_to(Short));
    assert!(!Short.widens_to(Char));
    assert!(Int.widens_to(Float));
    assert!(Long.widens_to(Float));
    assert!(!Double.widens_to(Float));
    assert!(!Boolean.widens_to(Int));
    assert!(Boolean.widens_to(Boolean));
}

#[test]
fn test_binary_promotion() {
    use PrimitiveKind::*;
    assert_eq!(PrimitiveKind::promote(Byte, Short), Int);
    assert_eq!(PrimitiveKind::promote(Char, Char), Int);
    assert_eq!(PrimitiveKind::promote(Int, Long), Long);
    assert_eq!(PrimitiveKind::promote(Long, Float), Float);
    assert_eq!(PrimitiveKind::promote(Float, Double), Double);
}

#[test]
fn test_boolean_casts_to_one_or_zero() {
    for kind in PrimitiveKind::ALL.into_iter().filter(|k| k.is_numeric()) {
        assert_eq!(Primitive::Boolean(true).cast(kind), kind.one());
        assert_eq!(Primitive::Boolean(false).cast(kind), kind.default_value());
    }
}

#[test]
fn test_numbers_cast_to_boolean_by_zero_test() {
    assert_eq!(Primitive::Int(0).cast(PrimitiveKind::Boolean), Primitive::Boolean(false));
    assert_eq!(Primitive::Int(-3).cast(PrimitiveKind::Boolean), Primitive::Boolean(true));
    assert_eq!(Primitive::Double(0.0).cast(PrimitiveKind::Boolean), Primitive::Boolean(false));
    assert_eq!(Primitive::Char(0).cast(PrimitiveKind::Boolean), Primitive::Boolean(false));
}

#[test]
fn test_narrowing_wraps() {
    assert_eq!(Primitive::Int(300).cast(PrimitiveKind::Byte), Primitive::Byte(44));
    assert_eq!(Primitive::Int(-1).cast(PrimitiveKind::Char), Primitive::Char(0xFFFF));
    assert_eq!(Primitive::Long(1 << 40).cast(PrimitiveKind::Int), Primitive::Int(0));
}

#[test]
fn test_floating_to_integral_truncates_and_saturates() {
    assert_eq!(Primitive::Double(3.9).cast(PrimitiveKind::Int), Primitive::Int(3));
    assert_eq!(Primitive::Double(-3.9).cast(PrimitiveKind::Int), Primitive::Int(-3));
    assert_eq!(Primitive::Double(1e20).cast(PrimitiveKind::Int), Primitive::Int(i32::MAX));
    assert_eq!(Primitive::Double(f64::NAN).cast(PrimitiveKind::Long), Primitive::Long(0));
    // Through int first, then wrapped.
    assert_eq!(Primitive::Double(300.7).cast(PrimitiveKind::Byte), Primitive::Byte(44));
}

#[test]
fn test_fits_in() {
    assert!(Primitive::Int(127).fits_in(PrimitiveKind::Byte));
    assert!(!Primitive::Int(128).fits_in(PrimitiveKind::Byte));
    assert!(Primitive::Int(65535).fits_in(PrimitiveKind::Char));
    assert!(!Primitive::Int(-1).fits_in(PrimitiveKind::Char));
    assert!(!Primitive::Double(1.0).fits_in(PrimitiveKind::Int));
}

#[test]
fn test_display() {
    assert_eq!(Primitive::Char(65).to_string(), "A");
    assert_eq!(Primitive::Boolean(true).to_string(), "true");
    assert_eq!(Primitive::Long(-7).to_string(), "-7");
}
